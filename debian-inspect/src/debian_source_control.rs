// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Debian source control files. */

use {
    crate::{
        control::ControlParagraph,
        error::{DebianError, Result},
        io::{ChecksumType, ContentDigest},
        package_version::PackageVersion,
        pgp::{is_cleartext_signed, read_cleartext, CleartextSignatures},
    },
    log::debug,
    std::{
        io::Read,
        ops::{Deref, DerefMut},
        str::FromStr,
    },
};

/// A single file as described by a `Files` or `Checksums-*` field in a [DebianSourceControlFile].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DebianSourceControlFileEntry<'a> {
    /// The filename/path.
    pub filename: &'a str,

    /// The content digest of this file.
    pub digest: ContentDigest,

    /// The size in bytes of the file.
    pub size: u64,
}

/// A Debian source control file/paragraph.
///
/// This control file consists of a single paragraph and defines a source package.
/// This paragraph is typically found in `.dsc` files.
///
/// The fields are defined at
/// <https://www.debian.org/doc/debian-policy/ch-controlfields.html#debian-source-control-files-dsc>.
#[derive(Default)]
pub struct DebianSourceControlFile {
    paragraph: ControlParagraph,
    /// Parsed PGP signatures, if the file was signed.
    signatures: Option<CleartextSignatures>,
}

impl Deref for DebianSourceControlFile {
    type Target = ControlParagraph;

    fn deref(&self) -> &Self::Target {
        &self.paragraph
    }
}

impl DerefMut for DebianSourceControlFile {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.paragraph
    }
}

impl From<ControlParagraph> for DebianSourceControlFile {
    fn from(paragraph: ControlParagraph) -> Self {
        Self {
            paragraph,
            signatures: None,
        }
    }
}

impl From<DebianSourceControlFile> for ControlParagraph {
    fn from(cf: DebianSourceControlFile) -> Self {
        cf.paragraph
    }
}

impl DebianSourceControlFile {
    /// Construct an instance by parsing text.
    ///
    /// Text beginning with `-----BEGIN PGP SIGNED MESSAGE-----` is parsed as a PGP
    /// cleartext signature, see [Self::from_armored_bytes()].
    pub fn parse_str(text: &str) -> Result<Self> {
        if is_cleartext_signed(text) {
            Self::from_armored_bytes(text.as_bytes())
        } else {
            Ok(Self::from(ControlParagraph::parse_str(text)?))
        }
    }

    /// Construct an instance by reading data from a reader.
    ///
    /// Semantics are the same as [Self::parse_str()]. Content must be UTF-8.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = vec![];
        reader.read_to_end(&mut data)?;

        let text = String::from_utf8(data).map_err(|e| {
            DebianError::ControlParse(format!("source control file is not UTF-8: {}", e))
        })?;

        Self::parse_str(&text)
    }

    /// Construct an instance from data holding a PGP cleartext signature.
    ///
    /// An error occurs if the PGP cleartext framing is not well-formed or if the
    /// signature packets fail to parse.
    ///
    /// The PGP signature is NOT validated. The file will be parsed despite lack of
    /// signature verification.
    pub fn from_armored_bytes(data: &[u8]) -> Result<Self> {
        let (content, signatures) = read_cleartext(data)?;

        debug!(
            "read PGP cleartext with {} signature(s)",
            signatures.iter_signatures().count()
        );

        let text = String::from_utf8(content).map_err(|e| {
            DebianError::ControlParse(format!("source control file is not UTF-8: {}", e))
        })?;

        Ok(Self {
            paragraph: ControlParagraph::parse_str(&text)?,
            signatures: Some(signatures),
        })
    }

    /// Whether the parsed content was wrapped in a PGP cleartext signature.
    pub fn is_signed(&self) -> bool {
        self.signatures.is_some()
    }

    /// Obtain PGP signatures from this possibly signed file.
    pub fn signatures(&self) -> Option<&CleartextSignatures> {
        self.signatures.as_ref()
    }

    /// The format of the source package.
    ///
    /// See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#s-f-format>.
    pub fn format(&self) -> Result<&str> {
        self.required_field_str("Format")
    }

    /// The name of the source package.
    ///
    /// See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#s-f-source>.
    pub fn source(&self) -> Result<&str> {
        self.required_field_str("Source")
    }

    /// The binary packages this source package produces.
    ///
    /// See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#s-f-binary>.
    pub fn binary(&self) -> Option<Box<(dyn Iterator<Item = &str> + '_)>> {
        let iter = self.iter_field_comma_delimited("Binary")?;

        Some(Box::new(iter))
    }

    /// The architectures this source package will build for.
    ///
    /// See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#s-f-architecture>.
    pub fn architecture(&self) -> Option<Box<(dyn Iterator<Item = &str> + '_)>> {
        let iter = self.iter_field_words("Architecture")?;

        Some(Box::new(iter))
    }

    /// The version number of the package as a string.
    ///
    /// See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#s-f-version>.
    pub fn version_str(&self) -> Result<&str> {
        self.required_field_str("Version")
    }

    /// The parsed version of the source package.
    pub fn version(&self) -> Result<PackageVersion> {
        Ok(PackageVersion::parse(self.version_str()?)?)
    }

    /// The package maintainer.
    ///
    /// See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#s-f-maintainer>.
    pub fn maintainer(&self) -> Result<&str> {
        self.required_field_str("Maintainer")
    }

    /// The URL from which the source of this package can be obtained.
    pub fn homepage(&self) -> Option<&str> {
        self.field_str("Homepage")
    }

    /// The most recent version of the standards this package conforms to.
    pub fn standards_version(&self) -> Result<&str> {
        self.required_field_str("Standards-Version")
    }

    /// List of associated files with MD5 checksums.
    ///
    /// See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#s-f-files>.
    pub fn files(
        &self,
    ) -> Result<Box<(dyn Iterator<Item = Result<DebianSourceControlFileEntry<'_>>> + '_)>> {
        self.iter_files(ChecksumType::Md5)
            .ok_or_else(|| DebianError::ControlRequiredFieldMissing("Files".to_string()))
    }

    /// Iterate the entries of the field listing files with a given digest type.
    ///
    /// Returns `None` if the field is absent.
    pub fn iter_files(
        &self,
        checksum: ChecksumType,
    ) -> Option<Box<(dyn Iterator<Item = Result<DebianSourceControlFileEntry<'_>>> + '_)>> {
        let iter = self.iter_field_lines(checksum.source_field_name())?;

        Some(Box::new(iter.map(move |v| {
            // Values are of form: <digest> <size> <path>
            let mut parts = v.split_ascii_whitespace();

            let (digest, size, filename) = match (parts.next(), parts.next(), parts.next()) {
                (Some(digest), Some(size), Some(filename)) => (digest, size, filename),
                _ => return Err(DebianError::SourceFileEntryMalformed(v.to_string())),
            };

            if parts.next().is_some() {
                return Err(DebianError::SourceFileEntryMalformed(v.to_string()));
            }

            let digest = ContentDigest::from_hex_digest(checksum, digest)?;
            let size = u64::from_str(size)?;

            Ok(DebianSourceControlFileEntry {
                filename,
                digest,
                size,
            })
        })))
    }
}
