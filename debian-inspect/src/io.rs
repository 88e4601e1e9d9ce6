// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Content digests and file fingerprinting. */

use {
    crate::error::{DebianError, Result},
    digest::Digest,
    std::{
        fmt::{Display, Formatter},
        io::Read,
        path::Path,
    },
};

/// Size of buffer used when streaming content through digesters.
const READ_CHUNK_SIZE: usize = 32768;

/// A checksum flavor used by Debian packaging.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ChecksumType {
    /// MD5.
    Md5,

    /// SHA-1.
    Sha1,

    /// SHA-256.
    Sha256,
}

impl ChecksumType {
    /// All supported variants, weakest first.
    pub fn all() -> impl Iterator<Item = ChecksumType> {
        [Self::Md5, Self::Sha1, Self::Sha256].into_iter()
    }

    /// Name of the field in `.dsc` files listing files with this digest type.
    pub fn source_field_name(&self) -> &'static str {
        match self {
            Self::Md5 => "Files",
            Self::Sha1 => "Checksums-Sha1",
            Self::Sha256 => "Checksums-Sha256",
        }
    }

    /// Short lowercase name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }

    /// Length in bytes of digests of this flavor.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }
}

impl Display for ChecksumType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Represents a content digest.
#[derive(Clone, Eq, PartialEq, PartialOrd)]
pub enum ContentDigest {
    /// An MD5 digest.
    Md5(Vec<u8>),
    /// A SHA-1 digest.
    Sha1(Vec<u8>),
    /// A SHA-256 digest.
    Sha256(Vec<u8>),
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5(data) => write!(f, "Md5({})", hex::encode(data)),
            Self::Sha1(data) => write!(f, "Sha1({})", hex::encode(data)),
            Self::Sha256(data) => write!(f, "Sha256({})", hex::encode(data)),
        }
    }
}

impl Display for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.digest_hex())
    }
}

impl ContentDigest {
    /// Create a new MD5 instance by parsing a hex digest.
    pub fn md5_hex(digest: &str) -> Result<Self> {
        Self::from_hex_digest(ChecksumType::Md5, digest)
    }

    /// Create a new SHA-1 instance by parsing a hex digest.
    pub fn sha1_hex(digest: &str) -> Result<Self> {
        Self::from_hex_digest(ChecksumType::Sha1, digest)
    }

    /// Create a new SHA-256 instance by parsing a hex digest.
    pub fn sha256_hex(digest: &str) -> Result<Self> {
        Self::from_hex_digest(ChecksumType::Sha256, digest)
    }

    /// Obtain an instance by parsing a hex string as a [ChecksumType].
    ///
    /// Hex digits are accepted in either case.
    pub fn from_hex_digest(checksum: ChecksumType, digest: &str) -> Result<Self> {
        let data = hex::decode(digest)
            .map_err(|e| DebianError::ContentDigestBadHex(digest.to_string(), e))?;

        if data.len() != checksum.digest_len() {
            return Err(DebianError::ContentDigestBadLength(
                checksum,
                digest.to_string(),
            ));
        }

        Ok(match checksum {
            ChecksumType::Md5 => Self::Md5(data),
            ChecksumType::Sha1 => Self::Sha1(data),
            ChecksumType::Sha256 => Self::Sha256(data),
        })
    }

    /// Obtain the digest bytes for this content digest.
    pub fn digest_bytes(&self) -> &[u8] {
        match self {
            Self::Md5(x) => x,
            Self::Sha1(x) => x,
            Self::Sha256(x) => x,
        }
    }

    /// Obtain the hex encoded content digest.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest_bytes())
    }

    /// Obtain the [ChecksumType] for this digest.
    pub fn checksum_type(&self) -> ChecksumType {
        match self {
            Self::Md5(_) => ChecksumType::Md5,
            Self::Sha1(_) => ChecksumType::Sha1,
            Self::Sha256(_) => ChecksumType::Sha256,
        }
    }
}

/// Digests and size of a byte stream.
///
/// Produced by feeding content through a [MultiDigester].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fingerprints {
    pub md5: ContentDigest,
    pub sha1: ContentDigest,
    pub sha256: ContentDigest,
    /// Total number of bytes digested.
    pub size: u64,
}

impl Fingerprints {
    /// Compute fingerprints by draining a reader.
    ///
    /// Content is consumed in fixed size chunks, so memory use does not depend on the
    /// length of the stream.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut digester = MultiDigester::default();
        let mut buffer = vec![0; READ_CHUNK_SIZE];

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            digester.update(&buffer[0..read]);
        }

        Ok(digester.finish())
    }

    /// Compute fingerprints of the file at the given path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let fh = std::fs::File::open(path.as_ref())?;

        Self::from_reader(fh)
    }

    /// Compute fingerprints of an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut digester = MultiDigester::default();
        digester.update(data);

        digester.finish()
    }

    /// Obtain the [ContentDigest] for a given [ChecksumType].
    pub fn digest(&self, checksum: ChecksumType) -> &ContentDigest {
        match checksum {
            ChecksumType::Md5 => &self.md5,
            ChecksumType::Sha1 => &self.sha1,
            ChecksumType::Sha256 => &self.sha256,
        }
    }

    /// Whether this instance holds the same content as another digest.
    pub fn matches_digest(&self, other: &ContentDigest) -> bool {
        self.digest(other.checksum_type()) == other
    }
}

/// A content digester that simultaneously computes multiple digest types.
#[derive(Default)]
pub struct MultiDigester {
    md5: md5::Md5,
    sha1: sha1::Sha1,
    sha256: sha2::Sha256,
    size: u64,
}

impl MultiDigester {
    /// Write content into the digesters.
    pub fn update(&mut self, data: &[u8]) {
        self.md5.update(data);
        self.sha1.update(data);
        self.sha256.update(data);
        self.size += data.len() as u64;
    }

    /// Finish digesting content.
    ///
    /// Consumes the instance and returns the [Fingerprints] of everything written.
    pub fn finish(self) -> Fingerprints {
        Fingerprints {
            md5: ContentDigest::Md5(self.md5.finalize().to_vec()),
            sha1: ContentDigest::Sha1(self.sha1.finalize().to_vec()),
            sha256: ContentDigest::Sha256(self.sha256.finalize().to_vec()),
            size: self.size,
        }
    }
}
