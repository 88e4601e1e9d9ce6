// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Validation of source packages described by `.dsc` files.

A `.dsc` file lists the files constituting a source package along with their sizes
and digests. The `Files` field carries MD5 digests. `Checksums-Sha1` and
`Checksums-Sha256` carry stronger digests of the same files.

Files are resolved relative to the directory holding the `.dsc` file.
*/

use {
    crate::{
        debian_source_control::DebianSourceControlFile,
        error::{DebianError, Result},
        io::{ChecksumType, ContentDigest, Fingerprints},
    },
    log::{debug, warn},
    std::{
        collections::BTreeMap,
        ops::Deref,
        path::{Path, PathBuf},
    },
};

/// Digests of files, keyed by digest type then filename.
pub type FileChecksums = BTreeMap<ChecksumType, BTreeMap<String, ContentDigest>>;

/// Actual digests of files whose content does not match what was declared.
///
/// Only mismatching digests are present. An empty mapping means everything matched.
pub type CorrectedChecksums = FileChecksums;

/// A file referenced by a source package.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceFileEntry {
    /// Filename relative to the source package's directory.
    pub filename: String,

    /// Declared size in bytes.
    pub size: u64,

    /// Declared digests.
    ///
    /// Always contains [ChecksumType::Md5]. Other types are present when the
    /// corresponding `Checksums-*` field lists the file.
    pub digests: BTreeMap<ChecksumType, ContentDigest>,
}

fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(|c: char| c == '/' || c == '\\')
}

/// A source package: a parsed `.dsc` file and the files it references.
pub struct SourcePackage {
    path: Option<PathBuf>,
    base_dir: PathBuf,
    control: DebianSourceControlFile,
    files: Vec<SourceFileEntry>,
}

impl Deref for SourcePackage {
    type Target = DebianSourceControlFile;

    fn deref(&self) -> &Self::Target {
        &self.control
    }
}

impl SourcePackage {
    /// Open the `.dsc` file at the given path.
    ///
    /// Referenced files are resolved relative to the directory containing it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(DebianError::PathNotFile(path.to_path_buf()));
        }

        if path.extension().map(|x| x != "dsc").unwrap_or(true) {
            warn!(
                "{} does not have a .dsc extension; parsing anyway",
                path.display()
            );
        }

        let fh = std::fs::File::open(path)?;
        let control = DebianSourceControlFile::from_reader(fh)?;

        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut slf = Self::from_control(control, base_dir)?;
        slf.path = Some(path.to_path_buf());

        Ok(slf)
    }

    /// Parse `.dsc` content, resolving referenced files against `base_dir`.
    pub fn parse_str(text: &str, base_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_control(
            DebianSourceControlFile::parse_str(text)?,
            base_dir.as_ref().to_path_buf(),
        )
    }

    /// Construct an instance from an already parsed control file.
    pub fn from_control(control: DebianSourceControlFile, base_dir: PathBuf) -> Result<Self> {
        let mut files: Vec<SourceFileEntry> = vec![];

        for entry in control.files()? {
            let entry = entry?;

            if !is_plain_filename(entry.filename) {
                return Err(DebianError::SourceFileUnsafePath(entry.filename.to_string()));
            }

            if files.iter().any(|f| f.filename == entry.filename) {
                return Err(DebianError::SourceFileEntryMalformed(format!(
                    "{} listed more than once in Files",
                    entry.filename
                )));
            }

            files.push(SourceFileEntry {
                filename: entry.filename.to_string(),
                size: entry.size,
                digests: BTreeMap::from([(ChecksumType::Md5, entry.digest)]),
            });
        }

        for checksum in [ChecksumType::Sha1, ChecksumType::Sha256] {
            let field = checksum.source_field_name();

            let entries = match control.iter_files(checksum) {
                Some(entries) => entries,
                None => continue,
            };

            for entry in entries {
                let entry = entry?;

                let file = files
                    .iter_mut()
                    .find(|f| f.filename == entry.filename)
                    .ok_or_else(|| DebianError::SourceChecksumUnknownFile {
                        field,
                        filename: entry.filename.to_string(),
                    })?;

                if file.digests.contains_key(&checksum) {
                    return Err(DebianError::SourceFileEntryMalformed(format!(
                        "{} listed more than once in {}",
                        entry.filename, field
                    )));
                }

                if file.size != entry.size {
                    warn!(
                        "{} declares size {} for {} but Files declares {}",
                        field, entry.size, entry.filename, file.size
                    );
                }

                file.digests.insert(checksum, entry.digest);
            }
        }

        Ok(Self {
            path: None,
            base_dir,
            control,
            files,
        })
    }

    /// The path of the `.dsc` file, if this instance was opened from one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The directory referenced files are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The parsed `.dsc` paragraph.
    pub fn control(&self) -> &DebianSourceControlFile {
        &self.control
    }

    /// Files referenced by this source package, in `Files` order.
    pub fn files(&self) -> &[SourceFileEntry] {
        &self.files
    }

    /// Resolve the filesystem path of a referenced file.
    pub fn resolve_path(&self, entry: &SourceFileEntry) -> PathBuf {
        self.base_dir.join(&entry.filename)
    }

    /// Resolved filesystem paths of all referenced files.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| self.resolve_path(f)).collect()
    }

    /// Declared sizes of referenced files.
    pub fn sizes(&self) -> impl Iterator<Item = (&str, u64)> {
        self.files.iter().map(|f| (f.filename.as_str(), f.size))
    }

    /// Declared digests of referenced files.
    pub fn checksums(&self) -> FileChecksums {
        let mut res = FileChecksums::new();

        for file in &self.files {
            for (checksum, digest) in &file.digests {
                res.entry(*checksum)
                    .or_default()
                    .insert(file.filename.clone(), digest.clone());
            }
        }

        res
    }

    /// Resolved paths of referenced files that don't exist, in `Files` order.
    pub fn missing_files(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .map(|f| self.resolve_path(f))
            .filter(|path| !path.is_file())
            .collect()
    }

    /// Whether every referenced file exists.
    pub fn all_files_present(&self) -> bool {
        self.missing_files().is_empty()
    }

    /// Compute digests of referenced files and report the ones not matching declarations.
    ///
    /// Missing files are skipped. Each present file is read once.
    pub fn corrected_checksums(&self) -> Result<CorrectedChecksums> {
        let mut corrected = CorrectedChecksums::new();

        for file in &self.files {
            let path = self.resolve_path(file);

            if !path.is_file() {
                continue;
            }

            debug!("verifying {}", path.display());
            let fingerprints = Fingerprints::from_path(&path)?;

            for (checksum, declared) in &file.digests {
                if !fingerprints.matches_digest(declared) {
                    debug!(
                        "{} {} mismatch: declared {}, actual {}",
                        file.filename,
                        checksum,
                        declared,
                        fingerprints.digest(*checksum)
                    );

                    corrected
                        .entry(*checksum)
                        .or_default()
                        .insert(file.filename.clone(), fingerprints.digest(*checksum).clone());
                }
            }
        }

        Ok(corrected)
    }

    /// Whether every present file matches all its declared digests.
    pub fn all_checksums_correct(&self) -> Result<bool> {
        Ok(self.corrected_checksums()?.is_empty())
    }

    /// Verify every referenced file exists and has the declared digests.
    ///
    /// Presence is checked first. All problems of the failing kind are reported.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_files();
        if !missing.is_empty() {
            return Err(DebianError::SourceFilesMissing(missing));
        }

        let corrected = self.corrected_checksums()?;
        if !corrected.is_empty() {
            return Err(DebianError::SourceChecksumMismatch(corrected));
        }

        Ok(())
    }
}
