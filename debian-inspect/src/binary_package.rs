// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Inspection of `.deb` files on the filesystem. */

use {
    crate::{
        binary_package_control::BinaryPackageControlFile,
        deb::reader::resolve_control_file,
        error::{DebianError, Result},
        io::{ContentDigest, Fingerprints},
        package_version::PackageVersion,
    },
    log::debug,
    once_cell::unsync::OnceCell,
    std::{
        cmp::Ordering,
        io::BufReader,
        path::{Path, PathBuf},
    },
};

/// A `.deb` file on the filesystem.
///
/// Construction only checks that the path refers to a regular file. The control
/// data and the file fingerprints are each computed on first access and cached for
/// the lifetime of the instance.
#[derive(Debug)]
pub struct BinaryPackage {
    path: PathBuf,
    ignore_missing_fields: bool,
    control: OnceCell<BinaryPackageControlFile>,
    fingerprints: OnceCell<Fingerprints>,
}

impl BinaryPackage {
    /// Open the `.deb` file at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(DebianError::PathNotFile(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            ignore_missing_fields: false,
            control: OnceCell::new(),
            fingerprints: OnceCell::new(),
        })
    }

    /// Set whether to tolerate control data lacking `Package`, `Version` or `Architecture`.
    pub fn ignore_missing_fields(mut self, value: bool) -> Self {
        self.ignore_missing_fields = value;
        self.control = OnceCell::new();

        self
    }

    /// The filesystem path of this package.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed `control` file of this package.
    pub fn control(&self) -> Result<&BinaryPackageControlFile> {
        self.control.get_or_try_init(|| {
            let fh = std::fs::File::open(&self.path)?;
            let control = resolve_control_file(BufReader::new(fh))?;

            for name in control.missing_required_fields() {
                if self.ignore_missing_fields {
                    debug!(
                        "{} lacks required field {}; ignoring",
                        self.path.display(),
                        name
                    );
                } else {
                    return Err(DebianError::ControlRequiredFieldMissing(name.to_string()));
                }
            }

            Ok(control)
        })
    }

    /// The `control` file rendered back to text.
    pub fn control_str(&self) -> Result<String> {
        Ok(self.control()?.to_string())
    }

    /// Digests and size of the `.deb` file.
    pub fn fingerprints(&self) -> Result<&Fingerprints> {
        self.fingerprints
            .get_or_try_init(|| Fingerprints::from_path(&self.path))
    }

    /// MD5 digest of the `.deb` file.
    pub fn md5(&self) -> Result<&ContentDigest> {
        Ok(&self.fingerprints()?.md5)
    }

    /// SHA-1 digest of the `.deb` file.
    pub fn sha1(&self) -> Result<&ContentDigest> {
        Ok(&self.fingerprints()?.sha1)
    }

    /// SHA-256 digest of the `.deb` file.
    pub fn sha256(&self) -> Result<&ContentDigest> {
        Ok(&self.fingerprints()?.sha256)
    }

    /// Size in bytes of the `.deb` file.
    pub fn size(&self) -> Result<u64> {
        Ok(self.fingerprints()?.size)
    }

    /// The parsed `Version` field.
    pub fn version(&self) -> Result<PackageVersion> {
        self.control()?.version()
    }

    /// The epoch of the package version, `0` when not specified.
    pub fn epoch(&self) -> Result<u32> {
        Ok(self.version()?.epoch_assumed())
    }

    /// The upstream component of the package version.
    pub fn upstream_version(&self) -> Result<String> {
        Ok(self.version()?.upstream_version().to_string())
    }

    /// The Debian revision of the package version, if any.
    pub fn debian_revision(&self) -> Result<Option<String>> {
        Ok(self.version()?.debian_revision().map(|x| x.to_string()))
    }

    /// Compare this package's version against a version string.
    ///
    /// [Ordering::Less] means this package is older than `version`.
    pub fn compare_version_with(&self, version: &str) -> Result<Ordering> {
        Ok(self.version()?.cmp(&PackageVersion::parse(version)?))
    }
}
