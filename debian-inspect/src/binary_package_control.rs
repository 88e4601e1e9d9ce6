// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Debian binary package control files. */

use {
    crate::{
        control::ControlParagraph,
        error::{DebianError, Result},
        package_version::PackageVersion,
    },
    std::{
        fmt::{Display, Formatter},
        ops::{Deref, DerefMut},
        str::FromStr,
    },
};

/// A Debian binary package control file/paragraph.
///
/// See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#binary-package-control-files-debian-control>.
///
/// Binary package control files are defined by a single paragraph with well-defined
/// fields. This type is a low-level wrapper around an inner [ControlParagraph].
/// [Deref] and [DerefMut] can be used to operate on the inner [ControlParagraph].
///
/// Fields we insist on have getters that return [Result] and will error if the field
/// is not present. Other fields return [Option]. This enforcement can be bypassed by
/// calling [ControlParagraph::field()].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryPackageControlFile {
    paragraph: ControlParagraph,
}

impl Deref for BinaryPackageControlFile {
    type Target = ControlParagraph;

    fn deref(&self) -> &Self::Target {
        &self.paragraph
    }
}

impl DerefMut for BinaryPackageControlFile {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.paragraph
    }
}

impl From<ControlParagraph> for BinaryPackageControlFile {
    fn from(paragraph: ControlParagraph) -> Self {
        Self { paragraph }
    }
}

impl From<BinaryPackageControlFile> for ControlParagraph {
    fn from(cf: BinaryPackageControlFile) -> Self {
        cf.paragraph
    }
}

impl Display for BinaryPackageControlFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.paragraph)
    }
}

impl BinaryPackageControlFile {
    /// Fields that must be present for the control file to describe a package.
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["Package", "Version", "Architecture"];

    /// Names of [Self::REQUIRED_FIELDS] entries absent from this paragraph.
    pub fn missing_required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        Self::REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(move |name| !self.has_field(name))
    }

    /// The `Package` field value.
    pub fn package(&self) -> Result<&str> {
        self.required_field_str("Package")
    }

    /// The `Version` field as its original string.
    pub fn version_str(&self) -> Result<&str> {
        self.required_field_str("Version")
    }

    /// The `Version` field parsed into a [PackageVersion].
    pub fn version(&self) -> Result<PackageVersion> {
        Ok(PackageVersion::parse(self.version_str()?)?)
    }

    /// The `Architecture` field.
    pub fn architecture(&self) -> Result<&str> {
        self.required_field_str("Architecture")
    }

    /// The `Maintainer` field.
    pub fn maintainer(&self) -> Option<&str> {
        self.field_str("Maintainer")
    }

    /// The `Description` field.
    ///
    /// The first line is the synopsis. Later lines hold the extended description with
    /// their leading space intact.
    pub fn description(&self) -> Option<&str> {
        self.field_str("Description")
    }

    /// The `Source` field.
    pub fn source(&self) -> Option<&str> {
        self.field_str("Source")
    }

    /// The `Section` field.
    pub fn section(&self) -> Option<&str> {
        self.field_str("Section")
    }

    /// The `Priority` field.
    pub fn priority(&self) -> Option<&str> {
        self.field_str("Priority")
    }

    /// The `Installed-Size` field, parsed to a [u64].
    pub fn installed_size(&self) -> Option<Result<u64>> {
        self.field_str("Installed-Size")
            .map(|v| u64::from_str(v).map_err(DebianError::from))
    }

    /// The entries of the `Depends` field.
    ///
    /// Each entry is a dependency expression such as `libc6 (>= 2.14)` or an
    /// alternation like `a | b`.
    pub fn depends(&self) -> Option<impl Iterator<Item = &str>> {
        self.iter_field_comma_delimited("Depends")
    }
}
