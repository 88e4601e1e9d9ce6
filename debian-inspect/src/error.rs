// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Error handling. */

use {
    crate::{io::ChecksumType, package_version::VersionError, source_package::CorrectedChecksums},
    std::path::PathBuf,
    thiserror::Error,
};

/// Primary crate error type.
#[derive(Debug, Error)]
pub enum DebianError {
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("integer parsing error: {0:?}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("version error: {0}")]
    Version(#[from] VersionError),

    #[error("path is not a regular file: {}", .0.display())]
    PathNotFile(PathBuf),

    #[error("malformed ar container: {0}")]
    ContainerFormat(String),

    #[error("control data not found: {0}")]
    MissingControl(String),

    #[error("control file parse error: {0}")]
    ControlParse(String),

    #[error("required field missing in control file: {0}")]
    ControlRequiredFieldMissing(String),

    #[error("bad hex digest {0}: {1:?}")]
    ContentDigestBadHex(String, hex::FromHexError),

    #[error("{0} digest has wrong length: {1}")]
    ContentDigestBadLength(ChecksumType, String),

    #[error("malformed source file entry: {0}")]
    SourceFileEntryMalformed(String),

    #[error("{field} lists {filename} which is not present in Files")]
    SourceChecksumUnknownFile { field: &'static str, filename: String },

    #[error("source file name is not a plain file name: {0}")]
    SourceFileUnsafePath(String),

    #[error("{} source file(s) missing: {0:?}", .0.len())]
    SourceFilesMissing(Vec<PathBuf>),

    #[error("source file checksums do not match; actual digests: {0:?}")]
    SourceChecksumMismatch(CorrectedChecksums),

    #[error("malformed PGP cleartext signature framing: {0}")]
    PgpCleartextMalformed(String),
}

/// Result wrapper for this crate.
pub type Result<T> = std::result::Result<T, DebianError>;
