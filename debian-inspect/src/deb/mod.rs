// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Interfaces for .deb package files.

The .deb file specification lives at <https://manpages.debian.org/unstable/dpkg-dev/deb.5.en.html>.
*/

use {crate::error::Result, std::io::Read};

pub mod reader;

/// Compression format of a tar archive within a `.deb` file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DebCompression {
    /// Content is a plain tar archive.
    Uncompressed,
    /// Content is compressed as `.gz`.
    Gzip,
    /// Content is compressed as `.xz`.
    Xz,
    /// Content is compressed as `.zst`.
    Zstandard,
}

impl DebCompression {
    /// Resolve the compression format from the filename suffix following `.tar`.
    ///
    /// Returns `None` for suffixes we don't know how to decompress.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "" => Some(Self::Uncompressed),
            ".gz" => Some(Self::Gzip),
            ".xz" => Some(Self::Xz),
            ".zst" => Some(Self::Zstandard),
            _ => None,
        }
    }

    /// Obtain the filename extension for this compression format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Uncompressed => "",
            Self::Gzip => ".gz",
            Self::Xz => ".xz",
            Self::Zstandard => ".zst",
        }
    }

    /// Wrap a reader of compressed content in a reader of decompressed content.
    pub fn decompress<'a>(&self, reader: impl Read + 'a) -> Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Self::Uncompressed => Box::new(reader),
            Self::Gzip => Box::new(libflate::gzip::Decoder::new(reader)?),
            Self::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Self::Zstandard => Box::new(zstd::Decoder::new(reader)?),
        })
    }
}
