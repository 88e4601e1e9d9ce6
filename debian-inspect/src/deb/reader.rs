// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! .deb file reading functionality. */

use {
    crate::{
        binary_package_control::BinaryPackageControlFile,
        control::ControlParagraph,
        deb::DebCompression,
        error::{DebianError, Result},
    },
    log::{debug, warn},
    std::io::{Cursor, ErrorKind, Read},
};

/// Magic bytes at the start of every ar archive.
pub const AR_MAGIC: &[u8; 8] = b"!<arch>\n";

/// Convert an error from the ar parser into our error type.
///
/// The ar crate reports malformed headers as I/O errors. We surface those as
/// container format problems and leave genuine I/O failures alone.
fn ar_error(e: std::io::Error) -> DebianError {
    match e.kind() {
        ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof => {
            DebianError::ContainerFormat(e.to_string())
        }
        _ => DebianError::Io(e),
    }
}

/// Convert an error decoding the buffered content of a control member.
///
/// The member is fully in memory by then, so any failure means the compressed
/// stream or the tar archive inside it is corrupt.
fn control_member_error(filename: &str, e: DebianError) -> DebianError {
    match e {
        DebianError::Io(e) => DebianError::ContainerFormat(format!("{}: {}", filename, e)),
        e => e,
    }
}

/// A reader of .deb files.
///
/// A .deb binary package file is an ar archive usually holding 3 entries:
///
/// 1. `debian-binary` holding the version of the binary package format.
/// 2. `control.tar[.<ext>]` holding package metadata.
/// 3. `data.tar[.<ext>]` holding file content.
///
/// Entries are visited in the order they are stored. No assumptions are made about
/// the order or the number of entries.
pub struct BinaryPackageReader<R: Read> {
    archive: ar::Archive<std::io::Chain<Cursor<[u8; 8]>, R>>,
}

impl<R: Read> BinaryPackageReader<R> {
    /// Construct a new instance from a reader.
    ///
    /// The ar magic is consumed and verified immediately.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 8];

        match reader.read_exact(&mut magic) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(DebianError::ContainerFormat(
                    "file too short to be an ar archive".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        if &magic != AR_MAGIC {
            return Err(DebianError::ContainerFormat(format!(
                "bad ar magic: {:?}",
                String::from_utf8_lossy(&magic)
            )));
        }

        // The ar crate wants to see the magic itself.
        Ok(Self {
            archive: ar::Archive::new(Cursor::new(magic).chain(reader)),
        })
    }

    /// Obtain the next entry from the underlying ar archive.
    ///
    /// The entry will be converted to an enum that richly represents its content.
    /// Only `debian-binary` and supported `control.tar` members have their content
    /// read. Other members are skipped without being buffered.
    pub fn next_entry(&mut self) -> Option<Result<BinaryPackageEntry>> {
        let mut entry = match self.archive.next_entry()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(ar_error(e))),
        };

        // GNU ar terminates names with a slash.
        let filename = String::from_utf8_lossy(entry.header().identifier())
            .trim_end_matches('/')
            .to_string();
        let size = entry.header().size();

        debug!("visiting ar member {} ({} bytes)", filename, size);

        let compression = if filename == "debian-binary" {
            None
        } else if let Some(tail) = filename.strip_prefix("control.tar") {
            match DebCompression::from_extension(tail) {
                Some(compression) => Some(compression),
                None => {
                    warn!("ignoring control member with unsupported compression: {}", filename);
                    return Some(Ok(BinaryPackageEntry::Other { filename, size }));
                }
            }
        } else if filename.starts_with("data.tar") {
            return Some(Ok(BinaryPackageEntry::Data { filename, size }));
        } else {
            return Some(Ok(BinaryPackageEntry::Other { filename, size }));
        };

        let mut data = vec![];
        if let Err(e) = entry.read_to_end(&mut data) {
            return Some(Err(ar_error(e)));
        }

        if data.len() as u64 != size {
            return Some(Err(DebianError::ContainerFormat(format!(
                "ar member {} truncated: expected {} bytes, got {}",
                filename,
                size,
                data.len()
            ))));
        }

        Some(match compression {
            None => Ok(BinaryPackageEntry::DebianBinary(data)),
            Some(compression) => match compression.decompress(Cursor::new(data)) {
                Ok(reader) => Ok(BinaryPackageEntry::Control(ControlTarReader {
                    filename,
                    archive: tar::Archive::new(reader),
                })),
                Err(e) => Err(control_member_error(&filename, e)),
            },
        })
    }
}

/// Represents an entry in a .deb archive.
pub enum BinaryPackageEntry {
    /// The `debian-binary` file.
    DebianBinary(Vec<u8>),
    /// A `control.tar` tar archive with a supported compression.
    Control(ControlTarReader),
    /// A `data.tar[.<ext>]` tar archive. Content is not read.
    Data { filename: String, size: u64 },
    /// Any other member. Content is not read.
    Other { filename: String, size: u64 },
}

/// A reader for `control.tar` files.
pub struct ControlTarReader {
    filename: String,
    archive: tar::Archive<Box<dyn Read>>,
}

impl ControlTarReader {
    /// Name of the ar member this archive came from.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Obtain the raw text of the `control` file in this archive.
    ///
    /// The entry may be stored as `control` or `./control`. Consumes the archive.
    pub fn control_text(mut self) -> Result<String> {
        let filename = self.filename;

        match Self::find_control(&mut self.archive, &filename) {
            Ok(Some(data)) => String::from_utf8(data).map_err(|e| {
                DebianError::ControlParse(format!("control file is not UTF-8: {}", e))
            }),
            Ok(None) => Err(DebianError::MissingControl(format!(
                "no control entry in {}",
                filename
            ))),
            Err(e) => Err(control_member_error(&filename, e)),
        }
    }

    fn find_control(
        archive: &mut tar::Archive<Box<dyn Read>>,
        filename: &str,
    ) -> Result<Option<Vec<u8>>> {
        for entry in archive.entries()? {
            let mut entry = entry?;

            let path = String::from_utf8_lossy(&entry.path_bytes()).to_string();

            if path.trim_start_matches("./") != "control" {
                continue;
            }

            debug!("found {} in {}", path, filename);

            let mut data = vec![];
            entry.read_to_end(&mut data)?;

            return Ok(Some(data));
        }

        Ok(None)
    }
}

/// Resolve the raw text of the `control` file from the `control.tar` within a `.deb` archive.
///
/// The first `control.tar` member with a supported compression is used.
pub fn resolve_control_text(reader: impl Read) -> Result<String> {
    let mut reader = BinaryPackageReader::new(reader)?;

    while let Some(entry) = reader.next_entry() {
        if let BinaryPackageEntry::Control(control) = entry? {
            return control.control_text();
        }
    }

    Err(DebianError::MissingControl(
        "no control.tar member in archive".to_string(),
    ))
}

/// Resolve the parsed `control` file from the `control.tar` within a `.deb` archive.
pub fn resolve_control_file(reader: impl Read) -> Result<BinaryPackageControlFile> {
    let text = resolve_control_text(reader)?;

    Ok(BinaryPackageControlFile::from(ControlParagraph::parse_str(
        &text,
    )?))
}
