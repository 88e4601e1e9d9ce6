// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Fixture construction for tests. */

use {
    crate::{deb::DebCompression, error::Result},
    std::{
        io::Write,
        path::{Path, PathBuf},
    },
};

pub const SAMPLE_CONTROL: &str = "Package: mypackage\n\
Version: 1:4.7.0+dfsg1-2\n\
Architecture: amd64\n\
Maintainer: Jane Doe <jane@example.com>\n\
Installed-Size: 1234\n\
Depends: libc6 (>= 2.14), zlib1g\n\
Section: utils\n\
Priority: optional\n\
Description: short description\n A longer description.\n .\n With another paragraph.\n";

/// An armored RSA/SHA-256 signature packet taken from a real signed document.
pub const SIGNATURE_BLOCK: &str = "-----BEGIN PGP SIGNATURE-----

wsBzBAEBCAAdFiEEImXrTLK/iNkAro0bdKlBuiGeyBAFAmevKMEACgkQdKlBuiGe
yBA7PQgA1CoBKtlyBwbiNxB7OhLEFcuSp3U0ufVXtof2R09TvoUut8E8TRrAl10c
q/6YMRA5Wb/uYfrtf0eWlgpXyH442yVFFY+forYrCfrhY54GXQJA6lguL8ZMqUdS
SlES1JzvX65L73guCtbRXpSlcuLT7iTbvHlIIU5QTOtYKo59KdmcF01KPtrLLen1
fzdTlGxq7wPxQid3KuN3eZfZ20RUtU79amZxq8spdlZxN6eVU4orliMRR7YiLzIP
EDMZ1vmPtHw4Hg24YGPC2OOzn2bUIb8TzQ3grbvc0BuvjokbPvZOG5j2jMEJjb+3
RkvVS4tolFfLOk8EQrCD7CdxxLqvZw==
=Ea8d
-----END PGP SIGNATURE-----
";

/// Wrap content in a PGP cleartext signature frame using [SIGNATURE_BLOCK].
///
/// The signature does not cover the content. Nothing here verifies signatures.
pub fn pgp_sign(content: &str) -> String {
    format!(
        "-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA256\n\n{}{}",
        content, SIGNATURE_BLOCK
    )
}

/// Compress data the way `.deb` builders do.
pub fn compress(compression: DebCompression, data: &[u8]) -> Result<Vec<u8>> {
    let mut buffer = vec![];

    match compression {
        DebCompression::Uncompressed => {
            buffer.extend_from_slice(data);
        }
        DebCompression::Gzip => {
            let header = libflate::gzip::HeaderBuilder::new().finish();

            let mut encoder = libflate::gzip::Encoder::with_options(
                &mut buffer,
                libflate::gzip::EncodeOptions::new().header(header),
            )?;
            encoder.write_all(data)?;
            encoder.finish().into_result()?;
        }
        DebCompression::Xz => {
            let mut encoder = xz2::write::XzEncoder::new(buffer, 6);
            encoder.write_all(data)?;
            buffer = encoder.finish()?;
        }
        DebCompression::Zstandard => {
            let mut encoder = zstd::Encoder::new(buffer, 3)?;
            encoder.write_all(data)?;
            buffer = encoder.finish()?;
        }
    }

    Ok(buffer)
}

fn new_tar_header(size: u64) -> Result<tar::Header> {
    let mut header = tar::Header::new_gnu();
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("root")?;
    header.set_groupname("root")?;
    header.set_mtime(1638141540);
    header.set_size(size);

    Ok(header)
}

/// Build an uncompressed `control.tar` holding a root directory and a single file.
///
/// The name is written verbatim so `./` prefixes survive.
pub fn control_tar(name: &str, content: &str) -> Result<Vec<u8>> {
    let mut buffer = vec![];

    {
        let mut builder = tar::Builder::new(&mut buffer);

        let mut header = new_tar_header(0)?;
        header.set_path(Path::new("./"))?;
        header.set_entry_type(tar::EntryType::Directory);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append(&header, std::io::empty())?;

        let mut header = new_tar_header(content.len() as _)?;
        let name_buffer = &mut header.as_old_mut().name;
        name_buffer[0..name.len()].copy_from_slice(name.as_bytes());
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, content.as_bytes())?;

        builder.finish()?;
    }

    Ok(buffer)
}

/// A member of an ar archive.
pub struct DebMember {
    name: String,
    data: Vec<u8>,
}

impl DebMember {
    pub fn new(name: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            data,
        }
    }

    pub fn debian_binary() -> Self {
        Self::new("debian-binary", b"2.0\n".to_vec())
    }

    /// A `control.tar` member compressed with the given format.
    pub fn control(compression: DebCompression, tar_data: &[u8]) -> Result<Self> {
        Ok(Self::new(
            &format!("control.tar{}", compression.extension()),
            compress(compression, tar_data)?,
        ))
    }
}

/// Assemble an ar archive from members, in order.
pub fn build_deb(members: &[DebMember]) -> Result<Vec<u8>> {
    let mut buffer = vec![];

    {
        let mut builder = ar::Builder::new(&mut buffer);

        for member in members {
            let mut header = ar::Header::new(member.name.as_bytes().to_vec(), member.data.len() as _);
            header.set_mode(0o644);
            header.set_mtime(1638141540);
            header.set_uid(0);
            header.set_gid(0);
            builder.append(&header, member.data.as_slice())?;
        }
    }

    Ok(buffer)
}

/// Write a `.deb` with the given control text to `dir`, returning its path.
pub fn write_deb(dir: &Path, filename: &str, control: &str) -> Result<PathBuf> {
    let deb = build_deb(&[
        DebMember::debian_binary(),
        DebMember::control(DebCompression::Gzip, &control_tar("./control", control)?)?,
        DebMember::new("data.tar.xz", compress(DebCompression::Xz, b"")?),
    ])?;

    let path = dir.join(filename);
    std::fs::write(&path, deb)?;

    Ok(path)
}
