// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! PGP cleartext signature handling.

Signed `.dsc` files wrap their paragraph in a PGP cleartext signature as defined by
[RFC 4880 Section 7](https://datatracker.ietf.org/doc/html/rfc4880.html#section-7).
Parsing is delegated to [pgp_cleartext::CleartextSignatureReader], which checks the
framing and parses the signature packets. Signatures are NOT verified.
*/

use {
    crate::error::{DebianError, Result},
    std::io::{Cursor, Read},
};

pub use pgp_cleartext::{CleartextSignatureReader, CleartextSignatures};

const HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";

/// Whether text begins with a PGP cleartext signature header line.
pub fn is_cleartext_signed(text: &str) -> bool {
    text.lines()
        .next()
        .map(|line| line.trim_end_matches('\r') == HEADER)
        .unwrap_or(false)
}

/// Read the signed content and signatures of a PGP cleartext signature document.
///
/// Dash escaping is reversed in the returned content. An error occurs if the framing is
/// malformed, if the signature block does not parse or if it holds no signatures.
pub fn read_cleartext(data: &[u8]) -> Result<(Vec<u8>, CleartextSignatures)> {
    let mut reader = CleartextSignatureReader::new(Cursor::new(data));

    // The source is in memory. Every error is a parse error.
    let mut content = vec![];
    reader
        .read_to_end(&mut content)
        .map_err(|e| DebianError::PgpCleartextMalformed(e.to_string()))?;

    let signatures = reader.finalize();

    if signatures.iter_signatures().next().is_none() {
        return Err(DebianError::PgpCleartextMalformed(
            "no PGP signature found".to_string(),
        ));
    }

    Ok((content, signatures))
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::testutil::{pgp_sign, SIGNATURE_BLOCK},
    };

    #[test]
    fn detect() {
        assert!(is_cleartext_signed(&pgp_sign("Source: hello\n")));
        assert!(is_cleartext_signed(
            &pgp_sign("Source: hello\n").replace('\n', "\r\n")
        ));
        assert!(!is_cleartext_signed("Format: 3.0 (quilt)\n"));
        assert!(!is_cleartext_signed(&format!("\n{}", pgp_sign("Source: hello\n"))));
        assert!(!is_cleartext_signed(""));
    }

    #[test]
    fn read() -> Result<()> {
        let (content, signatures) =
            read_cleartext(pgp_sign("Source: hello\n- -----not really armor\n").as_bytes())?;

        assert_eq!(content, b"Source: hello\n-----not really armor\n");
        assert_eq!(signatures.iter_signatures().count(), 1);

        Ok(())
    }

    #[test]
    fn malformed() {
        for text in [
            "Source: hello\n".to_string(),
            // Armor header that is not `Hash:`.
            format!(
                "-----BEGIN PGP SIGNED MESSAGE-----\nNotAHash: whatever\n\nSource: hello\n{}",
                SIGNATURE_BLOCK
            ),
            // No signature block.
            "-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA256\n\nSource: hello\n".to_string(),
            // Signature block without signature data.
            "-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA256\n\nSource: hello\n\
             -----BEGIN PGP SIGNATURE-----\n\n!!! not base64, not a signature !!!\n\
             -----END PGP SIGNATURE-----\n"
                .to_string(),
        ] {
            assert!(
                matches!(
                    read_cleartext(text.as_bytes()),
                    Err(DebianError::PgpCleartextMalformed(_))
                ),
                "{}",
                text
            );
        }
    }
}
