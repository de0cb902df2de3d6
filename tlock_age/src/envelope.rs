//! Envelope driver (component C8): streams plaintext through an age writer
//! addressed to a single [`crate::adaptor::Recipient`], and streams
//! ciphertext back out through an age reader with the matching
//! [`crate::adaptor::Identity`], autodetecting ASCII armor on the way in.

use std::io::{self, copy, Read, Write};
use std::iter;

use crate::adaptor::{Identity, Recipient};
use crate::error::Error;
use crate::network::Network;

const ARMOR_MARKER: &[u8] = b"-----BEGIN AGE ENCRYPTED FILE-----";

/// Encrypts `src` to `dst` as a single-recipient age envelope. `armor`
/// controls whether the output is ASCII-armored; the writer is always
/// closed (and the armor terminator flushed) on every exit path.
pub fn encrypt<N: Network, W: Write, R: Read>(
    network: N,
    round: u64,
    mut src: R,
    dst: W,
    armor: bool,
) -> Result<(), Error> {
    let recipient = Recipient::new(network, round);
    let encryptor = age::Encryptor::with_recipients(vec![Box::new(recipient)])
        .expect("a single recipient is always accepted");

    if armor {
        let armored = age::armor::ArmoredWriter::wrap_output(dst, age::armor::Format::AsciiArmor)
            .map_err(|e| Error::Age(e.to_string()))?;
        let mut writer = encryptor
            .wrap_output(armored)
            .map_err(|e| Error::Age(e.to_string()))?;
        copy(&mut src, &mut writer).map_err(|e| Error::Age(e.to_string()))?;
        let armored = writer.finish().map_err(|e| Error::Age(e.to_string()))?;
        armored.finish().map_err(|e| Error::Age(e.to_string()))?;
    } else {
        let mut writer = encryptor
            .wrap_output(dst)
            .map_err(|e| Error::Age(e.to_string()))?;
        copy(&mut src, &mut writer).map_err(|e| Error::Age(e.to_string()))?;
        writer.finish().map_err(|e| Error::Age(e.to_string()))?;
    }

    Ok(())
}

/// Decrypts `src` (armored or raw, autodetected) to `dst` using `network`
/// to fetch the beacon signature named by the envelope's stanza. Errors
/// from the adaptor propagate with their precise kind, including
/// [`Error::TooEarly`], rather than a generic decryption failure.
pub fn decrypt<N: Network, W: Write, R: Read>(
    network: N,
    trust_chain_hash: bool,
    mut src: R,
    mut dst: W,
) -> Result<(), Error> {
    let mut peek = [0u8; ARMOR_MARKER.len()];
    let n = read_fill(&mut src, &mut peek)?;
    let chained = io::Cursor::new(peek[..n].to_vec()).chain(src);

    let identity = Identity::new(network, trust_chain_hash);

    if &peek[..n] == ARMOR_MARKER {
        let armored = age::armor::ArmoredReader::new(chained);
        decrypt_with(armored, &identity, &mut dst)
    } else {
        decrypt_with(chained, &identity, &mut dst)
    }
}

fn decrypt_with<N: Network, R: Read, W: Write>(
    src: R,
    identity: &Identity<N>,
    dst: &mut W,
) -> Result<(), Error> {
    let decryptor = match age::Decryptor::new(src) {
        Ok(age::Decryptor::Recipients(d)) => d,
        Ok(_) => return Err(Error::Age("not a recipient-stanza envelope".to_string())),
        Err(e) => return Err(Error::Age(e.to_string())),
    };

    let mut reader = match decryptor.decrypt(iter::once(identity as &dyn age::Identity)) {
        Ok(reader) => reader,
        Err(e) => {
            return Err(identity
                .last_error()
                .unwrap_or_else(|| Error::Age(e.to_string())))
        }
    };

    copy(&mut reader, dst).map_err(|e| Error::Age(e.to_string()))?;
    Ok(())
}

fn read_fill<R: Read>(src: &mut R, buf: &mut [u8]) -> Result<usize, Error> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = src
            .read(&mut buf[filled..])
            .map_err(|e| Error::Age(e.to_string()))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::network::FixedNetwork;

    fn test_network() -> FixedNetwork {
        let pk_bytes = hex::decode("8200fc249deb0148eb918d6e213980c5d01acd7fc251900d9260136da3b54836ce125172399ddc69c4e3e11429b62c11").unwrap();
        FixedNetwork::new(
            "7672797f548f3f4748ac4bf3352fc6c6b6468c9ad40ad456a397545c6e2df5bf",
            pk_bytes,
            tlock::PEDERSEN_BLS_UNCHAINED,
            0,
            Duration::from_secs(3),
        )
    }

    fn signature() -> Vec<u8> {
        hex::decode("a4721e6c3eafcd823f138cd29c6c82e8c5149101d0bb4bafddbac1c2d1fe3738895e4e21dd4b8b41bf007046440220910bb1cdb91f50a84a0d7f33ff2e8577aa62ac64b35a291a728a9db5ac91e06d1312b48a376138d77b4d6ad27c24221afe").unwrap()
    }

    #[test]
    fn raw_round_trip() {
        let plaintext = b"a message locked to round 1000";
        let mut encrypted = vec![];
        encrypt(test_network(), 1000, &plaintext[..], &mut encrypted, false).unwrap();

        let mut decrypted = vec![];
        let net = test_network().with_signature(1000, signature());
        decrypt(net, false, &encrypted[..], &mut decrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn armored_and_raw_decrypt_to_identical_plaintext() {
        let plaintext = b"round trip under armor";
        let mut raw = vec![];
        encrypt(test_network(), 1000, &plaintext[..], &mut raw, false).unwrap();
        let mut armored = vec![];
        encrypt(test_network(), 1000, &plaintext[..], &mut armored, true).unwrap();

        let mut from_raw = vec![];
        decrypt(
            test_network().with_signature(1000, signature()),
            false,
            &raw[..],
            &mut from_raw,
        )
        .unwrap();

        let mut from_armored = vec![];
        decrypt(
            test_network().with_signature(1000, signature()),
            false,
            &armored[..],
            &mut from_armored,
        )
        .unwrap();

        assert_eq!(from_raw, plaintext);
        assert_eq!(from_armored, plaintext);
    }

    #[test]
    fn too_early_propagates_verbatim() {
        let plaintext = b"not yet";
        let mut encrypted = vec![];
        encrypt(test_network(), 1000, &plaintext[..], &mut encrypted, false).unwrap();

        let mut sink = vec![];
        let err = decrypt(test_network(), false, &encrypted[..], &mut sink).unwrap_err();
        assert!(matches!(err, Error::TooEarly(1000)));
    }
}
