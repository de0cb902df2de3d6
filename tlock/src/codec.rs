//! Fixed-length binary codec for an IBE ciphertext (component C4).
//!
//! Layout is `U ∥ V ∥ W`: `U` compressed to 48 or 96 bytes depending on the
//! key group, followed by the 16-byte `V` and `W`. Total length is exactly
//! 80 or 128 bytes; anything else is rejected.

use crate::error::Error;
use crate::ibe::{Ciphertext, Point};

/// Encode `U ∥ V ∥ W`.
pub fn encode(ct: &Ciphertext) -> Vec<u8> {
    let mut out = ct.u.to_compressed();
    out.extend_from_slice(&ct.v);
    out.extend_from_slice(&ct.w);
    out
}

/// Decode `U ∥ V ∥ W`, inferring `U`'s group from the buffer length.
pub fn decode(bytes: &[u8]) -> Result<Ciphertext, Error> {
    let (u_len, total) = match bytes.len() {
        80 => (48, 80),
        128 => (96, 128),
        other => {
            return Err(Error::MalformedCiphertext(format!(
                "ciphertext body is {other} bytes, expected 80 or 128"
            )))
        }
    };
    debug_assert_eq!(bytes.len(), total);

    let u = Point::from_compressed(&bytes[..u_len])?;
    let v: [u8; 16] = bytes[u_len..u_len + 16]
        .try_into()
        .map_err(|_| Error::MalformedCiphertext("truncated V".to_owned()))?;
    let w: [u8; 16] = bytes[u_len + 16..u_len + 32]
        .try_into()
        .map_err(|_| Error::MalformedCiphertext("truncated W".to_owned()))?;

    Ok(Ciphertext { u, v, w })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381_plus::G1Affine;

    #[test]
    fn round_trip_is_identity() {
        let ct = Ciphertext {
            u: Point::G1(G1Affine::generator()),
            v: [1u8; 16],
            w: [2u8; 16],
        };
        let encoded = encode(&ct);
        assert_eq!(encoded.len(), 80);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, ct);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = decode(&[0u8; 79]).unwrap_err();
        assert!(matches!(err, Error::MalformedCiphertext(_)));
    }
}
