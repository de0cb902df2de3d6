//! Boneh–Franklin IBE over BLS12-381, CCA-secured via a Fujisaki–Okamoto
//! style re-encryption check (component C3).
//!
//! Orientation (which group holds the master key vs. signatures) is carried
//! by the [`Point`] enum rather than duck-typed, so the pairing argument
//! order is a `match`, not a runtime guess.

use std::marker::PhantomData;

use bls12_381_plus::{
    ExpandMsg, ExpandMsgXmd, G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar,
};
use group::Curve;
use itertools::Itertools;
use rand::distributions::Uniform;
use rand::Rng;
use sha2::digest::core_api::BlockSizeUser;
use sha2::{Digest, Sha256};

use crate::error::Error;

pub const G1_SIZE: usize = 48;
pub const G2_SIZE: usize = 96;

const FP_CHUNK_SIZE: usize = 48;

const H2_DST: &[u8] = b"IBE-H2";
const H4_DST: &[u8] = b"IBE-H4";

/// A point in one of the two pairing subgroups, tagged so pairing order is
/// an exhaustive match rather than a guess from point length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Point {
    G1(G1Affine),
    G2(G2Affine),
}

impl Point {
    /// `e(self, hash_to_curve(id))`, oriented so the result is always the
    /// "master key paired with round identity" value regardless of which
    /// group `self` lives in.
    pub fn pairing_with_identity(&self, id: &[u8], h2c_dst: &[u8]) -> Gt {
        match self {
            Point::G1(g) => {
                let qid = G2Projective::hash::<ExpandMsgXmd<Sha256>>(id, h2c_dst).to_affine();
                bls12_381_plus::pairing(g, &qid)
            }
            Point::G2(g) => {
                let qid = G1Projective::hash::<ExpandMsgXmd<Sha256>>(id, h2c_dst).to_affine();
                bls12_381_plus::pairing(&qid, g)
            }
        }
    }

    /// `e(self, other)`, requiring the two points to live in different
    /// subgroups (the pairing is only defined between G1 and G2).
    pub fn pairing(&self, other: &Point) -> Result<Gt, Error> {
        match (self, other) {
            (Point::G1(s), Point::G2(o)) => Ok(bls12_381_plus::pairing(s, o)),
            (Point::G2(s), Point::G1(o)) => Ok(bls12_381_plus::pairing(o, s)),
            _ => Err(Error::MalformedCiphertext(
                "pairing requires points on different subgroups".to_owned(),
            )),
        }
    }

    pub fn generator(&self) -> Self {
        match self {
            Point::G1(_) => G1Affine::generator().into(),
            Point::G2(_) => G2Affine::generator().into(),
        }
    }

    pub fn mul(&self, s: Scalar) -> Self {
        use std::ops::Mul;
        match self {
            Point::G1(g) => g.mul(s).to_affine().into(),
            Point::G2(g) => g.mul(s).to_affine().into(),
        }
    }

    pub fn is_identity(&self) -> bool {
        match self {
            Point::G1(g) => bool::from(g.is_identity()),
            Point::G2(g) => bool::from(g.is_identity()),
        }
    }

    pub fn to_compressed(self) -> Vec<u8> {
        match self {
            Point::G1(g) => g.to_compressed().to_vec(),
            Point::G2(g) => g.to_compressed().to_vec(),
        }
    }

    /// Decode a compressed point, picking the subgroup by byte length.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() == G1_SIZE {
            let arr: [u8; G1_SIZE] = bytes
                .try_into()
                .map_err(|_| Error::MalformedCiphertext("bad G1 point length".to_owned()))?;
            let pt = G1Affine::from_compressed(&arr);
            if pt.is_some().into() {
                Ok(pt.unwrap().into())
            } else {
                Err(Error::MalformedCiphertext(
                    "G1 point failed to decompress".to_owned(),
                ))
            }
        } else if bytes.len() == G2_SIZE {
            let arr: [u8; G2_SIZE] = bytes
                .try_into()
                .map_err(|_| Error::MalformedCiphertext("bad G2 point length".to_owned()))?;
            let pt = G2Affine::from_compressed(&arr);
            if pt.is_some().into() {
                Ok(pt.unwrap().into())
            } else {
                Err(Error::MalformedCiphertext(
                    "G2 point failed to decompress".to_owned(),
                ))
            }
        } else {
            Err(Error::MalformedCiphertext(format!(
                "point is neither {G1_SIZE} nor {G2_SIZE} bytes"
            )))
        }
    }
}

impl From<G1Affine> for Point {
    fn from(g: G1Affine) -> Self {
        Point::G1(g)
    }
}

impl From<G2Affine> for Point {
    fn from(g: G2Affine) -> Self {
        Point::G2(g)
    }
}

/// `(U, V, W)` as defined in §3: `U` in the key group, `V`/`W` each 16 bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Ciphertext {
    pub u: Point,
    pub v: [u8; 16],
    pub w: [u8; 16],
}

/// Encrypt a 16-byte message under a master public key and round identity.
///
/// `h2c_dst` lands the identity on the signature group; `h3_dst` is mixed
/// into the CCA re-randomisation hash (see [`crate::scheme::Scheme::h3_dst`]
/// for why this varies by scheme).
pub fn encrypt(
    master: Point,
    id: &[u8],
    msg: [u8; 16],
    h2c_dst: &[u8],
    h3_dst: &[u8],
) -> Result<Ciphertext, Error> {
    if master.is_identity() {
        return Err(Error::InvalidPublicKey);
    }

    let mut rng = rand::thread_rng();
    // 1. Gid = e(master, Q_id)
    let gid = master.pairing_with_identity(id, h2c_dst);

    // 2-3. Draw sigma, derive r = H3(sigma, msg); re-hash on rejection so
    // the scalar is always in canonical range. The loop is bounded by
    // expand_message_drand's own counter (u16::MAX iterations).
    let (sigma, r) = loop {
        let sigma: [u8; 16] = (0..16)
            .map(|_| rng.sample(Uniform::new_inclusive(0u8, 255u8)))
            .collect_vec()
            .try_into()
            .unwrap();

        if let Some(r) = derive_r(h3_dst, &sigma, &msg) {
            break (sigma, r);
        }
    };

    // 4. U = r*G
    let u = master.generator().mul(r);

    // 5. V = sigma XOR H2(r*Gid)
    let v = {
        let r_gid = gid.mul(r);
        let h = Sha256::new()
            .chain_update(H2_DST)
            .chain_update(rev_chunks(&r_gid.to_bytes(), FP_CHUNK_SIZE))
            .finalize();
        xor16(&sigma, &h[0..16])
    };

    // 6. W = msg XOR H4(sigma)
    let w = {
        let h = Sha256::new()
            .chain_update(H4_DST)
            .chain_update(sigma)
            .finalize();
        xor16(&msg, &h[0..16])
    };

    Ok(Ciphertext { u, v, w })
}

/// Decrypt a ciphertext given the round signature.
pub fn decrypt(sig: Point, c: &Ciphertext, h3_dst: &[u8]) -> Result<[u8; 16], Error> {
    // 1. r*Gid = e(U, sig)
    let r_gid = sig.pairing(&c.u)?;

    // 2. sigma' = V XOR H2(r*Gid)
    let sigma = {
        let h = Sha256::new()
            .chain_update(H2_DST)
            .chain_update(rev_chunks(&r_gid.to_bytes(), FP_CHUNK_SIZE))
            .finalize();
        xor16(&c.v, &h[0..16])
    };

    // 3. msg' = W XOR H4(sigma')
    let msg = {
        let h = Sha256::new()
            .chain_update(H4_DST)
            .chain_update(sigma)
            .finalize();
        xor16(&c.w, &h[0..16])
    };

    // 4. Recompute r' = H3(sigma', msg') and check U' == U.
    let r = derive_r(h3_dst, &sigma, &msg).ok_or(Error::DecryptionFailed)?;
    let u_prime = c.u.generator().mul(r);
    if u_prime != c.u {
        return Err(Error::DecryptionFailed);
    }

    Ok(msg)
}

/// `r = H3(sigma, msg)`, expanded to a canonical scalar. Returns `None` if
/// the candidate scalar is not in range, so the caller re-hashes with fresh
/// randomness (encrypt) or fails decryption (decrypt never retries: a
/// non-canonical `r'` here just means the ciphertext doesn't re-derive, so
/// it's folded into the ordinary CCA failure).
fn derive_r(h3_dst: &[u8], sigma: &[u8; 16], msg: &[u8; 16]) -> Option<Scalar> {
    let h = Sha256::new()
        .chain_update(h3_dst)
        .chain_update(sigma)
        .chain_update(msg)
        .finalize();

    let mut buf = [0u8; 32];
    ExpandMsgDrand::<Sha256>::expand_message(&h, &[], &mut buf);
    Scalar::from_bytes(&buf).into()
}

fn xor16(a: &[u8], b: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = a[i] ^ b[i];
    }
    out
}

/// `expand_message_drand`: drand's own scalar-from-hash counter loop, kept
/// bit-for-bit so ciphertexts stay interoperable with the beacon network's
/// Go implementation.
struct ExpandMsgDrand<HashT> {
    phantom: PhantomData<HashT>,
}

impl<HashT> ExpandMsg for ExpandMsgDrand<HashT>
where
    HashT: Digest + BlockSizeUser,
{
    fn expand_message(msg: &[u8], _dst: &[u8], buf: &mut [u8]) {
        const BITS_TO_MASK: usize = 1;
        for i in 1..u16::MAX {
            let mut h = HashT::new()
                .chain_update(i.to_le_bytes())
                .chain_update(msg)
                .finalize()
                .to_vec();
            h[0] >>= BITS_TO_MASK;
            let rev: Vec<u8> = h.iter().copied().rev().collect();
            let candidate: [u8; 32] = rev.as_slice().try_into().unwrap();
            if bool::from(Scalar::from_bytes(&candidate).is_some()) {
                buf.copy_from_slice(&candidate);
                return;
            }
        }
    }
}

/// Reverse a byte slice in fixed-size chunks (matches the big-endian/
/// little-endian chunk ordering `Gt::to_bytes` vs. the hash input expects).
fn rev_chunks(a: &[u8], chunk_size: usize) -> Vec<u8> {
    a.chunks(chunk_size).rev().collect_vec().concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor16_truth_table() {
        let a = [0u8; 16];
        let b = [0xffu8; 16];
        assert_eq!(xor16(&a, &b), [0xffu8; 16]);
        assert_eq!(xor16(&b, &b), [0u8; 16]);
    }

    #[test]
    fn rev_chunks_reorders_blocks() {
        let a = vec![1u8, 2, 3, 4];
        assert_eq!(rev_chunks(&a, 2), vec![3, 4, 1, 2]);
    }

    #[test]
    fn zero_public_key_is_rejected() {
        let zero = Point::G1(G1Affine::identity());
        let err = encrypt(
            zero,
            b"round",
            [0u8; 16],
            crate::scheme::PEDERSEN_BLS_UNCHAINED.h2c_dst(),
            b"IBE-H3",
        )
        .unwrap_err();
        assert_eq!(err, Error::InvalidPublicKey);
    }
}
