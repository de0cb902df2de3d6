//! # tlock
//!
//! tlock is a library to encrypt and decrypt 16-byte binaries using the
//! [tlock](https://eprint.iacr.org/2023/189) scheme. It provides `time_lock`
//! and `time_unlock` functions consuming threshold BLS signatures provided
//! by [drand](https://drand.love/docs/specification/)-style beacons.
//!
//! The reference interoperable Go implementation is available at
//! [drand/tlock](https://github.com/drand/tlock). Unlike that implementation,
//! no beacon client is baked into this crate: callers provide a round number
//! and its signature however they obtained it. See `tlock_age` for a
//! higher-level envelope that also fetches the signature for you via a
//! `Network` capability.
//!
//! Which scheme a key belongs to is selected explicitly by name (see
//! [`Scheme`]) rather than inferred from key length, since two of the three
//! registered schemes share a key-group length.

mod codec;
mod error;
mod ibe;
mod scheme;

use std::io;

use tracing::info_span;

pub use error::Error;
pub use scheme::{Group, IdentityEncoding, Scheme};
pub use scheme::{BLS_UNCHAINED_G1_RFC9380, BLS_UNCHAINED_ON_G1, PEDERSEN_BLS_UNCHAINED};

/// A beacon round and its signature, as published by the network.
///
/// Invariant: `verify(pk, signature, identity(round))` must hold; callers
/// that fetch beacons from an untrusted source should run them through
/// [`time_unlock`], which checks this before attempting decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Beacon {
    pub round: u64,
    pub signature: Vec<u8>,
}

impl Beacon {
    pub fn new(round: u64, signature: Vec<u8>) -> Self {
        Self { round, signature }
    }
}

/// Timelock-encrypt a 16-byte message under `scheme`'s master public key,
/// targeting `round` (component C6, `TimeLock`).
pub fn time_lock(
    scheme: &Scheme,
    public_key_bytes: &[u8],
    round: u64,
    msg: [u8; 16],
) -> Result<Vec<u8>, Error> {
    info_span!("ibe::encryption", scheme = scheme.name(), round).in_scope(|| {
        let master = ibe::Point::from_compressed(public_key_bytes)?;
        let id = scheme.identity(round);
        let ct = ibe::encrypt(master, &id, msg, scheme.h2c_dst(), scheme.h3_dst())?;
        Ok(codec::encode(&ct))
    })
}

/// Verify `beacon` against `scheme`'s master public key and, if it checks
/// out, decrypt `ciphertext` (component C6, `TimeUnlock`).
///
/// Returns [`Error::InvalidBeacon`] if the signature does not verify,
/// distinct from the ciphertext-level failures so callers can tell a
/// corrupt beacon apart from a tampered ciphertext.
pub fn time_unlock(
    scheme: &Scheme,
    public_key_bytes: &[u8],
    beacon: &Beacon,
    ciphertext: &[u8],
) -> Result<[u8; 16], Error> {
    info_span!("ibe::decryption", scheme = scheme.name(), round = beacon.round).in_scope(|| {
        verify_beacon(scheme, public_key_bytes, beacon)?;
        let sig = ibe::Point::from_compressed(&beacon.signature)?;
        let ct = codec::decode(ciphertext)?;
        ibe::decrypt(sig, &ct, scheme.h3_dst())
    })
}

/// Standard BLS verification of `beacon.signature` on `identity(scheme,
/// beacon.round)` under `public_key_bytes`: `e(G, sig) == e(pk, H(id))`.
fn verify_beacon(scheme: &Scheme, public_key_bytes: &[u8], beacon: &Beacon) -> Result<(), Error> {
    let pk = ibe::Point::from_compressed(public_key_bytes)?;
    let sig = ibe::Point::from_compressed(&beacon.signature)?;
    let id = scheme.identity(beacon.round);

    let lhs = pk.generator().pairing(&sig)?;
    let rhs = pk.pairing_with_identity(&id, scheme.h2c_dst());

    if lhs.to_bytes() == rhs.to_bytes() {
        Ok(())
    } else {
        Err(Error::InvalidBeacon)
    }
}

/// Stream convenience wrapper over [`time_lock`]: reads up to 16 bytes from
/// `src`, encrypts, and writes the encoded ciphertext to `dst`.
///
/// Example using an empty 16-byte message, fastnet public key, at round 1000
///
/// ```rust
/// // curl -sS https://api.drand.sh/dbd506d6ef76e5f386f41c651dcb808c5bcbd75471cc4eafa3f4df7ad4e4c493/info | jq -r '.public_key'
/// let pk_bytes = hex::decode("a0b862a7527fee3a731bcb59280ab6abd62d5c0b6ea03dc4ddf6612fdfc9d01f01c31542541771903475eb1ec6615f8d0df0b8b6dce385811d6dcf8cbefb8759e5e616a3dfd054c928940766d9a5b9db91e3b697e5d70a975181e007f87fca5e").unwrap();
/// let scheme = tlock::BLS_UNCHAINED_ON_G1;
/// let round = 1000;
/// let src = vec![0u8; 16];
///
/// let mut encrypted = vec![];
/// tlock::encrypt(&mut encrypted, src.as_slice(), &scheme, &pk_bytes, round).unwrap();
/// ```
pub fn encrypt<W: io::Write, R: io::Read>(
    mut dst: W,
    mut src: R,
    scheme: &Scheme,
    public_key_bytes: &[u8],
    round_number: u64,
) -> Result<(), Error> {
    let mut message = [0u8; 16];
    src.read(&mut message)
        .map_err(|e| Error::MalformedCiphertext(format!("error reading plaintext: {e}")))?;

    let encoded = time_lock(scheme, public_key_bytes, round_number, message)?;
    dst.write_all(&encoded)
        .map_err(|e| Error::MalformedCiphertext(format!("error writing ciphertext: {e}")))?;
    Ok(())
}

/// Stream convenience wrapper over [`time_unlock`].
pub fn decrypt<W: io::Write, R: io::Read>(
    mut dst: W,
    mut src: R,
    scheme: &Scheme,
    public_key_bytes: &[u8],
    beacon: &Beacon,
) -> Result<(), Error> {
    let mut encoded = Vec::new();
    io::Read::read_to_end(&mut src, &mut encoded)
        .map_err(|e| Error::MalformedCiphertext(format!("error reading ciphertext: {e}")))?;

    let msg = time_unlock(scheme, public_key_bytes, beacon, &encoded)?;
    dst.write_all(&msg)
        .map_err(|e| Error::MalformedCiphertext(format!("error writing plaintext: {e}")))?;
    Ok(())
}
