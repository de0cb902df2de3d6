//! Hybrid timelock encryption over the age file format.
//!
//! This crate wires [`tlock`]'s identity-based timelock primitive into a
//! single age recipient/identity pair (component C7, [`adaptor`]), a
//! streaming encrypt/decrypt driver with ASCII-armor autodetection
//! (component C8, [`envelope`]), an abstract beacon source the driver
//! consults for chain parameters and round signatures (component C9,
//! [`network`]), and a way to read an envelope's round and chain hash
//! without decrypting it (component C10, [`metadata`]).
//!
//! Callers bring their own [`Network`] implementation; this crate never
//! performs I/O itself. `tle` binds a `drand_core`-backed one.
//!
//! ```rust
//! # use std::time::Duration;
//! let pk_bytes = hex::decode("8200fc249deb0148eb918d6e213980c5d01acd7fc251900d9260136da3b54836ce125172399ddc69c4e3e11429b62c11").unwrap();
//! let signature = hex::decode("a4721e6c3eafcd823f138cd29c6c82e8c5149101d0bb4bafddbac1c2d1fe3738895e4e21dd4b8b41bf007046440220910bb1cdb91f50a84a0d7f33ff2e8577aa62ac64b35a291a728a9db5ac91e06d1312b48a376138d77b4d6ad27c24221afe").unwrap();
//!
//! let make_network = |pk_bytes: Vec<u8>| tlock_age::FixedNetwork::new(
//!     "7672797f548f3f4748ac4bf3352fc6c6b6468c9ad40ad456a397545c6e2df5bf",
//!     pk_bytes,
//!     tlock::PEDERSEN_BLS_UNCHAINED,
//!     0,
//!     Duration::from_secs(3),
//! );
//!
//! let mut encrypted = vec![];
//! tlock_age::encrypt(make_network(pk_bytes.clone()), 1000, &b"hello, future"[..], &mut encrypted, false).unwrap();
//!
//! let mut decrypted = vec![];
//! let network = make_network(pk_bytes).with_signature(1000, signature);
//! tlock_age::decrypt(network, false, &encrypted[..], &mut decrypted).unwrap();
//! assert_eq!(decrypted, b"hello, future".to_vec());
//! ```

pub mod adaptor;
pub mod envelope;
pub mod error;
pub mod metadata;
pub mod network;
mod time;

pub use adaptor::{Identity, Recipient};
pub use envelope::{decrypt, encrypt};
pub use error::Error;
pub use metadata::{read as read_metadata, Metadata, RoundEstimate};
pub use network::{FixedNetwork, Network};
pub use time::{round_at, time_of};
