//! Age-stanza adaptor (component C7): wraps/unwraps an age file key as a
//! single `tlock` recipient stanza.
//!
//! `age`'s `Identity`/`Recipient` traits only let us return an
//! `age::DecryptError`/`age::EncryptError`, which has no room for our own
//! error kinds (in particular `TooEarly` must survive as itself, not as a
//! generic decryption failure). [`Identity`] works around this the way the
//! teacher crate's `HeaderIdentity` smuggles header fields out of
//! `unwrap_stanza`: it stashes the real error in a `Mutex` and the envelope
//! driver (`crate::envelope`) reads it back out after `age::Decryptor`
//! reports a bare failure.

use std::io;
use std::sync::Mutex;

use age::secrecy::ExposeSecret;
use age_core::format::{FileKey, Stanza};
use tracing::info_span;

use crate::error::Error;
use crate::network::Network;

pub const STANZA_TAG: &str = "tlock";

/// `age::Recipient` implementation: encrypts the age file key under a
/// chosen scheme/round/public key, drawn from `network` at wrap time.
pub struct Recipient<N: Network> {
    network: N,
    round: u64,
}

impl<N: Network> Recipient<N> {
    pub fn new(network: N, round: u64) -> Self {
        Self { network, round }
    }
}

impl<N: Network> age::Recipient for Recipient<N> {
    fn wrap_file_key(&self, file_key: &FileKey) -> Result<Vec<Stanza>, age::EncryptError> {
        let _span = info_span!("tlock_age::wrap", round = self.round).entered();
        let public_key = self.network.public_key();
        let scheme = self.network.scheme();

        let msg: [u8; 16] = file_key.expose_secret()[..]
            .try_into()
            .expect("age file keys are always 16 bytes");

        let body = tlock::time_lock(&scheme, &public_key, self.round, msg).map_err(|e| {
            age::EncryptError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                e.to_string(),
            ))
        })?;

        Ok(vec![Stanza {
            tag: STANZA_TAG.to_string(),
            args: vec![self.round.to_string(), self.network.chain_hash()],
            body,
        }])
    }
}

/// `age::Identity` implementation: recovers the age file key once
/// `network` can supply the round's beacon signature.
pub struct Identity<N: Network> {
    network: N,
    trust_chain_hash: bool,
    last_error: Mutex<Option<Error>>,
}

impl<N: Network> Identity<N> {
    pub fn new(network: N, trust_chain_hash: bool) -> Self {
        Self {
            network,
            trust_chain_hash,
            last_error: Mutex::new(None),
        }
    }

    /// The precise error the last failed `unwrap_stanza` call hit. `age`'s
    /// own error type can't carry this, so the envelope driver calls this
    /// after a decrypt failure to recover the real kind (crucially,
    /// `Error::TooEarly`).
    pub fn last_error(&self) -> Option<Error> {
        self.last_error.lock().unwrap().clone()
    }

    fn fail(&self, e: Error) -> Option<Result<FileKey, age::DecryptError>> {
        *self.last_error.lock().unwrap() = Some(e);
        Some(Err(age::DecryptError::DecryptionFailed))
    }
}

impl<N: Network> age::Identity for Identity<N> {
    fn unwrap_stanza(&self, stanza: &Stanza) -> Option<Result<FileKey, age::DecryptError>> {
        if stanza.tag != STANZA_TAG {
            return None;
        }
        if stanza.args.len() != 2 {
            return self.fail(Error::IncorrectIdentity);
        }

        let round: u64 = match stanza.args[0].parse() {
            Ok(round) => round,
            Err(_) => return self.fail(Error::IncorrectIdentity),
        };
        let _span = info_span!("tlock_age::unwrap", round).entered();
        let stanza_chain_hash = &stanza.args[1];

        let current_chain_hash = self.network.chain_hash();
        if *stanza_chain_hash != current_chain_hash {
            if self.trust_chain_hash {
                if let Err(e) = self.network.switch_chain_hash(stanza_chain_hash) {
                    return self.fail(e);
                }
            } else {
                return self.fail(Error::WrongChainHash);
            }
        }

        let signature = match self.network.signature(round) {
            Ok(sig) => sig,
            Err(e) => return self.fail(e),
        };

        let scheme = self.network.scheme();
        let public_key = self.network.public_key();
        let beacon = tlock::Beacon::new(round, signature);

        match tlock::time_unlock(&scheme, &public_key, &beacon, &stanza.body) {
            Ok(file_key) => Some(Ok(file_key.into())),
            Err(e) => self.fail(Error::Ibe(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::network::FixedNetwork;

    fn test_network(signature: Option<(u64, Vec<u8>)>) -> FixedNetwork {
        let pk_bytes = hex::decode("8200fc249deb0148eb918d6e213980c5d01acd7fc251900d9260136da3b54836ce125172399ddc69c4e3e11429b62c11").unwrap();
        let net = FixedNetwork::new(
            "7672797f548f3f4748ac4bf3352fc6c6b6468c9ad40ad456a397545c6e2df5bf",
            pk_bytes,
            tlock::PEDERSEN_BLS_UNCHAINED,
            0,
            Duration::from_secs(3),
        );
        match signature {
            Some((round, sig)) => net.with_signature(round, sig),
            None => net,
        }
    }

    #[test]
    fn round_trip_through_stanza() {
        let signature = hex::decode("a4721e6c3eafcd823f138cd29c6c82e8c5149101d0bb4bafddbac1c2d1fe3738895e4e21dd4b8b41bf007046440220910bb1cdb91f50a84a0d7f33ff2e8577aa62ac64b35a291a728a9db5ac91e06d1312b48a376138d77b4d6ad27c24221afe").unwrap();

        let recipient_net = test_network(None);
        let chain_hash = recipient_net.chain_hash();
        use age::Recipient as _;
        let recipient = Recipient::new(recipient_net, 1000);
        let file_key: FileKey = [7u8; 16].into();
        let stanzas = recipient.wrap_file_key(&file_key).unwrap();
        assert_eq!(stanzas.len(), 1);
        assert_eq!(stanzas[0].tag, STANZA_TAG);
        assert_eq!(stanzas[0].args, vec!["1000".to_string(), chain_hash]);

        let identity = Identity::new(test_network(Some((1000, signature))), false);
        let recovered = identity.unwrap_stanza(&stanzas[0]).unwrap().unwrap();
        assert_eq!(&recovered.expose_secret()[..], &[7u8; 16]);
    }

    #[test]
    fn too_early_is_recoverable_from_last_error() {
        let identity = Identity::new(test_network(None), false);
        let stanza = Stanza {
            tag: STANZA_TAG.to_string(),
            args: vec![
                "1000".to_string(),
                "7672797f548f3f4748ac4bf3352fc6c6b6468c9ad40ad456a397545c6e2df5bf".to_string(),
            ],
            body: vec![0u8; 80],
        };
        let result = identity.unwrap_stanza(&stanza).unwrap();
        assert!(result.is_err());
        assert!(matches!(identity.last_error(), Some(Error::TooEarly(1000))));
    }

    #[test]
    fn wrong_chain_hash_without_trust_is_rejected() {
        let identity = Identity::new(test_network(None), false);
        let stanza = Stanza {
            tag: STANZA_TAG.to_string(),
            args: vec!["1000".to_string(), "00".repeat(32)],
            body: vec![0u8; 80],
        };
        let result = identity.unwrap_stanza(&stanza).unwrap();
        assert!(result.is_err());
        assert!(matches!(identity.last_error(), Some(Error::WrongChainHash)));
    }

    #[test]
    fn non_tlock_stanza_is_ignored() {
        let identity = Identity::new(test_network(None), false);
        let stanza = Stanza {
            tag: "x25519".to_string(),
            args: vec![],
            body: vec![],
        };
        assert!(identity.unwrap_stanza(&stanza).is_none());
    }
}
