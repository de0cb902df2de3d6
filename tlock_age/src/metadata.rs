//! Metadata extraction (component C10): recover the round and chain hash a
//! file was encrypted to without needing the beacon signature, by letting
//! age parse the header and walking its stanzas ourselves. Grounded in the
//! upstream crate's `HeaderIdentity`, which stashes the fields it sees in
//! `unwrap_stanza` instead of ever producing a file key.

use std::io::Read;
use std::iter;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use age_core::format::{FileKey, Stanza};
use serde::Serialize;

use crate::adaptor::STANZA_TAG;
use crate::error::Error;
use crate::network::Network;
use crate::time::time_of;

/// The round and chain an envelope's single `tlock` stanza names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    round: u64,
    chain_hash: String,
}

impl Metadata {
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn chain_hash(&self) -> &str {
        &self.chain_hash
    }

    /// Estimate the wallclock time this round is (or was) signed at, given a
    /// `network` that can supply the chain's genesis time and period. No
    /// beacon fetch or decryption is involved — this is a linear projection,
    /// not a proof the round exists (§4.8).
    pub fn estimate_time<N: Network>(&self, network: &N) -> RoundEstimate {
        let time = time_of(network.genesis_time(), network.period(), self.round);
        let is_future = time
            .duration_since(SystemTime::now())
            .map(|_| true)
            .unwrap_or(false);
        RoundEstimate { time, is_future }
    }
}

/// The estimated wallclock time for a round, and whether that time is still
/// ahead of (or already behind) the moment the estimate was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundEstimate {
    #[serde(serialize_with = "serialize_unix_secs")]
    pub time: SystemTime,
    pub is_future: bool,
}

fn serialize_unix_secs<S: serde::Serializer>(
    time: &SystemTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    serializer.serialize_u64(secs)
}

struct StanzaReader {
    found: Mutex<Option<Metadata>>,
}

impl age::Identity for StanzaReader {
    fn unwrap_stanza(&self, stanza: &Stanza) -> Option<Result<FileKey, age::DecryptError>> {
        if stanza.tag != STANZA_TAG || stanza.args.len() != 2 {
            return None;
        }
        if self.found.lock().unwrap().is_some() {
            // Per the accept-the-first-stanza rule, later stanzas are ignored.
            return None;
        }
        if let Ok(round) = stanza.args[0].parse() {
            *self.found.lock().unwrap() = Some(Metadata {
                round,
                chain_hash: stanza.args[1].clone(),
            });
        }
        None
    }
}

/// Reads an envelope's round and chain hash without decrypting its body.
/// `src` may be armored or raw, autodetected the same way as
/// [`crate::envelope::decrypt`].
pub fn read<R: Read>(mut src: R) -> Result<Metadata, Error> {
    const ARMOR_MARKER: &[u8] = b"-----BEGIN AGE ENCRYPTED FILE-----";

    let mut peek = [0u8; ARMOR_MARKER.len()];
    let mut filled = 0;
    while filled < peek.len() {
        let n = src
            .read(&mut peek[filled..])
            .map_err(|e| Error::Age(e.to_string()))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    let chained = std::io::Cursor::new(peek[..filled].to_vec()).chain(src);

    let reader = StanzaReader {
        found: Mutex::new(None),
    };

    if &peek[..filled] == ARMOR_MARKER {
        let armored = age::armor::ArmoredReader::new(chained);
        let decryptor = match age::Decryptor::new(armored) {
            Ok(age::Decryptor::Recipients(d)) => d,
            Ok(_) => return Err(Error::Age("not a recipient-stanza envelope".to_string())),
            Err(e) => return Err(Error::Age(e.to_string())),
        };
        let _ = decryptor.decrypt(iter::once(&reader as &dyn age::Identity));
    } else {
        let decryptor = match age::Decryptor::new(chained) {
            Ok(age::Decryptor::Recipients(d)) => d,
            Ok(_) => return Err(Error::Age("not a recipient-stanza envelope".to_string())),
            Err(e) => return Err(Error::Age(e.to_string())),
        };
        let _ = decryptor.decrypt(iter::once(&reader as &dyn age::Identity));
    }

    reader
        .found
        .into_inner()
        .unwrap()
        .ok_or(Error::IncorrectIdentity)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::envelope;
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

    #[test]
    fn reads_round_and_chain_hash_without_the_signature() {
        let mut encrypted = vec![];
        envelope::encrypt(test_network(), 4242, &b"hello"[..], &mut encrypted, false).unwrap();

        let metadata = read(&encrypted[..]).unwrap();
        assert_eq!(metadata.round(), 4242);
        assert_eq!(
            metadata.chain_hash(),
            "7672797f548f3f4748ac4bf3352fc6c6b6468c9ad40ad456a397545c6e2df5bf"
        );
    }

    #[test]
    fn reads_through_armor_too() {
        let mut encrypted = vec![];
        envelope::encrypt(test_network(), 4242, &b"hello"[..], &mut encrypted, true).unwrap();

        let metadata = read(&encrypted[..]).unwrap();
        assert_eq!(metadata.round(), 4242);
    }

    #[test]
    fn estimates_wallclock_time_from_genesis_and_period() {
        let mut encrypted = vec![];
        envelope::encrypt(test_network(), 4242, &b"hello"[..], &mut encrypted, false).unwrap();

        let metadata = read(&encrypted[..]).unwrap();
        let estimate = metadata.estimate_time(&test_network());

        // genesis=0, period=3s, round 4242 -> (4242-1)*3 seconds since epoch,
        // long since past.
        assert_eq!(
            estimate.time,
            std::time::UNIX_EPOCH + Duration::from_secs(4241 * 3)
        );
        assert!(!estimate.is_future);
    }
}
