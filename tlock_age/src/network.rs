//! Abstract beacon source (component C9).
//!
//! The adaptor never talks to a transport directly: every encrypt/decrypt
//! call that needs network data goes through this trait. The core crate
//! never depends on an HTTP client; `tle` binds a real one via `drand_core`,
//! and [`FixedNetwork`] here is the in-memory stub used by tests and by
//! offline callers (age plugins, batch jobs with pre-fetched signatures).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use tlock::Scheme;

use crate::error::Error;
use crate::time::round_at;

/// The contract the core consumes from a beacon network.
///
/// Implementations must be safe to call concurrently; the only method that
/// mutates shared state is [`Network::switch_chain_hash`], which callers are
/// responsible for serialising (§5).
pub trait Network: Send + Sync {
    /// Lowercase hex digest identifying the chain's parameters.
    fn chain_hash(&self) -> String;

    /// The chain's master public key, compressed.
    fn public_key(&self) -> Vec<u8>;

    /// Which tlock scheme this chain's signatures use.
    fn scheme(&self) -> Scheme;

    /// The round whose signature would be current at `time`.
    fn current_round(&self, time: SystemTime) -> u64;

    /// The chain's genesis time, unix seconds. Used alongside [`Network::period`]
    /// to estimate a round's wallclock time for metadata inspection (§4.8);
    /// not needed for encryption or decryption themselves.
    fn genesis_time(&self) -> u64;

    /// The chain's round period.
    fn period(&self) -> Duration;

    /// Alias for [`Network::current_round`], kept distinct for beacon
    /// schedules with sub-second periods where the two could one day
    /// diverge.
    fn round_number(&self, time: SystemTime) -> u64 {
        self.current_round(time)
    }

    /// Fetch the signature for `round`. Returns [`Error::TooEarly`] if the
    /// beacon hasn't published it yet.
    fn signature(&self, round: u64) -> Result<Vec<u8>, Error>;

    /// Attempt to re-point this network at a different chain. Networks that
    /// only ever serve one chain should reject anything but their own hash.
    fn switch_chain_hash(&self, hex: &str) -> Result<(), Error>;
}

/// An in-memory `Network` stub: fixed chain parameters and a small table of
/// pre-supplied round signatures. Used by tests, by age plugins decrypting
/// offline with a signature supplied out of band, and as a template for a
/// relay that caches recent rounds.
pub struct FixedNetwork {
    chain_hash: Mutex<String>,
    public_key: Vec<u8>,
    scheme: Scheme,
    genesis_time: u64,
    period: Duration,
    signatures: Mutex<HashMap<u64, Vec<u8>>>,
    alternate_chain_hashes: Vec<String>,
}

impl FixedNetwork {
    pub fn new(
        chain_hash: impl Into<String>,
        public_key: Vec<u8>,
        scheme: Scheme,
        genesis_time: u64,
        period: Duration,
    ) -> Self {
        Self {
            chain_hash: Mutex::new(chain_hash.into()),
            public_key,
            scheme,
            genesis_time,
            period,
            signatures: Mutex::new(HashMap::new()),
            alternate_chain_hashes: Vec::new(),
        }
    }

    /// Register chain hashes this stub is additionally willing to
    /// `switch_chain_hash` to, simulating a multi-chain relay.
    pub fn with_alternate_chain_hashes(mut self, hashes: Vec<String>) -> Self {
        self.alternate_chain_hashes = hashes;
        self
    }

    /// Pre-supply the signature for `round`, as if it had already been
    /// fetched from the network.
    pub fn with_signature(self, round: u64, signature: Vec<u8>) -> Self {
        self.signatures.lock().unwrap().insert(round, signature);
        self
    }
}

impl Network for FixedNetwork {
    fn chain_hash(&self) -> String {
        self.chain_hash.lock().unwrap().clone()
    }

    fn public_key(&self) -> Vec<u8> {
        self.public_key.clone()
    }

    fn scheme(&self) -> Scheme {
        self.scheme
    }

    fn current_round(&self, time: SystemTime) -> u64 {
        round_at(self.genesis_time, self.period, time)
    }

    fn genesis_time(&self) -> u64 {
        self.genesis_time
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn signature(&self, round: u64) -> Result<Vec<u8>, Error> {
        match self.signatures.lock().unwrap().get(&round) {
            Some(sig) => Ok(sig.clone()),
            None => Err(Error::TooEarly(round)),
        }
    }

    fn switch_chain_hash(&self, hex: &str) -> Result<(), Error> {
        let current = self.chain_hash.lock().unwrap().clone();
        if hex == current || self.alternate_chain_hashes.iter().any(|h| h == hex) {
            *self.chain_hash.lock().unwrap() = hex.to_owned();
            Ok(())
        } else {
            Err(Error::WrongChainHash)
        }
    }
}

