//! `drand_core`-backed [`tlock_age::Network`] (component C9's real
//! implementation). `tlock`/`tlock_age` stay executor-free; this crate is
//! the one place a tokio runtime and an HTTP client are allowed to exist,
//! per the design notes' "beacon source abstraction" guidance.

use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use drand_core::HttpClient;
use tlock::Scheme;
use tlock_age::{round_at, Error, Network};

/// Binds a live drand HTTP endpoint to the [`Network`] contract. Blocks the
/// calling thread on an internal runtime so the core crates never need to
/// know tokio exists.
pub struct HttpNetwork {
    runtime: tokio::runtime::Runtime,
    client: Mutex<HttpClient>,
    chain_hash: Mutex<String>,
    public_key: Vec<u8>,
    scheme: Scheme,
    genesis_time: u64,
    period: Duration,
    network_host: String,
}

impl HttpNetwork {
    /// Connects to `network_host/chain_hash` and fetches its chain info
    /// once up front; later calls reuse the cached parameters.
    pub fn connect(network_host: &str, chain_hash: &str) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let url = format!("{}/{}", network_host.trim_end_matches('/'), chain_hash);
        let client: HttpClient = url
            .as_str()
            .try_into()
            .map_err(|e| anyhow::anyhow!("connecting to {url}: {e}"))?;

        let info = runtime.block_on(async { client.chain_info().await })?;
        let scheme_id = info.scheme_id().to_string();

        Ok(Self {
            client: Mutex::new(client),
            chain_hash: Mutex::new(chain_hash.to_owned()),
            public_key: info.public_key(),
            scheme: Scheme::by_name(&scheme_id)
                .map_err(|e| anyhow::anyhow!("unsupported chain scheme: {e}"))?,
            genesis_time: info.genesis_time(),
            period: Duration::from_secs(info.period()),
            network_host: network_host.to_owned(),
            runtime,
        })
    }
}

impl Network for HttpNetwork {
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
        let client = self.client.lock().unwrap();
        self.runtime
            .block_on(async { client.get(round).await })
            .map(|beacon| beacon.signature())
            .map_err(|e| {
                if e.to_string().to_lowercase().contains("not found") {
                    Error::TooEarly(round)
                } else {
                    Error::Transport(e.to_string())
                }
            })
    }

    fn switch_chain_hash(&self, hex: &str) -> Result<(), Error> {
        let url = format!("{}/{}", self.network_host.trim_end_matches('/'), hex);
        let client: HttpClient = url
            .as_str()
            .try_into()
            .map_err(|_| Error::WrongChainHash)?;

        self.runtime
            .block_on(async { client.chain_info().await })
            .map_err(|_| Error::WrongChainHash)?;

        *self.client.lock().unwrap() = client;
        *self.chain_hash.lock().unwrap() = hex.to_owned();
        Ok(())
    }
}
