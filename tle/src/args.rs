//! Command-line surface (external collaborator per §6): argument parsing,
//! environment-variable binding (`TLE_*`), and the encrypt/decrypt/metadata
//! mode dispatch. Batch directory walking is explicitly out of scope (§1)
//! and isn't implemented here.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tle", version, about = "Timelock encryption over the age format")]
pub struct Args {
    /// Decrypt rather than encrypt.
    #[arg(short = 'd', long, env = "TLE_DECRYPT", conflicts_with_all = ["metadata", "round", "duration", "armor", "force"])]
    pub decrypt: bool,

    /// Print the round and chain hash an envelope targets, without decrypting.
    #[arg(short = 'm', long, env = "TLE_METADATA", conflicts_with_all = ["round", "duration", "armor", "force"])]
    pub metadata: bool,

    /// Round number to encrypt to. Mutually exclusive with `--duration`.
    #[arg(long, env = "TLE_ROUND", conflicts_with = "duration")]
    pub round: Option<u64>,

    /// Duration from now to encrypt to, e.g. `30s`, `1h30m`, `1y2M3d`.
    /// Mutually exclusive with `--round`.
    #[arg(long, env = "TLE_DURATION")]
    pub duration: Option<String>,

    /// ASCII-armor the output. Encrypt only.
    #[arg(long, env = "TLE_ARMOR")]
    pub armor: bool,

    /// Allow encrypting to a round that has already elapsed.
    #[arg(long, env = "TLE_FORCE")]
    pub force: bool,

    /// Trust the chain hash named by the envelope's stanza and switch to it
    /// if the configured network supports it, rather than rejecting
    /// mismatches outright.
    #[arg(long, env = "TLE_TRUST_CHAIN_HASH")]
    pub trust_chain_hash: bool,

    /// drand HTTP API root, e.g. `https://api.drand.sh`.
    #[arg(long, env = "TLE_NETWORK_HOST", default_value = "https://api.drand.sh")]
    pub network_host: String,

    /// Chain hash identifying which beacon on `network-host` to use.
    #[arg(long, env = "TLE_CHAIN_HASH", default_value = "52db9ba70e0cc0f6eaf7803dd07447a1f5477735fd3f661792ba94600c84e971")]
    pub chain_hash: String,

    /// Input file; reads stdin if omitted.
    #[arg(short = 'i', long, env = "TLE_INPUT")]
    pub input: Option<std::path::PathBuf>,

    /// Output file; writes stdout if omitted.
    #[arg(short = 'o', long, env = "TLE_OUTPUT")]
    pub output: Option<std::path::PathBuf>,
}

impl Args {
    /// Validates the cross-flag invariants clap's `conflicts_with` can't
    /// express on its own (an explicit requirement rather than a mutual
    /// exclusion).
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.decrypt && !self.metadata && self.round.is_none() && self.duration.is_none() {
            anyhow::bail!("encrypt mode requires exactly one of --round or --duration");
        }
        if self.decrypt && self.armor {
            anyhow::bail!("--armor only applies to encryption; decryption autodetects it");
        }
        Ok(())
    }
}
