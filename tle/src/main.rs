mod args;
mod duration;
mod network;

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::time::SystemTime;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use args::Args;
use network::HttpNetwork;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(tlock_age::Error::TooEarly(round)) = e.downcast_ref::<tlock_age::Error>() {
                eprintln!("round {round} has not been signed yet: too early to decrypt");
            } else {
                eprintln!("error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    args.validate()?;

    let mut src: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(fs::File::open(path).context("opening input file")?),
        None => Box::new(io::stdin()),
    };

    let mut dst: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(fs::File::create(path).context("creating output file")?),
        None => Box::new(io::stdout()),
    };

    if args.metadata {
        let mut buf = Vec::new();
        src.read_to_end(&mut buf)
            .context("reading envelope for metadata")?;
        let metadata = tlock_age::read_metadata(buf.as_slice())?;

        // Estimating wallclock time needs only the chain's genesis/period,
        // not a beacon fetch; a network we can't reach just means we print
        // round/chain-hash without an estimate rather than failing outright.
        let estimate = HttpNetwork::connect(&args.network_host, metadata.chain_hash())
            .ok()
            .map(|network| metadata.estimate_time(&network));

        print_metadata(&mut dst, &metadata, estimate)?;
        return Ok(());
    }

    let network = HttpNetwork::connect(&args.network_host, &args.chain_hash)
        .context("connecting to beacon network")?;

    if args.decrypt {
        tlock_age::decrypt(network, args.trust_chain_hash, src, dst)?;
        return Ok(());
    }

    let round = resolve_round(&args, &network)?;
    info!(round, "encrypting");

    tlock_age::encrypt(network, round, src, &mut dst, args.armor)?;
    Ok(())
}

fn print_metadata<W: Write>(
    dst: &mut W,
    metadata: &tlock_age::Metadata,
    estimate: Option<tlock_age::RoundEstimate>,
) -> anyhow::Result<()> {
    let value = serde_json::json!({
        "round": metadata.round(),
        "chain_hash": metadata.chain_hash(),
        "estimated_time_unix": estimate.map(|e| e
            .time
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)),
        "is_future": estimate.map(|e| e.is_future),
    });
    serde_json::to_writer_pretty(&mut *dst, &value)?;
    writeln!(dst)?;
    Ok(())
}

fn resolve_round(args: &Args, network: &HttpNetwork) -> anyhow::Result<u64> {
    use tlock_age::Network;

    let round = match (args.round, &args.duration) {
        (Some(round), None) => round,
        (None, Some(spec)) => {
            let now = time::OffsetDateTime::now_utc();
            let target = duration::apply(spec, now)?;
            network.current_round(SystemTime::from(target))
        }
        _ => unreachable!("validated by Args::validate"),
    };

    if !args.force && round <= network.current_round(SystemTime::now()) {
        bail!(
            "round {round} is not in the future; pass --force to encrypt toward a past round anyway"
        );
    }

    Ok(round)
}
