//! Settlement CLI
//!
//! Usage: `settle [SNAPSHOT.json] [--estimated] [--explain PARTICIPANT]`
//!
//! Reads a ledger snapshot, prints the JSON report on stdout and logs to
//! stderr. Configuration comes from the TOML file named by
//! `SETTLEMENT_CONFIG`, or from environment variables.

use anyhow::{bail, Context};
use ledger_core::{BalanceView, ParticipantId};
use settlement::{Config, SettlementEngine};
use std::path::PathBuf;

#[derive(Debug, Default)]
struct Args {
    snapshot: Option<PathBuf>,
    estimated: bool,
    explain: Option<ParticipantId>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Args::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--estimated" => parsed.estimated = true,
                "--explain" => {
                    let id = args.next().context("--explain needs a participant id")?;
                    parsed.explain = Some(ParticipantId::new(id));
                }
                flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
                path => {
                    if parsed.snapshot.replace(PathBuf::from(path)).is_some() {
                        bail!("only one snapshot file may be given");
                    }
                }
            }
        }

        Ok(parsed)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    // Load configuration
    let mut config = match std::env::var("SETTLEMENT_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => Config::from_env()?,
    };
    if let Some(path) = args.snapshot {
        config.ledger.snapshot_path = Some(path);
    }
    if args.estimated {
        config.ledger.include_unpaid = true;
    }

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        snapshot = ?config.ledger.snapshot_path,
        "Starting settlement run"
    );

    let view = config.ledger.default_view();
    let engine = SettlementEngine::from_config(config)?;

    let output = match (&args.explain, view) {
        (Some(id), view) => serde_json::to_string_pretty(&engine.explain(id, view)?)?,
        (None, BalanceView::Estimated) => serde_json::to_string_pretty(&engine.estimate()?)?,
        (None, BalanceView::Settled) => serde_json::to_string_pretty(&engine.settle()?)?,
    };
    println!("{}", output);

    Ok(())
}
