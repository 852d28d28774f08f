mod config;
mod core;
mod detectors;
mod features;
mod oracle;
mod service;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, info_span};
use tracing_subscriber::EnvFilter;

use crate::config::config::AppCfg;
use crate::detectors::materiality::CompanyTable;
use crate::oracle::build_oracle;
use crate::service::batch::{BatchItem, read_items};
use crate::service::classifier::ClassificationService;

/// Classify financial headlines for catalysts, routine operations and materiality.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// YAML config file; environment variables (`ORACLE__BACKEND`, ...) override it.
    #[arg(long, default_value = "config.yml")]
    config: String,

    /// Headlines file, one `headline|TICKER` per line. Reads stdin when omitted.
    #[arg(long)]
    input: Option<String>,

    /// Ticker applied to lines that carry none.
    #[arg(long)]
    symbol: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let cfg = AppCfg::load(&cli.config)?;

    let span = info_span!(
        "Classifier",
        pid = %std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
    );
    let _enter = span.enter();

    info!("Starting up");

    let companies = Arc::new(CompanyTable::load(&cfg.companies.path)?);
    let oracle = build_oracle(&cfg.oracle)?;
    let service = ClassificationService::new(oracle, companies, cfg.routine.policy);

    let items = load_items(&cli)?;
    info!(count = items.len(), "Classifying headlines");

    tokio::select! {
        res = service.classify_batch(&items) => {
            match res {
                Ok(reports) => {
                    let mut out = io::stdout().lock();
                    for report in &reports {
                        serde_json::to_writer(&mut out, report)?;
                        writeln!(out)?;
                    }
                }
                Err(e) => {
                    error!(?e, "Batch aborted");
                    return Err(e.into());
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, abandoning batch");
        }
    }

    info!("Classifier exit");
    Ok(())
}

fn load_items(cli: &Cli) -> Result<Vec<BatchItem>> {
    let symbol = cli.symbol.as_deref();
    match &cli.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {path}"))?;
            read_items(BufReader::new(file), symbol)
        }
        None => read_items(io::stdin().lock(), symbol),
    }
}
