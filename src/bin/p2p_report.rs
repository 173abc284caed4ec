//! One-shot P2P report
//!
//! Uso: cargo run --bin p2p_report -- p2pbuy [cantidad]
//!
//! Runs a single market command and prints the same text the bot would reply.

use anyhow::{bail, Result};
use clap::Parser;
use std::sync::Arc;

use p2pbot::bot::{Command, CommandHandler};
use p2pbot::config::AppConfig;
use p2pbot::logging;
use p2pbot::market::{render_average, render_report, P2pClient, ReportKind};

#[derive(Parser)]
#[command(name = "p2p-report", about = "Print a Binance P2P listing report")]
struct Args {
    /// Command to run: p2pbuy, p2psell or promedio
    command: String,

    /// Row count for p2pbuy / p2psell
    rows: Option<String>,

    /// Fail on any malformed record instead of skipping it
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = AppConfig::load()?;
    if args.strict {
        cfg.market.max_malformed = Some(0);
    }
    logging::init(&cfg.logging);

    let name = args.command.trim_start_matches('/');
    let Some(kind) = Command::from_name(name).report_kind() else {
        bail!("Comando no reconocido: {name}. Usa p2pbuy, p2psell o promedio");
    };

    let source = Arc::new(P2pClient::new(&cfg.market)?);
    let handler = CommandHandler::new(source, &cfg.market);

    match handler.snapshot(kind, args.rows.as_deref()).await {
        Ok(snapshot) => {
            let text = match kind {
                ReportKind::Listing(_) => render_report(&snapshot),
                ReportKind::Average => render_average(&snapshot),
            };
            println!("{text}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}
