//! Command handler: wires the market pipeline into chat replies
//!
//! Every pipeline failure is turned into a short user-safe message here.

use std::sync::Arc;
use tracing::{info, warn};

use crate::bot::command::{Command, ParsedCommand};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::market::{
    render_average, render_report, snapshot_from_payload, ListingSource, NormalizePolicy,
    QueryDefaults, ReportKind,
};
use crate::types::MarketSnapshot;

pub struct CommandHandler {
    source: Arc<dyn ListingSource>,
    defaults: QueryDefaults,
    policy: NormalizePolicy,
}

impl CommandHandler {
    pub fn new(source: Arc<dyn ListingSource>, cfg: &MarketConfig) -> Self {
        Self {
            source,
            defaults: QueryDefaults::from(cfg),
            policy: NormalizePolicy {
                max_malformed: cfg.max_malformed,
            },
        }
    }

    /// Produce the reply text for one inbound command
    pub async fn handle(&self, parsed: &ParsedCommand) -> String {
        match &parsed.command {
            Command::Start => self.welcome_text(),
            Command::Help => self.help_text(),
            Command::Unknown(name) => {
                info!(command = %name, "Unknown command");
                "Comando no reconocido. Usa /p2pbuy o /p2psell (/ayuda para más opciones)."
                    .to_string()
            }
            command => match command.report_kind() {
                Some(kind) => self.report(kind, parsed).await,
                None => self.help_text(),
            },
        }
    }

    async fn report(&self, kind: ReportKind, parsed: &ParsedCommand) -> String {
        match self.snapshot(kind, parsed.arg.as_deref()).await {
            Ok(snapshot) => match kind {
                ReportKind::Listing(_) => render_report(&snapshot),
                ReportKind::Average => render_average(&snapshot),
            },
            Err(e) => {
                warn!(command = %parsed.name, error = %e, "Market command failed");
                match &e {
                    MarketError::InvalidArgument(_) => format!(
                        "{}\nUso: /{} [cantidad]",
                        e.user_message(),
                        parsed.name
                    ),
                    _ => e.user_message(),
                }
            }
        }
    }

    /// Run the pipeline for one report: build query, fetch, normalize, rank, stats
    pub async fn snapshot(&self, kind: ReportKind, arg: Option<&str>) -> Result<MarketSnapshot> {
        let query = self.defaults.build(kind, arg)?;
        let payload = self.source.fetch_listings(&query).await?;
        snapshot_from_payload(&query, payload, self.policy)
    }

    fn welcome_text(&self) -> String {
        format!(
            "👋 ¡Hola! Consulto los anuncios P2P de {} en {}.\n\n{}",
            self.defaults.pair.asset,
            self.defaults.pair.fiat,
            self.help_text()
        )
    }

    fn help_text(&self) -> String {
        format!(
            "Comandos disponibles:\n\
             /p2pbuy [cantidad] - anuncios de compra, más baratos primero (por defecto {default})\n\
             /p2psell [cantidad] - anuncios de venta, mejor precio primero (por defecto {default})\n\
             /promedio - mínimo, máximo y promedio de compra sobre {average} anuncios\n\
             /ayuda - muestra este mensaje\n\n\
             La cantidad debe estar entre 1 y {max}.",
            default = self.defaults.default_rows,
            average = self.defaults.average_rows,
            max = self.defaults.max_rows
        )
    }
}
