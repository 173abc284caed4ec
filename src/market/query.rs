//! Query builder: command + optional row-count argument -> validated Query

use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::types::{Direction, Pair, Query};

/// Which report a market command asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Ranked listing for one direction, row count from the argument
    Listing(Direction),
    /// BUY-side stats only, fixed row count
    Average,
}

impl ReportKind {
    pub fn direction(&self) -> Direction {
        match self {
            ReportKind::Listing(direction) => *direction,
            ReportKind::Average => Direction::Buy,
        }
    }
}

/// Per-deployment defaults applied to every query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefaults {
    pub pair: Pair,
    pub page: u32,
    pub default_rows: u32,
    pub average_rows: u32,
    pub max_rows: u32,
}

impl From<&MarketConfig> for QueryDefaults {
    fn from(cfg: &MarketConfig) -> Self {
        Self {
            pair: Pair::new(&cfg.asset, &cfg.fiat),
            page: cfg.page,
            default_rows: cfg.default_rows,
            average_rows: cfg.average_rows,
            max_rows: cfg.max_rows,
        }
    }
}

impl QueryDefaults {
    /// Build a query. The average shortcut ignores `arg` entirely.
    pub fn build(&self, kind: ReportKind, arg: Option<&str>) -> Result<Query> {
        let rows = match kind {
            ReportKind::Average => self.average_rows,
            ReportKind::Listing(_) => match arg {
                Some(raw) => self.parse_rows(raw)?,
                None => self.default_rows,
            },
        };

        Ok(Query {
            pair: self.pair.clone(),
            direction: kind.direction(),
            rows,
            page: self.page,
        })
    }

    fn parse_rows(&self, raw: &str) -> Result<u32> {
        let usage = || {
            MarketError::InvalidArgument(format!(
                "Cantidad inválida \"{}\". Usa un número entre 1 y {}.",
                raw.trim(),
                self.max_rows
            ))
        };

        let rows: u32 = raw.trim().parse().map_err(|_| usage())?;
        if rows == 0 || rows > self.max_rows {
            return Err(usage());
        }
        Ok(rows)
    }
}
