//! Market pipeline error taxonomy

use reqwest::StatusCode;

/// Longest backend body excerpt kept on a `Backend` error
pub const BACKEND_EXCERPT_CHARS: usize = 300;

/// Longest excerpt echoed back to a chat user
const REPLY_EXCERPT_CHARS: usize = 120;

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("market unreachable: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("backend returned {status}: {excerpt}")]
    Backend { status: StatusCode, excerpt: String },

    #[error("unexpected response shape: {0}")]
    Schema(String),

    #[error("no listings available")]
    EmptyResult,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, MarketError>;

impl MarketError {
    pub fn backend(status: StatusCode, body: &str) -> Self {
        MarketError::Backend {
            status,
            excerpt: truncate_chars(body.trim(), BACKEND_EXCERPT_CHARS),
        }
    }

    /// Short chat reply for this failure. Never includes more than a bounded
    /// slice of the backend body.
    pub fn user_message(&self) -> String {
        match self {
            MarketError::Fetch(_) => {
                "⚠️ No se pudo contactar al mercado P2P. Intenta de nuevo en unos minutos."
                    .to_string()
            }
            MarketError::Backend { status, excerpt } => {
                let detail = truncate_chars(excerpt, REPLY_EXCERPT_CHARS);
                if detail.is_empty() {
                    format!("⚠️ El mercado P2P respondió con error {}.", status.as_u16())
                } else {
                    format!(
                        "⚠️ El mercado P2P respondió con error {}: {}",
                        status.as_u16(),
                        detail
                    )
                }
            }
            MarketError::Schema(_) => {
                "⚠️ Respuesta inesperada del mercado P2P. Intenta más tarde.".to_string()
            }
            MarketError::EmptyResult => {
                "ℹ️ No hay anuncios disponibles en este momento.".to_string()
            }
            MarketError::InvalidArgument(reason) => format!("❌ {reason}"),
        }
    }
}

/// Cut `text` to at most `max` characters on a char boundary, marking the cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
