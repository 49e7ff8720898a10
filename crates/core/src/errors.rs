use thiserror::Error;

/// Unified error type for the entire portfolio-analyzer-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Only upload and configuration errors abort an analysis run. Lookup errors
/// are caught by `MarketDataService` and turn into unavailable values.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Upload ──────────────────────────────────────────────────────
    #[error("Could not parse upload: {0}")]
    Parse(String),

    #[error("Missing required columns: {0}")]
    Schema(String),

    #[error("Invalid value in row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    // ── File I/O / Config ───────────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    // ── Market data ─────────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No market data provider configured")]
    NoProvider,

    #[error("Market data unavailable for {symbol}: {message}")]
    LookupUnavailable { symbol: String, message: String },

    #[error("Lookup for {symbol} timed out after {seconds}s")]
    LookupTimeout { symbol: String, seconds: u64 },

    // ── Analytics ───────────────────────────────────────────────────
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
}

impl CoreError {
    /// True for errors that end the whole analysis run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::Parse(_)
                | CoreError::Schema(_)
                | CoreError::InvalidRow { .. }
                | CoreError::FileIO(_)
                | CoreError::Deserialization(_)
                | CoreError::InvalidSettings(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Parse(format!("delimited text: {e}"))
    }
}

impl From<calamine::Error> for CoreError {
    fn from(e: calamine::Error) -> Self {
        CoreError::Parse(format!("spreadsheet: {e}"))
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters: reqwest errors carry full URLs, API keys included.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
