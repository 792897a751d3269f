use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WindRoseError>;

#[derive(Error, Debug)]
pub enum WindRoseError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("No data for these criteria: {0}")]
    EmptyInput(String),

    #[error("Total observation count is zero")]
    ZeroTotal,

    #[error("Unknown wind direction code: '{0}'")]
    UnknownDirection(String),

    #[error("No observation at any synoptic hour on {date}")]
    NoNearbyObservation { date: NaiveDate },

    #[error("Window start {from} must be before window end {to}")]
    InvalidWindow {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl WindRoseError {
    /// Conditions that mean "nothing to show" rather than a defect.
    pub fn is_no_data(&self) -> bool {
        matches!(self, WindRoseError::EmptyInput(_) | WindRoseError::ZeroTotal)
    }
}
