use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HighlightError {
    #[error("Scale must be greater than zero, got {0}")]
    InvalidScale(f64),

    #[error("Non-finite value for {0}")]
    NonFinite(&'static str),

    #[error("Negative {field}: {value}")]
    NegativeDimension { field: &'static str, value: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}
