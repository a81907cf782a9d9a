//! Error types for the market engine

use thiserror::Error;

/// Result type alias using our MarketError
pub type Result<T> = std::result::Result<T, MarketError>;

/// Reasons a seller's bill is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BillError {
    /// The response has no `total` field
    #[error("The field \"total\" in the response is missing.")]
    MissingField,

    /// The `total` field is present but not numeric
    #[error("\"Total\" is not a number.")]
    NotANumber,
}

/// Main error type for market operations
#[derive(Error, Debug)]
pub enum MarketError {
    /// Configuration errors (unknown reduction key, unreadable file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed bill returned by a seller
    #[error("Invalid bill: {0}")]
    Validation(#[from] BillError),

    /// Seller registration URL could not be parsed
    #[error("Invalid seller url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Seller unreachable, timed out or returned an unreadable response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Password mismatch for an already registered seller
    #[error("Seller {0} is not authorized")]
    Authorization(String),

    /// Seller not present in the registry
    #[error("Unknown seller: {0}")]
    UnknownSeller(String),

    /// Quote references a country or cover outside the catalogs
    #[error("Cannot bill quote: {0}")]
    Quote(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for MarketError {
    fn from(err: config::ConfigError) -> Self {
        MarketError::Configuration(err.to_string())
    }
}
