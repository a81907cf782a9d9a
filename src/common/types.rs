//! Unified types shared by the dispatcher, the ledger and the HTTP surface

use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places every cash amount is rounded to
pub const CASH_PRECISION: u32 = 2;

/// Round a cash amount to two decimal places, midpoint away from zero
pub fn round_cash(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CASH_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}

/// Network location of a seller's endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerAddress {
    /// URL scheme (http or https)
    pub scheme: String,
    pub hostname: String,
    pub port: u16,
    /// Base path, always starting with `/`
    pub path: String,
}

impl SellerAddress {
    /// Build the full URL of a resource below the seller's base path
    ///
    /// `resource("quote")` on `http://localhost:3000/path` gives
    /// `http://localhost:3000/path/quote`.
    pub fn resource(&self, resource: &str) -> String {
        format!(
            "{}://{}:{}{}/{}",
            self.scheme,
            self.hostname,
            self.port,
            self.path.trim_end_matches('/'),
            resource.trim_start_matches('/')
        )
    }
}

impl std::fmt::Display for SellerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}{}", self.scheme, self.hostname, self.port, self.path)
    }
}

/// A registered seller and its ledger
#[derive(Debug, Clone, PartialEq)]
pub struct Seller {
    /// Unique seller name
    pub name: String,
    /// Where quotes and feedback are sent
    pub address: SellerAddress,
    /// Current cash balance
    pub cash: Decimal,
    /// Whether the seller answered its last request
    pub online: bool,
    /// SHA-256 hex digest of the registration password
    pub password_hash: String,
    /// Iteration stored in `history[history_offset]`, set by the first
    /// iteration opened after registration
    pub first_iteration: Option<u64>,
    /// History slot of `first_iteration`; moves forward when the clock restarts
    pub history_offset: usize,
    /// Cash delta per iteration since registration, 0 when untouched
    pub history: Vec<Decimal>,
}

/// Price request broadcast to every seller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Destination country code
    pub country: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    /// Number of travellers (1 to 6 for a valid quote)
    pub travellers: u32,
    /// Cover type name
    pub cover: String,
    /// Name of the reduction strategy applied to the bill
    pub reduction: String,
}

/// Amount a seller asks for a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub total: Decimal,
}

impl Bill {
    pub fn new(total: Decimal) -> Self {
        Self { total }
    }
}

/// Raw answer of a seller to a quote request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerResponse {
    pub status: StatusCode,
    /// Response body, absent when it could not be read
    pub body: Option<String>,
}

impl SellerResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    /// Response carrying only a status code
    pub fn status_only(status: StatusCode) -> Self {
        Self { status, body: None }
    }
}

/// Severity of a feedback message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Info,
    Error,
}

/// Message posted to a seller's feedback endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub content: String,
}

impl Feedback {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Info,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Error,
            content: content.into(),
        }
    }
}
