//! QuoteMarket Library
//!
//! A buyer that periodically broadcasts travel insurance quotes to registered
//! sellers, checks their bills and keeps a per-seller cash ledger.

pub mod common;
pub mod config;
pub mod market;
pub mod server;

// Re-export commonly used types
pub use common::errors::{BillError, MarketError, Result};
pub use common::traits::{ConfigurationSource, QuoteTransport};
pub use common::types::{Bill, Feedback, FeedbackKind, Quote, Seller, SellerAddress, SellerResponse};
pub use config::types::{AppConfig, BadRequestConfig, MarketConfig};
pub use market::bad_request::CorruptionMode;
pub use market::interpreter::{DispatchContext, LedgerOp};
pub use market::reduction::{Reduction, ReductionCatalog, ReductionTier};
pub use market::{CashHistory, Dispatcher, DispatcherState, HttpTransport, InFlight, QuoteService, SellerRegistry};
pub use server::{create_app, ServerState};
