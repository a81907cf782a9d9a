//! Trait definitions for the engine's collaborators

use async_trait::async_trait;
use std::collections::HashMap;

use super::errors::Result;
use super::types::{Feedback, Quote, SellerAddress, SellerResponse};
use crate::config::types::MarketConfig;
use crate::market::reduction::ReductionTier;

/// Network seam between the dispatcher and the sellers
///
/// Implementations perform one request per call and never retry; a
/// timeout or connection failure is returned as an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteTransport: Send + Sync {
    /// Post a quote to the seller's quote endpoint and return its raw answer
    ///
    /// # Arguments
    /// * `seller` - Address of the seller
    /// * `quote` - Quote to send (possibly corrupted)
    async fn send_quote(&self, seller: &SellerAddress, quote: &Quote) -> Result<SellerResponse>;

    /// Post a feedback message to the seller's feedback endpoint
    async fn notify(&self, seller: &SellerAddress, feedback: &Feedback) -> Result<()>;
}

/// Source of the live market configuration
///
/// The dispatcher calls `all()` at every tick and never caches the result.
pub trait ConfigurationSource: Send + Sync {
    /// Current configuration snapshot
    fn all(&self) -> MarketConfig;

    /// Custom reduction tables read along with the last snapshot
    ///
    /// `None` keeps the tables the engine started with.
    fn reductions(&self) -> Option<HashMap<String, Vec<ReductionTier>>> {
        None
    }
}
