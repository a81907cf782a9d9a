//! HTTP transport to the sellers' quote and feedback endpoints

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::common::errors::{MarketError, Result};
use crate::common::traits::QuoteTransport;
use crate::common::types::{Feedback, Quote, SellerAddress, SellerResponse};

/// JSON-over-HTTP client for seller endpoints
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a 5 second timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(5))
    }

    /// Create a transport with a custom per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::Internal(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl QuoteTransport for HttpTransport {
    #[instrument(skip(self, quote), fields(seller = %seller))]
    async fn send_quote(&self, seller: &SellerAddress, quote: &Quote) -> Result<SellerResponse> {
        let url = seller.resource("quote");
        debug!("Posting quote to: {}", url);

        let response = self.client.post(&url).json(quote).send().await?;
        let status = response.status();

        // A body that cannot be read counts as no body at all
        let body = match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Could not read body from {}: {}", url, e);
                None
            }
        };

        Ok(SellerResponse { status, body })
    }

    #[instrument(skip(self, feedback), fields(seller = %seller))]
    async fn notify(&self, seller: &SellerAddress, feedback: &Feedback) -> Result<()> {
        let url = seller.resource("feedback");
        let response = self.client.post(&url).json(feedback).send().await?;

        if !response.status().is_success() {
            debug!("Feedback refused by {} with status {}", url, response.status());
        }
        Ok(())
    }
}
