//! Common test utilities and fixtures

#![allow(dead_code)]

use chrono::NaiveDate;
use quote_market::common::types::Quote;
use quote_market::config::StaticConfiguration;
use quote_market::market::catalog::{Countries, Covers};
use quote_market::market::quote::{FixedClock, QuoteService};
use quote_market::market::reduction::ReductionCatalog;
use quote_market::{create_app, Dispatcher, HttpTransport, MarketConfig, SellerRegistry, ServerState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{Request, ResponseTemplate};

/// Day every generated quote departs from
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()
}

/// Quote service with the default catalogs and a frozen clock
pub fn quote_service() -> Arc<QuoteService> {
    Arc::new(QuoteService::new(
        Countries::europe(),
        Covers::standard(),
        ReductionCatalog::new(),
        Arc::new(FixedClock(today())),
    ))
}

/// Dispatcher over `registry` using real HTTP and an in-memory configuration
pub fn dispatcher(
    registry: SellerRegistry,
    config: MarketConfig,
    timeout: Duration,
) -> (Dispatcher, StaticConfiguration) {
    let configuration = StaticConfiguration::new(config);
    let transport = HttpTransport::with_timeout(timeout).unwrap();
    let dispatcher = Dispatcher::new(
        registry,
        quote_service(),
        Arc::new(transport),
        Arc::new(configuration.clone()),
        Duration::from_millis(50),
    );
    (dispatcher, configuration)
}

/// Seller behaviour: answers every quote with the exact bill
pub fn honest_seller(request: &Request) -> ResponseTemplate {
    let quote: Quote = match serde_json::from_slice(&request.body) {
        Ok(quote) => quote,
        Err(_) => return ResponseTemplate::new(400),
    };
    match quote_service().bill(&quote) {
        Ok(bill) => ResponseTemplate::new(200)
            .set_body_string(format!(r#"{{"total": {}}}"#, bill.total)),
        Err(_) => ResponseTemplate::new(400),
    }
}

/// Serve the registration API on an ephemeral local port
pub async fn spawn_server(registry: SellerRegistry, chunk_size: usize) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app(ServerState::new(registry, chunk_size));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
