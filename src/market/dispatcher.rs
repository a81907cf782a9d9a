//! Periodic quote dispatcher
//!
//! A single tokio interval drives the iteration clock. Every tick opens the
//! iteration on the registry, reads a fresh configuration snapshot and fans one
//! quote out to every seller. Each seller is handled by its own task, which
//! settles the answer against the ledger slot of the iteration it was sent in.

use reqwest::StatusCode;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::bad_request::{corrupt, settle, should_trigger};
use super::interpreter::{interpret, DispatchContext};
use super::ledger::SellerRegistry;
use super::offline::{policy_for, OfflinePolicy};
use super::quote::QuoteService;
use super::reduction::ReductionCatalog;
use crate::common::errors::Result;
use crate::common::traits::{ConfigurationSource, QuoteTransport};
use crate::common::types::{Bill, Quote, SellerAddress};
use crate::config::types::MarketConfig;

/// Whether the iteration clock is ticking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Stopped,
    Running,
}

/// Quotes of one iteration still being answered
///
/// Dropping it does not cancel anything; `join` waits for every seller.
#[derive(Debug)]
pub struct InFlight {
    pub iteration: u64,
    /// Quote actually sent, corrupted on bad-request iterations
    pub quote: Quote,
    /// Bill of the valid quote
    pub expected_bill: Bill,
    pub bad_request: bool,
    handles: Vec<JoinHandle<Option<Decimal>>>,
}

impl InFlight {
    /// Number of sellers the quote was sent to
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every seller task and collect the cash deltas applied
    pub async fn join(self) -> Vec<Option<Decimal>> {
        let mut deltas = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            match handle.await {
                Ok(delta) => deltas.push(delta),
                Err(e) => {
                    error!("Seller task failed: {}", e);
                    deltas.push(None);
                }
            }
        }
        deltas
    }
}

/// Everything one seller task needs, captured at dispatch time
struct SellerTask {
    registry: SellerRegistry,
    transport: Arc<dyn QuoteTransport>,
    policy: Arc<dyn OfflinePolicy>,
    address: SellerAddress,
    quote: Arc<Quote>,
    context: DispatchContext,
    cash_freeze: bool,
}

impl SellerTask {
    async fn run(self) -> Option<Decimal> {
        let seller = self.context.seller.as_str();
        let iteration = self.context.iteration;

        let response = match self.transport.send_quote(&self.address, &self.quote).await {
            Ok(response) => response,
            Err(e) => {
                warn!(seller = %seller, iteration, "Seller unreachable: {}", e);
                if let Err(e) = self.policy.on_unreachable(&self.registry, seller).await {
                    error!(seller = %seller, "Offline policy failed: {}", e);
                }
                return None;
            }
        };

        let marked = if response.status == StatusCode::NOT_FOUND {
            self.policy.on_unreachable(&self.registry, seller).await
        } else {
            self.registry.set_online(seller).await
        };
        if let Err(e) = marked {
            error!(seller = %seller, "Could not update seller status: {}", e);
        }

        let op = if self.context.bad_request {
            settle(&self.context, &response)
        } else {
            interpret(&self.context, &response)
        };

        let delta = match self
            .registry
            .apply(seller, iteration, &op, self.cash_freeze)
            .await
        {
            Ok(delta) => delta,
            Err(e) => {
                error!(seller = %seller, iteration, "Ledger update failed: {}", e);
                None
            }
        };
        info!(
            seller = %seller,
            iteration,
            status = %response.status,
            ?op,
            ?delta,
            "Response settled"
        );

        if let Some(feedback) = op.feedback(&self.context, delta) {
            if let Err(e) = self.transport.notify(&self.address, &feedback).await {
                debug!(seller = %seller, "Feedback not delivered: {}", e);
            }
        }
        delta
    }
}

/// Drives iterations and fans quotes out to every registered seller
#[derive(Clone)]
pub struct Dispatcher {
    registry: SellerRegistry,
    quotes: Arc<QuoteService>,
    transport: Arc<dyn QuoteTransport>,
    configuration: Arc<dyn ConfigurationSource>,
    tick_interval: Duration,
    /// Next iteration to open
    iteration: Arc<AtomicU64>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Dispatcher {
    pub fn new(
        registry: SellerRegistry,
        quotes: Arc<QuoteService>,
        transport: Arc<dyn QuoteTransport>,
        configuration: Arc<dyn ConfigurationSource>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            registry,
            quotes,
            transport,
            configuration,
            // tokio intervals panic on a zero period
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            iteration: Arc::new(AtomicU64::new(0)),
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    pub fn registry(&self) -> &SellerRegistry {
        &self.registry
    }

    /// Iteration the next tick will open
    pub fn next_iteration(&self) -> u64 {
        self.iteration.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> DispatcherState {
        let ticker = self.ticker.lock().unwrap_or_else(|e| e.into_inner());
        match ticker.as_ref() {
            Some(handle) if !handle.is_finished() => DispatcherState::Running,
            _ => DispatcherState::Stopped,
        }
    }

    /// Start the iteration clock at `start_iteration`, first tick immediately
    ///
    /// Restarts the clock when already running. Seller histories continue
    /// from where they stopped. Returns `start_iteration`.
    pub fn start_buying(&self, start_iteration: u64) -> u64 {
        let mut ticker = self.ticker.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = ticker.take() {
            previous.abort();
            info!("Restarting iteration clock");
        }
        self.iteration.store(start_iteration, Ordering::SeqCst);

        let dispatcher = self.clone();
        let handle = tokio::spawn(async move {
            dispatcher.registry.restart_clock().await;
            let mut clock = interval(dispatcher.tick_interval);
            clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                clock.tick().await;
                let iteration = dispatcher.iteration.fetch_add(1, Ordering::SeqCst);
                if let Err(e) = dispatcher.tick(iteration).await {
                    error!(iteration, "Iteration skipped: {}", e);
                }
            }
        });

        *ticker = Some(handle);
        info!(
            start_iteration,
            interval_ms = self.tick_interval.as_millis() as u64,
            "Started buying"
        );
        start_iteration
    }

    /// Stop the iteration clock; requests already sent keep running
    pub fn stop(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = ticker.take() {
            handle.abort();
            info!(next_iteration = self.next_iteration(), "Stopped buying");
        }
    }

    /// Run one iteration
    ///
    /// Returns `None` when the market is inactive.
    #[instrument(skip(self))]
    pub async fn tick(&self, iteration: u64) -> Result<Option<InFlight>> {
        self.registry.open_iteration(iteration).await;

        let config = self.configuration.all();
        if let Some(tables) = self.configuration.reductions() {
            self.quotes
                .set_reductions(ReductionCatalog::with_custom(&tables));
        }
        if !config.active {
            debug!("Market inactive, no quote sent");
            return Ok(None);
        }

        let bad_request = should_trigger(iteration, &config.bad_request);
        self.dispatch(&config.reduction, iteration, bad_request, &config)
            .await
            .map(Some)
    }

    /// Send one quote for `iteration` to every eligible seller
    ///
    /// Opens `iteration` first, which is a no-op when the tick already did.
    /// # Arguments
    /// * `reduction` - Key of the reduction strategy the quote carries
    /// * `iteration` - Iteration the answers are accounted to
    /// * `bad_request` - Whether to send a corrupted copy of the quote
    pub async fn send_quote_to_sellers(
        &self,
        reduction: &str,
        iteration: u64,
        bad_request: bool,
    ) -> Result<InFlight> {
        self.registry.open_iteration(iteration).await;
        let config = self.configuration.all();
        self.dispatch(reduction, iteration, bad_request, &config)
            .await
    }

    async fn dispatch(
        &self,
        reduction: &str,
        iteration: u64,
        bad_request: bool,
        config: &MarketConfig,
    ) -> Result<InFlight> {
        let reduction = self
            .quotes
            .reductions()
            .resolve(reduction)?
            .name()
            .to_string();
        let valid = self.quotes.create(&reduction)?;
        let expected_bill = self.quotes.bill(&valid)?;

        let quote = if bad_request {
            corrupt(&valid, &config.bad_request.modes)
        } else {
            valid
        };
        let shared = Arc::new(quote.clone());
        let policy = policy_for(config);

        let sellers = self.registry.addresses_for(iteration).await;
        info!(
            iteration,
            reduction = %reduction,
            bad_request,
            expected = %expected_bill.total,
            sellers = sellers.len(),
            "Dispatching quote"
        );

        let handles = sellers
            .into_iter()
            .map(|(seller, address)| {
                let task = SellerTask {
                    registry: self.registry.clone(),
                    transport: Arc::clone(&self.transport),
                    policy: Arc::clone(&policy),
                    address,
                    quote: Arc::clone(&shared),
                    context: DispatchContext {
                        seller,
                        expected_bill,
                        iteration,
                        bad_request,
                    },
                    cash_freeze: config.cash_freeze,
                };
                tokio::spawn(task.run())
            })
            .collect();

        Ok(InFlight {
            iteration,
            quote,
            expected_bill,
            bad_request,
            handles,
        })
    }
}
