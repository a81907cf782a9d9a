//! Seller registry and per-seller cash ledger
//!
//! Every mutation names the seller and the iteration it belongs to. History
//! slots are addressed by iteration, so responses arriving late or out of
//! order still land in their own slot. Untouched iterations are recorded as 0.
//!
//! A seller's first slot belongs to the first iteration opened after it
//! registered. When the clock jumps (a restart, lower or higher) every
//! history continues at its end rather than rewriting settled slots.

use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::interpreter::LedgerOp;
use crate::common::errors::{MarketError, Result};
use crate::common::types::{round_cash, Bill, Seller, SellerAddress};

/// Sampled history per seller, as served to reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashHistory {
    pub history: BTreeMap<String, Vec<Decimal>>,
    /// Length of the longest history
    pub last_iteration: usize,
}

/// Iteration assumed next when nothing has been opened yet
const FIRST_ITERATION: u64 = 1;

#[derive(Debug, Default)]
struct RegistryState {
    sellers: HashMap<String, Seller>,
    /// Last iteration opened by the dispatcher
    last_opened: Option<u64>,
    /// Set by `restart_clock`; the next opened iteration starts a new run
    restart_pending: bool,
}

impl RegistryState {
    fn next_iteration(&self) -> u64 {
        self.last_opened.map_or(FIRST_ITERATION, |last| last + 1)
    }

    fn record(&mut self, name: &str, iteration: u64, delta: Decimal) -> Result<Decimal> {
        let next = self.next_iteration();
        let seller = self
            .sellers
            .get_mut(name)
            .ok_or_else(|| MarketError::UnknownSeller(name.to_string()))?;
        record(seller, iteration, delta, next)
    }
}

/// Shared handle on all registered sellers and their cash
#[derive(Debug, Clone, Default)]
pub struct SellerRegistry {
    state: Arc<RwLock<RegistryState>>,
}

/// SHA-256 hex digest of a registration password
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Parse a registration URL into a seller address
///
/// An empty path becomes `/`; a missing port falls back to the scheme's default.
pub fn parse_address(url: &str) -> Result<SellerAddress> {
    let parsed = Url::parse(url)?;
    let hostname = parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or(url::ParseError::EmptyHost)?
        .to_string();
    let port = parsed
        .port_or_known_default()
        .ok_or(url::ParseError::InvalidPort)?;
    let path = match parsed.path() {
        "" => "/".to_string(),
        path => path.to_string(),
    };

    Ok(SellerAddress {
        scheme: parsed.scheme().to_string(),
        hostname,
        port,
        path,
    })
}

/// Values at the end of each complete chunk, plus the last value when the
/// final chunk is incomplete
///
/// A chunk size of 0 is treated as 1.
pub fn sample_history(values: &[Decimal], chunk_size: usize) -> Vec<Decimal> {
    let chunk_size = chunk_size.max(1);
    let mut samples: Vec<Decimal> = values
        .iter()
        .skip(chunk_size - 1)
        .step_by(chunk_size)
        .copied()
        .collect();

    if values.len() % chunk_size != 0 {
        if let Some(last) = values.last() {
            samples.push(*last);
        }
    }
    samples
}

fn running_balance(deltas: &[Decimal]) -> Vec<Decimal> {
    deltas
        .iter()
        .scan(Decimal::ZERO, |balance, delta| {
            *balance += *delta;
            Some(*balance)
        })
        .collect()
}

/// Write `delta` into the seller's cash and into the slot of `iteration`
///
/// A seller without a first iteration yet is anchored at `next`.
fn record(seller: &mut Seller, iteration: u64, delta: Decimal, next: u64) -> Result<Decimal> {
    let first = *seller.first_iteration.get_or_insert(next);
    if iteration < first {
        return Err(MarketError::Internal(format!(
            "iteration {} precedes the first iteration {} of {}",
            iteration, first, seller.name
        )));
    }

    let delta = round_cash(delta);
    let slot = seller.history_offset + (iteration - first) as usize;
    if seller.history.len() <= slot {
        seller.history.resize(slot + 1, Decimal::ZERO);
    }
    seller.history[slot] += delta;
    seller.cash = round_cash(seller.cash + delta);
    Ok(delta)
}

impl SellerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a seller, or refresh the address of an existing one
    ///
    /// Re-registering with the same password is idempotent and keeps cash and
    /// history. A different password is rejected without touching anything.
    pub async fn register(&self, url: &str, name: &str, password: &str) -> Result<Seller> {
        let address = parse_address(url)?;
        let password_hash = hash_password(password);

        let mut state = self.state.write().await;
        if let Some(existing) = state.sellers.get_mut(name) {
            if existing.password_hash != password_hash {
                warn!(seller = %name, "Registration refused: password mismatch");
                return Err(MarketError::Authorization(name.to_string()));
            }
            existing.address = address;
            info!(seller = %name, address = %existing.address, "Seller re-registered");
            return Ok(existing.clone());
        }

        let seller = Seller {
            name: name.to_string(),
            address,
            cash: Decimal::ZERO,
            online: false,
            password_hash,
            first_iteration: None,
            history_offset: 0,
            history: Vec::new(),
        };
        info!(seller = %name, address = %seller.address, "Seller registered");
        state.sellers.insert(name.to_string(), seller.clone());
        Ok(seller)
    }

    /// Unknown names are always authorized; known names need the same password
    pub async fn is_authorized(&self, name: &str, password: &str) -> bool {
        let state = self.state.read().await;
        match state.sellers.get(name) {
            Some(seller) => seller.password_hash == hash_password(password),
            None => true,
        }
    }

    /// Mark `iteration` as started and zero-fill every history up to it
    ///
    /// Sellers registered since the previous iteration take `iteration` as
    /// their first one. Opening the same iteration twice changes nothing; any
    /// other jump in the clock continues each history with a single new slot.
    pub async fn open_iteration(&self, iteration: u64) {
        let mut state = self.state.write().await;
        let restarted = std::mem::take(&mut state.restart_pending)
            || matches!(state.last_opened, Some(last) if iteration != last && iteration != last + 1);
        if restarted {
            info!(iteration, previous = ?state.last_opened, "Iteration clock restarted");
        }
        state.last_opened = Some(iteration);

        for seller in state.sellers.values_mut() {
            let first = match seller.first_iteration {
                Some(first) if !restarted => {
                    if first > iteration {
                        continue;
                    }
                    first
                }
                _ => {
                    seller.history_offset = seller.history.len();
                    seller.first_iteration = Some(iteration);
                    iteration
                }
            };
            let slots = seller.history_offset + (iteration - first) as usize + 1;
            if seller.history.len() < slots {
                seller.history.resize(slots, Decimal::ZERO);
            }
        }
    }

    /// Make the next opened iteration start a new run, whatever its number
    pub async fn restart_clock(&self) {
        self.state.write().await.restart_pending = true;
    }

    /// Last iteration opened, if any
    pub async fn current_iteration(&self) -> Option<u64> {
        self.state.read().await.last_opened
    }

    /// Settle a bill comparison for one iteration
    ///
    /// A matching bill (to the cent) earns its total; a missing or wrong one
    /// costs half the expected total. Returns the applied delta, or `None`
    /// when cash is frozen.
    pub async fn update_cash(
        &self,
        name: &str,
        expected: &Bill,
        actual: Option<&Bill>,
        iteration: u64,
        cash_freeze: bool,
    ) -> Result<Option<Decimal>> {
        if cash_freeze {
            debug!(seller = %name, iteration, "Cash frozen, bill ignored");
            return Ok(None);
        }

        let delta = match actual {
            Some(bill) if round_cash(bill.total) == round_cash(expected.total) => {
                round_cash(bill.total)
            }
            _ => -(expected.total / Decimal::TWO),
        };

        let mut state = self.state.write().await;
        state.record(name, iteration, delta).map(Some)
    }

    /// Unconditional credit for `iteration`
    pub async fn add_cash(&self, name: &str, amount: Decimal, iteration: u64) -> Result<Decimal> {
        let mut state = self.state.write().await;
        state.record(name, iteration, amount)
    }

    /// Unconditional debit for `iteration`
    pub async fn deduct_cash(&self, name: &str, amount: Decimal, iteration: u64) -> Result<Decimal> {
        let mut state = self.state.write().await;
        state.record(name, iteration, -amount)
    }

    /// Apply a response handler's decision
    pub async fn apply(
        &self,
        name: &str,
        iteration: u64,
        op: &LedgerOp,
        cash_freeze: bool,
    ) -> Result<Option<Decimal>> {
        match op {
            LedgerOp::Skip => Ok(None),
            LedgerOp::UpdateCash { expected, actual } => {
                self.update_cash(name, expected, actual.as_ref(), iteration, cash_freeze)
                    .await
            }
            LedgerOp::Add(amount) => self.add_cash(name, *amount, iteration).await.map(Some),
            LedgerOp::Deduct(amount) => self.deduct_cash(name, *amount, iteration).await.map(Some),
        }
    }

    /// Mark a seller offline and charge `penalty` outside of any iteration
    pub async fn set_offline(&self, name: &str, penalty: Decimal) -> Result<()> {
        let mut state = self.state.write().await;
        let seller = state
            .sellers
            .get_mut(name)
            .ok_or_else(|| MarketError::UnknownSeller(name.to_string()))?;
        seller.online = false;
        seller.cash = round_cash(seller.cash - penalty);
        info!(seller = %name, %penalty, cash = %seller.cash, "Seller set offline");
        Ok(())
    }

    pub async fn set_online(&self, name: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let seller = state
            .sellers
            .get_mut(name)
            .ok_or_else(|| MarketError::UnknownSeller(name.to_string()))?;
        seller.online = true;
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Option<Seller> {
        self.state.read().await.sellers.get(name).cloned()
    }

    /// All sellers, richest first
    pub async fn all_sellers(&self) -> Vec<Seller> {
        let state = self.state.read().await;
        let mut sellers: Vec<Seller> = state.sellers.values().cloned().collect();
        sellers.sort_by(|a, b| b.cash.cmp(&a.cash).then_with(|| a.name.cmp(&b.name)));
        sellers
    }

    /// Sellers eligible for a quote of `iteration`
    pub async fn addresses_for(&self, iteration: u64) -> Vec<(String, SellerAddress)> {
        let state = self.state.read().await;
        state
            .sellers
            .values()
            .filter(|seller| seller.first_iteration.is_some_and(|first| first <= iteration))
            .map(|seller| (seller.name.clone(), seller.address.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.sellers.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Per-iteration deltas sampled every `chunk_size` iterations
    pub async fn cash_history(&self, chunk_size: usize) -> CashHistory {
        self.sampled(chunk_size, |history| history.to_vec()).await
    }

    /// Running balance built from the deltas, sampled every `chunk_size` iterations
    pub async fn balance_history(&self, chunk_size: usize) -> CashHistory {
        self.sampled(chunk_size, running_balance).await
    }

    async fn sampled(
        &self,
        chunk_size: usize,
        series: impl Fn(&[Decimal]) -> Vec<Decimal>,
    ) -> CashHistory {
        let state = self.state.read().await;
        let mut history = BTreeMap::new();
        let mut last_iteration = 0;

        for seller in state.sellers.values() {
            last_iteration = last_iteration.max(seller.history.len());
            let values = series(&seller.history);
            history.insert(seller.name.clone(), sample_history(&values, chunk_size));
        }

        CashHistory {
            history,
            last_iteration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    async fn registry_with(name: &str) -> SellerRegistry {
        let registry = SellerRegistry::new();
        registry
            .register("http://localhost:3000/path", name, "secret")
            .await
            .unwrap();
        registry
    }

    async fn cash_of(registry: &SellerRegistry, name: &str) -> Decimal {
        registry.get(name).await.unwrap().cash
    }

    #[tokio::test]
    async fn test_register_new_seller() {
        let registry = registry_with("bob").await;
        let sellers = registry.all_sellers().await;

        assert_eq!(sellers.len(), 1);
        let bob = &sellers[0];
        assert_eq!(bob.name, "bob");
        assert_eq!(bob.cash, Decimal::ZERO);
        assert!(!bob.online);
        assert_eq!(bob.address.hostname, "localhost");
        assert_eq!(bob.address.port, 3000);
        assert_eq!(bob.address.path, "/path");
        assert_eq!(bob.address.to_string(), "http://localhost:3000/path");
    }

    #[tokio::test]
    async fn test_register_with_empty_path() {
        let registry = SellerRegistry::new();
        let bob = tokio_test::assert_ok!(
            registry
                .register("http://localhost:3000", "bob", "secret")
                .await
        );
        assert_eq!(bob.address.path, "/");
        assert_eq!(bob.address.port, 3000);
    }

    #[tokio::test]
    async fn test_register_defaults_port_from_scheme() {
        let address = parse_address("https://seller.example.com/api").unwrap();
        assert_eq!(address.port, 443);
        assert_eq!(address.path, "/api");
    }

    #[tokio::test]
    async fn test_register_invalid_url() {
        let registry = SellerRegistry::new();
        let err = tokio_test::assert_err!(registry.register("not a url", "bob", "secret").await);
        assert!(matches!(err, MarketError::InvalidUrl(_)));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_reregister_same_password_is_idempotent() {
        let registry = registry_with("john").await;
        registry.add_cash("john", dec!(30), 1).await.unwrap();

        let john = registry
            .register("http://localhost:6000", "john", "secret")
            .await
            .unwrap();

        assert_eq!(registry.len().await, 1);
        assert_eq!(john.cash, dec!(30));
        assert_eq!(john.address.port, 6000);
    }

    #[tokio::test]
    async fn test_reregister_other_password_is_rejected() {
        let registry = registry_with("john").await;

        let err = registry
            .register("http://localhost:6000", "john", "smith")
            .await
            .unwrap_err();

        assert!(matches!(err, MarketError::Authorization(_)));
        assert_eq!(registry.get("john").await.unwrap().address.port, 3000);
    }

    #[tokio::test]
    async fn test_is_authorized() {
        let registry = registry_with("travis").await;
        assert!(registry.is_authorized("carmen", "mccallum").await);
        assert!(registry.is_authorized("travis", "secret").await);
        assert!(!registry.is_authorized("travis", "vlad").await);
    }

    #[tokio::test]
    async fn test_update_cash_with_matching_bill() {
        let registry = registry_with("bob").await;
        registry
            .update_cash("bob", &Bill::new(dec!(100)), Some(&Bill::new(dec!(100))), 1, false)
            .await
            .unwrap();
        assert_eq!(cash_of(&registry, "bob").await, dec!(100));
    }

    #[tokio::test]
    async fn test_update_cash_without_bill() {
        let registry = registry_with("bob").await;
        registry
            .update_cash("bob", &Bill::new(dec!(100)), None, 1, false)
            .await
            .unwrap();
        assert_eq!(cash_of(&registry, "bob").await, dec!(-50));
    }

    #[tokio::test]
    async fn test_update_cash_with_wrong_bill() {
        let registry = registry_with("bob").await;
        registry
            .update_cash("bob", &Bill::new(dec!(100)), Some(&Bill::new(dec!(50))), 1, false)
            .await
            .unwrap();
        assert_eq!(cash_of(&registry, "bob").await, dec!(-50));
    }

    #[tokio::test]
    async fn test_update_cash_frozen() {
        let registry = registry_with("bob").await;
        let delta = registry
            .update_cash("bob", &Bill::new(dec!(100)), Some(&Bill::new(dec!(100))), 1, true)
            .await
            .unwrap();
        assert_eq!(delta, None);
        assert_eq!(cash_of(&registry, "bob").await, Decimal::ZERO);

        registry
            .update_cash("bob", &Bill::new(dec!(100)), None, 1, true)
            .await
            .unwrap();
        assert_eq!(cash_of(&registry, "bob").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_update_cash_compares_to_the_cent() {
        let registry = registry_with("bob").await;
        registry
            .update_cash(
                "bob",
                &Bill::new(dec!(100.12345)),
                Some(&Bill::new(dec!(100.12))),
                1,
                false,
            )
            .await
            .unwrap();
        assert_eq!(cash_of(&registry, "bob").await, dec!(100.12));
    }

    #[tokio::test]
    async fn test_update_cash_stores_rounded_amount() {
        let registry = registry_with("bob").await;
        registry
            .update_cash(
                "bob",
                &Bill::new(dec!(100.12)),
                Some(&Bill::new(dec!(100.12345))),
                1,
                false,
            )
            .await
            .unwrap();
        assert_eq!(cash_of(&registry, "bob").await, dec!(100.12));
    }

    #[tokio::test]
    async fn test_update_unknown_seller() {
        let registry = SellerRegistry::new();
        let err = registry.add_cash("ghost", dec!(1), 1).await.unwrap_err();
        assert!(matches!(err, MarketError::UnknownSeller(_)));
    }

    #[tokio::test]
    async fn test_set_offline_deducts_penalty() {
        let registry = registry_with("bob").await;
        registry.add_cash("bob", dec!(200), 1).await.unwrap();
        registry.set_online("bob").await.unwrap();

        registry.set_offline("bob", dec!(100)).await.unwrap();

        let bob = registry.get("bob").await.unwrap();
        assert!(!bob.online);
        assert_eq!(bob.cash, dec!(100));
        assert_eq!(bob.history, vec![dec!(200)]);
    }

    #[tokio::test]
    async fn test_history_slots_are_addressed_by_iteration() {
        let registry = registry_with("bob").await;

        // Responses of iterations 4 and 2 arrive before iteration 3's
        registry.add_cash("bob", dec!(40), 4).await.unwrap();
        registry.deduct_cash("bob", dec!(20), 2).await.unwrap();
        registry.add_cash("bob", dec!(30), 3).await.unwrap();

        let bob = registry.get("bob").await.unwrap();
        assert_eq!(bob.history, vec![dec!(0), dec!(-20), dec!(30), dec!(40)]);
        assert_eq!(bob.cash, dec!(50));
    }

    #[tokio::test]
    async fn test_open_iteration_zero_fills() {
        let registry = registry_with("bob").await;
        for iteration in 1..=3 {
            registry.open_iteration(iteration).await;
        }
        registry.add_cash("bob", dec!(10), 2).await.unwrap();
        registry.open_iteration(4).await;

        let bob = registry.get("bob").await.unwrap();
        assert_eq!(bob.history, vec![dec!(0), dec!(10), dec!(0), dec!(0)]);
        assert_eq!(registry.current_iteration().await, Some(4));
    }

    #[tokio::test]
    async fn test_late_registration_starts_at_next_iteration() {
        let registry = registry_with("bob").await;
        registry.open_iteration(1).await;
        registry.open_iteration(2).await;

        let alice = registry
            .register("http://localhost:4000", "alice", "pw")
            .await
            .unwrap();
        assert_eq!(alice.first_iteration, None);
        assert_eq!(registry.addresses_for(2).await.len(), 1);

        registry.open_iteration(3).await;
        assert_eq!(registry.addresses_for(3).await.len(), 2);
        let alice = registry.get("alice").await.unwrap();
        assert_eq!(alice.first_iteration, Some(3));
        assert_eq!(alice.history, vec![Decimal::ZERO]);

        let err = registry.add_cash("alice", dec!(5), 2).await.unwrap_err();
        assert!(matches!(err, MarketError::Internal(_)));
    }

    #[tokio::test]
    async fn test_first_opened_iteration_anchors_history() {
        let registry = registry_with("bob").await;
        assert!(registry.addresses_for(1000).await.is_empty());

        registry.open_iteration(1000).await;
        registry.add_cash("bob", dec!(7), 1000).await.unwrap();

        let bob = registry.get("bob").await.unwrap();
        assert_eq!(bob.first_iteration, Some(1000));
        assert_eq!(bob.history, vec![dec!(7)]);
        assert_eq!(registry.addresses_for(1000).await.len(), 1);
    }

    #[tokio::test]
    async fn test_reopening_an_iteration_changes_nothing() {
        let registry = registry_with("bob").await;
        registry.open_iteration(1).await;
        registry.add_cash("bob", dec!(3), 1).await.unwrap();
        registry.open_iteration(1).await;

        let bob = registry.get("bob").await.unwrap();
        assert_eq!(bob.history, vec![dec!(3)]);
    }

    #[tokio::test]
    async fn test_clock_going_back_continues_histories() {
        let registry = registry_with("bob").await;
        for iteration in 1..=50 {
            registry.open_iteration(iteration).await;
        }
        registry.add_cash("bob", dec!(10), 1).await.unwrap();
        registry
            .register("http://localhost:4000", "alice", "pw")
            .await
            .unwrap();

        registry.open_iteration(1).await;
        assert_eq!(registry.addresses_for(1).await.len(), 2);
        registry.add_cash("bob", dec!(4), 1).await.unwrap();
        registry.add_cash("alice", dec!(6), 1).await.unwrap();

        let bob = registry.get("bob").await.unwrap();
        assert_eq!(bob.history.len(), 51);
        assert_eq!(bob.history[0], dec!(10));
        assert_eq!(bob.history[50], dec!(4));
        assert_eq!(bob.cash, dec!(14));

        let alice = registry.get("alice").await.unwrap();
        assert_eq!(alice.history, vec![dec!(6)]);
        assert_eq!(registry.current_iteration().await, Some(1));
    }

    #[tokio::test]
    async fn test_restart_clock_at_the_next_iteration() {
        let registry = registry_with("bob").await;
        registry.open_iteration(1).await;
        registry.open_iteration(2).await;

        // Stopped after 2 and started again at 3
        registry.restart_clock().await;
        registry.open_iteration(3).await;
        registry.add_cash("bob", dec!(1), 3).await.unwrap();

        let bob = registry.get("bob").await.unwrap();
        assert_eq!(bob.history, vec![dec!(0), dec!(0), dec!(1)]);
        assert_eq!(bob.history_offset, 2);
    }

    #[tokio::test]
    async fn test_jump_forward_adds_a_single_slot() {
        let registry = registry_with("bob").await;
        registry.open_iteration(1).await;
        registry.open_iteration(1_000_000).await;

        let bob = registry.get("bob").await.unwrap();
        assert_eq!(bob.history.len(), 2);
        assert_eq!(bob.first_iteration, Some(1_000_000));
    }

    #[test]
    fn test_sample_history_complete_chunks() {
        let values = [dec!(0), dec!(0), dec!(10), dec!(10), dec!(10)];
        assert_eq!(sample_history(&values, 5), vec![dec!(10)]);
    }

    #[test]
    fn test_sample_history_incomplete_last_chunk() {
        let values = [
            dec!(0),
            dec!(0),
            dec!(10),
            dec!(10),
            dec!(10),
            dec!(10),
            dec!(10),
        ];
        assert_eq!(
            sample_history(&values, 3),
            vec![dec!(10), dec!(10), dec!(10)]
        );
    }

    #[test]
    fn test_sample_history_edge_cases() {
        assert!(sample_history(&[], 3).is_empty());
        assert_eq!(sample_history(&[dec!(1), dec!(2)], 5), vec![dec!(2)]);
        assert_eq!(
            sample_history(&[dec!(1), dec!(2)], 0),
            vec![dec!(1), dec!(2)]
        );
    }

    #[tokio::test]
    async fn test_cash_history_report() {
        let registry = registry_with("bob").await;
        for iteration in 3..=5 {
            registry.add_cash("bob", dec!(10), iteration).await.unwrap();
        }

        let report = registry.cash_history(5).await;
        assert_eq!(report.last_iteration, 5);
        assert_eq!(report.history["bob"], vec![dec!(10)]);

        for iteration in 6..=7 {
            registry.add_cash("bob", dec!(10), iteration).await.unwrap();
        }
        let report = registry.cash_history(3).await;
        assert_eq!(report.last_iteration, 7);
        assert_eq!(report.history["bob"], vec![dec!(10), dec!(10), dec!(10)]);
    }

    #[tokio::test]
    async fn test_balance_history_report() {
        let registry = registry_with("bob").await;
        registry.add_cash("bob", dec!(10), 1).await.unwrap();
        registry.deduct_cash("bob", dec!(5), 2).await.unwrap();
        registry.add_cash("bob", dec!(20), 4).await.unwrap();

        let report = registry.balance_history(2).await;
        assert_eq!(report.history["bob"], vec![dec!(5), dec!(25)]);
        assert_eq!(report.last_iteration, 4);
    }

    #[tokio::test]
    async fn test_all_sellers_sorted_by_cash() {
        let registry = registry_with("bob").await;
        registry
            .register("http://localhost:4000", "alice", "pw")
            .await
            .unwrap();
        registry.add_cash("alice", dec!(10), 1).await.unwrap();

        let names: Vec<String> = registry
            .all_sellers()
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["alice".to_string(), "bob".to_string()]);
    }
}
