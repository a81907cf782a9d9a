//! What happens to a seller that cannot be reached

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use super::ledger::SellerRegistry;
use crate::common::errors::Result;
use crate::config::types::MarketConfig;

/// Reaction to a seller that answered 404 or could not be reached at all
#[async_trait]
pub trait OfflinePolicy: Send + Sync {
    async fn on_unreachable(&self, registry: &SellerRegistry, seller: &str) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Leave the seller's status and cash alone
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOnline;

#[async_trait]
impl OfflinePolicy for KeepOnline {
    async fn on_unreachable(&self, _registry: &SellerRegistry, seller: &str) -> Result<()> {
        debug!(seller = %seller, "Seller unreachable, no penalty configured");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "keep_online"
    }
}

/// Mark the seller offline and charge a fixed penalty
#[derive(Debug, Clone, Copy)]
pub struct PenalizeUnreachable {
    pub penalty: Decimal,
}

impl PenalizeUnreachable {
    pub fn new(penalty: Decimal) -> Self {
        Self { penalty }
    }
}

#[async_trait]
impl OfflinePolicy for PenalizeUnreachable {
    async fn on_unreachable(&self, registry: &SellerRegistry, seller: &str) -> Result<()> {
        registry.set_offline(seller, self.penalty).await
    }

    fn name(&self) -> &'static str {
        "penalize_unreachable"
    }
}

/// Policy selected by the `offline_penalty` setting of a snapshot
pub fn policy_for(config: &MarketConfig) -> Arc<dyn OfflinePolicy> {
    match config.offline_penalty {
        Some(penalty) => Arc::new(PenalizeUnreachable::new(penalty)),
        None => Arc::new(KeepOnline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn registry() -> SellerRegistry {
        let registry = SellerRegistry::new();
        registry
            .register("http://localhost:3000", "bob", "secret")
            .await
            .unwrap();
        registry.add_cash("bob", dec!(200), 1).await.unwrap();
        registry.set_online("bob").await.unwrap();
        registry
    }

    #[tokio::test]
    async fn test_keep_online_changes_nothing() {
        let registry = registry().await;
        KeepOnline.on_unreachable(&registry, "bob").await.unwrap();

        let bob = registry.get("bob").await.unwrap();
        assert!(bob.online);
        assert_eq!(bob.cash, dec!(200));
    }

    #[tokio::test]
    async fn test_penalize_sets_offline() {
        let registry = registry().await;
        PenalizeUnreachable::new(dec!(100))
            .on_unreachable(&registry, "bob")
            .await
            .unwrap();

        let bob = registry.get("bob").await.unwrap();
        assert!(!bob.online);
        assert_eq!(bob.cash, dec!(100));
    }

    #[test]
    fn test_policy_for_config() {
        let mut config = MarketConfig::default();
        assert_eq!(policy_for(&config).name(), "keep_online");

        config.offline_penalty = Some(dec!(10));
        assert_eq!(policy_for(&config).name(), "penalize_unreachable");
    }
}
