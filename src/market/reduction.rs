//! Reduction strategies: step tables mapping a bill total to a discount fraction

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::common::errors::{MarketError, Result};

/// Key of the built-in tiered strategy
pub const STANDARD: &str = "STANDARD";
/// Key of the built-in flat 50% strategy
pub const HALF_PRICE: &str = "HALF PRICE";

/// One step of a reduction table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionTier {
    /// Lower bound of the tier
    pub threshold: Decimal,
    /// Discount applied when the total falls in this tier
    pub fraction: Decimal,
    /// Whether `threshold` itself belongs to this tier
    #[serde(default = "default_inclusive")]
    pub inclusive: bool,
}

fn default_inclusive() -> bool {
    true
}

impl ReductionTier {
    pub fn from(threshold: Decimal, fraction: Decimal) -> Self {
        Self {
            threshold,
            fraction,
            inclusive: true,
        }
    }

    pub fn above(threshold: Decimal, fraction: Decimal) -> Self {
        Self {
            threshold,
            fraction,
            inclusive: false,
        }
    }

    fn contains(&self, total: Decimal) -> bool {
        if self.inclusive {
            total >= self.threshold
        } else {
            total > self.threshold
        }
    }
}

/// Named step function from a total to a discount fraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    name: String,
    /// Sorted by descending threshold
    tiers: Vec<ReductionTier>,
}

impl Reduction {
    /// Build a strategy from tiers given in any order
    pub fn new(name: impl Into<String>, mut tiers: Vec<ReductionTier>) -> Self {
        // Exclusive bounds sort above inclusive ones at the same threshold
        tiers.sort_by(|a, b| {
            b.threshold
                .cmp(&a.threshold)
                .then_with(|| a.inclusive.cmp(&b.inclusive))
        });
        Self {
            name: name.into(),
            tiers,
        }
    }

    /// Tiered discount: 15% above 50,000 down to nothing under 1,000
    pub fn standard() -> Self {
        Self::new(
            STANDARD,
            vec![
                ReductionTier::above(dec!(50000), dec!(0.15)),
                ReductionTier::from(dec!(10000), dec!(0.10)),
                ReductionTier::from(dec!(7000), dec!(0.07)),
                ReductionTier::from(dec!(5000), dec!(0.05)),
                ReductionTier::from(dec!(1000), dec!(0.03)),
                ReductionTier::from(dec!(0), dec!(0.00)),
            ],
        )
    }

    /// Flat 50% on every total
    pub fn half_price() -> Self {
        Self::new(HALF_PRICE, vec![ReductionTier::from(Decimal::MIN, dec!(0.50))])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Discount fraction for `total`, evaluated top-down; 0 below every tier
    pub fn reduction_for(&self, total: Decimal) -> Decimal {
        self.tiers
            .iter()
            .find(|tier| tier.contains(total))
            .map(|tier| tier.fraction)
            .unwrap_or(Decimal::ZERO)
    }

    /// Apply the discount to `total`
    pub fn apply(&self, total: Decimal) -> Decimal {
        total * (Decimal::ONE - self.reduction_for(total))
    }
}

/// Strategies selectable by key from configuration
#[derive(Debug, Clone)]
pub struct ReductionCatalog {
    strategies: HashMap<String, Reduction>,
}

impl ReductionCatalog {
    /// Catalog holding the built-in strategies only
    pub fn new() -> Self {
        let mut catalog = Self {
            strategies: HashMap::new(),
        };
        catalog.insert(Reduction::standard());
        catalog.insert(Reduction::half_price());
        catalog
    }

    /// Catalog with configuration-declared strategies on top of the built-ins
    pub fn with_custom(custom: &HashMap<String, Vec<ReductionTier>>) -> Self {
        let mut catalog = Self::new();
        for (name, tiers) in custom {
            catalog.insert(Reduction::new(name.to_uppercase(), tiers.clone()));
        }
        catalog
    }

    /// Add or replace a strategy
    pub fn insert(&mut self, reduction: Reduction) {
        self.strategies.insert(reduction.name().to_uppercase(), reduction);
    }

    /// Look up a strategy, failing on unknown keys
    pub fn resolve(&self, key: &str) -> Result<&Reduction> {
        self.strategies
            .get(&key.to_uppercase())
            .ok_or_else(|| MarketError::Configuration(format!("Unknown reduction: {}", key)))
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for ReductionCatalog {
    fn default() -> Self {
        Self::new()
    }
}
