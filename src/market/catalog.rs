//! Countries and cover types a quote can be drawn from

use rand::seq::IndexedRandom;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Destination country with its tax rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub code: String,
    /// Tax added on top of the bill (0.20 = 20%)
    pub tax: Decimal,
}

impl Country {
    pub fn new(code: impl Into<String>, tax: Decimal) -> Self {
        Self {
            code: code.into(),
            tax,
        }
    }

    pub fn apply_tax(&self, amount: Decimal) -> Decimal {
        amount * (Decimal::ONE + self.tax)
    }
}

/// Countries quotes are generated for
#[derive(Debug, Clone)]
pub struct Countries {
    countries: Vec<Country>,
}

impl Countries {
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }

    /// European destinations with their VAT rates
    pub fn europe() -> Self {
        Self::new(vec![
            Country::new("AT", dec!(0.20)),
            Country::new("BE", dec!(0.21)),
            Country::new("DE", dec!(0.19)),
            Country::new("DK", dec!(0.25)),
            Country::new("ES", dec!(0.21)),
            Country::new("FI", dec!(0.24)),
            Country::new("FR", dec!(0.20)),
            Country::new("GR", dec!(0.24)),
            Country::new("IE", dec!(0.23)),
            Country::new("IT", dec!(0.22)),
            Country::new("LU", dec!(0.17)),
            Country::new("NL", dec!(0.21)),
            Country::new("PL", dec!(0.23)),
            Country::new("PT", dec!(0.23)),
            Country::new("SE", dec!(0.25)),
        ])
    }

    pub fn get(&self, code: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Uniformly chosen country
    pub fn random_one<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Country> {
        self.countries.choose(rng)
    }
}

/// Insurance cover with its price multiplier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub name: String,
    pub rate: Decimal,
}

impl Cover {
    pub fn new(name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }
}

/// Cover types quotes are generated for
#[derive(Debug, Clone)]
pub struct Covers {
    covers: Vec<Cover>,
}

impl Covers {
    pub fn new(covers: Vec<Cover>) -> Self {
        Self { covers }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Cover::new("Basic", dec!(1.0)),
            Cover::new("Extra", dec!(1.5)),
            Cover::new("Premier", dec!(2.0)),
        ])
    }

    pub fn rate_of(&self, name: &str) -> Option<Decimal> {
        self.covers.iter().find(|c| c.name == name).map(|c| c.rate)
    }

    pub fn random_one<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Cover> {
        self.covers.choose(rng)
    }
}
