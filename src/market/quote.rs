//! Quote generation, billing and bill validation

use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use super::catalog::{Countries, Covers};
use super::reduction::ReductionCatalog;
use crate::common::errors::{BillError, MarketError, Result};
use crate::common::types::{round_cash, Bill, Quote};

/// Price per traveller per day before cover, tax and reduction
pub const DAILY_RATE: Decimal = dec!(1.8);
/// Allowed traveller counts for a valid quote
pub const MIN_TRAVELLERS: u32 = 1;
pub const MAX_TRAVELLERS: u32 = 6;

/// Source of "today" for departure dates
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock frozen on a given day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Builds random quotes and computes the bill a seller should answer with
#[derive(Clone)]
pub struct QuoteService {
    countries: Countries,
    covers: Covers,
    /// Swapped when the configuration brings new reduction tables
    reductions: Arc<RwLock<ReductionCatalog>>,
    clock: Arc<dyn Clock>,
}

impl QuoteService {
    pub fn new(
        countries: Countries,
        covers: Covers,
        reductions: ReductionCatalog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            countries,
            covers,
            reductions: Arc::new(RwLock::new(reductions)),
            clock,
        }
    }

    /// European countries, standard covers and the system clock
    pub fn with_defaults(reductions: ReductionCatalog) -> Self {
        Self::new(
            Countries::europe(),
            Covers::standard(),
            reductions,
            Arc::new(SystemClock),
        )
    }

    pub fn countries(&self) -> &Countries {
        &self.countries
    }

    pub fn covers(&self) -> &Covers {
        &self.covers
    }

    /// Snapshot of the current reduction catalog
    pub fn reductions(&self) -> ReductionCatalog {
        self.reductions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the reduction catalog for quotes billed from now on
    pub fn set_reductions(&self, catalog: ReductionCatalog) {
        let mut reductions = self.reductions.write().unwrap_or_else(|e| e.into_inner());
        *reductions = catalog;
    }

    /// Generate a random quote recording `reduction` as its strategy
    ///
    /// Departure is 10 to 100 days from today, the trip lasts 7 to 30 days
    /// and carries 1 to 6 travellers.
    pub fn create(&self, reduction: &str) -> Result<Quote> {
        let mut rng = rand::rng();

        let country = self
            .countries
            .random_one(&mut rng)
            .ok_or_else(|| MarketError::Quote("no country available".to_string()))?;
        let cover = self
            .covers
            .random_one(&mut rng)
            .ok_or_else(|| MarketError::Quote("no cover available".to_string()))?;

        let today = self.clock.today();
        let departure_date = add_days(today, rng.random_range(10..=100))?;
        let return_date = add_days(departure_date, rng.random_range(7..=30))?;

        Ok(Quote {
            country: country.code.clone(),
            departure_date,
            return_date,
            travellers: rng.random_range(MIN_TRAVELLERS..=MAX_TRAVELLERS),
            cover: cover.name.clone(),
            reduction: reduction.to_string(),
        })
    }

    /// Expected bill for a valid quote
    ///
    /// `1.8 * days * travellers * cover rate`, taxed for the country, then
    /// discounted by the quote's reduction and rounded to cents.
    pub fn bill(&self, quote: &Quote) -> Result<Bill> {
        let country = self
            .countries
            .get(&quote.country)
            .ok_or_else(|| MarketError::Quote(format!("unknown country {}", quote.country)))?;
        let cover_rate = self
            .covers
            .rate_of(&quote.cover)
            .ok_or_else(|| MarketError::Quote(format!("unknown cover {}", quote.cover)))?;
        let catalog = self.reductions.read().unwrap_or_else(|e| e.into_inner());
        let reduction = catalog.resolve(&quote.reduction)?;

        let days = (quote.return_date - quote.departure_date).num_days();
        if days < 0 {
            return Err(MarketError::Quote(
                "return date is before departure date".to_string(),
            ));
        }
        if !(MIN_TRAVELLERS..=MAX_TRAVELLERS).contains(&quote.travellers) {
            return Err(MarketError::Quote(format!(
                "{} travellers out of range",
                quote.travellers
            )));
        }

        let sum = DAILY_RATE * Decimal::from(days) * Decimal::from(quote.travellers) * cover_rate;
        let taxed = country.apply_tax(sum);
        Ok(Bill::new(round_cash(reduction.apply(taxed))))
    }
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| MarketError::Internal(format!("date overflow adding {} days", days)))
}

/// Check a seller's raw JSON answer and extract its bill
pub fn validate_bill(raw: &Value) -> std::result::Result<Bill, BillError> {
    let total = raw.get("total").ok_or(BillError::MissingField)?;

    match total {
        Value::Number(number) => {
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map(Bill::new)
                .map_err(|_| BillError::NotANumber)
        }
        _ => Err(BillError::NotANumber),
    }
}
