//! Fault injection: periodic corrupted quotes and their settlement

use chrono::Days;
use rand::seq::IndexedRandom;
use rand::Rng;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::interpreter::{DispatchContext, LedgerOp};
use crate::common::types::{Quote, SellerResponse};
use crate::config::types::BadRequestConfig;

/// Attempts at drawing a value different from the original before giving up
const MAX_DRAWS: usize = 16;

/// Field mutation applied to a quote to make it invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionMode {
    /// Country code outside the catalog
    UnknownCountry,
    /// Return date set before the departure date
    ReturnBeforeDeparture,
    /// Zero travellers
    NoTravellers,
    /// More travellers than allowed
    TooManyTravellers,
    /// Cover name outside the catalog
    UnknownCover,
    /// Reduction strategy nobody knows
    UnknownReduction,
}

impl CorruptionMode {
    pub const ALL: [CorruptionMode; 6] = [
        CorruptionMode::UnknownCountry,
        CorruptionMode::ReturnBeforeDeparture,
        CorruptionMode::NoTravellers,
        CorruptionMode::TooManyTravellers,
        CorruptionMode::UnknownCover,
        CorruptionMode::UnknownReduction,
    ];

    /// Overwrite this mode's field in `target` with a fresh value that
    /// differs from the same field in `original` whenever possible
    fn apply<R: Rng + ?Sized>(self, target: &mut Quote, original: &Quote, rng: &mut R) {
        match self {
            CorruptionMode::UnknownCountry => {
                target.country = differing(&original.country, || {
                    (0..3).map(|_| char::from(rng.random_range(b'A'..=b'Z'))).collect()
                });
            }
            CorruptionMode::ReturnBeforeDeparture => {
                let departure = original.departure_date;
                target.return_date = differing(&original.return_date, || {
                    departure
                        .checked_sub_days(Days::new(rng.random_range(1..=30)))
                        .unwrap_or(departure)
                });
            }
            CorruptionMode::NoTravellers => {
                target.travellers = 0;
            }
            CorruptionMode::TooManyTravellers => {
                target.travellers = differing(&original.travellers, || rng.random_range(7..=20));
            }
            CorruptionMode::UnknownCover => {
                target.cover = differing(&original.cover, || garbage(rng, &["Titanium", "Void", "Lunar"]));
            }
            CorruptionMode::UnknownReduction => {
                target.reduction =
                    differing(&original.reduction, || garbage(rng, &["BLACK FRIDAY", "FREE", "ALL IN"]));
            }
        }
    }
}

fn differing<T: PartialEq>(original: &T, mut draw: impl FnMut() -> T) -> T {
    let mut candidate = draw();
    for _ in 1..MAX_DRAWS {
        if candidate != *original {
            break;
        }
        candidate = draw();
    }
    candidate
}

fn garbage<R: Rng + ?Sized>(rng: &mut R, words: &[&str]) -> String {
    let word = words.choose(rng).copied().unwrap_or("X");
    format!("{} {}", word, rng.random_range(0..1000))
}

/// Whether iteration `iteration` must carry a corrupted quote
///
/// A period of 0 never triggers.
pub fn should_trigger(iteration: u64, config: &BadRequestConfig) -> bool {
    config.active && config.period != 0 && iteration % config.period == 0
}

/// Copy of `quote` with one or more fields drawn from `modes` corrupted
///
/// An empty `modes` set allows every mode. The result never equals `quote`.
pub fn corrupt(quote: &Quote, modes: &[CorruptionMode]) -> Quote {
    let mut rng = rand::rng();

    let mut pool: Vec<CorruptionMode> = Vec::with_capacity(CorruptionMode::ALL.len());
    for mode in modes {
        if !pool.contains(mode) {
            pool.push(*mode);
        }
    }
    if pool.is_empty() {
        pool.extend_from_slice(&CorruptionMode::ALL);
    }

    let count = rng.random_range(1..=pool.len());
    let mut corrupted = quote.clone();
    for mode in pool.choose_multiple(&mut rng, count) {
        mode.apply(&mut corrupted, quote, &mut rng);
    }

    // The input may already carry the chosen corruptions
    for mode in CorruptionMode::ALL {
        if corrupted != *quote {
            break;
        }
        mode.apply(&mut corrupted, quote, &mut rng);
    }
    if corrupted == *quote {
        corrupted.country.push('?');
    }

    corrupted
}

/// Ledger outcome of a seller's answer to a corrupted quote
///
/// Rejecting with 400 earns the full expected total; anything else costs half.
pub fn settle(context: &DispatchContext, response: &SellerResponse) -> LedgerOp {
    let total = context.expected_bill.total;
    if response.status == StatusCode::BAD_REQUEST {
        LedgerOp::Add(total)
    } else {
        LedgerOp::Deduct(total / Decimal::TWO)
    }
}
