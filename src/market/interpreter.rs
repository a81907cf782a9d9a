//! Turns a seller's raw response into a ledger operation

use reqwest::StatusCode;
use rust_decimal::Decimal;
use tracing::debug;

use super::quote::validate_bill;
use crate::common::types::{Bill, Feedback, SellerResponse};

/// Immutable facts captured when a quote is dispatched to one seller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchContext {
    /// Seller the quote was sent to
    pub seller: String,
    /// Bill computed from the valid quote
    pub expected_bill: Bill,
    /// Iteration the quote belongs to
    pub iteration: u64,
    /// Whether the quote sent was corrupted
    pub bad_request: bool,
}

/// Ledger mutation requested by a response handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOp {
    /// Leave the ledger untouched
    Skip,
    /// Compare the seller's bill (if any) to the expected one
    UpdateCash {
        expected: Bill,
        actual: Option<Bill>,
    },
    /// Unconditional credit
    Add(Decimal),
    /// Unconditional debit
    Deduct(Decimal),
}

impl LedgerOp {
    /// Message telling the seller how the answer was settled
    ///
    /// `delta` is the amount the ledger actually applied; `None` means the
    /// ledger did not move (skipped or frozen) and nothing is reported.
    pub fn feedback(&self, context: &DispatchContext, delta: Option<Decimal>) -> Option<Feedback> {
        let delta = delta?;
        let feedback = match self {
            LedgerOp::Skip => return None,
            LedgerOp::Add(_) if context.bad_request => Feedback::info(format!(
                "Bad request correctly rejected at iteration {}, earned {}",
                context.iteration, delta
            )),
            LedgerOp::Deduct(_) if context.bad_request => Feedback::error(format!(
                "Bad request accepted at iteration {}, penalty {}",
                context.iteration,
                -delta
            )),
            LedgerOp::Add(_) => Feedback::info(format!("Credited {}", delta)),
            LedgerOp::Deduct(_) => Feedback::error(format!("Debited {}", -delta)),
            LedgerOp::UpdateCash { actual: Some(_), .. } if delta > Decimal::ZERO => {
                Feedback::info(format!(
                    "Hey {}, your bill is correct, you earned {}",
                    context.seller, delta
                ))
            }
            LedgerOp::UpdateCash { expected, actual } => Feedback::error(format!(
                "Expected bill {}, got {}, penalty {}",
                expected.total,
                actual
                    .map(|bill| bill.total.to_string())
                    .unwrap_or_else(|| "no valid bill".to_string()),
                -delta
            )),
        };
        Some(feedback)
    }
}

/// Ledger operation for a seller's answer to a valid quote
///
/// - 404: skipped, the seller is left out of this iteration
/// - 200: the body is validated as a bill and compared to the expected one
/// - anything else: treated as no answer, always penalized
pub fn interpret(context: &DispatchContext, response: &SellerResponse) -> LedgerOp {
    let expected = context.expected_bill;

    if response.status == StatusCode::NOT_FOUND {
        return LedgerOp::Skip;
    }
    if response.status != StatusCode::OK {
        return LedgerOp::UpdateCash {
            expected,
            actual: None,
        };
    }

    let actual = response
        .body
        .as_deref()
        .ok_or_else(|| "empty body".to_string())
        .and_then(|body| serde_json::from_str::<serde_json::Value>(body).map_err(|e| e.to_string()))
        .and_then(|raw| validate_bill(&raw).map_err(|e| e.to_string()));

    match actual {
        Ok(bill) => LedgerOp::UpdateCash {
            expected,
            actual: Some(bill),
        },
        Err(reason) => {
            debug!(
                seller = %context.seller,
                iteration = context.iteration,
                "Rejected bill: {}",
                reason
            );
            LedgerOp::UpdateCash {
                expected,
                actual: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn context() -> DispatchContext {
        DispatchContext {
            seller: "bob".to_string(),
            expected_bill: Bill::new(dec!(100)),
            iteration: 7,
            bad_request: false,
        }
    }

    #[test]
    fn test_not_found_is_skipped() {
        let op = interpret(&context(), &SellerResponse::status_only(StatusCode::NOT_FOUND));
        assert_eq!(op, LedgerOp::Skip);
    }

    #[test]
    fn test_other_status_counts_as_missing_bill() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::NO_CONTENT,
        ] {
            let op = interpret(&context(), &SellerResponse::new(status, r#"{"total": 100}"#));
            assert_eq!(
                op,
                LedgerOp::UpdateCash {
                    expected: Bill::new(dec!(100)),
                    actual: None
                }
            );
        }
    }

    #[test]
    fn test_success_with_valid_bill() {
        let op = interpret(
            &context(),
            &SellerResponse::new(StatusCode::OK, r#"{"total": 99.5}"#),
        );
        assert_eq!(
            op,
            LedgerOp::UpdateCash {
                expected: Bill::new(dec!(100)),
                actual: Some(Bill::new(dec!(99.5)))
            }
        );
    }

    #[test]
    fn test_success_with_malformed_bill() {
        for body in [r#"{"price": 100}"#, r#"{"total": "100"}"#, "not json", ""] {
            let op = interpret(&context(), &SellerResponse::new(StatusCode::OK, body));
            assert_eq!(
                op,
                LedgerOp::UpdateCash {
                    expected: Bill::new(dec!(100)),
                    actual: None
                },
                "body {:?}",
                body
            );
        }

        let op = interpret(&context(), &SellerResponse::status_only(StatusCode::OK));
        assert!(matches!(op, LedgerOp::UpdateCash { actual: None, .. }));
    }

    #[test]
    fn test_feedback_messages() {
        let ctx = context();
        let correct = LedgerOp::UpdateCash {
            expected: Bill::new(dec!(100)),
            actual: Some(Bill::new(dec!(100))),
        };
        let feedback = correct.feedback(&ctx, Some(dec!(100))).unwrap();
        assert_eq!(feedback.kind, crate::common::types::FeedbackKind::Info);

        let wrong = LedgerOp::UpdateCash {
            expected: Bill::new(dec!(100)),
            actual: Some(Bill::new(dec!(50))),
        };
        let feedback = wrong.feedback(&ctx, Some(dec!(-50))).unwrap();
        assert_eq!(feedback.kind, crate::common::types::FeedbackKind::Error);
        assert!(feedback.content.contains("penalty 50"));

        assert_eq!(correct.feedback(&ctx, None), None);
        assert_eq!(LedgerOp::Skip.feedback(&ctx, Some(Decimal::ZERO)), None);
    }
}
