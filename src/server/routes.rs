//! Registration and reporting handlers

use axum::extract::{Query, State};
use axum::Json;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::error::{AppError, AppResult};
use super::extract::JsonOrForm;
use super::state::ServerState;
use crate::common::types::Seller;
use crate::market::ledger::CashHistory;

/// Registration form: `name`, `password` and the seller's base `url`
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub password: String,
    pub url: String,
}

/// Public view of a seller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerView {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub path: String,
    pub cash: f64,
    pub online: bool,
}

impl From<Seller> for SellerView {
    fn from(seller: Seller) -> Self {
        Self {
            name: seller.name,
            hostname: seller.address.hostname,
            port: seller.address.port,
            path: seller.address.path,
            cash: as_f64(seller.cash),
            online: seller.online,
        }
    }
}

/// Sampled balances keyed by seller name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub history: BTreeMap<String, Vec<f64>>,
    pub last_iteration: usize,
}

impl From<CashHistory> for HistoryView {
    fn from(report: CashHistory) -> Self {
        Self {
            history: report
                .history
                .into_iter()
                .map(|(name, values)| (name, values.into_iter().map(as_f64).collect()))
                .collect(),
            last_iteration: report.last_iteration,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub chunk: Option<usize>,
}

fn as_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

/// Register a seller: `POST /seller`
pub async fn register_seller(
    State(state): State<ServerState>,
    JsonOrForm(request): JsonOrForm<RegistrationRequest>,
) -> AppResult<Json<SellerView>> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let seller = state
        .registry
        .register(&request.url, &request.name, &request.password)
        .await?;
    info!(name = %seller.name, address = %seller.address, "Registration accepted");

    Ok(Json(seller.into()))
}

/// List sellers by descending cash: `GET /sellers`
pub async fn list_sellers(State(state): State<ServerState>) -> Json<Vec<SellerView>> {
    let sellers = state.registry.all_sellers().await;
    Json(sellers.into_iter().map(SellerView::from).collect())
}

/// Sampled balance history: `GET /history?chunk=N`
pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryView> {
    let chunk = query.chunk.unwrap_or(state.history_chunk_size);
    Json(state.registry.balance_history(chunk).await.into())
}
