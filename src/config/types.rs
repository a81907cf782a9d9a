//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::market::bad_request::CorruptionMode;
use crate::market::reduction::ReductionTier;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Live market switches, re-read on every iteration
    #[serde(default)]
    pub market: MarketConfig,
    /// Extra reduction strategies, keyed by the name used in `market.reduction`
    #[serde(default)]
    pub reductions: HashMap<String, Vec<ReductionTier>>,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
    /// HTTP surface settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Snapshot of the market switches read at every tick
///
/// camelCase aliases keep JSON-style keys (`badRequest`, `cashFreeze`) working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Master on/off switch for dispatching quotes
    #[serde(default = "default_active")]
    pub active: bool,
    /// Key of the reduction strategy applied to generated quotes
    #[serde(default = "default_reduction")]
    pub reduction: String,
    /// Fault-injection schedule
    #[serde(default, alias = "badRequest")]
    pub bad_request: BadRequestConfig,
    /// When set, bill comparisons no longer move cash
    #[serde(default, alias = "cashFreeze")]
    pub cash_freeze: bool,
    /// Penalty deducted when a seller is found unreachable (disabled when absent)
    #[serde(default, alias = "offlinePenalty")]
    pub offline_penalty: Option<Decimal>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            active: default_active(),
            reduction: default_reduction(),
            bad_request: BadRequestConfig::default(),
            cash_freeze: false,
            offline_penalty: None,
        }
    }
}

fn default_active() -> bool {
    true
}

fn default_reduction() -> String {
    "STANDARD".to_string()
}

/// Bad request injection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadRequestConfig {
    #[serde(default)]
    pub active: bool,
    /// A bad request is sent every `period` iterations (0 disables)
    #[serde(default = "default_bad_request_period")]
    pub period: u64,
    /// Fields that may be corrupted (all of them when empty)
    #[serde(default)]
    pub modes: Vec<CorruptionMode>,
}

impl Default for BadRequestConfig {
    fn default() -> Self {
        Self {
            active: false,
            period: default_bad_request_period(),
            modes: Vec::new(),
        }
    }
}

fn default_bad_request_period() -> u64 {
    10
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Delay between two iterations in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Timeout for a single seller request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Iteration number the dispatcher starts from
    #[serde(default = "default_start_iteration")]
    pub start_iteration: u64,
    /// Default chunk size for the cash history report
    #[serde(default = "default_history_chunk_size")]
    pub history_chunk_size: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tick_interval_ms: default_tick_interval(),
            request_timeout_seconds: default_request_timeout(),
            start_iteration: default_start_iteration(),
            history_chunk_size: default_history_chunk_size(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_interval() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    5
}

fn default_start_iteration() -> u64 {
    1
}

fn default_history_chunk_size() -> usize {
    10
}

/// HTTP surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the registration server listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}
