//! Configuration loading and live configuration sources

pub mod loader;
pub mod source;
pub mod types;

pub use loader::load_config;
pub use source::{FileConfiguration, StaticConfiguration};
