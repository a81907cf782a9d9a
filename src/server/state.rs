//! Shared state handed to every handler

use crate::market::ledger::SellerRegistry;

#[derive(Debug, Clone)]
pub struct ServerState {
    /// Same registry the dispatcher writes to
    pub registry: SellerRegistry,
    /// Chunk size used by `/history` when the query does not set one
    pub history_chunk_size: usize,
}

impl ServerState {
    pub fn new(registry: SellerRegistry, history_chunk_size: usize) -> Self {
        Self {
            registry,
            history_chunk_size,
        }
    }
}
