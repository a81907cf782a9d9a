//! HTTP surface: seller registration and ledger reporting

pub mod app;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use error::{AppError, AppResult};
pub use state::ServerState;
