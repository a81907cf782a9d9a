//! Quote market engine: quotes, reductions, fault injection, ledger and dispatch

pub mod bad_request;
pub mod catalog;
pub mod dispatcher;
pub mod interpreter;
pub mod ledger;
pub mod offline;
pub mod quote;
pub mod reduction;
pub mod transport;

pub use dispatcher::{Dispatcher, DispatcherState, InFlight};
pub use ledger::{CashHistory, SellerRegistry};
pub use quote::QuoteService;
pub use transport::HttpTransport;
