//! Farmstead: state, persistence and analytics for a livestock farm dashboard.
//!
//! The UI layer sits elsewhere; this crate owns the records, the role gate,
//! the derived views (calendar, cash-flow forecast, sale-weight optimizer,
//! batch profitability, dashboard metrics) and the async boundaries to the
//! text service and email sink.

// Seed fixtures use wide tuple rows.
#![allow(clippy::type_complexity)]

pub mod access;
pub mod batches;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod email;
pub mod error;
pub mod forecast;
pub mod index;
pub mod intelligence;
pub mod optimizer;
pub mod pending;
pub mod seed;
pub mod state;
pub mod store;
pub mod types;

pub use config::FarmConfig;
pub use error::{FarmError, ServiceError, StoreError};
pub use state::{FarmState, SharedState};

/// Initialise `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}
