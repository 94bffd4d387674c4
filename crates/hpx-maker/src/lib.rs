//! Single-pass market maker job for hashpower term futures.
//!
//! One invocation = one complete iteration: funding check, volatility
//! estimate, reservation price, budget allocation, ladder generation,
//! reconciliation against resting orders, and (outside dry-run) one batch
//! submission. All persistent state lives on the ledger/indexer and is
//! re-read every run; the host scheduler owns retries and overlap
//! exclusion.

pub mod config;
pub mod error;
pub mod funding;
pub mod job;
pub mod logging;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use funding::{check_and_fund, FundingCheck, FundingOutcome};
pub use job::{run_iteration, IterationResult};
pub use logging::init_logging;
