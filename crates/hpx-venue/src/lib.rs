//! External service clients for the market maker.
//!
//! Two I/O boundaries, both consumed over HTTP:
//! - The **ledger** (execution venue): balances, index price, market
//!   parameters, and the write surface (batch order submission, margin
//!   top-up).
//! - The **indexer**: the caller's resting orders and net position for a
//!   delivery window, plus the historical price series. Eventually
//!   consistent with the ledger; `await_indexed` bounds the wait for a
//!   write to become visible.
//!
//! Both surfaces are traits so the job can run against in-memory fakes in
//! tests.

pub mod error;
pub mod index;
pub mod ledger;

pub use error::{VenueError, VenueResult};
pub use index::{await_indexed, IndexApi, IndexClient};
pub use ledger::{LedgerApi, LedgerClient, SubmitReceipt};
