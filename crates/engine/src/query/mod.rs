//! Unified transaction query engine.
//!
//! Expenses and incomes are stored apart but read as one stream:
//! `filter` normalizes the caller's raw input, `partition` reads each
//! partition and `merge` orders and pages the result. The entry point is
//! [`Engine::query_transactions`](crate::Engine::query_transactions).

mod filter;
mod merge;
mod partition;

pub use filter::{
    DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, PageWindow, RawTransactionFilter, TransactionFilter,
};
pub use merge::{TransactionPage, canonical_order, merge, total_pages};
pub use partition::PartitionRows;
pub(crate) use partition::read_partition;
