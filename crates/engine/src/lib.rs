//! Bookkeeping engine.
//!
//! Expenses and incomes are recorded in two independent partitions and read
//! back as a single, ordered, paginated stream of [`TransactionRecord`]s.

pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use query::{
    DEFAULT_LIMIT, MAX_LIMIT, PageWindow, PartitionRows, RawTransactionFilter, TransactionFilter,
    TransactionPage,
};
pub use transactions::{NewRecordCmd, TransactionKind, TransactionRecord};

pub mod expenses;
pub mod incomes;
pub mod query;

mod error;
mod money;
mod ops;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
