//! Expense and income operations.
//!
//! Reads go through the unified query engine (`list`); writes target one
//! partition at a time (`write`).

mod list;
mod write;
