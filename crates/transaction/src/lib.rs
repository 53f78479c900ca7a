//! Nestable, journal-based transactions.
//!
//! A [`Transaction`] is an undo/commit bookkeeping scope, not a concurrency
//! primitive. Storage participants apply their mutations in place and record how to
//! undo them; the scope decides at release time whether those undo actions run.

pub mod journal;
pub mod transaction;

pub use journal::Journal;
pub use transaction::{Transaction, TransactionOutcome};
