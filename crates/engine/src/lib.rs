//! Transactional transfer engine.
//!
//! Moves counted stacks in and out of any [`itemxfer_storage::Storage`] with
//! all-or-nothing semantics:
//!
//! - **Exact extraction** locks onto the first matching identity and only ever
//!   returns a single-identity stack.
//! - **Fuzzy extraction** compares depletable items by wear bucket and draws from at
//!   most one slot.
//! - **Insertion** returns whatever the storage did not accept.
//!
//! Every operation has a simulate twin that runs the same logic in a scope that is
//! never committed.

pub mod adaptor;
pub mod config;
pub mod diagnostics;
pub mod extract;
pub mod fuzzy;
pub mod insert;
pub mod request;

pub use adaptor::{InventoryAdaptor, StorageAdaptor};
pub use config::{ConfigError, DiagnosticsPolicy, EngineConfig};
#[cfg(any(test, feature = "test-util"))]
pub use diagnostics::CountingDiagnostics;
pub use diagnostics::{SilentDiagnostics, TracingDiagnostics, TransferDiagnostics};
pub use extract::{extract_exact, extract_similar};
pub use fuzzy::{BreakPoint, FuzzyMode, is_fuzzy_equal, is_fuzzy_equal_key};
pub use insert::insert_stack;
pub use request::{Destination, ExtractRequest};
