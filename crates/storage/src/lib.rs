//! Storage collaborator contract (mechanics only) and an in-memory slotted container.
//!
//! The engine never looks inside a container: it walks the container's
//! [`StorageView`]s inside a transaction and asks them to extract, or asks the
//! [`Storage`] as a whole to insert. [`SlottedStorage`] is the reference
//! implementation used by tests, benchmarks and embedders without their own storage.

pub mod slotted;
pub mod storage;

pub use slotted::{SlotView, SlotViews, SlottedStorage, StorageError};
pub use storage::{Storage, StorageView};
