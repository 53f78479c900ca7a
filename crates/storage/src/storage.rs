//! Storage and view traits.
//!
//! ## Contract
//!
//! - `views(tx)` enumerates one view per slot/channel, in a fixed order, lazily. Each
//!   call starts a fresh enumeration. Views read the state *as seen by `tx`*, so an
//!   enumeration started after earlier extractions in the same lineage observes them.
//! - `extract`/`insert` report how much actually moved. Callers must tolerate a
//!   non-conformant implementation reporting more than it was asked for.
//! - Every mutation is recorded in the transaction passed in, so that dropping the
//!   outermost scope without commit restores the previous state.
//!
//! Errors are the implementation's own (`Self::Error`); the engine propagates them
//! unmodified.

use std::sync::Arc;

use itemxfer_core::{ResourceKey, ResourceStack};
use itemxfer_transaction::Transaction;

/// One slot of a container, read within a transaction.
pub trait StorageView {
    type Error;

    /// Resource currently held (blank if none).
    fn resource(&self) -> ResourceKey;

    /// Amount currently held.
    fn amount(&self) -> u64;

    /// Maximum amount this slot can hold.
    fn capacity(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.resource().is_blank() || self.amount() == 0
    }

    fn stack(&self) -> ResourceStack {
        self.resource().to_stack(self.amount())
    }

    /// Remove up to `max_amount` of `resource` from this slot.
    fn extract(
        &self,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, Self::Error>;
}

/// A container of resources.
pub trait Storage {
    type Error;

    type View<'s>: StorageView<Error = Self::Error>
    where
        Self: 's;

    type Views<'s>: Iterator<Item = Result<Self::View<'s>, Self::Error>>
    where
        Self: 's;

    /// Enumerate slots in container order.
    fn views<'s>(&'s self, tx: &Transaction<'_>) -> Self::Views<'s>;

    fn supports_insertion(&self) -> bool {
        true
    }

    fn supports_extraction(&self) -> bool {
        true
    }

    /// Insert up to `max_amount` of `resource`; returns the accepted amount.
    fn insert(
        &self,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, Self::Error>;

    /// Extract up to `max_amount` of `resource` across all slots, in order.
    fn extract(
        &self,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, Self::Error> {
        let mut extracted = 0u64;
        for view in self.views(tx) {
            if extracted >= max_amount {
                break;
            }
            let view = view?;
            if view.resource() != *resource {
                continue;
            }
            extracted = extracted.saturating_add(view.extract(resource, max_amount - extracted, tx)?);
        }
        Ok(extracted)
    }
}

impl<S> Storage for &S
where
    S: Storage + ?Sized,
{
    type Error = S::Error;

    type View<'s>
        = S::View<'s>
    where
        Self: 's;

    type Views<'s>
        = S::Views<'s>
    where
        Self: 's;

    fn views<'s>(&'s self, tx: &Transaction<'_>) -> Self::Views<'s> {
        (**self).views(tx)
    }

    fn supports_insertion(&self) -> bool {
        (**self).supports_insertion()
    }

    fn supports_extraction(&self) -> bool {
        (**self).supports_extraction()
    }

    fn insert(
        &self,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, Self::Error> {
        (**self).insert(resource, max_amount, tx)
    }

    fn extract(
        &self,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, Self::Error> {
        (**self).extract(resource, max_amount, tx)
    }
}

impl<S> Storage for Arc<S>
where
    S: Storage + ?Sized,
{
    type Error = S::Error;

    type View<'s>
        = S::View<'s>
    where
        Self: 's;

    type Views<'s>
        = S::Views<'s>
    where
        Self: 's;

    fn views<'s>(&'s self, tx: &Transaction<'_>) -> Self::Views<'s> {
        (**self).views(tx)
    }

    fn supports_insertion(&self) -> bool {
        (**self).supports_insertion()
    }

    fn supports_extraction(&self) -> bool {
        (**self).supports_extraction()
    }

    fn insert(
        &self,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, Self::Error> {
        (**self).insert(resource, max_amount, tx)
    }

    fn extract(
        &self,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, Self::Error> {
        (**self).extract(resource, max_amount, tx)
    }
}
