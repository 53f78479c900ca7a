//! Transfer surface over a storage.
//!
//! [`InventoryAdaptor`] is what callers use: remove (exact or fuzzy), add, and a
//! handful of capability probes, each with a simulate twin. [`StorageAdaptor`]
//! implements it for any [`Storage`], opening its own outer scope per call. The
//! `*_within` methods join a scope the caller already holds instead.

use std::sync::Arc;

use itemxfer_core::ResourceStack;
use itemxfer_storage::{Storage, StorageView};
use itemxfer_transaction::Transaction;

use crate::config::EngineConfig;
use crate::diagnostics::{TransferDiagnostics, TracingDiagnostics};
use crate::extract::{extract_exact, extract_similar};
use crate::fuzzy::FuzzyMode;
use crate::insert::insert_stack;
use crate::request::ExtractRequest;

/// Moves stacks in and out of one inventory.
pub trait InventoryAdaptor {
    type Error;

    /// Extract up to `request.amount()` of a single identity and commit.
    fn remove_items(&self, request: &ExtractRequest<'_>) -> Result<ResourceStack, Self::Error>;

    /// What `remove_items` would return, without changing anything.
    fn simulate_remove(&self, request: &ExtractRequest<'_>) -> Result<ResourceStack, Self::Error>;

    /// Extract from at most one slot, matching the filter fuzzily, and commit.
    fn remove_similar_items(
        &self,
        request: &ExtractRequest<'_>,
        mode: FuzzyMode,
    ) -> Result<ResourceStack, Self::Error>;

    fn simulate_similar_remove(
        &self,
        request: &ExtractRequest<'_>,
        mode: FuzzyMode,
    ) -> Result<ResourceStack, Self::Error>;

    /// Insert `stack`; returns the remainder. Commits unless `simulate`.
    fn add_items(&self, stack: &ResourceStack, simulate: bool) -> Result<ResourceStack, Self::Error>;

    fn insert_items(&self, stack: &ResourceStack) -> Result<ResourceStack, Self::Error> {
        self.add_items(stack, false)
    }

    fn simulate_add(&self, stack: &ResourceStack) -> Result<ResourceStack, Self::Error> {
        self.add_items(stack, true)
    }

    /// True if the inventory exposes at least one slot.
    fn has_slots(&self) -> Result<bool, Self::Error>;

    /// True if any slot holds something.
    fn contains_items(&self) -> Result<bool, Self::Error>;

    /// True if the inventory supports insertion or extraction at all.
    fn may_allow_transfer(&self) -> bool;
}

/// [`InventoryAdaptor`] over a [`Storage`].
#[derive(Debug, Clone)]
pub struct StorageAdaptor<S> {
    storage: S,
    diagnostics: Arc<dyn TransferDiagnostics>,
}

impl<S> StorageAdaptor<S>
where
    S: Storage,
{
    /// Adaptor that logs storage contract violations.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_config(storage: S, config: &EngineConfig) -> Self {
        Self {
            storage,
            diagnostics: config.diagnostics.build(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn TransferDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// `remove_items` inside the caller's scope; the result is committed into it.
    pub fn remove_items_within(
        &self,
        parent: &mut Transaction<'_>,
        request: &ExtractRequest<'_>,
    ) -> Result<ResourceStack, S::Error> {
        self.exact(Some(parent), request, true)
    }

    /// `simulate_remove` inside the caller's scope; the scope sees no change afterwards.
    pub fn simulate_remove_within(
        &self,
        parent: &mut Transaction<'_>,
        request: &ExtractRequest<'_>,
    ) -> Result<ResourceStack, S::Error> {
        self.exact(Some(parent), request, false)
    }

    pub fn remove_similar_items_within(
        &self,
        parent: &mut Transaction<'_>,
        request: &ExtractRequest<'_>,
        mode: FuzzyMode,
    ) -> Result<ResourceStack, S::Error> {
        self.similar(Some(parent), request, mode, true)
    }

    pub fn simulate_similar_remove_within(
        &self,
        parent: &mut Transaction<'_>,
        request: &ExtractRequest<'_>,
        mode: FuzzyMode,
    ) -> Result<ResourceStack, S::Error> {
        self.similar(Some(parent), request, mode, false)
    }

    pub fn add_items_within(
        &self,
        parent: &mut Transaction<'_>,
        stack: &ResourceStack,
        simulate: bool,
    ) -> Result<ResourceStack, S::Error> {
        self.add(Some(parent), stack, simulate)
    }

    fn exact(
        &self,
        parent: Option<&mut Transaction<'_>>,
        request: &ExtractRequest<'_>,
        commit: bool,
    ) -> Result<ResourceStack, S::Error> {
        let tx = Transaction::open_or_join(parent);
        let extracted = extract_exact(&self.storage, request, &tx, self.diagnostics.as_ref())?;
        tracing::debug!(
            tx = %tx.id(),
            requested = request.amount(),
            extracted = extracted.count(),
            simulate = !commit,
            "exact extraction"
        );
        if commit {
            tx.commit();
        }
        Ok(extracted)
    }

    fn similar(
        &self,
        parent: Option<&mut Transaction<'_>>,
        request: &ExtractRequest<'_>,
        mode: FuzzyMode,
        commit: bool,
    ) -> Result<ResourceStack, S::Error> {
        let tx = Transaction::open_or_join(parent);
        let extracted = extract_similar(&self.storage, request, mode, &tx, self.diagnostics.as_ref())?;
        tracing::debug!(
            tx = %tx.id(),
            requested = request.amount(),
            extracted = extracted.count(),
            ?mode,
            simulate = !commit,
            "fuzzy extraction"
        );
        if commit {
            tx.commit();
        }
        Ok(extracted)
    }

    fn add(
        &self,
        parent: Option<&mut Transaction<'_>>,
        stack: &ResourceStack,
        simulate: bool,
    ) -> Result<ResourceStack, S::Error> {
        if stack.is_empty() {
            return Ok(ResourceStack::empty());
        }

        let tx = Transaction::open_or_join(parent);
        let remainder = insert_stack(&self.storage, stack, &tx, self.diagnostics.as_ref())?;
        tracing::debug!(
            tx = %tx.id(),
            offered = stack.count(),
            remainder = remainder.count(),
            simulate,
            "insertion"
        );
        if !simulate {
            tx.commit();
        }
        Ok(remainder)
    }
}

impl<S> InventoryAdaptor for StorageAdaptor<S>
where
    S: Storage,
{
    type Error = S::Error;

    fn remove_items(&self, request: &ExtractRequest<'_>) -> Result<ResourceStack, Self::Error> {
        self.exact(None, request, true)
    }

    fn simulate_remove(&self, request: &ExtractRequest<'_>) -> Result<ResourceStack, Self::Error> {
        self.exact(None, request, false)
    }

    fn remove_similar_items(
        &self,
        request: &ExtractRequest<'_>,
        mode: FuzzyMode,
    ) -> Result<ResourceStack, Self::Error> {
        self.similar(None, request, mode, true)
    }

    fn simulate_similar_remove(
        &self,
        request: &ExtractRequest<'_>,
        mode: FuzzyMode,
    ) -> Result<ResourceStack, Self::Error> {
        self.similar(None, request, mode, false)
    }

    fn add_items(&self, stack: &ResourceStack, simulate: bool) -> Result<ResourceStack, Self::Error> {
        self.add(None, stack, simulate)
    }

    fn has_slots(&self) -> Result<bool, Self::Error> {
        let tx = Transaction::open_outer();
        match self.storage.views(&tx).next() {
            Some(view) => view.map(|_| true),
            None => Ok(false),
        }
    }

    fn contains_items(&self) -> Result<bool, Self::Error> {
        let tx = Transaction::open_outer();
        for view in self.storage.views(&tx) {
            if !view?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn may_allow_transfer(&self) -> bool {
        self.storage.supports_insertion() || self.storage.supports_extraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemxfer_core::ResourceKey;
    use itemxfer_storage::SlottedStorage;

    use crate::config::DiagnosticsPolicy;
    use crate::diagnostics::CountingDiagnostics;

    fn stone() -> ResourceKey {
        ResourceKey::of("minecraft:stone")
    }

    fn adaptor(stacks: Vec<ResourceStack>) -> StorageAdaptor<SlottedStorage> {
        StorageAdaptor::new(SlottedStorage::from_stacks(64, stacks).unwrap())
    }

    #[test]
    fn simulate_remove_leaves_storage_untouched() {
        let adaptor = adaptor(vec![stone().to_stack(10)]);
        let preview = adaptor.simulate_remove(&ExtractRequest::new(4)).unwrap();
        assert_eq!(preview, stone().to_stack(4));
        assert_eq!(adaptor.storage().stacks(), vec![stone().to_stack(10)]);
        assert_eq!(adaptor.storage().revision(), 0);

        let taken = adaptor.remove_items(&ExtractRequest::new(4)).unwrap();
        assert_eq!(taken, preview);
        assert_eq!(adaptor.storage().stacks(), vec![stone().to_stack(6)]);
        assert_eq!(adaptor.storage().revision(), 1);
    }

    #[test]
    fn add_items_simulate_flag_controls_commit() {
        let adaptor = StorageAdaptor::new(SlottedStorage::new(1, 15));
        assert_eq!(adaptor.simulate_add(&stone().to_stack(20)).unwrap(), stone().to_stack(5));
        assert_eq!(adaptor.storage().amount_of(&stone()), 0);

        assert_eq!(adaptor.insert_items(&stone().to_stack(20)).unwrap(), stone().to_stack(5));
        assert_eq!(adaptor.storage().amount_of(&stone()), 15);
    }

    #[test]
    fn add_empty_is_a_no_op() {
        let adaptor = StorageAdaptor::new(SlottedStorage::new(1, 15));
        assert!(adaptor.insert_items(&ResourceStack::empty()).unwrap().is_empty());
        assert_eq!(adaptor.storage().revision(), 0);
    }

    #[test]
    fn capability_probes() {
        let adaptor = adaptor(vec![ResourceStack::empty(), stone().to_stack(1)]);
        assert!(adaptor.has_slots().unwrap());
        assert!(adaptor.contains_items().unwrap());
        assert!(adaptor.may_allow_transfer());

        let empty = StorageAdaptor::new(SlottedStorage::new(0, 64));
        assert!(!empty.has_slots().unwrap());
        assert!(!empty.contains_items().unwrap());

        let sealed = StorageAdaptor::new(
            SlottedStorage::new(1, 64)
                .with_insertion(false)
                .with_extraction(false),
        );
        assert!(!sealed.may_allow_transfer());
    }

    #[test]
    fn within_variants_join_the_callers_scope() {
        let adaptor = adaptor(vec![stone().to_stack(10)]);
        {
            let mut outer = Transaction::open_outer();
            let taken = adaptor.remove_items_within(&mut outer, &ExtractRequest::new(3)).unwrap();
            assert_eq!(taken, stone().to_stack(3));
            assert_eq!(adaptor.storage().amount_of(&stone()), 7);

            let preview = adaptor
                .simulate_remove_within(&mut outer, &ExtractRequest::new(10))
                .unwrap();
            assert_eq!(preview, stone().to_stack(7));
            assert_eq!(adaptor.storage().amount_of(&stone()), 7);
            // outer dropped without commit
        }
        assert_eq!(adaptor.storage().amount_of(&stone()), 10);

        let mut outer = Transaction::open_outer();
        let rest = adaptor
            .add_items_within(&mut outer, &stone().to_stack(5), false)
            .unwrap();
        assert!(rest.is_empty());
        outer.commit();
        assert_eq!(adaptor.storage().amount_of(&stone()), 15);
    }

    #[test]
    fn config_selects_diagnostics() {
        let config = EngineConfig {
            diagnostics: DiagnosticsPolicy::Silent,
        };
        let adaptor = StorageAdaptor::with_config(SlottedStorage::new(1, 64), &config);
        assert!(adaptor.remove_items(&ExtractRequest::new(1)).unwrap().is_empty());

        let counting = Arc::new(CountingDiagnostics::new());
        let adaptor = adaptor.with_diagnostics(counting.clone());
        adaptor.remove_items(&ExtractRequest::new(1)).unwrap();
        assert_eq!(counting.over_extractions(), 0);
    }
}
