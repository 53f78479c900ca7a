//! In-memory slotted container.
//!
//! Mutations are applied in place and journaled in the transaction: views read the
//! live slots, which already reflect the current lineage's writes, and rollback
//! restores the previous stacks. The container assumes a single writer per call;
//! the `RwLock` only keeps it shareable.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use itemxfer_core::{ResourceKey, ResourceStack};
use itemxfer_transaction::Transaction;

use crate::storage::{Storage, StorageView};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A previous panic left the slot lock poisoned.
    #[error("storage lock poisoned")]
    Poisoned,

    #[error("slot {index} out of range (slots: {slots})")]
    SlotOutOfRange { index: usize, slots: usize },

    #[error("slot {index} overfilled ({count} > capacity {capacity})")]
    Overfilled {
        index: usize,
        count: u64,
        capacity: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    stack: ResourceStack,
    capacity: u64,
}

/// Fixed number of slots, each with its own capacity.
#[derive(Debug, Clone)]
pub struct SlottedStorage {
    slots: Arc<RwLock<Vec<Slot>>>,
    revision: Arc<AtomicU64>,
    dirty: Arc<AtomicBool>,
    insertion: bool,
    extraction: bool,
}

impl SlottedStorage {
    /// `slot_count` empty slots of `capacity` each.
    pub fn new(slot_count: usize, capacity: u64) -> Self {
        Self::with_capacities(std::iter::repeat_n(capacity, slot_count))
    }

    pub fn with_capacities(capacities: impl IntoIterator<Item = u64>) -> Self {
        let slots = capacities
            .into_iter()
            .map(|capacity| Slot {
                stack: ResourceStack::empty(),
                capacity,
            })
            .collect();
        Self {
            slots: Arc::new(RwLock::new(slots)),
            revision: Arc::new(AtomicU64::new(0)),
            dirty: Arc::new(AtomicBool::new(false)),
            insertion: true,
            extraction: true,
        }
    }

    /// One slot per stack, each sized `capacity`.
    pub fn from_stacks(
        capacity: u64,
        stacks: impl IntoIterator<Item = ResourceStack>,
    ) -> Result<Self, StorageError> {
        let stacks: Vec<ResourceStack> = stacks.into_iter().collect();
        let storage = Self::new(stacks.len(), capacity);
        for (index, stack) in stacks.into_iter().enumerate() {
            storage.seed(index, stack)?;
        }
        Ok(storage)
    }

    /// Put `stack` into slot `index` directly, outside any transaction.
    ///
    /// Meant for building fixtures; does not bump the revision.
    pub fn seed(&self, index: usize, stack: ResourceStack) -> Result<(), StorageError> {
        let mut slots = self.slots.write().map_err(|_| StorageError::Poisoned)?;
        let len = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(StorageError::SlotOutOfRange { index, slots: len })?;
        if stack.count() > slot.capacity {
            return Err(StorageError::Overfilled {
                index,
                count: stack.count(),
                capacity: slot.capacity,
            });
        }
        slot.stack = stack;
        Ok(())
    }

    pub fn with_insertion(mut self, enabled: bool) -> Self {
        self.insertion = enabled;
        self
    }

    pub fn with_extraction(mut self, enabled: bool) -> Self {
        self.extraction = enabled;
        self
    }

    pub fn slot_count(&self) -> usize {
        self.read_slots().len()
    }

    pub fn stack_in_slot(&self, index: usize) -> Option<ResourceStack> {
        self.read_slots().get(index).map(|slot| slot.stack.clone())
    }

    /// Current stacks, in slot order.
    pub fn stacks(&self) -> Vec<ResourceStack> {
        self.read_slots().iter().map(|slot| slot.stack.clone()).collect()
    }

    /// Total amount of `resource` across all slots.
    pub fn amount_of(&self, resource: &ResourceKey) -> u64 {
        self.read_slots()
            .iter()
            .filter(|slot| !slot.stack.is_empty() && slot.stack.key() == resource)
            .map(|slot| slot.stack.count())
            .sum()
    }

    /// Number of outermost commits that changed this container.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    fn read_slots(&self) -> std::sync::RwLockReadGuard<'_, Vec<Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Journal the previous stacks of `changed` slots and schedule the revision bump.
    fn journal(&self, tx: &Transaction<'_>, previous: Vec<(usize, ResourceStack)>) {
        if previous.is_empty() {
            return;
        }

        let slots = Arc::clone(&self.slots);
        tx.record_undo(move || {
            let mut slots = slots.write().unwrap_or_else(PoisonError::into_inner);
            for (index, stack) in previous.into_iter().rev() {
                if let Some(slot) = slots.get_mut(index) {
                    slot.stack = stack;
                }
            }
        });

        self.dirty.store(true, Ordering::Release);
        let dirty = Arc::clone(&self.dirty);
        let revision = Arc::clone(&self.revision);
        tx.on_outer_commit(move || {
            if dirty.swap(false, Ordering::AcqRel) {
                revision.fetch_add(1, Ordering::AcqRel);
            }
        });
    }

    fn extract_from_slot(
        &self,
        index: usize,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, StorageError> {
        if !self.extraction || max_amount == 0 || resource.is_blank() {
            return Ok(0);
        }

        let mut slots = self.slots.write().map_err(|_| StorageError::Poisoned)?;
        let len = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(StorageError::SlotOutOfRange { index, slots: len })?;

        if slot.stack.is_empty() || slot.stack.key() != resource {
            return Ok(0);
        }

        let taken = max_amount.min(slot.stack.count());
        let previous = std::mem::replace(&mut slot.stack, ResourceStack::empty());
        slot.stack = previous.shrink(taken);
        drop(slots);

        tracing::trace!(tx = %tx.id(), slot = index, %resource, taken, "extracted from slot");
        self.journal(tx, vec![(index, previous)]);
        Ok(taken)
    }
}

impl Storage for SlottedStorage {
    type Error = StorageError;

    type View<'s> = SlotView<'s>;

    type Views<'s> = SlotViews<'s>;

    fn views<'s>(&'s self, _tx: &Transaction<'_>) -> Self::Views<'s> {
        SlotViews {
            storage: self,
            next: 0,
            len: self.slot_count(),
        }
    }

    fn supports_insertion(&self) -> bool {
        self.insertion
    }

    fn supports_extraction(&self) -> bool {
        self.extraction
    }

    /// Tops up slots already holding `resource`, then fills empty slots, in slot order.
    fn insert(
        &self,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, Self::Error> {
        if !self.insertion || max_amount == 0 || resource.is_blank() {
            return Ok(0);
        }

        let mut slots = self.slots.write().map_err(|_| StorageError::Poisoned)?;
        let mut remaining = max_amount;
        let mut previous = Vec::new();

        let matching: Vec<usize> = (0..slots.len())
            .filter(|&i| !slots[i].stack.is_empty() && slots[i].stack.key() == resource)
            .collect();
        let empty: Vec<usize> = (0..slots.len())
            .filter(|&i| slots[i].stack.is_empty())
            .collect();

        for index in matching.into_iter().chain(empty) {
            if remaining == 0 {
                break;
            }
            let slot = &mut slots[index];
            let room = slot.capacity.saturating_sub(slot.stack.count());
            let accepted = room.min(remaining);
            if accepted == 0 {
                continue;
            }
            let before = std::mem::replace(&mut slot.stack, ResourceStack::empty());
            slot.stack = resource.to_stack(before.count() + accepted);
            previous.push((index, before));
            remaining -= accepted;
        }
        drop(slots);

        let inserted = max_amount - remaining;
        tracing::trace!(tx = %tx.id(), %resource, inserted, "inserted into storage");
        self.journal(tx, previous);
        Ok(inserted)
    }
}

/// Lazy enumeration of a [`SlottedStorage`]'s slots.
#[derive(Debug)]
pub struct SlotViews<'s> {
    storage: &'s SlottedStorage,
    next: usize,
    len: usize,
}

impl<'s> Iterator for SlotViews<'s> {
    type Item = Result<SlotView<'s>, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let view = SlotView {
            storage: self.storage,
            index: self.next,
        };
        self.next += 1;
        Some(Ok(view))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.len - self.next;
        (left, Some(left))
    }
}

/// View of one slot; reads the live slot each time it is asked.
#[derive(Debug, Clone, Copy)]
pub struct SlotView<'s> {
    storage: &'s SlottedStorage,
    index: usize,
}

impl SlotView<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    fn read<T>(&self, f: impl FnOnce(&Slot) -> T, default: T) -> T {
        self.storage.read_slots().get(self.index).map(f).unwrap_or(default)
    }
}

impl StorageView for SlotView<'_> {
    type Error = StorageError;

    fn resource(&self) -> ResourceKey {
        self.read(|slot| slot.stack.key().clone(), ResourceKey::blank())
    }

    fn amount(&self) -> u64 {
        self.read(|slot| slot.stack.count(), 0)
    }

    fn capacity(&self) -> u64 {
        self.read(|slot| slot.capacity, 0)
    }

    fn extract(
        &self,
        resource: &ResourceKey,
        max_amount: u64,
        tx: &Transaction<'_>,
    ) -> Result<u64, Self::Error> {
        self.storage.extract_from_slot(self.index, resource, max_amount, tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stone() -> ResourceKey {
        ResourceKey::of("minecraft:stone")
    }

    fn dirt() -> ResourceKey {
        ResourceKey::of("minecraft:dirt")
    }

    #[test]
    fn views_enumerate_every_slot_in_order() {
        let storage =
            SlottedStorage::from_stacks(64, [stone().to_stack(3), ResourceStack::empty(), dirt().to_stack(1)])
                .unwrap();
        let tx = Transaction::open_outer();
        let seen: Vec<ResourceKey> = storage.views(&tx).map(|v| v.unwrap().resource()).collect();
        assert_eq!(seen, vec![stone(), ResourceKey::blank(), dirt()]);
    }

    #[test]
    fn extract_through_view_is_rolled_back_on_drop() {
        let storage = SlottedStorage::from_stacks(64, [stone().to_stack(10)]).unwrap();
        {
            let tx = Transaction::open_outer();
            let view = storage.views(&tx).next().unwrap().unwrap();
            assert_eq!(view.extract(&stone(), 4, &tx).unwrap(), 4);
            assert_eq!(view.amount(), 6);
        }
        assert_eq!(storage.stack_in_slot(0), Some(stone().to_stack(10)));
        assert_eq!(storage.revision(), 0);
    }

    #[test]
    fn extract_wrong_resource_moves_nothing() {
        let storage = SlottedStorage::from_stacks(64, [stone().to_stack(10)]).unwrap();
        let tx = Transaction::open_outer();
        let view = storage.views(&tx).next().unwrap().unwrap();
        assert_eq!(view.extract(&dirt(), 4, &tx).unwrap(), 0);
        assert_eq!(tx.pending_undo(), 0);
    }

    #[test]
    fn insert_tops_up_matching_slots_before_empty_ones() {
        let storage = SlottedStorage::new(3, 16);
        storage.seed(2, stone().to_stack(10)).unwrap();

        let tx = Transaction::open_outer();
        assert_eq!(storage.insert(&stone(), 20, &tx).unwrap(), 20);
        tx.commit();

        assert_eq!(
            storage.stacks(),
            vec![stone().to_stack(14), ResourceStack::empty(), stone().to_stack(16)]
        );
        assert_eq!(storage.revision(), 1);
    }

    #[test]
    fn insert_reports_what_fits() {
        let storage = SlottedStorage::new(1, 15);
        let tx = Transaction::open_outer();
        assert_eq!(storage.insert(&stone(), 20, &tx).unwrap(), 15);
    }

    #[test]
    fn insert_and_extract_respect_capability_flags() {
        let storage = SlottedStorage::from_stacks(64, [stone().to_stack(5)])
            .unwrap()
            .with_insertion(false)
            .with_extraction(false);
        let tx = Transaction::open_outer();
        assert_eq!(storage.insert(&stone(), 5, &tx).unwrap(), 0);
        assert_eq!(Storage::extract(&storage, &stone(), 5, &tx).unwrap(), 0);
        assert!(!storage.supports_insertion());
        assert!(!storage.supports_extraction());
    }

    #[test]
    fn storage_level_extract_drains_matching_slots() {
        let storage = SlottedStorage::from_stacks(
            64,
            [stone().to_stack(3), dirt().to_stack(9), stone().to_stack(4)],
        )
        .unwrap();
        let tx = Transaction::open_outer();
        assert_eq!(Storage::extract(&storage, &stone(), 6, &tx).unwrap(), 6);
        tx.commit();
        assert_eq!(
            storage.stacks(),
            vec![ResourceStack::empty(), dirt().to_stack(9), stone().to_stack(1)]
        );
    }

    #[test]
    fn revision_bumps_once_per_outer_commit() {
        let storage = SlottedStorage::new(2, 64);
        let mut tx = Transaction::open_outer();
        storage.insert(&stone(), 5, &tx).unwrap();
        {
            let inner = tx.open_nested();
            storage.insert(&dirt(), 5, &inner).unwrap();
            inner.commit();
        }
        tx.commit();
        assert_eq!(storage.revision(), 1);

        // Read-only scope: no bump.
        Transaction::open_outer().commit();
        assert_eq!(storage.revision(), 1);
    }

    #[test]
    fn seed_rejects_bad_slots() {
        let storage = SlottedStorage::new(1, 8);
        assert_eq!(
            storage.seed(3, stone().to_stack(1)),
            Err(StorageError::SlotOutOfRange { index: 3, slots: 1 })
        );
        assert_eq!(
            storage.seed(0, stone().to_stack(9)),
            Err(StorageError::Overfilled {
                index: 0,
                count: 9,
                capacity: 8
            })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: an uncommitted mix of inserts and extracts leaves the container
        /// exactly as it was.
        #[test]
        fn uncommitted_operations_leave_no_trace(
            initial in prop::collection::vec(0u64..=64, 1..8),
            ops in prop::collection::vec((any::<bool>(), 0u64..100), 0..20),
        ) {
            let storage = SlottedStorage::from_stacks(
                64,
                initial.iter().map(|&c| stone().to_stack(c)),
            ).unwrap();
            let before = storage.stacks();
            {
                let tx = Transaction::open_outer();
                for (is_insert, amount) in &ops {
                    if *is_insert {
                        storage.insert(&stone(), *amount, &tx).unwrap();
                    } else {
                        Storage::extract(&storage, &stone(), *amount, &tx).unwrap();
                    }
                }
            }
            prop_assert_eq!(storage.stacks(), before);
            prop_assert_eq!(storage.revision(), 0);
        }
    }
}
