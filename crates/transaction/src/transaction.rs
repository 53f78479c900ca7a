//! Transaction scopes with guaranteed release.
//!
//! ## Lineage
//!
//! An outer scope is opened with [`Transaction::open_outer`]. Nested scopes are opened
//! from an existing handle ([`Transaction::open_nested`]) and exclusively borrow their
//! parent, so the parent cannot be used until the child is released. There is no
//! ambient "current transaction": code that wants to join a caller's scope takes the
//! handle as a parameter ([`Transaction::open_or_join`]).
//!
//! ## Commit protocol
//!
//! - **Nested commit** moves the child's journal into the parent. Nothing becomes
//!   durable yet; the parent can still roll it back.
//! - **Outer commit** drops the journal (changes stay as applied) and runs the
//!   final-commit hooks.
//! - **Drop without commit** rolls back every mutation recorded in this scope,
//!   including those inherited from committed children. This is the normal path for
//!   simulation, and it also covers `?` early returns and unwinding panics.

use std::cell::{Cell, RefCell};

use itemxfer_core::TransactionId;

use crate::journal::Journal;

/// How a scope was released.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Committed,
    RolledBack,
}

/// A transaction scope. See the module docs for the commit protocol.
///
/// `'p` is the lifetime of the borrow on the parent scope (`'static` for outer scopes).
pub struct Transaction<'p> {
    id: TransactionId,
    depth: usize,
    parent: Option<&'p RefCell<Journal>>,
    journal: RefCell<Journal>,
    released: Cell<bool>,
}

impl Transaction<'static> {
    /// Begin a new root scope.
    pub fn open_outer() -> Self {
        let tx = Self {
            id: TransactionId::new(),
            depth: 0,
            parent: None,
            journal: RefCell::new(Journal::new()),
            released: Cell::new(false),
        };
        tracing::trace!(tx = %tx.id, depth = 0, "transaction opened");
        tx
    }
}

impl<'p> Transaction<'p> {
    /// Open a nested scope when `parent` is given, an outer scope otherwise.
    pub fn open_or_join(parent: Option<&'p mut Transaction<'_>>) -> Self {
        match parent {
            Some(parent) => parent.open_nested(),
            None => Transaction::open_outer(),
        }
    }

    /// Begin a child scope joining this one.
    pub fn open_nested(&mut self) -> Transaction<'_> {
        let tx = Transaction {
            id: TransactionId::new(),
            depth: self.depth + 1,
            parent: Some(&self.journal),
            journal: RefCell::new(Journal::new()),
            released: Cell::new(false),
        };
        tracing::trace!(tx = %tx.id, parent = %self.id, depth = tx.depth, "transaction opened");
        tx
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Nesting depth; `0` for the outer scope.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_outer(&self) -> bool {
        self.parent.is_none()
    }

    /// Register how to undo a mutation a participant just applied.
    pub fn record_undo(&self, action: impl FnOnce() + 'static) {
        self.journal.borrow_mut().record_undo(Box::new(action));
    }

    /// Register a hook that runs when the outermost scope of this lineage commits.
    ///
    /// Never runs if any scope between here and the root rolls back.
    pub fn on_outer_commit(&self, hook: impl FnOnce() + 'static) {
        self.journal.borrow_mut().on_outer_commit(Box::new(hook));
    }

    /// Undo actions recorded in this scope so far (including committed children).
    pub fn pending_undo(&self) -> usize {
        self.journal.borrow().undo_len()
    }

    /// Commit this scope. Only the outer commit makes changes durable.
    pub fn commit(self) -> TransactionOutcome {
        self.released.set(true);
        let journal = self.journal.take();

        match self.parent {
            Some(parent) => {
                tracing::trace!(
                    tx = %self.id,
                    depth = self.depth,
                    undo = journal.undo_len(),
                    "nested transaction committed into parent"
                );
                parent.borrow_mut().absorb(journal);
            }
            None => {
                let fired = journal.finalize();
                tracing::debug!(tx = %self.id, hooks = fired, "transaction committed");
            }
        }

        TransactionOutcome::Committed
    }

    /// Roll back explicitly. Equivalent to dropping the scope.
    pub fn abort(self) -> TransactionOutcome {
        self.rollback();
        TransactionOutcome::RolledBack
    }

    fn rollback(&self) {
        if self.released.replace(true) {
            return;
        }
        let undone = self.journal.take().rollback();
        tracing::debug!(tx = %self.id, depth = self.depth, undone, "transaction rolled back");
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.rollback();
    }
}

impl core::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("journal", &self.journal)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::rc::Rc;

    /// Minimal participant: a counter mutated in place with undo recorded.
    fn add(tx: &Transaction<'_>, cell: &Rc<Cell<i64>>, delta: i64) {
        let before = cell.get();
        cell.set(before + delta);
        let cell = Rc::clone(cell);
        tx.record_undo(move || cell.set(before));
    }

    #[test]
    fn drop_without_commit_rolls_back() {
        let value = Rc::new(Cell::new(10));
        {
            let tx = Transaction::open_outer();
            add(&tx, &value, 5);
            assert_eq!(value.get(), 15);
        }
        assert_eq!(value.get(), 10);
    }

    #[test]
    fn outer_commit_is_durable() {
        let value = Rc::new(Cell::new(10));
        let tx = Transaction::open_outer();
        add(&tx, &value, 5);
        assert_eq!(tx.commit(), TransactionOutcome::Committed);
        assert_eq!(value.get(), 15);
    }

    #[test]
    fn inner_commit_is_undone_by_outer_rollback() {
        let value = Rc::new(Cell::new(0));
        let mut outer = Transaction::open_outer();
        add(&outer, &value, 1);
        {
            let inner = outer.open_nested();
            assert_eq!(inner.depth(), 1);
            assert!(!inner.is_outer());
            add(&inner, &value, 2);
            inner.commit();
        }
        assert_eq!(value.get(), 3);
        assert_eq!(outer.pending_undo(), 2);

        assert_eq!(outer.abort(), TransactionOutcome::RolledBack);
        assert_eq!(value.get(), 0);
    }

    #[test]
    fn inner_rollback_keeps_outer_changes() {
        let value = Rc::new(Cell::new(0));
        let mut outer = Transaction::open_outer();
        add(&outer, &value, 1);
        {
            let inner = outer.open_nested();
            add(&inner, &value, 100);
        }
        assert_eq!(value.get(), 1);
        outer.commit();
        assert_eq!(value.get(), 1);
    }

    #[test]
    fn hooks_fire_only_on_outermost_commit() {
        let fired = Rc::new(Cell::new(0));
        let mut outer = Transaction::open_outer();
        {
            let inner = outer.open_nested();
            let fired = Rc::clone(&fired);
            inner.on_outer_commit(move || fired.set(fired.get() + 1));
            inner.commit();
        }
        assert_eq!(fired.get(), 0);
        outer.commit();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn hooks_never_fire_on_rollback() {
        let fired = Rc::new(Cell::new(false));
        let mut outer = Transaction::open_outer();
        {
            let inner = outer.open_nested();
            let fired = Rc::clone(&fired);
            inner.on_outer_commit(move || fired.set(true));
            inner.commit();
        }
        drop(outer);
        assert!(!fired.get());
    }

    #[test]
    fn open_or_join_nests_under_given_parent() {
        let value = Rc::new(Cell::new(0));
        let mut outer = Transaction::open_or_join(None);
        assert!(outer.is_outer());
        {
            let joined = Transaction::open_or_join(Some(&mut outer));
            assert_eq!(joined.depth(), 1);
            add(&joined, &value, 7);
            joined.commit();
        }
        drop(outer);
        assert_eq!(value.get(), 0);
    }

    #[test]
    fn early_error_return_rolls_back() {
        fn collaborator() -> Result<(), &'static str> {
            Err("collaborator failed")
        }

        fn failing(value: &Rc<Cell<i64>>) -> Result<(), &'static str> {
            let tx = Transaction::open_outer();
            add(&tx, value, 42);
            collaborator()?;
            tx.commit();
            Ok(())
        }

        let value = Rc::new(Cell::new(1));
        assert!(failing(&value).is_err());
        assert_eq!(value.get(), 1);
    }

    #[test]
    fn panic_unwinding_rolls_back() {
        let value = Rc::new(Cell::new(1));
        let inner_value = Rc::clone(&value);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let tx = Transaction::open_outer();
            add(&tx, &inner_value, 42);
            panic!("collaborator panicked mid-iteration");
        }));
        assert!(result.is_err());
        assert_eq!(value.get(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: whatever nested scopes commit, dropping the outer scope restores
        /// the starting value.
        #[test]
        fn outer_rollback_restores_start(
            deltas in prop::collection::vec((-1_000i64..1_000, any::<bool>()), 0..16)
        ) {
            let value = Rc::new(Cell::new(0));
            {
                let mut outer = Transaction::open_outer();
                for (delta, commit_inner) in &deltas {
                    let inner = outer.open_nested();
                    add(&inner, &value, *delta);
                    if *commit_inner {
                        inner.commit();
                    }
                }
            }
            prop_assert_eq!(value.get(), 0);
        }

        /// Property: after an outer commit the value equals the sum of committed deltas.
        #[test]
        fn outer_commit_keeps_committed_children(
            deltas in prop::collection::vec((-1_000i64..1_000, any::<bool>()), 0..16)
        ) {
            let value = Rc::new(Cell::new(0));
            let mut outer = Transaction::open_outer();
            for (delta, commit_inner) in &deltas {
                let inner = outer.open_nested();
                add(&inner, &value, *delta);
                if *commit_inner {
                    inner.commit();
                }
            }
            outer.commit();

            let expected: i64 = deltas.iter().filter(|(_, c)| *c).map(|(d, _)| d).sum();
            prop_assert_eq!(value.get(), expected);
        }
    }
}
