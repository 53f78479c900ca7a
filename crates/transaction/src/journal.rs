//! Undo journal owned by a single transaction scope.

/// Restores the state changed by one mutation.
pub type UndoAction = Box<dyn FnOnce()>;

/// Runs once the outermost scope of a lineage commits.
pub type CommitHook = Box<dyn FnOnce()>;

/// Undo actions and final-commit hooks recorded inside one scope.
///
/// - Undo actions run in **reverse** registration order on rollback, so later
///   mutations are undone before the earlier ones they were applied on top of.
/// - Hooks run in registration order, and only on the outermost commit.
/// - A committed child scope hands its whole journal to the parent (`absorb`), which
///   is how an inner commit stays revocable until the outer scope decides.
#[derive(Default)]
pub struct Journal {
    undo: Vec<UndoAction>,
    hooks: Vec<CommitHook>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_undo(&mut self, action: UndoAction) {
        self.undo.push(action);
    }

    pub fn on_outer_commit(&mut self, hook: CommitHook) {
        self.hooks.push(hook);
    }

    /// Number of undo actions currently pending.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn hook_len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.hooks.is_empty()
    }

    /// Append a committed child's journal after this scope's own entries.
    pub fn absorb(&mut self, child: Journal) {
        self.undo.extend(child.undo);
        self.hooks.extend(child.hooks);
    }

    /// Undo everything, newest first. Hooks are discarded without running.
    ///
    /// Returns the number of undo actions executed.
    pub fn rollback(self) -> usize {
        let undone = self.undo.len();
        for action in self.undo.into_iter().rev() {
            action();
        }
        undone
    }

    /// Make the journaled changes durable: drop the undo actions, run the hooks.
    pub fn finalize(self) -> usize {
        let Journal { undo, hooks } = self;
        drop(undo);
        let fired = hooks.len();
        for hook in hooks {
            hook();
        }
        fired
    }
}

impl core::fmt::Debug for Journal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Journal")
            .field("undo", &self.undo.len())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
