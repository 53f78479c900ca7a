//! Insertion.

use itemxfer_core::ResourceStack;
use itemxfer_storage::Storage;
use itemxfer_transaction::Transaction;

use crate::diagnostics::TransferDiagnostics;

/// Offer the whole of `stack` to `storage` within `tx`; returns what was not accepted.
///
/// An empty stack is returned as-is without touching the storage.
pub fn insert_stack<S>(
    storage: &S,
    stack: &ResourceStack,
    tx: &Transaction<'_>,
    diagnostics: &dyn TransferDiagnostics,
) -> Result<ResourceStack, S::Error>
where
    S: Storage,
{
    if stack.is_empty() {
        return Ok(ResourceStack::empty());
    }

    let offered = stack.count();
    let mut inserted = storage.insert(stack.key(), offered, tx)?;
    if inserted > offered {
        diagnostics.over_insertion(inserted, offered);
        inserted = offered;
    }

    Ok(stack.shrink(inserted))
}
