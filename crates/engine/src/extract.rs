//! Extraction algorithms. Both run inside a caller-provided scope and never commit.

use itemxfer_core::{ResourceKey, ResourceStack};
use itemxfer_storage::{Storage, StorageView};
use itemxfer_transaction::Transaction;

use crate::diagnostics::TransferDiagnostics;
use crate::fuzzy::{FuzzyMode, is_fuzzy_equal_key};
use crate::request::ExtractRequest;

/// Exact-match extraction across as many views as needed.
///
/// The first view that passes the filter and destination and actually yields
/// something locks the identity for the whole call; later views are only drawn from
/// if they hold exactly that identity, even when they would pass the filter. The
/// result therefore never mixes identities.
pub fn extract_exact<S>(
    storage: &S,
    request: &ExtractRequest<'_>,
    tx: &Transaction<'_>,
    diagnostics: &dyn TransferDiagnostics,
) -> Result<ResourceStack, S::Error>
where
    S: Storage,
{
    let amount = request.amount();
    let mut locked: Option<ResourceKey> = None;
    let mut extracted = 0u64;

    for view in storage.views(tx) {
        if extracted >= amount {
            break;
        }
        let view = view?;
        if view.is_empty() {
            continue;
        }

        let resource = view.resource();
        let asked = amount - extracted;

        let moved = if let Some(chosen) = locked.as_ref() {
            if *chosen != resource {
                continue;
            }
            view.extract(&resource, asked, tx)?
        } else {
            if request.filter().is_some_and(|filter| !resource.matches(filter)) {
                continue;
            }
            if !request.destination_accepts(&resource) {
                continue;
            }
            let moved = view.extract(&resource, asked, tx)?;
            if moved == 0 {
                // Not extractable; keep looking for an identity.
                continue;
            }
            locked = Some(resource);
            moved
        };

        if moved > asked {
            diagnostics.over_extraction(moved, asked);
        }
        extracted = extracted.saturating_add(moved);
    }

    Ok(match locked {
        Some(key) => key.to_stack(extracted.min(amount)),
        None => ResourceStack::empty(),
    })
}

/// Fuzzy-match extraction from at most one view.
///
/// Depletable stacks with different wear are never merged: the first view that
/// fuzzy-matches the filter, passes the destination and yields something is the only
/// one drawn from, even if it cannot cover the whole amount.
pub fn extract_similar<S>(
    storage: &S,
    request: &ExtractRequest<'_>,
    mode: FuzzyMode,
    tx: &Transaction<'_>,
    diagnostics: &dyn TransferDiagnostics,
) -> Result<ResourceStack, S::Error>
where
    S: Storage,
{
    let amount = request.amount();
    if amount == 0 {
        return Ok(ResourceStack::empty());
    }

    for view in storage.views(tx) {
        let view = view?;
        if view.is_empty() {
            continue;
        }

        let resource = view.resource();
        if request
            .filter()
            .is_some_and(|filter| !is_fuzzy_equal_key(&resource, filter, mode))
        {
            continue;
        }
        if !request.destination_accepts(&resource) {
            continue;
        }

        let moved = view.extract(&resource, amount, tx)?;
        if moved == 0 {
            continue;
        }
        if moved > amount {
            diagnostics.over_extraction(moved, amount);
        }
        return Ok(resource.to_stack(moved.min(amount)));
    }

    Ok(ResourceStack::empty())
}
