//! Extraction requests.

use itemxfer_core::ResourceKey;

/// Predicate over a candidate resource, checked before the engine commits to it.
pub type Destination<'a> = &'a dyn Fn(&ResourceKey) -> bool;

/// What the caller wants out of a storage.
///
/// ```ignore
/// let fits = |key: &ResourceKey| key.same_item(&ResourceKey::of("minecraft:stone"));
/// let request = ExtractRequest::new(12).matching(&filter).accepted_by(&fits);
/// ```
#[derive(Clone, Copy)]
pub struct ExtractRequest<'a> {
    amount: u64,
    filter: Option<&'a ResourceKey>,
    destination: Option<Destination<'a>>,
}

impl<'a> ExtractRequest<'a> {
    /// Up to `amount` of anything.
    pub fn new(amount: u64) -> Self {
        Self {
            amount,
            filter: None,
            destination: None,
        }
    }

    /// Restrict to resources matching `filter`. A blank filter accepts anything.
    pub fn matching(mut self, filter: &'a ResourceKey) -> Self {
        self.filter = (!filter.is_blank()).then_some(filter);
        self
    }

    /// Only resources the destination accepts are considered.
    pub fn accepted_by(mut self, destination: Destination<'a>) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn filter(&self) -> Option<&'a ResourceKey> {
        self.filter
    }

    /// True if the destination predicate (if any) accepts `resource`.
    pub fn destination_accepts(&self, resource: &ResourceKey) -> bool {
        self.destination.is_none_or(|accepts| accepts(resource))
    }
}

impl core::fmt::Debug for ExtractRequest<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExtractRequest")
            .field("amount", &self.amount)
            .field("filter", &self.filter)
            .field("destination", &self.destination.is_some())
            .finish()
    }
}
