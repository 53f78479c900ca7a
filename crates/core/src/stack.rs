//! Counted stacks of a single resource identity.

use serde::{Deserialize, Serialize};

use crate::resource::ResourceKey;
use crate::value_object::ValueObject;

/// A `ResourceKey` paired with a count.
///
/// A stack is empty iff its count is zero or its key is blank. Empty stacks
/// compare equal to each other regardless of the key they used to carry, so
/// `shrink` down to zero always yields `ResourceStack::empty()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RawStack")]
pub struct ResourceStack {
    key: ResourceKey,
    count: u64,
}

impl ResourceStack {
    pub fn new(key: ResourceKey, count: u64) -> Self {
        if key.is_blank() || count == 0 {
            return Self::empty();
        }
        Self { key, count }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.key.is_blank()
    }

    /// Same key, different count.
    pub fn with_count(&self, count: u64) -> Self {
        Self::new(self.key.clone(), count)
    }

    /// Remove `amount` units (saturating at zero).
    pub fn shrink(&self, amount: u64) -> Self {
        self.with_count(self.count.saturating_sub(amount))
    }

    /// Add `amount` units (saturating at `u64::MAX`).
    pub fn grow(&self, amount: u64) -> Self {
        self.with_count(self.count.saturating_add(amount))
    }
}

/// Wire shape; decoding goes through `ResourceStack::new` so it normalizes too.
#[derive(Deserialize)]
struct RawStack {
    key: ResourceKey,
    count: u64,
}

impl From<RawStack> for ResourceStack {
    fn from(raw: RawStack) -> Self {
        ResourceStack::new(raw.key, raw.count)
    }
}

impl PartialEq for ResourceStack {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => true,
            (false, false) => self.count == other.count && self.key == other.key,
            _ => false,
        }
    }
}

impl Eq for ResourceStack {}

impl ValueObject for ResourceStack {}

impl core::fmt::Display for ResourceStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return f.write_str("<empty>");
        }
        write!(f, "{}x {}", self.count, self.key)
    }
}
