//! Fuzzy equality for depletable resources.
//!
//! Only used by fuzzy extraction. Two stacks of the same depletable item are
//! interchangeable when their wear falls in the same bucket relative to the mode's
//! break point. A key of such an item without a durability facet counts as pristine.
//! Items that are not depletable on either side fall back to exact identity.

use serde::{Deserialize, Serialize};

use itemxfer_core::{DomainError, DomainResult, ResourceKey, ResourceStack};

/// Wear fraction in `(0, 1]` splitting "worn" from "fresh".
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct BreakPoint(f32);

impl BreakPoint {
    pub fn new(fraction: f32) -> DomainResult<Self> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(DomainError::validation(format!(
                "break point must be in (0, 1], got {fraction}"
            )));
        }
        Ok(Self(fraction))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for BreakPoint {
    type Error = DomainError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BreakPoint> for f32 {
    fn from(value: BreakPoint) -> Self {
        value.0
    }
}

/// How much wear difference fuzzy matching tolerates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyMode {
    /// Wear is ignored entirely.
    IgnoreAll,
    /// Splits "more than 1 point of wear" from "at most 1 point of wear".
    Percent99,
    /// Break point 0.25.
    Percent75,
    /// Break point 0.5.
    Percent50,
    /// Break point 0.75.
    Percent25,
    Custom(BreakPoint),
}

impl FuzzyMode {
    /// Break point used by the bucketed modes; `None` for `IgnoreAll`/`Percent99`.
    pub fn break_point(self) -> Option<f32> {
        match self {
            FuzzyMode::IgnoreAll | FuzzyMode::Percent99 => None,
            FuzzyMode::Percent75 => Some(0.25),
            FuzzyMode::Percent50 => Some(0.5),
            FuzzyMode::Percent25 => Some(0.75),
            FuzzyMode::Custom(bp) => Some(bp.value()),
        }
    }
}

/// Fuzzy comparison of two stacks (counts are ignored).
pub fn is_fuzzy_equal(a: &ResourceStack, b: &ResourceStack, mode: FuzzyMode) -> bool {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => true,
        (false, false) => is_fuzzy_equal_key(a.key(), b.key(), mode),
        _ => false,
    }
}

/// Fuzzy comparison of two keys.
pub fn is_fuzzy_equal_key(a: &ResourceKey, b: &ResourceKey, mode: FuzzyMode) -> bool {
    match (a.is_blank(), b.is_blank()) {
        (true, true) => return true,
        (false, false) => {}
        _ => return false,
    }

    if !a.same_item(b) {
        return false;
    }

    // Depletability belongs to the item: one side carrying durability is enough.
    if a.durability().is_none() && b.durability().is_none() {
        return a == b;
    }
    let (wear_a, wear_b) = (Wear::of(a), Wear::of(b));

    match mode {
        FuzzyMode::IgnoreAll => true,
        FuzzyMode::Percent99 => (wear_a.points > 1) == (wear_b.points > 1),
        other => {
            // Every remaining mode carries a break point.
            let bp = other.break_point().unwrap_or(1.0);
            (wear_a.fraction > bp) == (wear_b.fraction > bp)
        }
    }
}

/// Wear of one side; a key without durability is pristine.
#[derive(Debug, Clone, Copy)]
struct Wear {
    points: u32,
    fraction: f32,
}

impl Wear {
    fn of(key: &ResourceKey) -> Self {
        key.durability().map_or(
            Self {
                points: 0,
                fraction: 0.0,
            },
            |durability| Self {
                points: durability.current_wear(),
                fraction: durability.wear_fraction(),
            },
        )
    }
}
