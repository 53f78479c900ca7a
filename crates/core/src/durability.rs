//! Wear tracking for depletable resources.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Durability facet of a depletable resource (tools, armor, ...).
///
/// Invariant: `current_wear <= max_wear`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDurability", into = "RawDurability")]
pub struct Durability {
    current_wear: u32,
    max_wear: u32,
}

impl Durability {
    pub fn new(current_wear: u32, max_wear: u32) -> DomainResult<Self> {
        if current_wear > max_wear {
            return Err(DomainError::WearExceedsMax {
                current: current_wear,
                max: max_wear,
            });
        }
        Ok(Self {
            current_wear,
            max_wear,
        })
    }

    /// A fresh (unworn) facet.
    pub fn pristine(max_wear: u32) -> Self {
        Self {
            current_wear: 0,
            max_wear,
        }
    }

    pub fn current_wear(&self) -> u32 {
        self.current_wear
    }

    pub fn max_wear(&self) -> u32 {
        self.max_wear
    }

    /// Fraction of the durability already used up, in `[0, 1]`.
    ///
    /// A facet with `max_wear == 0` reports `0.0`.
    pub fn wear_fraction(&self) -> f32 {
        if self.max_wear == 0 {
            return 0.0;
        }
        self.current_wear as f32 / self.max_wear as f32
    }
}

impl ValueObject for Durability {}

#[derive(Serialize, Deserialize)]
struct RawDurability {
    current_wear: u32,
    max_wear: u32,
}

impl TryFrom<RawDurability> for Durability {
    type Error = DomainError;

    fn try_from(raw: RawDurability) -> Result<Self, Self::Error> {
        Durability::new(raw.current_wear, raw.max_wear)
    }
}

impl From<Durability> for RawDurability {
    fn from(value: Durability) -> Self {
        Self {
            current_wear: value.current_wear,
            max_wear: value.max_wear,
        }
    }
}
