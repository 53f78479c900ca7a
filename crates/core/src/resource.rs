//! Resource identity: *what* is being moved, never *how much*.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::durability::Durability;
use crate::stack::ResourceStack;
use crate::value_object::ValueObject;

/// Name of an underlying item type (e.g. `minecraft:diamond_sword`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Immutable, value-equal identity of a resource.
///
/// Two keys are equal iff they name the same item with the same components and the
/// same durability facet. The blank key (`ResourceKey::blank()`) means "no resource".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceKey {
    item: Option<ItemId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    components: BTreeMap<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    durability: Option<Durability>,
}

impl ResourceKey {
    /// The "no resource" sentinel.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Plain key for `item`, without components or durability.
    pub fn of(item: impl Into<ItemId>) -> Self {
        Self {
            item: Some(item.into()),
            components: BTreeMap::new(),
            durability: None,
        }
    }

    /// Key for a depletable item carrying the given wear.
    pub fn depletable(item: impl Into<ItemId>, durability: Durability) -> Self {
        Self::of(item).with_durability(durability)
    }

    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = Some(durability);
        self
    }

    pub fn with_component(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.components.insert(name.into(), value);
        self
    }

    pub fn is_blank(&self) -> bool {
        self.item.is_none()
    }

    pub fn item(&self) -> Option<&ItemId> {
        self.item.as_ref()
    }

    pub fn components(&self) -> &BTreeMap<String, JsonValue> {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&JsonValue> {
        self.components.get(name)
    }

    pub fn durability(&self) -> Option<&Durability> {
        self.durability.as_ref()
    }

    pub fn is_depletable(&self) -> bool {
        self.durability.is_some()
    }

    /// True iff both keys name the same underlying item, ignoring components and wear.
    ///
    /// Blank keys never share an item.
    pub fn same_item(&self, other: &ResourceKey) -> bool {
        match (&self.item, &other.item) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Exact identity match against a filter key.
    pub fn matches(&self, filter: &ResourceKey) -> bool {
        !self.is_blank() && self == filter
    }

    pub fn to_stack(&self, count: u64) -> ResourceStack {
        ResourceStack::new(self.clone(), count)
    }
}

impl ValueObject for ResourceKey {}

impl core::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let Some(item) = &self.item else {
            return f.write_str("<blank>");
        };
        write!(f, "{item}")?;
        if let Some(d) = &self.durability {
            write!(f, "[wear={}/{}]", d.current_wear(), d.max_wear())?;
        }
        if !self.components.is_empty() {
            write!(f, "{{{} components}}", self.components.len())?;
        }
        Ok(())
    }
}
