//! `itemxfer-core`: value primitives for the transfer engine.
//!
//! This crate contains **pure** data model types (no storage, no transactions):
//! resource identities, counted stacks and the durability facet of depletable items.

pub mod durability;
pub mod error;
pub mod id;
pub mod resource;
pub mod stack;
pub mod value_object;

pub use durability::Durability;
pub use error::{DomainError, DomainResult};
pub use id::TransactionId;
pub use resource::{ItemId, ResourceKey};
pub use stack::ResourceStack;
pub use value_object::ValueObject;
