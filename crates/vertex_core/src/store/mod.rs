//! On-device key-value preference store.
//!
//! # Responsibility
//! - Define the string-keyed persistence contract used by the state manager.
//! - Keep SQL and JSON encoding details behind that contract.
//!
//! # Invariants
//! - One JSON value per key; writing a key replaces its previous value.
//! - Removing an absent key is not an error.

pub mod keys;
pub mod kv_store;
