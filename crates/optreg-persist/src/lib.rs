//! Saving and loading stores.
//!
//! A store is written as a [`StoreDocument`]: the definition name and a map
//! from key name to the value encoded by that key's codec. Loading decodes
//! each entry through the matching key of a [`StoreDefinition`], so values
//! come back with their original types.
//!
//! # Formats
//!
//! - JSON (default)
//! - TOML
//!
//! # Design Rules
//!
//! 1. Only stores with a definition can be saved.
//! 2. A stored value whose key has no codec fails the save.
//! 3. Files are replaced atomically.
//!
//! [`StoreDefinition`]: optreg_store::StoreDefinition

pub mod config;
pub mod document;
pub mod error;
pub mod file;

// Re-exports for convenience.
pub use config::{Format, PersistConfig};
pub use document::StoreDocument;
pub use error::{PersistError, PersistResult};
pub use file::{load, read_document, save, write_document};
