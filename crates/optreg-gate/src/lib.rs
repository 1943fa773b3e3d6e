//! Key usage validation.
//!
//! Components declare the keys they read and write by implementing
//! [`KeyUser`]. Before a component runs, [`KeyUser::check`] verifies that
//! every key of the store's definition has a value (or a default, unless
//! defaults are disabled). All failing keys are reported together.
//!
//! [`UsageGate`] runs the same check for a set of components at once and
//! also flags components that use keys the definition does not contain.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use optreg_gate::KeyUser;
//! use optreg_store::{AnyKey, Key, Store, StoreDefinition};
//!
//! struct Greeter {
//!     name: Key<String>,
//! }
//!
//! impl KeyUser for Greeter {
//!     fn read_keys(&self) -> Vec<Arc<dyn AnyKey>> {
//!         vec![self.name.erased()]
//!     }
//! }
//!
//! let greeter = Greeter { name: Key::new("name") };
//! let definition = StoreDefinition::new("greeting", greeter.declared_keys()).unwrap();
//! let mut store = Store::with_definition(Arc::new(definition));
//! assert!(greeter.check(&store, false).is_err());
//!
//! store.set(&greeter.name, "world".to_string()).unwrap();
//! assert!(greeter.check(&store, false).is_ok());
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod report;
pub mod user;

// Re-exports for convenience.
pub use config::GateConfig;
pub use error::{GateError, GateResult};
pub use gate::{ComponentReport, GateReport, UsageGate};
pub use report::CheckReport;
pub use user::KeyUser;
