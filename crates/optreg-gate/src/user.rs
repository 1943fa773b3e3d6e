use std::collections::HashSet;
use std::sync::Arc;

use optreg_store::{AnyKey, Store, StoreDefinition};
use tracing::warn;

use crate::error::GateResult;
use crate::report::CheckReport;

/// A component that reads and writes configuration through keys.
///
/// Both key lists default to empty. [`check`](KeyUser::check) verifies that
/// a store can serve the component before it runs.
pub trait KeyUser: Send + Sync {
    /// Keys the component reads.
    fn read_keys(&self) -> Vec<Arc<dyn AnyKey>> {
        Vec::new()
    }

    /// Keys the component writes.
    fn write_keys(&self) -> Vec<Arc<dyn AnyKey>> {
        Vec::new()
    }

    /// Read keys followed by write keys, each name once.
    fn declared_keys(&self) -> Vec<Arc<dyn AnyKey>> {
        let mut seen = HashSet::new();
        self.read_keys()
            .into_iter()
            .chain(self.write_keys())
            .filter(|key| seen.insert(key.name().to_string()))
            .collect()
    }

    /// Names of declared keys missing from `definition`.
    fn undeclared_keys(&self, definition: &StoreDefinition) -> Vec<String> {
        self.declared_keys()
            .iter()
            .filter(|key| !definition.has_key(key.name()))
            .map(|key| key.name().to_string())
            .collect()
    }

    /// Check that every key of the store's definition has a value, or a
    /// default when `defaults_disabled` is `false`.
    ///
    /// Fails with [`GateError::NoDefinition`](crate::GateError::NoDefinition)
    /// if the store has no definition, and with
    /// [`GateError::Validation`](crate::GateError::Validation) listing all
    /// failing keys otherwise.
    fn check(&self, store: &Store, defaults_disabled: bool) -> GateResult<()> {
        let report = CheckReport::run(store, defaults_disabled)?;
        if !report.passed() {
            warn!(
                store = %report.store,
                failing = ?report.failing,
                defaults_disabled,
                "store check failed"
            );
        }
        report.into_result().map(|_| ())
    }
}
