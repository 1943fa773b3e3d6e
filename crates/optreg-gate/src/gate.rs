use optreg_store::Store;
use tracing::debug;

use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::report::CheckReport;
use crate::user::KeyUser;

// ---------------------------------------------------------------------------
// GateReport
// ---------------------------------------------------------------------------

/// Keys a single component uses that the store's definition lacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentReport {
    /// Name the component was registered under.
    pub component: String,
    /// Declared keys missing from the definition.
    pub undeclared: Vec<String>,
}

/// The outcome of running a store through the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateReport {
    /// Definition-wide value check.
    pub store_check: CheckReport,
    /// Per-component results in registration order. Components after a
    /// failure are absent when the gate is fail-fast.
    pub components: Vec<ComponentReport>,
    definition: String,
}

impl GateReport {
    /// Returns `true` if every check passed.
    pub fn is_accepted(&self) -> bool {
        self.store_check.passed() && self.components.iter().all(|c| c.undeclared.is_empty())
    }

    /// One message per failed check.
    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        if !self.store_check.passed() {
            failures.push(
                GateError::Validation {
                    store: self.store_check.store.clone(),
                    failing: self.store_check.failing.clone(),
                    defaults_disabled: self.store_check.defaults_disabled,
                }
                .to_string(),
            );
        }
        for component in self.components.iter().filter(|c| !c.undeclared.is_empty()) {
            failures.push(
                GateError::Undeclared {
                    component: component.component.clone(),
                    definition: self.definition.clone(),
                    keys: component.undeclared.clone(),
                }
                .to_string(),
            );
        }
        failures
    }

    /// The report if accepted, otherwise [`GateError::Rejected`] with every
    /// failure message.
    pub fn into_result(self) -> GateResult<Self> {
        if self.is_accepted() {
            return Ok(self);
        }
        Err(GateError::Rejected {
            store: self.store_check.store.clone(),
            failures: self.failures(),
        })
    }
}

// ---------------------------------------------------------------------------
// UsageGate
// ---------------------------------------------------------------------------

/// Checks one store on behalf of several components before they run.
///
/// The store must have a definition. The gate checks that every key of the
/// definition can be read, then that every component only declares keys the
/// definition contains.
pub struct UsageGate {
    components: Vec<(String, Box<dyn KeyUser>)>,
    config: GateConfig,
}

impl UsageGate {
    /// An empty gate.
    pub fn new(config: GateConfig) -> Self {
        Self {
            components: Vec::new(),
            config,
        }
    }

    /// Register a component under `name`.
    pub fn add_component(&mut self, name: impl Into<String>, component: Box<dyn KeyUser>) {
        self.components.push((name.into(), component));
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Run every check over `store`.
    ///
    /// Fails only when the store has no definition; check failures are
    /// reported in the returned [`GateReport`].
    pub fn evaluate(&self, store: &Store) -> GateResult<GateReport> {
        let definition = store.definition().ok_or_else(|| GateError::NoDefinition {
            store: store.name().to_string(),
        })?;
        let store_check = CheckReport::run(store, self.config.defaults_disabled)?;

        let mut report = GateReport {
            components: Vec::with_capacity(self.components.len()),
            definition: definition.name().to_string(),
            store_check,
        };

        if !report.store_check.passed() && self.config.fail_fast {
            debug!(store = store.name(), "store check failed, skipping components");
            return Ok(report);
        }

        for (name, component) in &self.components {
            let undeclared = component.undeclared_keys(definition);
            let failed = !undeclared.is_empty();
            debug!(
                store = store.name(),
                component = %name,
                undeclared = undeclared.len(),
                "component checked"
            );
            report.components.push(ComponentReport {
                component: name.clone(),
                undeclared,
            });
            if failed && self.config.fail_fast {
                break;
            }
        }

        debug!(
            store = store.name(),
            accepted = report.is_accepted(),
            "key usage gate evaluated"
        );
        Ok(report)
    }
}
