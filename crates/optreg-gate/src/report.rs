use optreg_store::Store;

use crate::error::{GateError, GateResult};

/// Outcome of checking one store against its definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckReport {
    /// Name of the checked store.
    pub store: String,
    /// Name of the definition it was checked against.
    pub definition: String,
    /// Whether defaults were ignored.
    pub defaults_disabled: bool,
    /// Number of keys checked.
    pub checked: usize,
    /// Keys without a value or usable default, in definition order.
    pub failing: Vec<String>,
}

impl CheckReport {
    /// Check every key of `store`'s definition.
    ///
    /// A key passes when the store has a value for it, or when defaults are
    /// enabled and the key has one. All keys are checked; failures are
    /// collected rather than reported one at a time.
    pub fn run(store: &Store, defaults_disabled: bool) -> GateResult<Self> {
        let definition = store
            .definition()
            .ok_or_else(|| GateError::NoDefinition {
                store: store.name().to_string(),
            })?;

        let failing = definition
            .keys()
            .iter()
            .filter(|key| {
                let satisfied =
                    store.has_value(key.as_ref()) || (!defaults_disabled && key.has_default());
                !satisfied
            })
            .map(|key| key.name().to_string())
            .collect();

        Ok(Self {
            store: store.name().to_string(),
            definition: definition.name().to_string(),
            defaults_disabled,
            checked: definition.len(),
            failing,
        })
    }

    /// Returns `true` if no key failed.
    pub fn passed(&self) -> bool {
        self.failing.is_empty()
    }

    /// The report itself if it passed, otherwise a [`GateError::Validation`]
    /// naming every failing key.
    pub fn into_result(self) -> GateResult<Self> {
        if self.passed() {
            return Ok(self);
        }
        Err(GateError::Validation {
            store: self.store,
            failing: self.failing,
            defaults_disabled: self.defaults_disabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optreg_store::{Key, StoreDefinition};

    fn keys() -> (Key<String>, Key<i32>) {
        (Key::new("a"), Key::new("b").with_default_value(1))
    }

    fn store() -> Store {
        let (a, b) = keys();
        Store::with_definition(
            StoreDefinition::builder("shape")
                .key(&a)
                .key(&b)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn defaults_enabled_fails_only_keys_without_default() {
        let report = CheckReport::run(&store(), false).unwrap();
        assert_eq!(report.failing, vec!["a"]);
        assert_eq!(report.checked, 2);
    }

    #[test]
    fn defaults_disabled_fails_both() {
        let report = CheckReport::run(&store(), true).unwrap();
        assert_eq!(report.failing, vec!["a", "b"]);
    }

    #[test]
    fn stored_values_pass() {
        let (a, _) = keys();
        let mut store = store();
        store.set(&a, "x".into()).unwrap();
        assert!(CheckReport::run(&store, false).unwrap().passed());
        assert_eq!(CheckReport::run(&store, true).unwrap().failing, vec!["b"]);
    }

    #[test]
    fn missing_definition_is_an_error() {
        assert_eq!(
            CheckReport::run(&Store::new("bare"), false).unwrap_err(),
            GateError::NoDefinition {
                store: "bare".into()
            }
        );
    }

    #[test]
    fn into_result_converts_failures() {
        let err = CheckReport::run(&store(), true)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(
            err,
            GateError::Validation {
                store: "shape".into(),
                failing: vec!["a".into(), "b".into()],
                defaults_disabled: true,
            }
        );
    }
}
