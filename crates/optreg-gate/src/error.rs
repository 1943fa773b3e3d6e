/// Errors raised while checking a store against declared key usage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The store has no definition to check against.
    #[error("checking key usage requires store '{store}' to have a StoreDefinition")]
    NoDefinition { store: String },

    /// One or more keys of the definition have neither a value nor a usable
    /// default. Every failing key is listed.
    #[error(
        "store check failed for '{store}': no value for key(s) {} ({})",
        .failing.join(", "),
        defaults_note(.defaults_disabled)
    )]
    Validation {
        store: String,
        failing: Vec<String>,
        defaults_disabled: bool,
    },

    /// Components use keys the store's definition does not contain.
    #[error("component '{component}' uses key(s) not in definition '{definition}': {}", .keys.join(", "))]
    Undeclared {
        component: String,
        definition: String,
        keys: Vec<String>,
    },

    /// The gate rejected the store; `failures` holds one message per problem.
    #[error("key usage gate rejected store '{store}': {}", .failures.join("; "))]
    Rejected { store: String, failures: Vec<String> },
}

fn defaults_note(defaults_disabled: &bool) -> &'static str {
    if *defaults_disabled {
        "defaults are disabled"
    } else {
        "defaults are enabled"
    }
}

/// Result alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;
