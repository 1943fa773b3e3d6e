use serde::{Deserialize, Serialize};

/// Configuration for [`ArgsParser`](crate::ArgsParser).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgsConfig {
    /// Program name shown in usage and help text.
    pub program_name: String,
    /// Tokens that are accepted and dropped together with the value after
    /// them. They need not start with a dash (`//`).
    pub ignore_flags: Vec<String>,
    /// Flags that print help instead of parsing.
    pub help_flags: Vec<String>,
}

impl Default for ArgsConfig {
    fn default() -> Self {
        Self {
            program_name: "optreg".to_string(),
            ignore_flags: vec!["--comment".to_string()],
            help_flags: vec!["--help".to_string(), "-h".to_string()],
        }
    }
}

impl ArgsConfig {
    /// Default configuration under another program name.
    pub fn named(program_name: impl Into<String>) -> Self {
        Self {
            program_name: program_name.into(),
            ..Default::default()
        }
    }
}
