use std::path::Path;

use serde::{Deserialize, Serialize};

/// On-disk document format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Toml,
}

impl Format {
    /// Pick the format from a file extension (`.json` or `.toml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Configuration for saving and loading stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistConfig {
    /// Document format.
    pub format: Format,
    /// When `true`, only explicitly stored values are written. When `false`,
    /// defaults of unset keys are written too.
    pub skip_defaults: bool,
    /// When `true`, loading fails on names the definition does not know and
    /// on documents written for another definition. When `false`, both are
    /// logged and skipped.
    pub strict_keys: bool,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            format: Format::Json,
            skip_defaults: true,
            strict_keys: false,
        }
    }
}

impl PersistConfig {
    /// JSON with default settings.
    pub fn json() -> Self {
        Self::default()
    }

    /// TOML with default settings.
    pub fn toml() -> Self {
        Self {
            format: Format::Toml,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a/b.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("b.toml")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("b.yaml")), None);
        assert_eq!(Format::from_path(Path::new("b")), None);
    }

    #[test]
    fn defaults() {
        let config = PersistConfig::default();
        assert_eq!(config.format, Format::Json);
        assert!(config.skip_defaults);
        assert!(!config.strict_keys);
        assert_eq!(PersistConfig::toml().format, Format::Toml);
    }

    #[test]
    fn config_serializes_lowercase_format() {
        let json = serde_json::to_string(&PersistConfig::toml()).unwrap();
        assert!(json.contains(r#""format":"toml""#));
    }
}
