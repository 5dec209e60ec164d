//! Configuration management for scanscribe.
//!
//! Settings are assembled once at startup: serde defaults, then an optional
//! TOML file, then environment overrides. Components receive the section they
//! need and never read the environment themselves.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmConfig;
use crate::ocr::OcrConfig;
use crate::services::BatchConfig;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Lookup function used to resolve overrides by variable name.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Top-level settings.
///
/// ```toml
/// [llm]
/// model = "llama3-70b-8192"
/// temperature = 0.7
///
/// [ocr]
/// language = "deu"
///
/// [batch]
/// case_insensitive = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
    pub batch: BatchConfig,
}

impl Settings {
    /// Load settings from an optional TOML file, then apply process environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.with_overrides(&env_lookup)
    }

    /// Read settings from a TOML file. Missing sections and keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides resolved through `lookup`.
    pub fn with_overrides(self, lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            llm: self.llm.with_overrides(lookup)?,
            ocr: self.ocr.with_overrides(lookup)?,
            batch: self.batch.with_overrides(lookup)?,
        })
    }
}

/// Resolve a variable from the process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Return the first of `keys` that resolves to a non-blank value.
pub(crate) fn first_set(lookup: Lookup<'_>, keys: &[&'static str]) -> Option<(&'static str, String)> {
    keys.iter().find_map(|key| {
        lookup(key)
            .filter(|value| !value.trim().is_empty())
            .map(|value| (*key, value))
    })
}

/// Parse a numeric override, naming the variable on failure.
pub(crate) fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a boolean override ("true"/"false", "1"/"0", "yes"/"no").
pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("scanscribe.toml");
        fs::write(
            &path,
            "[llm]\nmodel = \"mixtral-8x7b-32768\"\n\n[ocr]\nlanguage = \"deu\"\n",
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.llm.model, "mixtral-8x7b-32768");
        assert_eq!(settings.llm.max_tokens, 4096);
        assert_eq!(settings.ocr.language, "deu");
        assert_eq!(settings.ocr.dpi, 300);
        assert!(!settings.batch.case_insensitive);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        fs::write(&path, "[llm\nmodel = ").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Settings::from_file(Path::new("/nonexistent/scanscribe.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides_apply_to_every_section() {
        let lookup = lookup_from(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("OCR_LANGUAGE", "fra"),
            ("OCR_DPI", "200"),
            ("BATCH_CASE_INSENSITIVE", "yes"),
        ]);

        let settings = Settings::default().with_overrides(&lookup).unwrap();
        assert_eq!(settings.llm.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(settings.ocr.language, "fra");
        assert_eq!(settings.ocr.dpi, 200);
        assert!(settings.batch.case_insensitive);
    }

    #[test]
    fn test_env_overrides_win_over_file_values() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("scanscribe.toml");
        fs::write(&path, "[llm]\ntemperature = 0.2\n").unwrap();

        let lookup = lookup_from(&[("TEMPERATURE", "0.9")]);
        let settings = Settings::from_file(&path)
            .unwrap()
            .with_overrides(&lookup)
            .unwrap();
        assert!((settings.llm.temperature - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let lookup = lookup_from(&[("OCR_LANGUAGE", "  "), ("MAX_TOKENS", "")]);
        let settings = Settings::default().with_overrides(&lookup).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_bool_names_variable() {
        let lookup = lookup_from(&[("BATCH_CASE_INSENSITIVE", "maybe")]);
        let err = Settings::default().with_overrides(&lookup).unwrap_err();
        match err {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, "BATCH_CASE_INSENSITIVE"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_value_trims() {
        let n: u32 = parse_value("MAX_TOKENS", " 512 ").unwrap();
        assert_eq!(n, 512);
        assert!(parse_value::<u32>("MAX_TOKENS", "lots").is_err());
    }
}
