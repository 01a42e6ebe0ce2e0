//! Analyser configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! reference_dir: ./reference
//! exclude:
//!   - Check Network Synchronization
//! jobs: 4
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::CheckRegistry;

const CONFIG_VERSION: &str = "1.0";

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_reference_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Settings shared by every node analysed in one run.
///
/// # Examples
///
/// ```
/// use node_health_engine::config::AnalyserConfig;
///
/// let config: AnalyserConfig = serde_yaml::from_str("exclude: [Check Disabled MOs]").unwrap();
/// assert!(!config.is_enabled("Check Disabled MOs"));
/// assert!(config.is_enabled("Check active Alarms"));
/// assert_eq!(
///     config.reference_path("Alarms_and_events.tsv"),
///     std::path::Path::new("./Alarms_and_events.tsv"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyserConfig {
    /// Configuration format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Directory holding the alarm catalogues named by checks.
    #[serde(default = "default_reference_dir")]
    pub reference_dir: PathBuf,
    /// Captions of checks to skip. Skipped checks still get a row.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Nodes analysed in parallel; `None` or `0` lets rayon decide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            reference_dir: default_reference_dir(),
            exclude: Vec::new(),
            jobs: None,
        }
    }
}

impl AnalyserConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written, or
    /// [`ConfigError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` unless `caption` is in the exclusion list.
    pub fn is_enabled(&self, caption: &str) -> bool {
        !self.exclude.iter().any(|excluded| excluded == caption)
    }

    /// Resolves a catalogue file name against the reference directory.
    pub fn reference_path(&self, file_name: &str) -> PathBuf {
        self.reference_dir.join(file_name)
    }

    /// Checks that every excluded caption names a check in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing the unknown captions.
    pub fn validate(&self, registry: &CheckRegistry) -> Result<(), ConfigError> {
        let unknown = self
            .exclude
            .iter()
            .filter(|caption| registry.find(caption).is_none())
            .map(String::as_str)
            .collect::<Vec<_>>();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "unknown check caption(s) in exclude: {}",
                unknown.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
reference_dir: /srv/reference
exclude:
  - Check Network Synchronization
  - Check Disabled MOs
jobs: 8
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: AnalyserConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.reference_dir, PathBuf::from("/srv/reference"));
        assert_eq!(config.exclude.len(), 2);
        assert_eq!(config.jobs, Some(8));
    }

    #[test]
    fn test_deserialize_empty_document_uses_defaults() {
        let config: AnalyserConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AnalyserConfig::default());
    }

    #[test]
    fn test_is_enabled() {
        let config: AnalyserConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert!(!config.is_enabled("Check Disabled MOs"));
        assert!(config.is_enabled("Check active Alarms"));
    }

    #[test]
    fn test_reference_path() {
        let config: AnalyserConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(
            config.reference_path("Alarms_and_events.tsv"),
            PathBuf::from("/srv/reference/Alarms_and_events.tsv")
        );
    }

    #[test]
    fn test_validate_against_registry() {
        let registry = CheckRegistry::standard();
        let config: AnalyserConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert!(config.validate(registry).is_ok());

        let bad = AnalyserConfig {
            exclude: vec!["Check Everything".to_string()],
            ..AnalyserConfig::default()
        };
        let err = bad.validate(registry).unwrap_err();
        assert!(err.to_string().contains("Check Everything"));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node-health.yml");

        let original: AnalyserConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = AnalyserConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalyserConfig::load("/nonexistent/node-health.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
