//! TOML configuration for the `tax-calc` binary.
//!
//! ```toml
//! default_status = "single"
//! year_policy = "reject"          # or "latest"
//! standard_deduction_floor = true
//! data_dir = "data"               # builtin datasets when absent
//!
//! [log]
//! level = "info"
//! file = "tax-calc.log"
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tax_core::FilingStatus;
use thiserror::Error;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "tax-calc.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// What to do when a request names a year with no loaded data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YearPolicy {
    /// Fail the request.
    #[default]
    Reject,
    /// Substitute the most recent supported year.
    Latest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: Option<String>,
    /// Append log records to this file in addition to stderr.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_status: FilingStatus,
    pub year_policy: YearPolicy,
    /// Raise supplied deductions below the standard deduction up to it.
    pub standard_deduction_floor: bool,
    /// Directory of `<year>.json` documents replacing the builtin data.
    pub data_dir: Option<PathBuf>,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_status: FilingStatus::Single,
            year_policy: YearPolicy::Reject,
            standard_deduction_floor: true,
            data_dir: None,
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text, path)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Loads `explicit` if given (it must exist), otherwise
    /// [`DEFAULT_CONFIG_FILE`] from `cwd` if present, otherwise defaults.
    pub fn discover(
        explicit: Option<&Path>,
        cwd: &Path,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = cwd.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(text: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::from_toml(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn defaults_reject_unknown_years_and_floor_deductions() {
        let config = AppConfig::default();

        assert_eq!(config.year_policy, YearPolicy::Reject);
        assert!(config.standard_deduction_floor);
        assert_eq!(config.default_status, FilingStatus::Single);
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn parses_all_keys() {
        let config = parse(
            r#"
            default_status = "headOfHousehold"
            year_policy = "latest"
            standard_deduction_floor = false
            data_dir = "/srv/tax-data"

            [log]
            level = "debug"
            file = "calc.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_status, FilingStatus::HeadOfHousehold);
        assert_eq!(config.year_policy, YearPolicy::Latest);
        assert!(!config.standard_deduction_floor);
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/tax-data")));
        assert_eq!(config.log.level.as_deref(), Some("debug"));
        assert_eq!(config.log.file, Some(PathBuf::from("calc.log")));
    }

    #[test]
    fn partial_log_section_keeps_other_defaults() {
        let config = parse("[log]\nlevel = \"warn\"\n").unwrap();

        assert_eq!(config.log.file, None);
        assert_eq!(config.year_policy, YearPolicy::Reject);
    }

    #[test]
    fn unknown_policy_is_parse_error() {
        let err = parse("year_policy = \"closest\"").unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn discover_without_file_uses_defaults() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");

        assert_eq!(AppConfig::discover(None, &dir).unwrap(), AppConfig::default());
    }

    #[test]
    fn discover_explicit_missing_file_is_error() {
        let missing = Path::new("definitely/not/here.toml");

        let err = AppConfig::discover(Some(missing), Path::new(".")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
