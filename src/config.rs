//! Layered scan configuration.
//!
//! Settings are resolved from built-in defaults, then `STEPSCAN_*`
//! environment variables, then explicit overrides such as command-line flags.
//! Later layers win.

use crate::annotations::STEP_MARKER;
use camino::Utf8Path;
use ortho_config::figment::Figment;
use ortho_config::figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of environment variables read by [`ScanConfig::load`].
pub const ENV_PREFIX: &str = "STEPSCAN_";

/// Extensions scanned when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["kt", "kts"];

/// Failures while resolving a [`ScanConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read or did not match the expected shape.
    #[error("failed to load scan configuration: {0}")]
    Load(#[from] Box<ortho_config::figment::Error>),
    /// The step marker resolved to an empty name.
    #[error("step marker must not be empty")]
    EmptyMarker,
    /// No source file extensions remain after merging.
    #[error("at least one source extension must be configured")]
    NoExtensions,
}

/// Options controlling which files and annotations a scan considers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Annotation name marking step implementations.
    pub marker: String,
    /// File extensions, without the leading dot, accepted for scanning.
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            marker: STEP_MARKER.to_owned(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|&ext| ext.to_owned()).collect(),
        }
    }
}

impl ScanConfig {
    /// Defaults merged with `STEPSCAN_*` environment variables.
    #[must_use]
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    /// Resolve defaults and environment, applying `marker` last when given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a layer cannot be extracted or the merged
    /// configuration is unusable.
    pub fn load(marker: Option<&str>) -> Result<Self, ConfigError> {
        let mut figment = Self::figment();
        if let Some(name) = marker {
            figment = figment.merge(Serialized::default("marker", name));
        }
        Self::from_figment(&figment)
    }

    /// Extract and validate a configuration from `figment`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction fails, the marker is blank, or
    /// no extensions are configured.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let mut config: Self = figment.extract().map_err(Box::new)?;
        config.marker = config.marker.trim().to_owned();
        if config.marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        config.extensions = config
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_owned())
            .filter(|ext| !ext.is_empty())
            .collect();
        if config.extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        Ok(config)
    }

    /// Whether `file` carries one of the configured extensions.
    #[must_use]
    pub fn accepts(&self, file: &str) -> bool {
        Utf8Path::new(file)
            .extension()
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}
