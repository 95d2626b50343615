//! Engine options loaded from a TOML file
//!
//! ```toml
//! serialize_nulls = true
//!
//! [limits]
//! max_resolution_depth = 32
//! max_number_len = 256
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tjson_io::{EngineOptions, Limits};

/// Failure to load a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid config TOML
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    serialize_nulls: Option<bool>,
    limits: LimitsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LimitsSection {
    max_resolution_depth: Option<usize>,
    max_number_len: Option<usize>,
}

impl ConfigFile {
    fn into_options(self) -> EngineOptions {
        let defaults = Limits::default();
        EngineOptions {
            serialize_nulls: self.serialize_nulls.unwrap_or(false),
            limits: Limits {
                max_resolution_depth: self
                    .limits
                    .max_resolution_depth
                    .unwrap_or(defaults.max_resolution_depth),
                max_number_len: self
                    .limits
                    .max_number_len
                    .unwrap_or(defaults.max_number_len),
            },
        }
    }
}

/// Parse engine options from TOML text
pub fn parse_options(text: &str, path: &Path) -> Result<EngineOptions, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.into_options())
}

/// Load engine options from `path`, or defaults when no path is given
pub fn load_options(path: Option<&Path>) -> Result<EngineOptions, ConfigError> {
    let Some(path) = path else {
        return Ok(EngineOptions::default());
    };
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let options = parse_options(&text, path)?;
    tracing::debug!(path = %path.display(), ?options, "loaded config");
    Ok(options)
}
