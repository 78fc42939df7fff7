//! Configuration structures.
//!
//! Configuration starts from defaults, or from the JSON file named by
//! `MARSHAL_JSON_CONFIG`, and is overlaid from the remaining environment
//! variables (see [`Config::from_env`]).

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Error, Result};

/// Default nesting limit for both decoding and encoding.
pub const DEFAULT_MAX_DEPTH: usize = 900;

/// Global configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Marshal decoder configuration.
    #[serde(default)]
    pub decode: DecodeConfig,

    /// Typed JSON encoder configuration.
    #[serde(default)]
    pub encode: EncodeConfig,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

/// Marshal decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Maximum object nesting accepted before failing.
    pub max_depth: usize,

    /// Whether code objects carry `co_posonlyargcount` (CPython 3.8+).
    pub has_posonlyargcount: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            has_posonlyargcount: true,
        }
    }
}

/// How non-finite floats (NaN, ±inf) are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonFinitePolicy {
    /// Emit `"nan"`, `"inf"` or `"-inf"` inside a `float` envelope.
    #[default]
    Sentinel,
    /// Fail the encoding.
    Error,
}

impl std::str::FromStr for NonFinitePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sentinel" => Ok(NonFinitePolicy::Sentinel),
            "error" => Ok(NonFinitePolicy::Error),
            other => Err(Error::config(format!(
                "non-finite policy must be 'sentinel' or 'error', got {other:?}"
            ))),
        }
    }
}

/// Typed JSON encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Maximum value nesting encoded before failing.
    pub max_depth: usize,

    /// Rendering of NaN and infinities.
    pub non_finite: NonFinitePolicy,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            non_finite: NonFinitePolicy::default(),
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing sections and fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| Error::config(format!("{}: {err}", path.display())))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Defaults (or the `MARSHAL_JSON_CONFIG` file) overlaid with the other
    /// `MARSHAL_JSON_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("MARSHAL_JSON_CONFIG") {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(level) = lookup("MARSHAL_JSON_LOG_LEVEL") {
            config.observability.log_level = level;
        }
        if let Some(format) = lookup("MARSHAL_JSON_LOG_FORMAT") {
            config.observability.json_logs = format.eq_ignore_ascii_case("json");
        }
        if let Some(depth) = lookup("MARSHAL_JSON_MAX_DEPTH") {
            let depth: usize = depth.parse().map_err(|_| {
                Error::config(format!(
                    "MARSHAL_JSON_MAX_DEPTH must be a positive integer, got {depth:?}"
                ))
            })?;
            if depth == 0 {
                return Err(Error::config("MARSHAL_JSON_MAX_DEPTH must be positive"));
            }
            config.decode.max_depth = depth;
            config.encode.max_depth = depth;
        }
        if let Some(policy) = lookup("MARSHAL_JSON_NON_FINITE") {
            config.encode.non_finite = policy.parse()?;
        }

        Ok(config)
    }
}
