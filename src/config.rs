//! Algorithm Registry Configuration
//!
//! Handles parsing of the declarative TOML file that describes which
//! algorithms exist, how their template slots may be filled, and which kinds
//! they are registered under. Definitions are referenced by key and resolved
//! into [`AlgorithmSpec`] trees; algorithms gated by a `when` pattern are kept
//! only if the feature probe matches.
//!
//! ```toml
//! [algorithms.lz78]
//! name = "lz78::LZ78Compressor"
//! header = "LZ78Compressor.hpp"
//! slots = [["ascii", "binary"]]
//!
//! [[kinds]]
//! name = "Compressor"
//! algorithms = ["lz78"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::codegen::EmitterConfig;
use crate::model::{AlgorithmSpec, Kind};
use crate::probe::{FeatureProbe, ProbeError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Unknown algorithm `{name}` referenced by `{referenced_by}`")]
    UnknownAlgorithm { name: String, referenced_by: String },

    #[error("Algorithm references form a cycle: {0}")]
    Cycle(String),

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Emitted source settings
    #[serde(default)]
    pub emit: EmitterConfig,

    /// Algorithm definitions by reference key
    #[serde(default)]
    pub algorithms: BTreeMap<String, AlgorithmDef>,

    /// Kinds in emission order
    #[serde(default)]
    pub kinds: Vec<KindDef>,
}

/// One algorithm definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmDef {
    /// Type name used in the type expression
    pub name: String,

    /// Header declaring the type
    pub header: String,

    /// Template slots, each a list of algorithm keys
    #[serde(default)]
    pub slots: Vec<Vec<String>>,

    /// Feature pattern that must match for the algorithm to be enabled
    #[serde(default)]
    pub when: Option<String>,
}

/// One kind and its top-level algorithms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindDef {
    /// Registry type name
    pub name: String,

    /// Top-level algorithm keys
    #[serde(default)]
    pub algorithms: Vec<String>,
}

impl RegistryConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve every kind into algorithm trees, dropping disabled algorithms.
    pub fn resolve(&self, probe: &dyn FeatureProbe) -> ConfigResult<Vec<Kind>> {
        let mut resolver = Resolver {
            config: self,
            probe,
            enabled: HashMap::new(),
            stack: Vec::new(),
        };

        let mut kinds = Vec::with_capacity(self.kinds.len());
        for def in &self.kinds {
            let mut kind = Kind::new(def.name.clone());
            for key in &def.algorithms {
                if let Some(spec) = resolver.resolve(key, &def.name)? {
                    kind.algorithms.push(spec);
                }
            }
            kinds.push(kind);
        }
        Ok(kinds)
    }
}

struct Resolver<'c> {
    config: &'c RegistryConfig,
    probe: &'c dyn FeatureProbe,
    enabled: HashMap<&'c str, bool>,
    stack: Vec<&'c str>,
}

impl<'c> Resolver<'c> {
    fn resolve(&mut self, key: &str, referenced_by: &str) -> ConfigResult<Option<AlgorithmSpec>> {
        let config = self.config;
        let (key, def) =
            config
                .algorithms
                .get_key_value(key)
                .ok_or_else(|| ConfigError::UnknownAlgorithm {
                    name: key.to_string(),
                    referenced_by: referenced_by.to_string(),
                })?;
        let key = key.as_str();

        if self.stack.contains(&key) {
            let mut path = self.stack.clone();
            path.push(key);
            return Err(ConfigError::Cycle(path.join(" -> ")));
        }
        if !self.is_enabled(key, def)? {
            return Ok(None);
        }

        self.stack.push(key);
        let mut spec = AlgorithmSpec::leaf(def.name.clone(), def.header.clone());
        for slot in &def.slots {
            let mut alternatives = Vec::with_capacity(slot.len());
            for alt in slot {
                if let Some(resolved) = self.resolve(alt, key)? {
                    alternatives.push(resolved);
                }
            }
            spec.slots.push(alternatives);
        }
        self.stack.pop();

        Ok(Some(spec))
    }

    fn is_enabled(&mut self, key: &'c str, def: &AlgorithmDef) -> ConfigResult<bool> {
        if let Some(&known) = self.enabled.get(key) {
            return Ok(known);
        }
        let enabled = match &def.when {
            Some(pattern) => self.probe.matches(pattern)?,
            None => true,
        };
        if !enabled {
            warn!(algorithm = key, "disabled by feature probe");
        }
        self.enabled.insert(key, enabled);
        Ok(enabled)
    }
}
