//! Feature Probe
//!
//! Answers "does pattern P appear in file F" for the configuration source,
//! which uses it to drop algorithms whose feature is not enabled.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

/// Probe errors.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read feature file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid feature pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Answers feature queries.
pub trait FeatureProbe {
    /// Whether `pattern` matches anywhere within a single line of the feature source
    fn matches(&self, pattern: &str) -> Result<bool, ProbeError>;
}

/// Probe over a configuration header loaded once from disk.
#[derive(Debug, Clone)]
pub struct HeaderProbe {
    text: String,
}

impl HeaderProbe {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProbeError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProbeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { text })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl FeatureProbe for HeaderProbe {
    fn matches(&self, pattern: &str) -> Result<bool, ProbeError> {
        let re = Regex::new(pattern).map_err(|source| ProbeError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.text.lines().any(|line| re.is_match(line)))
    }
}

/// Probe answering from a fixed set of enabled patterns.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    enabled: HashSet<String>,
}

impl StaticProbe {
    pub fn new<I, S>(enabled: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: enabled.into_iter().map(Into::into).collect(),
        }
    }
}

impl FeatureProbe for StaticProbe {
    fn matches(&self, pattern: &str) -> Result<bool, ProbeError> {
        Ok(self.enabled.contains(pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
#pragma once
#define LIBDIVSUFSORT_FOUND
/* #define GLOG_FOUND */
";

    #[test]
    fn test_header_probe_line_match() {
        let probe = HeaderProbe::from_text(HEADER);
        assert!(probe.matches("^#define LIBDIVSUFSORT_FOUND").unwrap());
        assert!(probe.matches("GLOG_FOUND").unwrap());
        assert!(!probe.matches("^#define GLOG_FOUND").unwrap());
        assert!(!probe.matches("FOUND\\s+#pragma").unwrap());
    }

    #[test]
    fn test_invalid_pattern() {
        let probe = HeaderProbe::from_text(HEADER);
        assert!(matches!(
            probe.matches("(unclosed"),
            Err(ProbeError::Pattern { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = HeaderProbe::load(dir.path().join("config.h")).unwrap_err();
        assert!(matches!(err, ProbeError::Io { .. }));
    }

    #[test]
    fn test_static_probe() {
        let probe = StaticProbe::new(["FEATURE_X"]);
        assert!(probe.matches("FEATURE_X").unwrap());
        assert!(!probe.matches("FEATURE_Y").unwrap());
    }
}
