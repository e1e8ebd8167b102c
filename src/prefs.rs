//! Persisted preferences: the directories pickers last used, keyed by preference name.
//!
//! Stored as a small YAML document:
//!
//! ```yaml
//! directories:
//!   testSuiteDirectory: /home/qa/suites
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{ErrorContext, SuiteError};

/// File name used when no preferences path is given.
pub const DEFAULT_PREFS_FILE: &str = ".suite-prefs.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub directories: BTreeMap<String, PathBuf>,
}

impl Preferences {
    /// Reads preferences from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(SuiteError::io(path, "read preferences", e)),
        };
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|e| SuiteError::Config {
            message: format!("malformed preferences file '{}'", path.display()),
            ctx: ErrorContext::with_help("Delete the file to start over with default preferences."),
            source: Some(Box::new(e)),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SuiteError> {
        let text = serde_yaml::to_string(self).map_err(|e| SuiteError::Config {
            message: "failed to serialize preferences".to_string(),
            ctx: ErrorContext::none(),
            source: Some(Box::new(e)),
        })?;
        fs::write(path, text).map_err(|e| SuiteError::io(path, "write preferences", e))
    }

    pub fn directory(&self, key: &str) -> Option<&Path> {
        self.directories.get(key).map(PathBuf::as_path)
    }

    pub fn remember_directory(&mut self, key: &str, dir: impl Into<PathBuf>) {
        self.directories.insert(key.to_string(), dir.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_PREFS_FILE);
        let mut prefs = Preferences::default();
        prefs.remember_directory("testSuiteDirectory", "/home/qa/suites");
        prefs.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(
            loaded.directory("testSuiteDirectory"),
            Some(Path::new("/home/qa/suites"))
        );
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "directories: [not, a, map").unwrap();
        let err = Preferences::load(&path).unwrap_err();
        assert_eq!(err.error_type(), crate::ErrorType::Config);
    }
}
