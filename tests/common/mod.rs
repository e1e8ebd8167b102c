//! Shared fixtures for suite integration tests.

#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Writes a minimal test-case document titled `title` at `dir/relative`.
pub fn write_test_case(dir: &Path, relative: &str, title: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let body = format!(
        "<html><head><title>{title}</title></head><body>\n<table><thead><tr><td>{title}</td></tr></thead>\n<tbody><tr><td>open</td><td>/</td><td></td></tr></tbody></table>\n</body></html>\n"
    );
    fs::write(&path, body).unwrap();
    path
}

/// Reads back `(stored filename, title)` pairs in suite order.
pub fn pairs(suite: &suitekit::SuiteDocument) -> Vec<(String, String)> {
    suite
        .tests()
        .iter()
        .map(|case| (case.filename().unwrap_or_default().to_string(), case.title()))
        .collect()
}
