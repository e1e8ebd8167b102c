use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{test_case::OpenTestCase, SuiteError};

/// Discovers test-case files to put in a suite.
///
/// The discovery process follows this flow:
/// 1. Walk `root` recursively for `.html` / `.htm` files
/// 2. Drop `exclude` (normally the suite file being built)
/// 3. Sort for a deterministic suite order
/// 4. Open each file to read its title
#[derive(Debug)]
pub struct TestCaseDiscoverer;

impl TestCaseDiscoverer {
    /// Recursively scans a directory for test-case files, sorted by path.
    pub fn discover_files(root: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>, SuiteError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                SuiteError::io(&path, "walk directory", e.into())
            })?;

            if !entry.file_type().is_file() || !Self::is_html_file(entry.path()) {
                continue;
            }
            if exclude.is_some_and(|excluded| same_file(entry.path(), excluded)) {
                continue;
            }
            files.push(entry.into_path());
        }
        files.sort();
        Ok(files)
    }

    /// Discovers and opens every test case under `root`.
    pub fn discover_test_cases(
        root: &Path,
        exclude: Option<&Path>,
    ) -> Result<Vec<OpenTestCase>, SuiteError> {
        Self::discover_files(root, exclude)?
            .iter()
            .map(|path| OpenTestCase::load(path))
            .collect()
    }

    fn is_html_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
