//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::{
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    content_handle,
    discovery::TestCaseDiscoverer,
    test_case::OpenTestCase,
    FixedPicker, Preferences, SaveOutcome, SuiteDocument, SuiteError,
};

pub mod args;
pub mod output;

pub use args::{Command, SuiteArgs};
use output::{listing, print_error, print_json, print_listing, print_success, print_warning};

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    init_tracing();
    let args = SuiteArgs::parse();

    match execute(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            print_error(e);
            process::exit(1);
        }
    }
}

/// Runs one parsed command. `Ok(false)` means the command ran but reported a problem.
pub fn execute(args: SuiteArgs) -> Result<bool, SuiteError> {
    let mut prefs = Preferences::load(&args.prefs)?;

    let ok = match args.command {
        Command::List { suite, json } => {
            let suite = open_suite(&suite, &mut prefs)?;
            let rows = listing(&suite);
            if json {
                print_json(&rows)?;
            } else {
                print_listing(&rows);
            }
            true
        }

        Command::New { suite, from, tests } => {
            let target = absolutize(&suite)?;
            let mut doc = SuiteDocument::new();
            for test in &tests {
                add_test_file(&mut doc, &absolutize(test)?, None)?;
            }
            if let Some(dir) = from {
                let found =
                    TestCaseDiscoverer::discover_test_cases(&absolutize(&dir)?, Some(target.as_path()))?;
                for case in found {
                    doc.add_from_content(content_handle(case));
                }
            }
            save_suite(&mut doc, Some(target), &mut prefs)?
        }

        Command::Add { suite, test, title } => {
            let mut doc = open_suite(&suite, &mut prefs)?;
            add_test_file(&mut doc, &absolutize(&test)?, title)?;
            save_suite(&mut doc, None, &mut prefs)?
        }

        Command::Remove { suite, title } => {
            let mut doc = open_suite(&suite, &mut prefs)?;
            match doc.find_by_title(&title) {
                Some(id) => {
                    doc.remove(id)?;
                    save_suite(&mut doc, None, &mut prefs)?
                }
                None => {
                    print_warning(&format!("No test case titled '{title}' in the suite."));
                    false
                }
            }
        }

        Command::Check { suite } => {
            let suite = open_suite(&suite, &mut prefs)?;
            let missing: Vec<_> = listing(&suite).into_iter().filter(|row| !row.exists).collect();
            for row in &missing {
                print_warning(&format!(
                    "missing: {} ({})",
                    row.title,
                    row.resolved
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                ));
            }
            if missing.is_empty() {
                print_success(&format!("All {} test cases present.", suite.len()));
            }
            missing.is_empty()
        }
    };

    prefs.save(&args.prefs)?;
    Ok(ok)
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_suite(path: &Path, prefs: &mut Preferences) -> Result<SuiteDocument, SuiteError> {
    let mut picker = FixedPicker::new(Some(absolutize(path)?), prefs);
    SuiteDocument::load_with(&mut picker)?
        .ok_or_else(|| crate::err_msg!(Internal, "no suite file chosen"))
}

/// Saves through the picker. `target` is only consulted when the suite has no file yet.
fn save_suite(
    doc: &mut SuiteDocument,
    target: Option<PathBuf>,
    prefs: &mut Preferences,
) -> Result<bool, SuiteError> {
    let mut picker = FixedPicker::new(target, prefs);
    match doc.save(&mut picker, false)? {
        SaveOutcome::Saved(path) => {
            print_success(&format!("Saved {} test cases to {}", doc.len(), path.display()));
            Ok(true)
        }
        SaveOutcome::Cancelled => {
            print_warning("Suite not saved.");
            Ok(false)
        }
    }
}

/// Links a test-case file into the suite. Files that do not exist yet are added under
/// the given title or a fresh `Untitled` title.
fn add_test_file(
    doc: &mut SuiteDocument,
    test: &Path,
    title: Option<String>,
) -> Result<(), SuiteError> {
    let mut case = if test.is_file() {
        OpenTestCase::load(test)?
    } else {
        OpenTestCase::with_file(test, doc.generate_new_test_case_title())
    };
    if let Some(title) = title {
        case.title = title;
    }
    doc.add_from_content(content_handle(case));
    Ok(())
}

fn absolutize(path: &Path) -> Result<PathBuf, SuiteError> {
    crate::path::absolutize(path).map_err(|e| SuiteError::io(path, "read working directory", e))
}
