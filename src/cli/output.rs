//! Handles all user-facing output for the CLI.
//!
//! Human-readable listings are colorized with `termcolor`; `--json` output goes
//! through `serde_json`. Errors are rendered by `miette`.

use std::path::PathBuf;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::{SuiteDocument, SuiteError};

/// One listed suite member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedTest {
    pub index: usize,
    pub title: String,
    /// Path as written in the suite file.
    pub path: Option<String>,
    /// Absolute location, when the suite has a backing file.
    pub resolved: Option<PathBuf>,
    pub exists: bool,
}

/// Collects the listing rows of a suite.
pub fn listing(suite: &SuiteDocument) -> Vec<ListedTest> {
    suite
        .entries()
        .enumerate()
        .map(|(index, entry)| {
            let resolved = entry.file();
            let exists = resolved.as_ref().is_some_and(|p| p.is_file());
            ListedTest {
                index: index + 1,
                title: entry.title(),
                path: entry.relative_file_path(),
                resolved,
                exists,
            }
        })
        .collect()
}

pub fn print_listing(rows: &[ListedTest]) {
    if rows.is_empty() {
        println!("  No test cases.");
        return;
    }

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for row in rows {
        let color = if row.exists { Color::Green } else { Color::Red };
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
        print!("{} ", if row.exists { "✓" } else { "✗" });
        let _ = stdout.reset();
        println!(
            "{:>3}. {}  ({})",
            row.index,
            row.title,
            row.path.as_deref().unwrap_or("<unsaved>")
        );
    }
}

pub fn print_json(rows: &[ListedTest]) -> Result<(), SuiteError> {
    let text = serde_json::to_string_pretty(rows).map_err(|e| SuiteError::Internal {
        message: "failed to serialize listing".to_string(),
        ctx: crate::ErrorContext::none(),
        source: Some(Box::new(e)),
    })?;
    println!("{text}");
    Ok(())
}

/// Prints a one-line success message in bold green.
pub fn print_success(message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    println!("{message}");
    let _ = stdout.reset();
}

/// Prints a warning line to stderr in yellow.
pub fn print_warning(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
    eprintln!("{message}");
    let _ = stderr.reset();
}

/// Renders an error with its diagnostics to stderr.
pub fn print_error(error: SuiteError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
