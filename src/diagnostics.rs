//!
//! Unified, `miette`-based diagnostics for suite loading, editing, and saving.
//!
//! # Error Construction Macros
//!
//! - **Use `err_msg!` for message-only errors.**
//!   - `err_msg!(Internal, "Unexpected state")`
//!
//! - **Use `err_src!` for errors that point into suite text.**
//!   - `err_src!(Parse, "Missing <table>", source_text, "suite.html", help)`
//!
//! - **Use `SuiteError::io` for failed reads and writes.** It keeps the path and the
//!   underlying `std::io::Error` as the error source.
//!
//! The CLI renders every error through `miette::Report`, so help text and source snippets
//! attached here show up verbatim for the user.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use thiserror::Error;

pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe error classification that corresponds to `SuiteError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Suite text could not be decoded into a table
    Parse,
    /// A mutation was refused because it would break a suite invariant
    Refused,
    /// Reading or writing a file failed
    Io,
    /// The preferences file is unreadable or malformed
    Config,
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "Parse",
            ErrorType::Refused => "Refused",
            ErrorType::Io => "Io",
            ErrorType::Config => "Config",
            ErrorType::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The suite text this error refers to (if any).
    pub source: Option<SourceArc>,
    /// The primary span inside `source` (if any).
    pub span: Option<SourceSpan>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_help(help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..Self::default()
        }
    }

    pub fn with_source(source: SourceArc, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help,
        }
    }
}

/// Unified error type for every suite failure mode.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("Failed to load test suite: {message}")]
    Parse { message: String, ctx: ErrorContext },
    #[error("{message}")]
    LastTestCase { message: String, ctx: ErrorContext },
    #[error("Cannot save suite: {message}")]
    UnsavedTestCase { message: String, ctx: ErrorContext },
    #[error("I/O error on '{}': {message}", .path.display())]
    Io {
        message: String,
        path: PathBuf,
        ctx: ErrorContext,
        #[source]
        source: Option<std::io::Error>,
    },
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl SuiteError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            SuiteError::Parse { ctx, .. } => ctx,
            SuiteError::LastTestCase { ctx, .. } => ctx,
            SuiteError::UnsavedTestCase { ctx, .. } => ctx,
            SuiteError::Io { ctx, .. } => ctx,
            SuiteError::Config { ctx, .. } => ctx,
            SuiteError::Internal { ctx, .. } => ctx,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            SuiteError::Parse { .. } => ErrorType::Parse,
            SuiteError::LastTestCase { .. } | SuiteError::UnsavedTestCase { .. } => {
                ErrorType::Refused
            }
            SuiteError::Io { .. } => ErrorType::Io,
            SuiteError::Config { .. } => ErrorType::Config,
            SuiteError::Internal { .. } => ErrorType::Internal,
        }
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(path: &Path, action: &str, err: std::io::Error) -> Self {
        SuiteError::Io {
            message: format!("failed to {action}: {err}"),
            path: path.to_path_buf(),
            ctx: ErrorContext::none(),
            source: Some(err),
        }
    }

    /// The error raised when removing the only test case left in a suite.
    pub fn last_test_case() -> Self {
        SuiteError::LastTestCase {
            message: "Cannot remove the last test case from a suite".to_string(),
            ctx: ErrorContext::with_help("Add another test case before removing this one."),
        }
    }

    /// The error raised when a suite would reference a test case that has no file yet.
    pub fn unsaved_test_case(title: &str) -> Self {
        SuiteError::UnsavedTestCase {
            message: format!("test case '{title}' has not been saved to a file"),
            ctx: ErrorContext::with_help("Save the test case before saving the suite."),
        }
    }
}

impl Diagnostic for SuiteError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self {
            SuiteError::Parse { .. } => "suitekit::parse",
            SuiteError::LastTestCase { .. } => "suitekit::refused",
            SuiteError::UnsavedTestCase { .. } => "suitekit::unsaved",
            SuiteError::Io { .. } => "suitekit::io",
            SuiteError::Config { .. } => "suitekit::config",
            SuiteError::Internal { .. } => "suitekit::internal",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        let span = ctx.span?;
        let text = match self {
            SuiteError::Parse { message, .. } => Some(message.clone()),
            _ => None,
        };
        Some(Box::new(std::iter::once(LabeledSpan::new(
            text,
            span.offset(),
            span.len().max(1),
        ))))
    }
}

/// Converts suite text into an `Arc<NamedSource<String>>` for use in error contexts.
pub fn to_error_source<S: AsRef<str>>(name: &str, source: S) -> SourceArc {
    Arc::new(NamedSource::new(name, source.as_ref().to_string()))
}

/// Constructs a `SuiteError` variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $msg:expr, $($arg:expr),+) => {
        $crate::SuiteError::$variant {
            message: format!($msg, $($arg),+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
    ($variant:ident, $msg:expr) => {
        $crate::SuiteError::$variant {
            message: format!("{}", $msg),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a `SuiteError::Parse` pointing at the start of the given text.
///
/// The span covers the first line, which is usually enough to identify the document.
#[macro_export]
macro_rules! err_src {
    ($variant:ident, $msg:expr, $text:expr, $name:expr, $help:expr) => {{
        let text: &str = $text;
        let first_line = text.find('\n').unwrap_or(text.len());
        $crate::SuiteError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_source(
                $crate::diagnostics::to_error_source($name, text),
                (0, first_line).into(),
                Some(format!("{}", $help)),
            ),
        }
    }};
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn test_parse_error_renders_help_and_code() {
        let err = crate::err_src!(
            Parse,
            "<table> tag not found",
            "<html><body>no table</body></html>",
            "broken.html",
            "A suite file must contain a <table> listing its test cases."
        );
        assert_eq!(err.error_type(), ErrorType::Parse);
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("<table> tag not found"));
        assert!(output.contains("suitekit::parse"));
        assert!(output.contains("must contain a <table>"));
    }

    #[test]
    fn test_io_error_keeps_path_and_source() {
        let err = SuiteError::io(
            Path::new("/nowhere/suite.html"),
            "read suite",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.error_type(), ErrorType::Io);
        assert!(err.to_string().contains("/nowhere/suite.html"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unsaved_test_case_is_refused() {
        let err = SuiteError::unsaved_test_case("Draft");
        assert_eq!(err.error_type(), ErrorType::Refused);
        assert!(err.to_string().contains("'Draft'"));
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("suitekit::unsaved"));
    }

    #[test]
    fn test_err_msg_formats_arguments() {
        let err = crate::err_msg!(Internal, "bad state {} of {}", 1, 2);
        assert_eq!(err.to_string(), "Internal error: bad state 1 of 2");
    }
}
