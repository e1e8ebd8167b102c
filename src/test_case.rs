//! Test-case references: the rows of a suite.
//!
//! A `TestCaseRef` is either a stored `(filename, title)` pair read from a suite file, or a
//! link to a test case that is currently open in memory. While a link is present, the open
//! test case is the authority for the title and path; the stored pair is only refreshed
//! when the suite is saved.

use std::{
    cell::RefCell,
    fmt,
    path::{Path, PathBuf},
    rc::Rc,
};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{path, SuiteError};

lazy_static! {
    static ref TITLE_ELEMENT: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
}

/// A live test case owned by whoever opened it.
pub trait TestCaseContent: fmt::Debug {
    /// Display form of the backing file, if the test case has been saved.
    fn filename(&self) -> Option<String>;
    /// The backing file, if the test case has been saved.
    fn file(&self) -> Option<PathBuf>;
    fn title(&self) -> String;
    fn set_title(&mut self, title: String);
}

/// Shared handle to live content. References never own what they point at.
pub type ContentHandle = Rc<RefCell<dyn TestCaseContent>>;

/// Wraps content into a shareable handle.
pub fn content_handle<C: TestCaseContent + 'static>(content: C) -> ContentHandle {
    Rc::new(RefCell::new(content))
}

/// A plain open test case: an optional backing file and a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTestCase {
    pub file: Option<PathBuf>,
    pub title: String,
}

impl OpenTestCase {
    /// An unsaved test case.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            file: None,
            title: title.into(),
        }
    }

    pub fn with_file(file: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            title: title.into(),
        }
    }

    /// Opens a test-case file, titling it from its `<title>` element or, failing that,
    /// its file stem.
    pub fn load(file: &Path) -> Result<Self, SuiteError> {
        let text =
            std::fs::read_to_string(file).map_err(|e| SuiteError::io(file, "read test case", e))?;
        let title = title_from_html(&text)
            .or_else(|| {
                file.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_default();
        Ok(Self::with_file(file, title))
    }
}

impl TestCaseContent for OpenTestCase {
    fn filename(&self) -> Option<String> {
        self.file.as_ref().map(|f| f.display().to_string())
    }

    fn file(&self) -> Option<PathBuf> {
        self.file.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }
}

/// Returns the trimmed text of the first non-empty `<title>` element.
pub fn title_from_html(text: &str) -> Option<String> {
    let caps = TITLE_ELEMENT.captures(text)?;
    let title = caps.get(1)?.as_str().trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Stable identity of a reference within its suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestCaseId(pub(crate) u64);

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One row of a suite.
///
/// Operations that depend on where the suite lives take the suite file as a plain
/// borrowed argument; `SuiteEntry` bundles that borrow for callers.
#[derive(Debug, Clone)]
pub struct TestCaseRef {
    id: TestCaseId,
    filename: Option<String>,
    title: Option<String>,
    content: Option<ContentHandle>,
}

impl TestCaseRef {
    pub(crate) fn from_row(id: TestCaseId, filename: String, title: String) -> Self {
        Self {
            id,
            filename: Some(filename),
            title: Some(title),
            content: None,
        }
    }

    pub(crate) fn from_content(id: TestCaseId, content: ContentHandle) -> Self {
        Self {
            id,
            filename: None,
            title: None,
            content: Some(content),
        }
    }

    pub fn id(&self) -> TestCaseId {
        self.id
    }

    /// The stored, suite-relative filename.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn content(&self) -> Option<&ContentHandle> {
        self.content.as_ref()
    }

    pub fn title(&self) -> String {
        match &self.content {
            Some(content) => content.borrow().title(),
            None => self.title.clone().unwrap_or_default(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        match &self.content {
            Some(content) => content.borrow_mut().set_title(title),
            None => self.title = Some(title),
        }
    }

    /// The open test case's filename when linked, otherwise the stored one.
    pub fn file_path(&self) -> Option<String> {
        match &self.content {
            Some(content) => content.borrow().filename(),
            None => self.filename.clone(),
        }
    }

    /// The path written into the suite: computed from the suite file to the open test
    /// case's file when both are known, otherwise the stored filename.
    pub fn relative_file_path(&self, suite_file: Option<&Path>) -> Option<String> {
        let content_file = self.content.as_ref().and_then(|c| c.borrow().file());
        match (suite_file, content_file) {
            (Some(suite_file), Some(target)) => Some(path::suite_relative_path(suite_file, &target)),
            _ => self.filename.clone(),
        }
    }

    /// Resolves the stored filename against the suite's directory.
    pub fn file(&self, suite_file: Option<&Path>) -> Option<PathBuf> {
        let dir = suite_file?.parent().unwrap_or_else(|| Path::new(""));
        let filename = self.filename.as_deref()?;
        Some(path::resolve_relative(dir, filename))
    }

    /// Copies the live path and title into the stored pair after a save.
    pub(crate) fn sync_stored(&mut self, path: String) {
        if let Some(content) = &self.content {
            let title = content.borrow().title();
            self.title = Some(title);
            self.filename = Some(path);
        }
    }
}
