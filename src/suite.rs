//! The suite document: an ordered list of test-case references backed by an HTML file.
//!
//! Loading is lenient: only the first `<table>` matters,
//! rows are read one after another, and rows without a link are header or decoration
//! rows that get skipped. The only fatal shape error is a document with no table.

use std::{
    fmt,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{
    err_src,
    path::absolutize,
    picker::{pick_suite, FilePicker, PickerMode},
    table::{self, RowScanner},
    test_case::{ContentHandle, TestCaseId, TestCaseRef},
    SuiteError,
};

lazy_static! {
    static ref UNTITLED: Regex = Regex::new(r"^Untitled").unwrap();
    static ref UNTITLED_NUMBERED: Regex = Regex::new(r"^Untitled (\d+)").unwrap();
}

/// Title given to the first new test case of a suite.
pub const UNTITLED_TITLE: &str = "Untitled";

/// Changes observers can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuiteEvent {
    TestCaseAdded,
    TestCaseRemoved,
}

impl SuiteEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteEvent::TestCaseAdded => "testCaseAdded",
            SuiteEvent::TestCaseRemoved => "testCaseRemoved",
        }
    }
}

impl fmt::Display for SuiteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(SuiteEvent, &TestCaseRef)>;

/// Result of a save that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// No destination was chosen; nothing was written.
    Cancelled,
}

/// An ordered collection of test-case references.
#[derive(Default)]
pub struct SuiteDocument {
    tests: Vec<TestCaseRef>,
    file: Option<PathBuf>,
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for SuiteDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteDocument")
            .field("tests", &self.tests)
            .field("file", &self.file)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SuiteDocument {
    /// A new, unsaved, empty suite.
    pub fn new() -> Self {
        Self::default()
    }

    // =====================
    // Loading
    // =====================

    /// Decodes suite text.
    pub fn load_str(content: &str) -> Result<Self, SuiteError> {
        Self::load_named(content, "suite")
    }

    /// Reads and decodes a suite file, remembering it as the backing file.
    pub fn load_file(path: &Path) -> Result<Self, SuiteError> {
        let bytes = std::fs::read(path).map_err(|e| SuiteError::io(path, "read suite", e))?;
        let content = String::from_utf8_lossy(&bytes);
        let mut suite = Self::load_named(&content, &path.display().to_string())?;
        suite.file = Some(path.to_path_buf());
        info!(path = %path.display(), tests = suite.tests.len(), "loaded suite");
        Ok(suite)
    }

    /// Asks `picker` for a suite file and loads it. `Ok(None)` when the user cancels.
    pub fn load_with(picker: &mut dyn FilePicker) -> Result<Option<Self>, SuiteError> {
        match pick_suite(picker, PickerMode::Open) {
            Some(path) => Self::load_file(&path).map(Some),
            None => Ok(None),
        }
    }

    fn load_named(content: &str, name: &str) -> Result<Self, SuiteError> {
        let Some(table) = table::find_table(content) else {
            return Err(err_src!(
                Parse,
                "<table> tag not found",
                content,
                name,
                "A suite file lists its test cases in an HTML <table>; this document has none."
            ));
        };

        let mut suite = Self::new();
        for row in RowScanner::new(table.text) {
            let Some(anchor) = table::parse_anchor(row.text) else {
                debug!(offset = table.offset + row.offset, "skipping row without link");
                continue;
            };
            let filename = table::decode_href(anchor.href).into_owned();
            debug!(%filename, title = anchor.label, "read suite row");
            let id = suite.allocate_id();
            suite
                .tests
                .push(TestCaseRef::from_row(id, filename, anchor.label.to_string()));
        }
        Ok(suite)
    }

    // =====================
    // Saving
    // =====================

    /// Renders the suite document, computing paths against the current backing file.
    ///
    /// Fails when a test case linked to open content has no file yet, since its row would
    /// have no link to write.
    pub fn to_html(&self) -> Result<String, SuiteError> {
        self.render(self.file.as_deref())
    }

    fn render(&self, suite_file: Option<&Path>) -> Result<String, SuiteError> {
        let rows = self
            .tests
            .iter()
            .map(|case| {
                let path = case
                    .relative_file_path(suite_file)
                    .or_else(|| case.file_path())
                    .filter(|path| !path.is_empty());
                match path {
                    Some(path) => Ok((path, case.title())),
                    None => Err(SuiteError::unsaved_test_case(&case.title())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(table::format_document(rows))
    }

    /// Saves to the backing file, asking `picker` for one when there is none or when
    /// `save_as` is set.
    pub fn save(
        &mut self,
        picker: &mut dyn FilePicker,
        save_as: bool,
    ) -> Result<SaveOutcome, SuiteError> {
        let destination = match &self.file {
            Some(file) if !save_as => file.clone(),
            _ => match pick_suite(picker, PickerMode::Save) {
                Some(path) => path,
                None => {
                    info!("suite not saved: no destination chosen");
                    return Ok(SaveOutcome::Cancelled);
                }
            },
        };
        let saved = self.save_to(&destination)?;
        Ok(SaveOutcome::Saved(saved))
    }

    /// Writes the suite to `path` as UTF-8 and makes `path` the backing file.
    ///
    /// Relative paths are anchored at the working directory first, and that absolute
    /// path is returned. The document is written to a temporary file beside `path` and
    /// moved into place, so a failed save leaves any previous suite file intact.
    pub fn save_to(&mut self, path: &Path) -> Result<PathBuf, SuiteError> {
        let path = absolutize(path).map_err(|e| SuiteError::io(path, "resolve suite path", e))?;
        let content = self.render(Some(path.as_path()))?;
        let dir = path.parent().unwrap_or_else(|| Path::new("/"));

        let temp = NamedTempFile::new_in(dir).map_err(|e| SuiteError::io(&path, "create suite", e))?;
        if let Ok(existing) = std::fs::metadata(&path) {
            temp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| SuiteError::io(&path, "copy suite permissions", e))?;
        }
        let temp = {
            let mut writer = BufWriter::new(temp);
            writer
                .write_all(content.as_bytes())
                .map_err(|e| SuiteError::io(&path, "write suite", e))?;
            writer
                .into_inner()
                .map_err(|e| SuiteError::io(&path, "flush suite", e.into_error()))?
        };
        temp.persist(&path)
            .map_err(|e| SuiteError::io(&path, "replace suite", e.error))?;

        for case in &mut self.tests {
            if let Some(stored) = case.relative_file_path(Some(path.as_path())) {
                case.sync_stored(stored);
            }
        }
        info!(path = %path.display(), tests = self.tests.len(), "saved suite");
        self.file = Some(path.clone());
        Ok(path)
    }

    // =====================
    // Mutation
    // =====================

    /// Appends a reference to an open test case.
    pub fn add_from_content(&mut self, content: ContentHandle) -> TestCaseId {
        let id = self.allocate_id();
        self.push(TestCaseRef::from_content(id, content))
    }

    /// Appends a reference to a test file that is not open, by suite-relative path.
    pub fn add_reference(&mut self, filename: impl Into<String>, title: impl Into<String>) -> TestCaseId {
        let id = self.allocate_id();
        self.push(TestCaseRef::from_row(id, filename.into(), title.into()))
    }

    fn push(&mut self, case: TestCaseRef) -> TestCaseId {
        let id = case.id();
        self.tests.push(case);
        if let Some(case) = self.tests.last() {
            Self::notify(&mut self.observers, SuiteEvent::TestCaseAdded, case);
        }
        id
    }

    /// Removes a test case. Removing the only remaining test case is refused and leaves
    /// the suite untouched. `Ok(None)` when `id` is not in the suite.
    pub fn remove(&mut self, id: TestCaseId) -> Result<Option<TestCaseRef>, SuiteError> {
        if self.tests.is_empty() {
            return Ok(None);
        }
        if self.tests.len() == 1 {
            warn!(%id, "refusing to remove the last test case");
            return Err(SuiteError::last_test_case());
        }
        let Some(index) = self.tests.iter().position(|case| case.id() == id) else {
            return Ok(None);
        };
        let removed = self.tests.remove(index);
        Self::notify(&mut self.observers, SuiteEvent::TestCaseRemoved, &removed);
        Ok(Some(removed))
    }

    /// Picks a title for a new test case that does not collide with existing
    /// `Untitled N` titles.
    ///
    /// Returns `Untitled` when no title starts with it, otherwise `Untitled {max + 1}` over
    /// every numbered title (a bare `Untitled` counts as 0).
    pub fn generate_new_test_case_title(&self) -> String {
        let titles: Vec<String> = self.tests.iter().map(TestCaseRef::title).collect();
        if !titles.iter().any(|title| UNTITLED.is_match(title)) {
            return UNTITLED_TITLE.to_string();
        }
        let max = titles
            .iter()
            .filter_map(|title| UNTITLED_NUMBERED.captures(title))
            .filter_map(|caps| caps[1].parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        format!("{UNTITLED_TITLE} {}", max.saturating_add(1))
    }

    /// Copies the suite into an independent document.
    ///
    /// The list is new, so adding or removing on either side does not affect the other.
    /// References linked to open test cases still share that content. Observers are not
    /// copied.
    pub fn create_copy(&self) -> Self {
        Self {
            tests: self.tests.clone(),
            file: self.file.clone(),
            next_id: self.next_id,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // =====================
    // Observers
    // =====================

    /// Registers `observer` for every add and remove on this suite.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(SuiteEvent, &TestCaseRef) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(observers: &mut [(SubscriptionId, Observer)], event: SuiteEvent, case: &TestCaseRef) {
        debug!(event = event.as_str(), id = %case.id(), "suite event");
        for (_, observer) in observers.iter_mut() {
            observer(event, case);
        }
    }

    // =====================
    // Access
    // =====================

    pub fn tests(&self) -> &[TestCaseRef] {
        &self.tests
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn set_file(&mut self, file: Option<PathBuf>) {
        self.file = file;
    }

    pub fn get(&self, id: TestCaseId) -> Option<&TestCaseRef> {
        self.tests.iter().find(|case| case.id() == id)
    }

    pub fn get_mut(&mut self, id: TestCaseId) -> Option<&mut TestCaseRef> {
        self.tests.iter_mut().find(|case| case.id() == id)
    }

    /// Entries in suite order, each able to resolve paths against this suite.
    pub fn entries(&self) -> impl Iterator<Item = SuiteEntry<'_>> + '_ {
        self.tests.iter().map(move |case| SuiteEntry { suite: self, case })
    }

    pub fn entry(&self, id: TestCaseId) -> Option<SuiteEntry<'_>> {
        self.get(id).map(|case| SuiteEntry { suite: self, case })
    }

    /// First test case whose current title is exactly `title`.
    pub fn find_by_title(&self, title: &str) -> Option<TestCaseId> {
        self.tests
            .iter()
            .find(|case| case.title() == title)
            .map(TestCaseRef::id)
    }

    fn allocate_id(&mut self) -> TestCaseId {
        let id = TestCaseId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// A test case seen through the suite that holds it.
#[derive(Debug, Clone, Copy)]
pub struct SuiteEntry<'a> {
    suite: &'a SuiteDocument,
    case: &'a TestCaseRef,
}

impl<'a> SuiteEntry<'a> {
    pub fn suite(&self) -> &'a SuiteDocument {
        self.suite
    }

    pub fn test_case(&self) -> &'a TestCaseRef {
        self.case
    }

    pub fn id(&self) -> TestCaseId {
        self.case.id()
    }

    pub fn title(&self) -> String {
        self.case.title()
    }

    pub fn file_path(&self) -> Option<String> {
        self.case.file_path()
    }

    pub fn relative_file_path(&self) -> Option<String> {
        self.case.relative_file_path(self.suite.file())
    }

    /// Absolute location of the test file, `None` while the suite is unsaved.
    pub fn file(&self) -> Option<PathBuf> {
        self.case.file(self.suite.file())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        test_case::{content_handle, OpenTestCase, TestCaseContent},
        ErrorType,
    };

    fn suite_with_titles(titles: &[&str]) -> SuiteDocument {
        let mut suite = SuiteDocument::new();
        for (i, title) in titles.iter().enumerate() {
            suite.add_reference(format!("t{i}.html"), *title);
        }
        suite
    }

    fn pairs(suite: &SuiteDocument) -> Vec<(String, String)> {
        suite
            .tests()
            .iter()
            .map(|c| (c.filename().unwrap_or_default().to_string(), c.title()))
            .collect()
    }

    #[test]
    fn test_load_skips_rows_without_links() {
        let text = "<table><tr><td><a href=\"t1.html\">First</a></td></tr><tr><td><b>ignored</b></td></tr><tr><td><a href=\"sub/t2.html\">Second</a></td></tr></table>";
        let suite = SuiteDocument::load_str(text).unwrap();
        assert_eq!(
            pairs(&suite),
            vec![
                ("t1.html".to_string(), "First".to_string()),
                ("sub/t2.html".to_string(), "Second".to_string()),
            ]
        );
        assert!(suite.file().is_none());
    }

    #[test]
    fn test_load_without_table_fails() {
        let err = SuiteDocument::load_str("<html><body><p>nothing</p></body></html>").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Parse);
        assert!(err.to_string().contains("<table> tag not found"));
    }

    #[test]
    fn test_load_empty_table() {
        let suite = SuiteDocument::load_str("<table>\n<tr><td><b>Test Suite</b></td></tr>\n</table>").unwrap();
        assert!(suite.is_empty());
    }

    #[test]
    fn test_load_decodes_hrefs() {
        let suite = SuiteDocument::load_str("<table><tr><td><a href='my%20tests/a%26b.html'>A &amp; B</a></td></tr></table>").unwrap();
        assert_eq!(pairs(&suite), vec![("my tests/a&b.html".to_string(), "A &amp; B".to_string())]);
    }

    #[test]
    fn test_render_round_trip() {
        let suite = suite_with_titles(&["Login", "Überprüfung", "Search <fast>"]);
        let reloaded = SuiteDocument::load_str(&suite.to_html().unwrap()).unwrap();
        assert_eq!(pairs(&reloaded), pairs(&suite));
    }

    #[test]
    fn test_render_round_trip_keeps_empty_titles() {
        let suite = suite_with_titles(&["A", ""]);
        let reloaded = SuiteDocument::load_str(&suite.to_html().unwrap()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(pairs(&reloaded), pairs(&suite));
    }

    #[test]
    fn test_render_refuses_content_without_file() {
        let mut suite = suite_with_titles(&["A"]);
        suite.add_from_content(content_handle(OpenTestCase::new("Draft")));
        let err = suite.to_html().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Refused);
        assert!(err.to_string().contains("'Draft'"));
    }

    #[test]
    fn test_generate_title_empty_suite() {
        assert_eq!(SuiteDocument::new().generate_new_test_case_title(), "Untitled");
        assert_eq!(suite_with_titles(&["Login"]).generate_new_test_case_title(), "Untitled");
    }

    #[test]
    fn test_generate_title_takes_maximum() {
        assert_eq!(
            suite_with_titles(&["Untitled 2", "Untitled 5"]).generate_new_test_case_title(),
            "Untitled 6"
        );
        assert_eq!(
            suite_with_titles(&["Untitled 5", "Untitled 2"]).generate_new_test_case_title(),
            "Untitled 6"
        );
    }

    #[test]
    fn test_generate_title_bare_untitled() {
        assert_eq!(suite_with_titles(&["Untitled"]).generate_new_test_case_title(), "Untitled 1");
        assert_eq!(
            suite_with_titles(&["Untitled", "Untitled 3"]).generate_new_test_case_title(),
            "Untitled 4"
        );
    }

    #[test]
    fn test_remove_last_is_refused() {
        let mut suite = suite_with_titles(&["Only"]);
        let id = suite.tests()[0].id();
        let err = suite.remove(id).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Refused);
        assert_eq!(suite.len(), 1);
        assert_eq!(suite.tests()[0].id(), id);
    }

    #[test]
    fn test_remove_notifies_observers() {
        let mut suite = suite_with_titles(&["A", "B"]);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        suite.subscribe(move |event, case| sink.borrow_mut().push((event, case.title())));

        let id = suite.tests()[0].id();
        let removed = suite.remove(id).unwrap().unwrap();
        assert_eq!(removed.title(), "A");
        assert_eq!(suite.len(), 1);
        assert_eq!(*events.borrow(), vec![(SuiteEvent::TestCaseRemoved, "A".to_string())]);

        assert!(suite.remove(id).is_err());
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut suite = suite_with_titles(&["A", "B"]);
        let mut other = suite_with_titles(&["X", "Y", "Z"]);
        let foreign = other.add_reference("w.html", "W");
        assert!(suite.remove(foreign).unwrap().is_none());
        assert_eq!(suite.len(), 2);
    }

    #[test]
    fn test_add_from_content_notifies_and_unsubscribe() {
        let mut suite = SuiteDocument::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let sub = suite.subscribe(move |event, case| sink.borrow_mut().push((event.as_str(), case.title())));

        let content = content_handle(OpenTestCase::new("Draft"));
        let id = suite.add_from_content(content);
        assert_eq!(suite.entry(id).unwrap().title(), "Draft");
        assert_eq!(*events.borrow(), vec![("testCaseAdded", "Draft".to_string())]);

        assert!(suite.unsubscribe(sub));
        assert!(!suite.unsubscribe(sub));
        suite.add_reference("x.html", "X");
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn test_create_copy_has_its_own_list() {
        let mut suite = suite_with_titles(&["A", "B"]);
        suite.set_file(Some(PathBuf::from("/suites/s.html")));
        let content = content_handle(OpenTestCase::new("Live"));
        suite.add_from_content(content.clone());

        let mut copy = suite.create_copy();
        assert_eq!(copy.file(), suite.file());
        copy.add_reference("c.html", "C");
        assert_eq!(suite.len(), 3);
        assert_eq!(copy.len(), 4);

        content.borrow_mut().set_title("Renamed".to_string());
        assert_eq!(copy.tests()[2].title(), "Renamed");
    }

    #[test]
    fn test_find_by_title() {
        let suite = suite_with_titles(&["A", "B", "B"]);
        assert_eq!(suite.find_by_title("B"), Some(suite.tests()[1].id()));
        assert_eq!(suite.find_by_title("C"), None);
    }
}
