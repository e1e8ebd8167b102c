//! File-picker collaborator used by suite open and save flows.

use std::path::PathBuf;

use crate::prefs::Preferences;

/// Preference key under which suite pickers remember their directory.
pub const TEST_SUITE_DIRECTORY_PREF: &str = "testSuiteDirectory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    Open,
    Save,
}

/// What the caller wants picked.
#[derive(Debug, Clone, Copy)]
pub struct PickRequest<'a> {
    pub mode: PickerMode,
    pub title: &'a str,
    /// Preference key for the remembered directory.
    pub pref_key: &'a str,
    /// Extension appended to save targets that have none (without the dot).
    pub default_extension: Option<&'a str>,
}

/// Chooses a file. `None` means the user cancelled.
pub trait FilePicker {
    fn pick(&mut self, request: PickRequest<'_>) -> Option<PathBuf>;
}

/// Non-interactive picker answering with a path decided up front.
///
/// Relative choices resolve against the directory remembered under the request's
/// preference key; the directory of every answer is remembered for the next pick.
#[derive(Debug)]
pub struct FixedPicker<'p> {
    choice: Option<PathBuf>,
    prefs: &'p mut Preferences,
}

impl<'p> FixedPicker<'p> {
    pub fn new(choice: Option<PathBuf>, prefs: &'p mut Preferences) -> Self {
        Self { choice, prefs }
    }

    /// A picker whose user always cancels.
    pub fn cancelled(prefs: &'p mut Preferences) -> Self {
        Self::new(None, prefs)
    }
}

impl FilePicker for FixedPicker<'_> {
    fn pick(&mut self, request: PickRequest<'_>) -> Option<PathBuf> {
        let choice = self.choice.take()?;
        let mut path = match self.prefs.directory(request.pref_key) {
            Some(dir) if choice.is_relative() => dir.join(&choice),
            _ => choice,
        };
        if request.mode == PickerMode::Save && path.extension().is_none() {
            if let Some(ext) = request.default_extension {
                path.set_extension(ext);
            }
        }
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.prefs.remember_directory(request.pref_key, dir);
        }
        tracing::debug!(title = request.title, path = %path.display(), "picked file");
        Some(path)
    }
}

/// Convenience for picking a suite file with the standard key.
pub fn pick_suite(picker: &mut dyn FilePicker, mode: PickerMode) -> Option<PathBuf> {
    let (title, default_extension) = match mode {
        PickerMode::Open => ("Select a suite file", None),
        PickerMode::Save => ("Save suite", Some("html")),
    };
    picker.pick(PickRequest {
        mode,
        title,
        pref_key: TEST_SUITE_DIRECTORY_PREF,
        default_extension,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_save_pick_appends_extension_and_remembers_dir() {
        let mut prefs = Preferences::default();
        let picked = {
            let mut picker = FixedPicker::new(Some(PathBuf::from("/suites/smoke")), &mut prefs);
            pick_suite(&mut picker, PickerMode::Save).unwrap()
        };
        assert_eq!(picked, PathBuf::from("/suites/smoke.html"));
        assert_eq!(
            prefs.directory(TEST_SUITE_DIRECTORY_PREF),
            Some(Path::new("/suites"))
        );
    }

    #[test]
    fn test_relative_pick_uses_remembered_dir() {
        let mut prefs = Preferences::default();
        prefs.remember_directory(TEST_SUITE_DIRECTORY_PREF, "/suites");
        let mut picker = FixedPicker::new(Some(PathBuf::from("nightly.html")), &mut prefs);
        let picked = pick_suite(&mut picker, PickerMode::Open).unwrap();
        assert_eq!(picked, PathBuf::from("/suites/nightly.html"));
    }

    #[test]
    fn test_answers_once_then_cancels() {
        let mut prefs = Preferences::default();
        {
            let mut picker = FixedPicker::new(Some(PathBuf::from("a.html")), &mut prefs);
            assert!(pick_suite(&mut picker, PickerMode::Open).is_some());
            assert!(pick_suite(&mut picker, PickerMode::Open).is_none());
        }

        let mut picker = FixedPicker::cancelled(&mut prefs);
        assert!(pick_suite(&mut picker, PickerMode::Save).is_none());
    }
}
