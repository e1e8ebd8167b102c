pub use crate::diagnostics::{ErrorContext, ErrorType, SuiteError};
pub use crate::picker::{FilePicker, FixedPicker, PickRequest, PickerMode, TEST_SUITE_DIRECTORY_PREF};
pub use crate::prefs::Preferences;
pub use crate::suite::{SaveOutcome, SubscriptionId, SuiteDocument, SuiteEntry, SuiteEvent};
pub use crate::test_case::{
    content_handle, ContentHandle, OpenTestCase, TestCaseContent, TestCaseId, TestCaseRef,
};

pub mod cli;
pub mod diagnostics;
pub mod discovery;
pub mod path;
pub mod picker;
pub mod prefs;
pub mod suite;
pub mod table;
pub mod test_case;
