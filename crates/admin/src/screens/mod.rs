//! One module per admin screen.

pub mod blogs;
pub mod courses;
pub mod dashboard;
pub mod instructors;
pub mod login;

use upbreed_core::validation::FormErrors;
use upbreed_events::{Notification, NotificationLevel, NotificationSink, Toast};
use upbreed_query::FetchError;

use crate::app::AdminApp;

/// Result of submitting a create/edit form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome<R> {
    /// Validation failed; nothing was sent.
    Invalid(FormErrors),
    /// An edit equal to what was loaded; nothing was sent.
    Unchanged,
    Saved(R),
    Failed(FetchError),
}

impl<R> FormOutcome<R> {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

fn notify_unchanged(app: &AdminApp) {
    app.notifier().notify(Notification::new(
        NotificationLevel::Info,
        &Toast::new("Info", "No changes made"),
    ));
}
