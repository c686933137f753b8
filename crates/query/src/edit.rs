//! Edit forms pre-filled from a detail fetch.
//!
//! An [`EditSession`] keeps the loaded baseline next to the draft the user
//! is editing. Submitting validates the draft, then sends only the fields
//! that differ from the baseline. An unchanged form makes no request.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use upbreed_core::diff::changed_fields;
use upbreed_core::validation::{check, FormErrors};
use upbreed_events::{Notification, NotificationLevel, NotificationSink, Toast};
use validator::Validate;

use crate::error::FetchError;
use crate::mutation::{MutateOptions, Mutation, MutationOutcome};

/// What a submit hands to the save mutation.
#[derive(Debug, Clone)]
pub struct Changes<F> {
    /// The full draft, for fields that cannot be diffed as JSON (files).
    pub draft: F,
    /// Serialized draft fields that differ from the baseline.
    pub fields: Map<String, Value>,
}

impl<F> Changes<F> {
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<R> {
    /// The draft failed validation; nothing was sent.
    Invalid(FormErrors),
    /// The draft equals the baseline; nothing was sent.
    Unchanged,
    Saved(R),
    Failed(FetchError),
}

pub struct EditSession<F> {
    baseline: F,
    draft: F,
    notifier: Arc<dyn NotificationSink>,
}

impl<F> EditSession<F>
where
    F: Serialize + Validate + Clone + Send + 'static,
{
    pub fn new(baseline: F, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            draft: baseline.clone(),
            baseline,
            notifier,
        }
    }

    pub fn baseline(&self) -> &F {
        &self.baseline
    }

    pub fn draft(&self) -> &F {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut F {
        &mut self.draft
    }

    /// Draft fields that differ from the baseline.
    pub fn changes(&self) -> Map<String, Value> {
        changed_fields(&to_json(&self.baseline), &to_json(&self.draft))
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes().is_empty()
    }

    /// Throw the draft away.
    pub fn reset(&mut self) {
        self.draft = self.baseline.clone();
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        check(&self.draft)
    }

    /// Validate and save the changed fields through `save`.
    ///
    /// On success the saved draft becomes the new baseline.
    pub async fn submit<R>(&mut self, save: &Mutation<Changes<F>, R>) -> SubmitOutcome<R>
    where
        R: Clone + Send + Sync + 'static,
    {
        if let Err(errors) = self.validate() {
            tracing::debug!(fields = %errors, "Edit form invalid");
            return SubmitOutcome::Invalid(errors);
        }

        let fields = self.changes();
        if fields.is_empty() {
            self.notifier.notify(Notification::new(
                NotificationLevel::Info,
                &Toast::new("Info", "No changes made"),
            ));
            return SubmitOutcome::Unchanged;
        }

        tracing::debug!(fields = fields.len(), "Submitting changed fields");
        let changes = Changes {
            draft: self.draft.clone(),
            fields,
        };
        match save.mutate(changes, MutateOptions::default()).await {
            MutationOutcome::Succeeded(saved) => {
                self.baseline = self.draft.clone();
                SubmitOutcome::Saved(saved)
            }
            MutationOutcome::Failed(e) => SubmitOutcome::Failed(e),
        }
    }
}

fn to_json<F: Serialize>(form: &F) -> Value {
    serde_json::to_value(form).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use upbreed_client::{ApiError, CookieJar};
    use upbreed_core::models::CoursePatch;
    use upbreed_core::validation::{CourseEditForm, ImageField, LocalFile};
    use upbreed_events::{InvalidationBus, ToastQueue};

    use super::*;
    use crate::cache::QueryCache;
    use crate::mutation::{MutationConfig, MutationContext};

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn baseline() -> CourseEditForm {
        CourseEditForm {
            title: "Course 3".into(),
            description: "Everything about topic number 3.".into(),
            categories: vec![1],
            image: ImageField::Remote("https://cdn.upbreed.com/3.png".into()),
        }
    }

    fn setup() -> (
        EditSession<CourseEditForm>,
        Mutation<Changes<CourseEditForm>, CoursePatch>,
        Arc<ToastQueue>,
        Arc<AtomicUsize>,
    ) {
        let toasts = Arc::new(ToastQueue::default());
        let ctx = MutationContext::new(
            QueryCache::new(Arc::new(InvalidationBus::default())),
            Arc::new(CookieJar::new()),
            toasts.clone(),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let save = Mutation::new(
            MutationConfig::new(
                move |changes: Changes<CourseEditForm>| {
                    c.fetch_add(1, Ordering::SeqCst);
                    async move {
                        let mut patch = CoursePatch::from_changes(&changes.fields)?;
                        if changes.contains("image") {
                            patch.image = changes.draft.image.local_file().cloned();
                        }
                        Ok::<_, ApiError>(patch)
                    }
                },
                Toast::error("Failed to update course"),
            ),
            ctx,
        );
        (EditSession::new(baseline(), toasts.clone()), save, toasts, calls)
    }

    #[tokio::test]
    async fn unchanged_submit_makes_no_request() {
        let (mut session, save, toasts, calls) = setup();

        assert_eq!(session.submit(&save).await, SubmitOutcome::Unchanged);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let shown = toasts.snapshot();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].level, NotificationLevel::Info);
        assert_eq!(shown[0].description, "No changes made");
    }

    #[tokio::test]
    async fn only_changed_fields_are_sent() {
        let (mut session, save, _, calls) = setup();
        session.draft_mut().title = "Course 3, revised".into();

        let saved = session.submit(&save).await;
        let patch = assert_matches!(saved, SubmitOutcome::Saved(p) => p);
        assert_eq!(patch.title.as_deref(), Some("Course 3, revised"));
        assert_eq!(patch.description, None);
        assert_eq!(patch.categories, None);
        assert!(patch.image.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // the saved draft is the new baseline
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn new_image_is_part_of_the_patch() {
        let (mut session, save, _, _) = setup();
        session
            .draft_mut()
            .image
            .accept(LocalFile::from_bytes("cover.png", PNG.to_vec()))
            .unwrap();

        let patch = assert_matches!(session.submit(&save).await, SubmitOutcome::Saved(p) => p);
        assert_eq!(patch.image.map(|f| f.name), Some("cover.png".to_string()));
        assert_eq!(patch.title, None);
    }

    #[tokio::test]
    async fn invalid_draft_is_not_sent() {
        let (mut session, save, toasts, calls) = setup();
        session.draft_mut().title = "x".into();

        let errors = assert_matches!(session.submit(&save).await, SubmitOutcome::Invalid(e) => e);
        assert!(errors.has("title"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(toasts.is_empty());
    }

    #[test]
    fn reset_discards_the_draft() {
        let toasts: Arc<dyn NotificationSink> = Arc::new(ToastQueue::default());
        let mut session = EditSession::new(baseline(), toasts);
        session.draft_mut().categories = vec![1, 2];
        assert!(session.is_dirty());
        session.reset();
        assert!(!session.is_dirty());
    }
}
