//! Confirmation dialogs: delete/deactivate and discard-changes.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use upbreed_client::ApiError;
use upbreed_core::query_key::KeyFilter;
use upbreed_core::routes::Route;
use upbreed_core::types::ResourceId;
use upbreed_events::Toast;

use crate::error::FetchError;
use crate::mutation::{MutateOptions, Mutation, MutationConfig, MutationContext, MutationOutcome};
use crate::navigation::Navigator;

// ---------------------------------------------------------------------------
// Delete dialog
// ---------------------------------------------------------------------------

/// Wording of a delete dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteCopy {
    /// Instructors are deactivated rather than deleted.
    Deactivate,
    Delete,
}

impl DeleteCopy {
    pub fn error_toast(&self) -> Toast {
        match self {
            Self::Deactivate => Toast::error("Failed to deactivate instructor"),
            Self::Delete => Toast::error("Failed to delete"),
        }
    }

    pub fn success_toast(&self) -> Toast {
        match self {
            Self::Deactivate => Toast::success("Instructor Deactivated"),
            Self::Delete => Toast::success("Deleted successfully"),
        }
    }

    pub fn idle_label(&self) -> &'static str {
        match self {
            Self::Deactivate => "Deactivate",
            Self::Delete => "Delete",
        }
    }

    pub fn pending_label(&self) -> &'static str {
        match self {
            Self::Deactivate => "Deactivating...",
            Self::Delete => "Deleting...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open { target: ResourceId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    Deleted(ResourceId),
    Failed(FetchError),
    /// A delete is already running; the confirm control is disabled.
    Busy,
    NotOpen,
}

/// Confirm-then-delete dialog bound to one resource family.
///
/// On success the dialog closes and the owning list family is invalidated,
/// so every list showing the row re-fetches without it. On failure it stays
/// open with an error toast.
pub struct DeleteDialog {
    copy: DeleteCopy,
    state: Arc<watch::Sender<DialogState>>,
    mutation: Mutation<ResourceId, ResourceId>,
}

impl DeleteDialog {
    pub fn new<F, Fut>(
        copy: DeleteCopy,
        family: impl Into<KeyFilter>,
        delete_fn: F,
        ctx: MutationContext,
    ) -> Self
    where
        F: Fn(ResourceId) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        let (state, _) = watch::channel(DialogState::Closed);
        let state = Arc::new(state);

        let closer = state.clone();
        let config = MutationConfig::new(
            move |id: ResourceId| {
                let fut = delete_fn(id);
                async move { fut.await.map(|()| id) }
            },
            copy.error_toast(),
        )
        .success_toast(copy.success_toast())
        .invalidates(family)
        .on_success(move |id| {
            tracing::info!(resource_id = id, "Delete confirmed");
            closer.send_replace(DialogState::Closed);
        });

        Self {
            copy,
            state,
            mutation: Mutation::new(config, ctx),
        }
    }

    pub fn open(&self, target: ResourceId) {
        self.state.send_replace(DialogState::Open { target });
    }

    /// Close without side effects.
    pub fn cancel(&self) {
        self.state.send_replace(DialogState::Closed);
    }

    pub fn current(&self) -> DialogState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DialogState> {
        self.state.subscribe()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.current(), DialogState::Open { .. })
    }

    pub fn is_busy(&self) -> bool {
        self.mutation.is_pending()
    }

    pub fn confirm_label(&self) -> &'static str {
        if self.is_busy() {
            self.copy.pending_label()
        } else {
            self.copy.idle_label()
        }
    }

    pub async fn confirm(&self) -> ConfirmOutcome {
        self.confirm_with(MutateOptions::default()).await
    }

    /// Confirm with a caller callback that runs after the dialog's own.
    pub async fn confirm_with(&self, options: MutateOptions<ResourceId>) -> ConfirmOutcome {
        let DialogState::Open { target } = self.current() else {
            return ConfirmOutcome::NotOpen;
        };
        if self.is_busy() {
            return ConfirmOutcome::Busy;
        }
        match self.mutation.mutate(target, options).await {
            MutationOutcome::Succeeded(id) => ConfirmOutcome::Deleted(id),
            MutationOutcome::Failed(e) => ConfirmOutcome::Failed(e),
        }
    }

    pub fn unmount(&self) {
        self.mutation.unmount();
    }
}

// ---------------------------------------------------------------------------
// Discard prompt
// ---------------------------------------------------------------------------

pub const DISCARD_MESSAGE: &str =
    "You're about to discard your changes. Are you sure you want to do this?";
pub const DISCARD_CONFIRM_LABEL: &str = "Yes, Discard changes";
pub const DISCARD_CANCEL_LABEL: &str = "No, Continue editing";

/// "Discard your changes?" prompt shown when leaving an edit form.
pub struct DiscardPrompt {
    navigator: Navigator,
    pending: watch::Sender<Option<Route>>,
}

impl DiscardPrompt {
    pub fn new(navigator: Navigator) -> Self {
        let (pending, _) = watch::channel(None);
        Self { navigator, pending }
    }

    /// Ask before leaving for `target`.
    pub fn open(&self, target: Route) {
        self.pending.send_replace(Some(target));
    }

    pub fn is_open(&self) -> bool {
        self.pending.borrow().is_some()
    }

    pub fn target(&self) -> Option<Route> {
        *self.pending.borrow()
    }

    /// Discard and navigate. Returns the route navigated to.
    pub fn confirm(&self) -> Option<Route> {
        let target = self.pending.send_replace(None)?;
        self.navigator.navigate(target);
        Some(target)
    }

    /// Keep editing.
    pub fn cancel(&self) {
        self.pending.send_replace(None);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use assert_matches::assert_matches;
    use upbreed_client::CookieJar;
    use upbreed_core::query_key::Resource;
    use upbreed_events::{InvalidationBus, NotificationLevel, ToastQueue};

    use super::*;
    use crate::cache::QueryCache;

    fn ctx() -> (MutationContext, Arc<ToastQueue>, Arc<InvalidationBus>) {
        let bus = Arc::new(InvalidationBus::default());
        let toasts = Arc::new(ToastQueue::default());
        let ctx = MutationContext::new(
            QueryCache::new(bus.clone()),
            Arc::new(CookieJar::new()),
            toasts.clone(),
        );
        (ctx, toasts, bus)
    }

    #[tokio::test]
    async fn confirm_deletes_closes_and_invalidates() {
        let (ctx, toasts, bus) = ctx();
        let mut events = bus.subscribe();
        let dialog = DeleteDialog::new(
            DeleteCopy::Deactivate,
            Resource::Instructors,
            |_id| async { Ok::<_, ApiError>(()) },
            ctx,
        );

        dialog.open(42);
        assert_eq!(dialog.current(), DialogState::Open { target: 42 });
        assert_eq!(dialog.confirm().await, ConfirmOutcome::Deleted(42));

        assert_eq!(dialog.current(), DialogState::Closed);
        assert_eq!(events.recv().await.unwrap().resource(), Resource::Instructors);
        let shown = toasts.snapshot();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].description, "Instructor Deactivated");
    }

    #[tokio::test]
    async fn failed_delete_stays_open() {
        let (ctx, toasts, _) = ctx();
        let dialog = DeleteDialog::new(
            DeleteCopy::Delete,
            Resource::Courses,
            |_id| async {
                Err::<(), _>(ApiError::Status {
                    status: 500,
                    body: "boom".into(),
                })
            },
            ctx,
        );

        dialog.open(7);
        assert_matches!(dialog.confirm().await, ConfirmOutcome::Failed(_));
        assert!(dialog.is_open());
        assert_eq!(toasts.count(NotificationLevel::Error), 1);
        assert_eq!(toasts.snapshot()[0].description, "Failed to delete");
    }

    #[tokio::test]
    async fn cancel_has_no_side_effects() {
        let (ctx, toasts, _) = ctx();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let dialog = DeleteDialog::new(
            DeleteCopy::Delete,
            Resource::Blogs,
            move |_id| {
                c.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ApiError>(()) }
            },
            ctx,
        );

        dialog.open(3);
        dialog.cancel();
        assert_eq!(dialog.confirm().await, ConfirmOutcome::NotOpen);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_confirm_while_pending_is_busy() {
        let (ctx, _, _) = ctx();
        let dialog = Arc::new(DeleteDialog::new(
            DeleteCopy::Deactivate,
            Resource::Instructors,
            |_id| async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, ApiError>(())
            },
            ctx,
        ));
        dialog.open(42);
        assert_eq!(dialog.confirm_label(), "Deactivate");

        let first = tokio::spawn({
            let dialog = dialog.clone();
            async move { dialog.confirm().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(dialog.is_busy());
        assert_eq!(dialog.confirm_label(), "Deactivating...");
        assert_eq!(dialog.confirm().await, ConfirmOutcome::Busy);
        assert_eq!(first.await.unwrap(), ConfirmOutcome::Deleted(42));
        assert_eq!(dialog.confirm_label(), "Deactivate");
    }

    #[test]
    fn discard_prompt_navigates_on_confirm_only() {
        let nav = Navigator::new(Route::BlogCreate);
        let prompt = DiscardPrompt::new(nav.clone());

        prompt.open(Route::Blogs);
        prompt.cancel();
        assert_eq!(nav.current(), Route::BlogCreate);
        assert_eq!(prompt.confirm(), None);

        prompt.open(Route::Blogs);
        assert_eq!(prompt.confirm(), Some(Route::Blogs));
        assert_eq!(nav.current(), Route::Blogs);
        assert!(!prompt.is_open());
    }
}
