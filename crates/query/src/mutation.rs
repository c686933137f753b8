//! Request-mutation orchestrator.
//!
//! A [`Mutation`] wraps one write endpoint together with what has to happen
//! around it: pending state, one toast per invocation, an optional session
//! cookie write, cache invalidation and success callbacks. Failures never
//! escape as `Err`; they are reported as a toast and a
//! [`MutationOutcome::Failed`].
//!
//! On success the side effects run in a fixed order:
//!
//! 1. cookie write
//! 2. success toast
//! 3. invalidations
//! 4. the config's `on_success`
//! 5. the per-call `on_success`
//!
//! The request runs on its own task, so dropping the caller's future does
//! not cancel it. After [`Mutation::unmount`] a late response no longer
//! touches component state, toasts or callbacks. Its cookie write and
//! invalidations still go out, because the server write happened.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use upbreed_client::{ApiError, CookieJar};
use upbreed_core::query_key::KeyFilter;
use upbreed_events::{Notification, NotificationLevel, NotificationSink, Toast};

use crate::cache::QueryCache;
use crate::error::FetchError;

pub type MutationFn<I, R> = Arc<dyn Fn(I) -> BoxFuture<'static, Result<R, ApiError>> + Send + Sync>;

pub type SuccessCallback<R> = Arc<dyn Fn(&R) + Send + Sync>;

/// Store a value from the response as a cookie.
pub struct CookieWrite<R> {
    pub name: String,
    get_value: Arc<dyn Fn(&R) -> Option<String> + Send + Sync>,
}

impl<R> CookieWrite<R> {
    pub fn new<F>(name: impl Into<String>, get_value: F) -> Self
    where
        F: Fn(&R) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            get_value: Arc::new(get_value),
        }
    }

    pub fn value(&self, response: &R) -> Option<String> {
        (self.get_value)(response)
    }
}

/// Static description of a mutation.
pub struct MutationConfig<I, R> {
    mutation_fn: MutationFn<I, R>,
    error_toast: Toast,
    success_toast: Option<Toast>,
    cookie: Option<CookieWrite<R>>,
    invalidates: Vec<KeyFilter>,
    on_success: Option<SuccessCallback<R>>,
}

impl<I, R> MutationConfig<I, R>
where
    I: Send + 'static,
    R: Send + 'static,
{
    pub fn new<F, Fut>(mutation_fn: F, error_toast: Toast) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    {
        Self {
            mutation_fn: Arc::new(move |input| mutation_fn(input).boxed()),
            error_toast,
            success_toast: None,
            cookie: None,
            invalidates: Vec::new(),
            on_success: None,
        }
    }

    pub fn success_toast(mut self, toast: Toast) -> Self {
        self.success_toast = Some(toast);
        self
    }

    pub fn cookie<F>(mut self, name: impl Into<String>, get_value: F) -> Self
    where
        F: Fn(&R) -> Option<String> + Send + Sync + 'static,
    {
        self.cookie = Some(CookieWrite::new(name, get_value));
        self
    }

    /// Add a key family to invalidate after a successful call.
    pub fn invalidates(mut self, filter: impl Into<KeyFilter>) -> Self {
        self.invalidates.push(filter.into());
        self
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&R) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn error_toast(&self) -> &Toast {
        &self.error_toast
    }
}

/// Shared collaborators every mutation needs.
#[derive(Clone)]
pub struct MutationContext {
    pub cache: QueryCache,
    pub jar: Arc<CookieJar>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl MutationContext {
    pub fn new(cache: QueryCache, jar: Arc<CookieJar>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            cache,
            jar,
            notifier,
        }
    }
}

/// Per-call options.
pub struct MutateOptions<R> {
    pub on_success: Option<SuccessCallback<R>>,
}

impl<R> MutateOptions<R> {
    pub fn on_success<F>(callback: F) -> Self
    where
        F: Fn(&R) + Send + Sync + 'static,
    {
        Self {
            on_success: Some(Arc::new(callback)),
        }
    }
}

impl<R> Default for MutateOptions<R> {
    fn default() -> Self {
        Self { on_success: None }
    }
}

/// Result of one invocation as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<R> {
    Succeeded(R),
    Failed(FetchError),
}

impl<R> MutationOutcome<R> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn ok(self) -> Option<R> {
        match self {
            Self::Succeeded(r) => Some(r),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(e) => Some(e),
        }
    }
}

/// State of the most recently started invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationState<R> {
    Idle,
    Pending,
    Success(R),
    Error(FetchError),
}

/// A mounted mutation. Cheap to clone; clones share pending state.
pub struct Mutation<I, R> {
    inner: Arc<Inner<I, R>>,
}

impl<I, R> Clone for Mutation<I, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<I, R> {
    config: MutationConfig<I, R>,
    ctx: MutationContext,
    state: watch::Sender<MutationState<R>>,
    in_flight: AtomicUsize,
    latest: AtomicU64,
    mounted: CancellationToken,
}

impl<I, R> Mutation<I, R>
where
    I: Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub fn new(config: MutationConfig<I, R>, ctx: MutationContext) -> Self {
        let (state, _) = watch::channel(MutationState::Idle);
        Self {
            inner: Arc::new(Inner {
                config,
                ctx,
                state,
                in_flight: AtomicUsize::new(0),
                latest: AtomicU64::new(0),
                mounted: CancellationToken::new(),
            }),
        }
    }

    /// Run one invocation and wait for it to settle.
    pub async fn mutate(&self, input: I, options: MutateOptions<R>) -> MutationOutcome<R> {
        let (seq, handle) = self.start(input, options);
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Mutation task failed");
                let error = FetchError::new(e.to_string());
                if self.is_mounted() {
                    self.inner.notify(NotificationLevel::Error, &self.inner.config.error_toast);
                    self.inner.set_state(seq, MutationState::Error(error.clone()));
                }
                MutationOutcome::Failed(error)
            }
        }
    }

    /// Start one invocation without waiting for it.
    ///
    /// The pending count is raised before this returns.
    pub fn mutate_detached(&self, input: I, options: MutateOptions<R>) -> JoinHandle<MutationOutcome<R>> {
        self.start(input, options).1
    }

    fn start(&self, input: I, options: MutateOptions<R>) -> (u64, JoinHandle<MutationOutcome<R>>) {
        let seq = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        self.inner.set_state(seq, MutationState::Pending);

        let inner = self.inner.clone();
        (seq, tokio::spawn(async move { inner.run(seq, input, options).await }))
    }

    /// True while any invocation is in flight.
    pub fn is_pending(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn state(&self) -> watch::Receiver<MutationState<R>> {
        self.inner.state.subscribe()
    }

    pub fn current(&self) -> MutationState<R> {
        self.inner.state.borrow().clone()
    }

    /// Detach the owning component.
    pub fn unmount(&self) {
        self.inner.mounted.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.inner.mounted.is_cancelled()
    }
}

impl<I, R> Inner<I, R>
where
    I: Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    async fn run(&self, seq: u64, input: I, options: MutateOptions<R>) -> MutationOutcome<R> {
        let result = {
            let _pending = PendingGuard(&self.in_flight);
            (self.config.mutation_fn)(input).await
        };
        let mounted = !self.mounted.is_cancelled();

        match result {
            Ok(response) => {
                if let Some(cookie) = &self.config.cookie {
                    if let Some(value) = cookie.value(&response) {
                        self.ctx.jar.set(&cookie.name, value);
                    }
                }
                if mounted {
                    if let Some(toast) = &self.config.success_toast {
                        self.notify(NotificationLevel::Success, toast);
                    }
                }
                for filter in &self.config.invalidates {
                    self.ctx.cache.invalidate_because(filter.clone(), "mutation");
                }
                if mounted {
                    if let Some(callback) = &self.config.on_success {
                        callback(&response);
                    }
                    if let Some(callback) = &options.on_success {
                        callback(&response);
                    }
                    self.set_state(seq, MutationState::Success(response.clone()));
                } else {
                    tracing::debug!("Mutation settled after unmount");
                }
                MutationOutcome::Succeeded(response)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    status = ?e.status(),
                    title = %self.config.error_toast.title,
                    "Mutation failed",
                );
                let error = FetchError::from(e);
                if mounted {
                    self.notify(NotificationLevel::Error, &self.config.error_toast);
                    self.set_state(seq, MutationState::Error(error.clone()));
                }
                MutationOutcome::Failed(error)
            }
        }
    }

    fn notify(&self, level: NotificationLevel, toast: &Toast) {
        self.ctx.notifier.notify(Notification::new(level, toast));
    }

    fn set_state(&self, seq: u64, state: MutationState<R>) {
        if self.latest.load(Ordering::SeqCst) == seq {
            self.state.send_replace(state);
        }
    }
}

/// Lowers the pending count when the call settles, panics included.
struct PendingGuard<'a>(&'a AtomicUsize);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use upbreed_core::query_key::{QueryKey, Resource};
    use upbreed_events::{InvalidationBus, ToastQueue};

    use super::*;

    struct Harness {
        ctx: MutationContext,
        toasts: Arc<ToastQueue>,
        bus: Arc<InvalidationBus>,
    }

    fn harness() -> Harness {
        let bus = Arc::new(InvalidationBus::default());
        let toasts = Arc::new(ToastQueue::default());
        let ctx = MutationContext::new(
            QueryCache::new(bus.clone()),
            Arc::new(CookieJar::new()),
            toasts.clone(),
        );
        Harness { ctx, toasts, bus }
    }

    fn echo(delay: Duration) -> MutationConfig<u32, u32> {
        MutationConfig::new(
            move |n: u32| async move {
                tokio::time::sleep(delay).await;
                if n == 0 {
                    Err(ApiError::Status {
                        status: 400,
                        body: "zero".into(),
                    })
                } else {
                    Ok(n)
                }
            },
            Toast::error("Failed"),
        )
    }

    #[tokio::test]
    async fn success_runs_side_effects_in_order() {
        let h = harness();
        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let mut events = h.bus.subscribe();

        let jar = h.ctx.jar.clone();
        let config_log = log.clone();
        let config = echo(Duration::ZERO)
            .success_toast(Toast::success("Saved"))
            .cookie("rf", |n: &u32| Some(format!("token-{n}")))
            .invalidates(Resource::Instructors)
            .on_success(move |_| {
                config_log.lock().unwrap().push(format!(
                    "config cookie={:?}",
                    jar.get("rf")
                ));
            });
        let mutation = Mutation::new(config, h.ctx.clone());

        let call_log = log.clone();
        let outcome = mutation
            .mutate(
                7,
                MutateOptions::on_success(move |n| call_log.lock().unwrap().push(format!("call {n}"))),
            )
            .await;

        assert_eq!(outcome, MutationOutcome::Succeeded(7));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["config cookie=Some(\"token-7\")".to_string(), "call 7".to_string()]
        );
        assert_eq!(h.toasts.count(NotificationLevel::Success), 1);
        assert_eq!(h.toasts.len(), 1);
        let event = events.recv().await.unwrap();
        assert!(event.affects(&QueryKey::new(Resource::Instructors).with("page", Some(2u32))));
        assert_eq!(mutation.current(), MutationState::Success(7));
        assert!(!mutation.is_pending());
    }

    #[tokio::test]
    async fn failure_shows_error_toast_and_skips_callbacks() {
        let h = harness();
        let called = Arc::new(AtomicUsize::new(0));
        let c = called.clone();
        let config = echo(Duration::ZERO)
            .success_toast(Toast::success("Saved"))
            .invalidates(Resource::Courses)
            .on_success(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        let mutation = Mutation::new(config, h.ctx.clone());
        let mut events = h.bus.subscribe();

        let outcome = mutation.mutate(0, MutateOptions::default()).await;

        assert_matches!(outcome, MutationOutcome::Failed(ref e) if e.status() == Some(400));
        assert_eq!(called.load(Ordering::SeqCst), 0);
        let toasts = h.toasts.snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, NotificationLevel::Error);
        assert_eq!(toasts[0].description, "Failed");
        assert!(events.try_recv().is_err());
        assert_matches!(mutation.current(), MutationState::Error(_));
    }

    #[tokio::test]
    async fn panicking_call_settles_as_failure() {
        let h = harness();
        let config = MutationConfig::new(
            |n: u32| async move {
                assert!(n != 13, "unlucky input");
                Ok::<u32, ApiError>(n)
            },
            Toast::error("Failed"),
        );
        let mutation = Mutation::new(config, h.ctx.clone());

        let outcome = mutation.mutate(13, MutateOptions::default()).await;

        assert_matches!(outcome, MutationOutcome::Failed(_));
        assert!(!mutation.is_pending());
        assert_matches!(mutation.current(), MutationState::Error(_));
        let toasts = h.toasts.snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, NotificationLevel::Error);
        assert_eq!(toasts[0].description, "Failed");

        assert_eq!(mutation.mutate(4, MutateOptions::default()).await, MutationOutcome::Succeeded(4));
        assert!(!mutation.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn pending_covers_every_overlapping_call() {
        let h = harness();
        let mutation = Mutation::new(echo(Duration::from_millis(100)), h.ctx.clone());

        let first = mutation.mutate_detached(1, MutateOptions::default());
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = mutation.mutate_detached(2, MutateOptions::default());
        assert!(mutation.is_pending());

        assert_eq!(first.await.unwrap(), MutationOutcome::Succeeded(1));
        assert!(mutation.is_pending());
        // the first call finished but the second one is the latest
        assert_eq!(mutation.current(), MutationState::Pending);

        assert_eq!(second.await.unwrap(), MutationOutcome::Succeeded(2));
        assert!(!mutation.is_pending());
        assert_eq!(mutation.current(), MutationState::Success(2));
    }

    #[tokio::test(start_paused = true)]
    async fn unmounted_mutation_still_invalidates_but_stays_quiet() {
        let h = harness();
        let called = Arc::new(AtomicUsize::new(0));
        let c = called.clone();
        let config = echo(Duration::from_millis(100))
            .success_toast(Toast::success("Deleted"))
            .invalidates(Resource::Instructors)
            .on_success(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        let mutation = Mutation::new(config, h.ctx.clone());
        let mut events = h.bus.subscribe();

        let handle = mutation.mutate_detached(42, MutateOptions::default());
        mutation.unmount();

        assert_eq!(handle.await.unwrap(), MutationOutcome::Succeeded(42));
        assert!(h.toasts.is_empty());
        assert_eq!(called.load(Ordering::SeqCst), 0);
        assert_eq!(mutation.current(), MutationState::Pending);
        assert_eq!(events.recv().await.unwrap().resource(), Resource::Instructors);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_caller_does_not_cancel_the_request() {
        let h = harness();
        let mutation = Mutation::new(
            echo(Duration::from_millis(100)).invalidates(Resource::Blogs),
            h.ctx.clone(),
        );
        let mut events = h.bus.subscribe();

        let call = mutation.mutate(5, MutateOptions::default());
        let _ = tokio::time::timeout(Duration::from_millis(10), call).await;

        assert_eq!(events.recv().await.unwrap().resource(), Resource::Blogs);
    }
}
