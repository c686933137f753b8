use std::sync::Arc;
use std::time::Duration;

use upbreed_client::{AdminApi, ApiError, ClientConfig, CookieJar};
use upbreed_core::routes::Route;
use upbreed_events::{FanoutNotifier, InvalidationBus, NotificationSink, ToastQueue, TracingNotifier};
use upbreed_query::{ListOptions, MutationContext, Navigator, QueryCache, QueryStateStore};

/// Everything the screens share: client, session, cache, toasts, location.
#[derive(Clone)]
pub struct AdminApp {
    pub config: ClientConfig,
    pub api: AdminApi,
    pub jar: Arc<CookieJar>,
    pub cache: QueryCache,
    pub toasts: Arc<ToastQueue>,
    pub navigator: Navigator,
    pub query_state: QueryStateStore,
    notifier: Arc<dyn NotificationSink>,
}

impl AdminApp {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Self::with_jar(config, Arc::new(CookieJar::new()))
    }

    pub fn with_jar(config: ClientConfig, jar: Arc<CookieJar>) -> Result<Self, ApiError> {
        let api = AdminApi::new(&config, jar.clone())?;
        let toasts = Arc::new(ToastQueue::default());
        let notifier = FanoutNotifier::new()
            .with(toasts.clone())
            .with(Arc::new(TracingNotifier));

        tracing::debug!(base_url = %config.base_url, "Admin app ready");
        Ok(Self {
            api,
            jar,
            cache: QueryCache::new(Arc::new(InvalidationBus::default())),
            toasts,
            navigator: Navigator::new(Route::Login),
            query_state: QueryStateStore::new(),
            notifier: Arc::new(notifier),
            config,
        })
    }

    pub fn notifier(&self) -> Arc<dyn NotificationSink> {
        self.notifier.clone()
    }

    pub fn mutation_context(&self) -> MutationContext {
        MutationContext::new(self.cache.clone(), self.jar.clone(), self.notifier.clone())
    }

    pub fn list_options(&self) -> ListOptions {
        ListOptions::from_config(&self.config)
    }

    /// List options that apply a search term immediately.
    pub fn list_options_undebounced(&self) -> ListOptions {
        ListOptions {
            debounce: Duration::ZERO,
            ..self.list_options()
        }
    }

    /// Navigate through the session guard. Returns where we landed.
    pub fn open(&self, route: Route) -> Route {
        self.navigator.navigate_guarded(route, &self.jar)
    }
}
