use std::sync::Arc;
use std::time::Duration;

use upbreed_client::{AdminApi, ClientConfig, CookieJar, Url};
use upbreed_events::{InvalidationBus, ToastQueue};
use upbreed_mock_api::MockServer;
use upbreed_query::{MutationContext, QueryCache};

/// A mock API, a client pointed at it, and the shared query plumbing.
pub struct TestContext {
    pub server: MockServer,
    pub api: AdminApi,
    pub cache: QueryCache,
    pub toasts: Arc<ToastQueue>,
    pub mutations: MutationContext,
}

pub async fn start() -> TestContext {
    start_with_timeout(Duration::from_secs(5)).await
}

pub async fn start_with_timeout(timeout: Duration) -> TestContext {
    let server = MockServer::start().await.expect("mock API should bind");
    let mut config = ClientConfig::new(Url::parse(&server.base_url()).expect("valid base url"));
    config.request_timeout = timeout;
    let jar = Arc::new(CookieJar::new());
    let api = AdminApi::new(&config, jar.clone()).expect("client should build");

    let cache = QueryCache::new(Arc::new(InvalidationBus::default()));
    let toasts = Arc::new(ToastQueue::default());
    let mutations = MutationContext::new(cache.clone(), jar, toasts.clone());
    TestContext {
        server,
        api,
        cache,
        toasts,
        mutations,
    }
}

/// Let spawned tasks and in-flight requests settle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
