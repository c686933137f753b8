use std::sync::Arc;
use std::time::Duration;

use upbreed_client::{AdminApi, ClientConfig, CookieJar, Url};
use upbreed_mock_api::MockServer;

/// A mock API plus a client pointed at it.
pub struct TestContext {
    pub server: MockServer,
    pub api: AdminApi,
    pub jar: Arc<CookieJar>,
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
    TestContext { server, api, jar }
}
