use std::time::Duration;

use upbreed_admin::AdminApp;
use upbreed_client::{ClientConfig, Url, AUTH_COOKIE};
use upbreed_mock_api::MockServer;

/// A seeded mock API and an admin app pointed at it.
pub struct TestApp {
    pub server: MockServer,
    pub app: AdminApp,
}

/// Logged out: the jar holds no session cookie.
pub async fn start() -> TestApp {
    let server = MockServer::start().await.expect("mock API should bind");
    let mut config = ClientConfig::new(Url::parse(&server.base_url()).expect("valid base url"));
    config.request_timeout = Duration::from_secs(5);
    let app = AdminApp::new(config).expect("app should build");
    TestApp { server, app }
}

/// Logged in with an opaque session token.
pub async fn start_logged_in() -> TestApp {
    let t = start().await;
    t.app.jar.set(AUTH_COOKIE, "test-session");
    t
}
