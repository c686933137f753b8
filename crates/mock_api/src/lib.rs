//! In-memory implementation of the Upbreed admin REST API.
//!
//! Used by integration tests across the workspace. [`MockServer::start`]
//! binds an ephemeral port on `127.0.0.1` and serves a seeded [`Store`];
//! the shared [`MockState`] records every request and can inject failures
//! or delays into the next matching requests.

pub mod error;
pub mod form;
pub mod handlers;
pub mod routes;
pub mod seed;
pub mod state;

use std::net::SocketAddr;

use tokio::task::JoinHandle;

pub use seed::{ADMIN_EMAIL, ADMIN_PASSWORD};
pub use state::{MockState, RecordedRequest, Store};

/// A running mock API. The server stops when this is dropped.
pub struct MockServer {
    addr: SocketAddr,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Start with the seeded data set.
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(Store::seeded()).await
    }

    pub async fn start_with(store: Store) -> std::io::Result<Self> {
        let state = MockState::new(store);
        let app = routes::router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock API stopped");
            }
        });
        tracing::debug!(%addr, "Mock API listening");

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// `http://127.0.0.1:<port>`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &MockState {
        &self.state
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
