//! Current-route holder shared by screens and mutation callbacks.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use upbreed_client::{AuthGuard, CookieJar};
use upbreed_core::routes::Route;

/// Back-stack depth; older entries are dropped.
pub const MAX_HISTORY: usize = 50;

/// Holds the current [`Route`]. Clones share the same location.
#[derive(Clone)]
pub struct Navigator {
    current: Arc<watch::Sender<Route>>,
    history: Arc<Mutex<Vec<Route>>>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        let (current, _) = watch::channel(start);
        Self {
            current: Arc::new(current),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.current.send_replace(route);
        if previous != route {
            tracing::debug!(from = %previous, to = %route, "Navigate");
            let mut history = self.history();
            if history.len() == MAX_HISTORY {
                history.remove(0);
            }
            history.push(previous);
        }
    }

    /// Navigate, sending protected routes through the session guard.
    ///
    /// Returns the route actually landed on. A redirect to the login page
    /// clears the back stack.
    pub fn navigate_guarded(&self, route: Route, jar: &CookieJar) -> Route {
        match AuthGuard::check_route(jar, route) {
            Ok(_) => {
                self.navigate(route);
                route
            }
            Err(redirect) => {
                self.navigate(redirect.to);
                if redirect.to == Route::Login {
                    self.history().clear();
                }
                redirect.to
            }
        }
    }

    pub fn history_len(&self) -> usize {
        self.history().len()
    }

    /// Go back one step. Returns `false` when there is no history.
    pub fn back(&self) -> bool {
        let Some(previous) = self.history().pop() else {
            return false;
        };
        self.current.send_replace(previous);
        true
    }

    fn history(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::default())
    }
}
