//! Upbreed in-process event plumbing.
//!
//! This crate provides the two fan-out channels the admin core relies on:
//!
//! - [`InvalidationBus`]: publish/subscribe hub for cache invalidation
//!   events, backed by `tokio::sync::broadcast`. Mutations publish, list and
//!   detail observers subscribe and re-fetch.
//! - [`notify`]: user-facing notifications (toasts) and the sinks that
//!   display or record them.

pub mod bus;
pub mod notify;

pub use bus::{InvalidationBus, InvalidationEvent};
pub use notify::{
    FanoutNotifier, Notification, NotificationLevel, NotificationSink, Toast, ToastQueue,
    TracingNotifier,
};
