//! Request-intercepting cache proxy for swcache.
//!
//! This crate provides the proxy that answers lifecycle events (install,
//! activate, fetch, message, push, sync) on behalf of a host runtime, the
//! request classifier and fetch strategies it dispatches to, and an HTTP
//! network collaborator.

pub mod classify;
pub mod fetch;
pub mod host;
pub mod proxy;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{Classifier, RequestClass};
pub use fetch::{FetchConfig, HttpNetwork, Network};
pub use host::{Host, HostSignal, Notification, NotificationAction, TracingHost};
pub use proxy::{CacheProxy, Message, MessageReply, ProxyConfig, PushPayload, Route};
pub use strategy::Strategy;
