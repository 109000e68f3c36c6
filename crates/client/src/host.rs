//! Signals the proxy sends back to its host runtime.

use serde::{Deserialize, Serialize};

/// A request from the proxy to the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum HostSignal {
    /// Make this worker eligible for activation without waiting for clients to close.
    SkipWaiting,
    /// Take control of already-open clients.
    ClaimClients,
    ShowNotification(Notification),
    OpenWindow { url: String },
}

/// Notification display options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: Option<String>,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub primary_key: Option<serde_json::Value>,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Host runtime that receives proxy signals.
pub trait Host: Send + Sync + 'static {
    fn signal(&self, signal: HostSignal);
}

/// Host that only logs the signals it receives.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHost;

impl Host for TracingHost {
    fn signal(&self, signal: HostSignal) {
        match &signal {
            HostSignal::SkipWaiting => tracing::info!("host: skip waiting"),
            HostSignal::ClaimClients => tracing::info!("host: claim clients"),
            HostSignal::ShowNotification(n) => tracing::info!(title = %n.title, "host: show notification"),
            HostSignal::OpenWindow { url } => tracing::info!(%url, "host: open window"),
        }
    }
}
