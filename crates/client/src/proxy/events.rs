//! Message, push, notification-click and background-sync hooks.

use serde::{Deserialize, Serialize};
use swcache_core::Error;

use super::CacheProxy;
use crate::host::{HostSignal, Notification, NotificationAction};

const NOTIFICATION_ICON: &str = "/static/assets/favicon.svg";
const NOTIFICATION_BADGE: &str = "/static/assets/apple-touch-icon.png";
const NOTIFICATION_VIBRATE: [u32; 3] = [100, 50, 100];
const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// Messages posted to the proxy by a client page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    SkipWaiting,
    GetCacheSize,
}

/// Reply posted back on the message channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessageReply {
    CacheSize {
        #[serde(rename = "cacheSize")]
        cache_size: u64,
    },
}

/// Push event data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub primary_key: Option<serde_json::Value>,
}

impl CacheProxy {
    /// Handle a message payload.
    ///
    /// Unrecognized payloads are ignored.
    pub async fn message(&self, payload: &serde_json::Value) -> Result<Option<MessageReply>, Error> {
        let message = match serde_json::from_value::<Message>(payload.clone()) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring message");
                return Ok(None);
            }
        };

        match message {
            Message::SkipWaiting => {
                self.host.signal(HostSignal::SkipWaiting);
                Ok(None)
            }
            Message::GetCacheSize => {
                let cache_size = self.cache_size().await?;
                Ok(Some(MessageReply::CacheSize { cache_size }))
            }
        }
    }

    /// Sum of stored body sizes across every partition.
    ///
    /// Enumerates all entries on each call; nothing is memoized.
    pub async fn cache_size(&self) -> Result<u64, Error> {
        let mut total = 0u64;
        for name in self.storage.names().await? {
            for key in self.storage.keys(&name).await? {
                if let Some(response) = self.storage.get(&name, &key).await? {
                    total += response.body_len();
                }
            }
        }
        Ok(total)
    }

    /// Show a notification for a push event that carries data.
    pub fn push(&self, payload: Option<PushPayload>) {
        let Some(payload) = payload else {
            return;
        };

        let action = |action: &str, title: &str| NotificationAction {
            action: action.into(),
            title: title.into(),
            icon: NOTIFICATION_ICON.into(),
        };

        self.host.signal(HostSignal::ShowNotification(Notification {
            title: payload.title,
            body: payload.body,
            icon: NOTIFICATION_ICON.into(),
            badge: NOTIFICATION_BADGE.into(),
            vibrate: NOTIFICATION_VIBRATE.to_vec(),
            primary_key: payload.primary_key,
            actions: vec![action("explore", "View Portfolio"), action("close", "Close")],
        }));
    }

    pub fn notification_click(&self, action: Option<&str>) {
        if action == Some("explore") {
            self.host.signal(HostSignal::OpenWindow { url: "/".into() });
        }
    }

    /// Returns whether the tag was recognized.
    pub async fn sync(&self, tag: &str) -> bool {
        if tag != BACKGROUND_SYNC_TAG {
            return false;
        }
        tracing::info!("background sync triggered");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::ProxyConfig;
    use super::super::tests::harness;
    use super::*;
    use crate::testing::ok;
    use serde_json::json;
    use swcache_core::{CacheStorage, StoredResponse};

    #[tokio::test]
    async fn test_skip_waiting_message() {
        let h = harness(ProxyConfig::default());
        let reply = h.proxy.message(&json!({"type": "SKIP_WAITING"})).await.unwrap();
        assert!(reply.is_none());
        assert_eq!(h.host.signals(), vec![HostSignal::SkipWaiting]);
    }

    #[tokio::test]
    async fn test_cache_size_spans_all_partitions() {
        let h = harness(ProxyConfig::default());
        h.storage.put("static-v1.2", "a", &ok("12345")).await.unwrap();
        h.storage.put("images-v1.2", "b", &StoredResponse::new(200, vec![], vec![0u8; 100])).await.unwrap();
        h.storage.put("static-v1.0", "c", &ok("xyz")).await.unwrap();

        let reply = h.proxy.message(&json!({"type": "GET_CACHE_SIZE"})).await.unwrap();
        assert_eq!(reply, Some(MessageReply::CacheSize { cache_size: 108 }));
        assert_eq!(serde_json::to_value(reply.unwrap()).unwrap(), json!({"cacheSize": 108}));
    }

    #[tokio::test]
    async fn test_cache_size_empty() {
        let h = harness(ProxyConfig::default());
        assert_eq!(h.proxy.cache_size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_message_ignored() {
        let h = harness(ProxyConfig::default());
        assert!(h.proxy.message(&json!({"type": "PING"})).await.unwrap().is_none());
        assert!(h.proxy.message(&json!("SKIP_WAITING")).await.unwrap().is_none());
        assert!(h.proxy.message(&serde_json::Value::Null).await.unwrap().is_none());
        assert!(h.host.signals().is_empty());
    }

    #[tokio::test]
    async fn test_push_with_payload() {
        let h = harness(ProxyConfig::default());
        let payload: PushPayload =
            serde_json::from_value(json!({"title": "New project", "body": "Check it out", "primaryKey": 7})).unwrap();
        h.proxy.push(Some(payload));

        let signals = h.host.signals();
        let [HostSignal::ShowNotification(notification)] = signals.as_slice() else {
            panic!("expected one notification, got {signals:?}");
        };
        assert_eq!(notification.title, "New project");
        assert_eq!(notification.body.as_deref(), Some("Check it out"));
        assert_eq!(notification.primary_key, Some(json!(7)));
        assert_eq!(notification.vibrate, vec![100, 50, 100]);
        assert_eq!(notification.actions.len(), 2);
        assert_eq!(notification.actions[0].action, "explore");
    }

    #[tokio::test]
    async fn test_push_without_payload() {
        let h = harness(ProxyConfig::default());
        h.proxy.push(None);
        assert!(h.host.signals().is_empty());
    }

    #[tokio::test]
    async fn test_notification_click() {
        let h = harness(ProxyConfig::default());
        h.proxy.notification_click(Some("close"));
        h.proxy.notification_click(None);
        h.proxy.notification_click(Some("explore"));
        assert_eq!(h.host.signals(), vec![HostSignal::OpenWindow { url: "/".into() }]);
    }

    #[tokio::test]
    async fn test_sync_tag() {
        let h = harness(ProxyConfig::default());
        assert!(h.proxy.sync("background-sync").await);
        assert!(!h.proxy.sync("other").await);
    }
}
