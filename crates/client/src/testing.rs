//! Test doubles for the network and host collaborators.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use swcache_core::{Error, RequestDescriptor, StoredResponse};

use crate::fetch::Network;
use crate::host::{Host, HostSignal};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Respond(StoredResponse),
    Delayed(Duration, StoredResponse),
    Fail,
    /// Never settles.
    Hang,
}

/// Network that answers from a per-href script and counts calls.
#[derive(Debug, Default)]
pub(crate) struct ScriptedNetwork {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(&self, href: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(href.to_string(), reply);
    }

    pub(crate) fn respond(&self, href: &str, status: u16, body: &'static str) {
        self.script(href, Reply::Respond(StoredResponse::new(status, vec![], body)));
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls_for(&self, href: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|h| h.as_str() == href).count()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<StoredResponse, Error> {
        let href = request.href();
        self.calls.lock().unwrap().push(href.clone());
        let reply = self.replies.lock().unwrap().get(&href).cloned();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(Reply::Fail) => Err(Error::Network(format!("scripted failure for {href}"))),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(Error::Network(format!("no route to {href}"))),
        }
    }
}

/// Host that records every signal.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    signals: Mutex<Vec<HostSignal>>,
}

impl RecordingHost {
    pub(crate) fn signals(&self) -> Vec<HostSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl Host for RecordingHost {
    fn signal(&self, signal: HostSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}

pub(crate) fn ok(body: &'static str) -> StoredResponse {
    StoredResponse::new(200, vec![("content-type".into(), "text/plain".into())], body)
}

/// Yield to spawned tasks until `check` passes or the budget runs out.
pub(crate) async fn settle<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::task::yield_now().await;
    }
    false
}
