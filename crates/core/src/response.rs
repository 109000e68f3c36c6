//! Stored network responses.

use crate::Error;
use bytes::Bytes;

/// Status used for the locally constructed fallback response.
pub const UNAVAILABLE_STATUS: u16 = 503;

/// A network response, either fresh from the network or read back from a
/// partition. Cached copies are never mutated; a re-fetch replaces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl StoredResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// Synthetic unavailable-response returned when neither cache nor
    /// network can satisfy a request.
    pub fn unavailable(message: &'static str) -> Self {
        Self {
            status: UNAVAILABLE_STATUS,
            headers: vec![("content-type".into(), "text/plain; charset=utf-8".into())],
            body: Bytes::from_static(message.as_bytes()),
        }
    }

    /// Whether the status is in the 2xx range. Only these responses are cached.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_len(&self) -> u64 {
        self.body.len() as u64
    }

    pub(crate) fn headers_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.headers)?)
    }

    pub(crate) fn from_parts(status: u16, headers_json: &str, body: Vec<u8>) -> Result<Self, Error> {
        let headers: Vec<(String, String)> = serde_json::from_str(headers_json)?;
        Ok(Self { status, headers, body: Bytes::from(body) })
    }
}
