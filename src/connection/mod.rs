pub mod auth;
pub mod config;
pub mod http;

use crate::core::{ListError, PageResponse, Result};
use async_trait::async_trait;

/// Raw HTTP response as seen by the list layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Map a list endpoint response to a page: non-2xx is a server error,
    /// a body that is not a page is a decode error.
    pub fn into_page(self, page_size: usize) -> Result<PageResponse> {
        if !self.is_success() {
            return Err(ListError::Server {
                status: self.status,
                message: server_message(&self.body),
            });
        }
        PageResponse::decode(&self.body, page_size)
    }
}

/// Pull a human-readable message out of an error body.
fn server_message(body: &[u8]) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = map.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return "empty response body".to_string();
    }
    text.chars().take(200).collect()
}

/// Seam between the query cache and the network.
///
/// Implementations return `ListError::Network` only when no response was
/// received; any status code is handed back as an [`HttpResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<HttpResponse>;
}
