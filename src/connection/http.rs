use super::config::ClientConfig;
use super::{HttpResponse, Transport};
use crate::core::{ListError, Result};
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::debug;

/// reqwest-backed [`Transport`] for the REST API.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
    bearer_token: RwLock<Option<String>>,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate().map_err(ListError::Config)?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ListError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let bearer_token = RwLock::new(config.bearer_token.clone());
        Ok(Self {
            client,
            config,
            bearer_token,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Replace the token attached to subsequent requests (sign-in / sign-out).
    pub fn set_bearer_token(&self, token: Option<String>) -> Result<()> {
        *self.bearer_token.write()? = token;
        Ok(())
    }

    pub fn has_bearer_token(&self) -> bool {
        self.bearer_token
            .read()
            .map(|token| token.is_some())
            .unwrap_or(false)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        let url = self.config.endpoint(path);
        let token = self.bearer_token.read()?.clone();

        let mut request = self.client.get(&url).query(query);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        debug!(url = %url, params = query.len(), "GET");
        let response = request
            .send()
            .await
            .map_err(|e| ListError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ListError::Network(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
