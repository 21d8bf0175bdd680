//! HTTP implementation of the [`ProviderAdapter`] port.
//!
//! Tools are invoked as `POST <base_url>/tools/<tool>` with the effective
//! params as the JSON body; the response body is the tool's JSON payload.
//! The API key is wrapped in [`secrecy::SecretString`] and never appears in
//! Debug output or logs.

use std::time::Duration;

use postflow_core::workflow::dispatch::{DispatchError, ProviderAdapter};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

/// How much of an error response body to carry into the error message.
const MAX_ERROR_BODY: usize = 512;

/// Adapter for one tool-providing service reachable over HTTP.
pub struct HttpToolAdapter {
    provider: String,
    base_url: String,
    client: reqwest::Client,
    api_key: Option<SecretString>,
}

impl HttpToolAdapter {
    /// Create an adapter for `provider` at `base_url`.
    pub fn new(
        provider: String,
        base_url: String,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("postflow/0.1")
            .build()
            .expect("failed to build HTTP client");

        Self {
            provider,
            base_url,
            client,
            api_key,
        }
    }

    fn tool_url(&self, tool: &str) -> String {
        format!("{}/tools/{}", self.base_url.trim_end_matches('/'), tool)
    }

    fn invocation_error(&self, tool: &str, message: String) -> DispatchError {
        DispatchError::ToolInvocation {
            provider: self.provider.clone(),
            tool: tool.to_string(),
            message,
        }
    }
}

impl ProviderAdapter for HttpToolAdapter {
    fn name(&self) -> &str {
        &self.provider
    }

    async fn invoke(
        &self,
        tool: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, DispatchError> {
        let url = self.tool_url(tool);
        let mut request = self.client.post(&url).json(params);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.invocation_error(tool, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(MAX_ERROR_BODY);
            return Err(self.invocation_error(tool, format!("HTTP {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.invocation_error(tool, format!("invalid JSON payload: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
