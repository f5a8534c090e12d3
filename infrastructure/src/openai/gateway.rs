//! Streaming completion gateway for OpenAI-compatible endpoints.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use confab_application::ports::completion_gateway::{
    CompletionGateway, CompletionRequest, GatewayError, StreamHandle,
};
use confab_application::ports::settings::{Settings, SettingsProvider};
use confab_domain::StreamEvent;
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::protocol::{ChatCompletionRequest, DONE_MARKER, SseBuffer, delta_content};

/// HTTP client plus the credentials it was built with.
///
/// Configuration is hot-reloadable, so the client is rebuilt whenever the
/// effective host/key/organization change and reused otherwise.
struct CachedClient {
    http: reqwest::Client,
    api_host: String,
    api_key: String,
    organization: String,
}

/// Gateway speaking the OpenAI chat-completions SSE protocol.
pub struct OpenAiGateway {
    settings: Arc<dyn SettingsProvider>,
    client: Mutex<Option<CachedClient>>,
}

impl OpenAiGateway {
    pub fn new(settings: Arc<dyn SettingsProvider>) -> Self {
        Self {
            settings,
            client: Mutex::new(None),
        }
    }

    /// Get a client for the snapshot's credentials, rebuilding on change.
    fn client_for(&self, settings: &Settings) -> Result<reqwest::Client, GatewayError> {
        let mut cached = self.client.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(client) = cached.as_ref()
            && client.api_host == settings.api_host
            && client.api_key == settings.api_key
            && client.organization == settings.organization
        {
            return Ok(client.http.clone());
        }

        debug!(host = %settings.api_host, "building completion client");

        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", settings.api_key);
        let mut auth = HeaderValue::from_str(&bearer)
            .map_err(|e| GatewayError::Connection(format!("invalid api key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        if !settings.organization.is_empty() {
            let org = HeaderValue::from_str(&settings.organization)
                .map_err(|e| GatewayError::Connection(format!("invalid organization: {e}")))?;
            headers.insert("OpenAI-Organization", org);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        *cached = Some(CachedClient {
            http: http.clone(),
            api_host: settings.api_host.clone(),
            api_key: settings.api_key.clone(),
            organization: settings.organization.clone(),
        });
        Ok(http)
    }

    /// Build the completions URL from a bare host or a full base URL.
    fn endpoint(api_host: &str) -> String {
        let base = api_host.trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{base}/v1/chat/completions")
        } else {
            format!("https://{base}/v1/chat/completions")
        }
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
        cancel: CancellationToken,
    ) -> Result<StreamHandle, GatewayError> {
        let settings = self.settings.snapshot();
        let http = self.client_for(&settings)?;
        let url = Self::endpoint(&settings.api_host);

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            stream: true,
        };

        debug!(
            %url,
            model = %request.model,
            messages = request.messages.len(),
            "opening streaming completion"
        );

        // Connection setup honors the token too; a server that accepts the
        // socket but withholds response headers must not pin the cycle.
        let response = tokio::select! {
            response = http.post(&url).json(&body).send() => {
                response.map_err(|e| GatewayError::Connection(e.to_string()))?
            }
            _ = cancel.cancelled() => {
                return Err(GatewayError::Connection("request canceled".to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "completion request rejected");
            return Err(GatewayError::RequestFailed(format!("{status}: {detail}")));
        }

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut sse = SseBuffer::new();

            loop {
                let chunk = tokio::select! {
                    _ = cancel.cancelled() => break,
                    chunk = stream.next() => chunk,
                };
                let Some(chunk) = chunk else { break };

                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };

                sse.push(&bytes);
                while let Some(data) = sse.next_data() {
                    if data == DONE_MARKER {
                        let _ = tx.send(StreamEvent::Done).await;
                        return;
                    }
                    if let Some(content) = delta_content(&data)
                        && tx.send(StreamEvent::Delta(content)).await.is_err()
                    {
                        return;
                    }
                }
            }

            // Connection closed without a terminator; treat a non-cancelled
            // end of stream as completion.
            if !cancel.is_cancelled() {
                let _ = tx.send(StreamEvent::Done).await;
            }
        });

        Ok(StreamHandle::new(rx))
    }
}
