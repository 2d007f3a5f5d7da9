use crate::decode::Utf8Decoder;
use anyhow::{anyhow, Result};
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use shared::agent_api::{ChatRequest, StreamChunk};
use shared::settings::ReaderSettings;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// A chat backend that answers a question as a sequence of text fragments.
///
/// Contract: if the request fails *before* any fragment is sent, returns `Err(...)`.
/// Once streaming starts, failures go through `StreamChunk::Error` and the method
/// returns `Ok(())`. Either way the final chunk on a normal run is `StreamChunk::Done`.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    async fn stream_answer(&self, question: &str, tx: UnboundedSender<StreamChunk>) -> Result<()>;
}

/// Client for the plain-text streaming chat endpoint (`POST {"question": ...}`).
pub struct StreamClient {
    http: Client,
    endpoint: String,
}

impl StreamClient {
    /// `timeout` bounds connecting and each wait for the next body chunk, not
    /// the whole answer, so long answers can keep streaming.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| anyhow!("failed to build HTTP client: {}", e))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_settings(settings: &ReaderSettings) -> Result<Self> {
        Self::new(
            settings.chat_endpoint(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatBackend for StreamClient {
    async fn stream_answer(&self, question: &str, tx: UnboundedSender<StreamChunk>) -> Result<()> {
        tracing::info!("POST {} ({} chars)", self.endpoint, question.len());

        let req = ChatRequest {
            question: question.to_string(),
        };
        let resp = self.http.post(&self.endpoint).json(&req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("chat backend error: {}", status));
        }
        if status == StatusCode::NO_CONTENT {
            return Err(anyhow!("response has no body"));
        }

        let mut stream = resp.bytes_stream();
        let mut decoder = Utf8Decoder::new();

        loop {
            // Nobody is listening any more; stop reading
            if tx.is_closed() {
                tracing::debug!("stream receiver dropped, abandoning response body");
                return Ok(());
            }

            let Some(chunk) = stream.next().await else {
                break;
            };

            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    let _ = tx.send(StreamChunk::Error(format!("stream read error: {}", e)));
                    return Ok(());
                }
            };

            match decoder.feed(&bytes) {
                Ok(text) => {
                    if !text.is_empty() {
                        tracing::debug!("fragment: {} bytes", text.len());
                        let _ = tx.send(StreamChunk::Text(text));
                    }
                }
                Err(e) => {
                    let _ = tx.send(StreamChunk::Error(e.to_string()));
                    return Ok(());
                }
            }
        }

        if let Err(e) = decoder.finish() {
            let _ = tx.send(StreamChunk::Error(e.to_string()));
            return Ok(());
        }

        let _ = tx.send(StreamChunk::Done);
        Ok(())
    }
}
