//! Streaming client for OpenAI-compatible chat completion endpoints

use crate::config::Config;
use crate::error::{Result, RetentionError};
use crate::llm::query::FragmentStream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{future, stream, Stream, StreamExt};
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A language model that answers one prompt with a stream of text fragments
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn stream_completion(&self, prompt: &str) -> Result<FragmentStream>;

    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

pub struct OpenAiCompatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    /// Longest wait for response headers or for the next body chunk
    idle_timeout: Duration,
}

impl OpenAiCompatClient {
    pub fn new(base_url: &str, api_key: String, model: &str, max_tokens: u32, temperature: f32, timeout: Duration) -> Result<Self> {
        // Whole-stream duration is left to the pipeline budget
        let client = Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            max_tokens,
            temperature,
            idle_timeout: timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.llm.base_url,
            config.api_key()?,
            &config.llm.model,
            config.llm.max_tokens,
            config.llm.temperature,
            Duration::from_secs(config.llm.request_timeout_secs),
        )
    }
}

#[async_trait]
impl ChatCompletion for OpenAiCompatClient {
    async fn stream_completion(&self, prompt: &str) -> Result<FragmentStream> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: true,
        };

        debug!("Sending {} char prompt to {}", prompt.len(), self.model);

        let pending = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("accept", "text/event-stream")
            .json(&request)
            .send();
        let response = tokio::time::timeout(self.idle_timeout, pending)
            .await
            .map_err(|_| idle_error(self.idle_timeout))??;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion endpoint returned {}: {}", status, body);
            return Err(RetentionError::Network(format!("status {}: {}", status.as_u16(), body)));
        }

        let body = response.bytes_stream().map(|chunk| chunk.map_err(RetentionError::from));
        let fragments = with_idle_timeout(body, self.idle_timeout)
            .scan(SseDecoder::default(), |decoder, chunk| {
                if decoder.done {
                    return future::ready(None);
                }
                let items: Vec<Result<String>> = match chunk {
                    Ok(bytes) => decoder.push(&bytes),
                    Err(e) => vec![Err(e)],
                };
                future::ready(Some(stream::iter(items)))
            })
            .flatten()
            .boxed();

        Ok(fragments)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn idle_error(idle: Duration) -> RetentionError {
    RetentionError::Network(format!("no data from completion endpoint for {:.0?}", idle))
}

/// Ends `inner` with a `Network` error once no item arrives within `idle`
pub(crate) fn with_idle_timeout<T, S>(inner: S, idle: Duration) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
    S: Stream<Item = Result<T>> + Send + 'static,
{
    stream::unfold(Some(inner.boxed()), move |state| async move {
        let mut inner = state?;
        match tokio::time::timeout(idle, inner.next()).await {
            Ok(Some(item)) => Some((item, Some(inner))),
            Ok(None) => None,
            Err(_) => Some((Err(idle_error(idle)), None)),
        }
    })
    .boxed()
}

/// Incremental Server-Sent-Events decoder yielding `delta.content` fragments
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    pub(crate) done: bool,
}

impl SseDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<Result<String>> {
        self.buffer.extend_from_slice(bytes);
        let mut out = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if self.done {
                continue;
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(item) = self.decode_line(line.trim()) {
                out.push(item);
            }
        }
        out
    }

    fn decode_line(&mut self, line: &str) -> Option<Result<String>> {
        let data = line.strip_prefix("data:")?.trim_start();
        if data == "[DONE]" {
            self.done = true;
            return None;
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => {
                if let Some(error) = chunk.error {
                    return Some(Err(RetentionError::Network(format!("stream error: {}", error))));
                }
                chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|content| !content.is_empty())
                    .map(Ok)
            }
            Err(e) => Some(Err(RetentionError::Serialization(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_fragments(items: Vec<Result<String>>) -> Vec<String> {
        items.into_iter().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_decodes_content_deltas() {
        let mut decoder = SseDecoder::default();
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Raise \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"salary.\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        let fragments = ok_fragments(decoder.push(body.as_bytes()));
        assert_eq!(fragments, vec!["Raise ", "salary."]);
        assert!(decoder.done);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        let first = decoder.push(b"data: {\"choices\":[{\"delta\":{\"con");
        assert!(first.is_empty());
        let second = ok_fragments(decoder.push(b"tent\":\"Hi\"}}]}\n"));
        assert_eq!(second, vec!["Hi"]);
    }

    #[test]
    fn test_ignores_lines_after_done_and_comments() {
        let mut decoder = SseDecoder::default();
        let fragments = ok_fragments(decoder.push(
            b": keep-alive\ndata: [DONE]\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
        ));
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_error_payload_surfaces() {
        let mut decoder = SseDecoder::default();
        let items = decoder.push(b"data: {\"error\":{\"message\":\"overloaded\"}}\n");
        assert!(matches!(items.as_slice(), [Err(RetentionError::Network(_))]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_body_ends_with_network_error() {
        let body = stream::iter(vec![Ok::<_, RetentionError>(1u8)]).chain(stream::pending());
        let mut stream = with_idle_timeout(body, Duration::from_secs(30));

        assert_eq!(stream.next().await.unwrap().unwrap(), 1);
        assert!(matches!(stream.next().await, Some(Err(RetentionError::Network(_)))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_but_steady_body_is_not_cut() {
        let body = stream::iter(0..5u8).then(|i| async move {
            tokio::time::sleep(Duration::from_secs(20)).await;
            Ok::<_, RetentionError>(i)
        });
        let items: Vec<u8> = with_idle_timeout(body, Duration::from_secs(30))
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
    }
}
