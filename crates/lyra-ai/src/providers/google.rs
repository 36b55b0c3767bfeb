//! Google Generative AI (Gemini) chat sessions

use crate::{
    error::{Error, Result},
    providers::{ChatSession, SessionProvider},
    stream::{ReplyBuilder, StreamEvent, StreamEventStream},
    types::{ChatConfig, StopReason, Turn, Usage},
};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Environment variables checked for a Gemini API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Header carrying the API key; the key never goes in the URL
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Generative AI client
#[derive(Clone, Default)]
pub struct GoogleProvider {
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a new Google provider
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionProvider for GoogleProvider {
    fn start_chat(&self, api_key: &str, config: &ChatConfig) -> Result<Arc<dyn ChatSession>> {
        if api_key.trim().is_empty() {
            return Err(Error::InvalidApiKey);
        }
        if config.model.is_empty() {
            return Err(Error::InvalidConfig("model must not be empty".into()));
        }

        tracing::debug!(model = %config.model, "starting Gemini chat session");

        Ok(Arc::new(GoogleChat {
            client: self.client.clone(),
            api_key: api_key.to_string(),
            config: config.clone(),
            history: Arc::new(Mutex::new(Vec::new())),
        }))
    }
}

/// A multi-turn Gemini conversation.
///
/// History only grows when an exchange completes; failed exchanges leave it
/// untouched.
pub struct GoogleChat {
    client: reqwest::Client,
    api_key: String,
    config: ChatConfig,
    history: Arc<Mutex<Vec<Turn>>>,
}

impl GoogleChat {
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ChatSession for GoogleChat {
    async fn send_message_stream(&self, message: &str) -> Result<StreamEventStream> {
        let request = {
            let history = self.history.lock();
            build_request(&history, message, &self.config)
        };

        let request_builder = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request);

        let event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        Ok(Box::pin(create_stream(
            event_source,
            self.config.model.clone(),
            message.to_string(),
            Arc::clone(&self.history),
        )))
    }
}

fn build_request(history: &[Turn], message: &str, config: &ChatConfig) -> GeminiRequest {
    let mut contents: Vec<GeminiContent> = history
        .iter()
        .map(|turn| GeminiContent {
            role: Some(turn.role.as_str().to_string()),
            parts: vec![GeminiPart {
                text: turn.text.clone(),
            }],
        })
        .collect();

    contents.push(GeminiContent {
        role: Some("user".to_string()),
        parts: vec![GeminiPart {
            text: message.to_string(),
        }],
    });

    let system_instruction = if config.system_instruction.is_empty() {
        None
    } else {
        Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: config.system_instruction.clone(),
            }],
        })
    };

    GeminiRequest {
        contents,
        system_instruction,
        generation_config: GeminiGenerationConfig {
            temperature: Some(config.temperature),
        },
    }
}

/// What one SSE data payload contributed to the reply
#[derive(Debug, Default, PartialEq)]
struct ParsedChunk {
    texts: Vec<String>,
    stop_reason: Option<StopReason>,
    usage: Option<Usage>,
}

/// Parse one SSE data payload. Errors carry the message to surface.
fn parse_chunk(data: &str) -> std::result::Result<ParsedChunk, String> {
    let response: GeminiStreamResponse = match serde_json::from_str(data) {
        Ok(response) => response,
        Err(e) => {
            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(data) {
                return Err(error_response.error.message);
            }
            return Err(format!("Failed to parse chunk: {}", e));
        }
    };

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_ref())
    {
        return Err(format!("Prompt blocked: {}", reason));
    }

    let mut chunk = ParsedChunk::default();

    for candidate in &response.candidates {
        if let Some(ref content) = candidate.content {
            for part in &content.parts {
                if part.thought {
                    continue;
                }
                if let Some(ref text) = part.text {
                    chunk.texts.push(text.clone());
                }
            }
        }
        if let Some(ref reason) = candidate.finish_reason {
            chunk.stop_reason = StopReason::from_finish_reason(reason);
        }
    }

    if let Some(ref usage) = response.usage_metadata {
        chunk.usage = Some(Usage {
            input: usage.prompt_token_count.unwrap_or(0),
            output: usage.candidates_token_count.unwrap_or(0),
        });
    }

    Ok(chunk)
}

fn create_stream(
    mut event_source: EventSource,
    model: String,
    message: String,
    history: Arc<Mutex<Vec<Turn>>>,
) -> impl futures::Stream<Item = StreamEvent> {
    stream! {
        let mut builder = ReplyBuilder::new();

        yield StreamEvent::Start { model };

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(msg)) => {
                    if msg.data.is_empty() || msg.data == "[DONE]" {
                        continue;
                    }

                    match parse_chunk(&msg.data) {
                        Ok(chunk) => {
                            for text in chunk.texts {
                                builder.push_delta(&text);
                                yield StreamEvent::TextDelta { delta: text };
                            }
                            if let Some(reason) = chunk.stop_reason {
                                builder.set_stop_reason(reason);
                            }
                            if let Some(usage) = chunk.usage {
                                builder.set_usage(usage);
                            }
                        }
                        Err(message) => {
                            event_source.close();
                            yield StreamEvent::Error { message };
                            return;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    event_source.close();
                    let body = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                        .map(|e| e.error.message)
                        .unwrap_or_else(|_| format!("HTTP {}", status));
                    yield StreamEvent::Error { message };
                    return;
                }
                Err(reqwest_eventsource::Error::Transport(e)) => {
                    event_source.close();
                    yield StreamEvent::Error {
                        message: format!("transport error: {}", e.without_url()),
                    };
                    return;
                }
                Err(e) => {
                    event_source.close();
                    yield StreamEvent::Error {
                        message: format!("SSE error: {}", e),
                    };
                    return;
                }
            }
        }

        event_source.close();

        {
            let mut history = history.lock();
            history.push(Turn::user(message));
            history.push(Turn::model(builder.text()));
        }

        yield builder.finish();
    }
}

// Request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
