use async_trait::async_trait;
use log::debug;

use crate::config::Settings;
use crate::{Error, Result};

/// Instruction prepended to every transcript
pub const SUMMARY_PROMPT: &str = "You are a YouTube video summarizer. You will be taking the transcript text \
and summarizing the entire video and providing the important summary in points \
within 250 words. Please provide the summary of the text given here: ";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Remote text generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, payload: &str) -> Result<String>;
}

/// Summarize a transcript: the prompt goes immediately before the transcript, no delimiter
pub async fn generate_summary(generator: &dyn TextGenerator, transcript: &str, prompt: &str) -> Result<String> {
    let payload = format!("{prompt}{transcript}");
    debug!("Requesting summary: payload {} chars", payload.chars().count());
    generator.generate(&payload).await
}

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, settings: &Settings) -> Self {
        Self {
            http,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, payload: &str) -> Result<String> {
        debug!("Generating via Gemini API with model {}", self.model);

        let resp = self
            .http
            .post(self.request_url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request_body(payload))
            .send()
            .await
            .map_err(|e| Error::GenerationFailed {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::GenerationFailed {
                status: Some(status.as_u16()),
                message: format!("Gemini API returned {status}: {body}"),
            });
        }

        let json: serde_json::Value = resp.json().await.map_err(|e| Error::GenerationFailed {
            status: None,
            message: format!("invalid Gemini response: {e}"),
        })?;
        extract_gemini_text(&json)
    }
}

fn request_body(payload: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [
            {
                "parts": [
                    { "text": payload }
                ]
            }
        ]
    })
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String> {
    if let Some(parts) = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text")?.as_str())
            .collect();
        if !text.is_empty() {
            return Ok(text);
        }
    }

    let reason = json
        .pointer("/promptFeedback/blockReason")
        .and_then(|r| r.as_str())
        .map(|r| format!("prompt blocked ({r})"))
        .unwrap_or_else(|| "response contained no text".to_string());
    Err(Error::GenerationFailed {
        status: None,
        message: reason,
    })
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::*;

    /// Records every payload and answers with a canned result
    pub struct FakeGenerator {
        pub payloads: Mutex<Vec<String>>,
        reply: std::result::Result<String, (Option<u16>, String)>,
    }

    impl FakeGenerator {
        pub fn replying(text: &str) -> Self {
            Self {
                payloads: Mutex::new(Vec::new()),
                reply: Ok(text.to_string()),
            }
        }

        pub fn failing(status: Option<u16>, message: &str) -> Self {
            Self {
                payloads: Mutex::new(Vec::new()),
                reply: Err((status, message.to_string())),
            }
        }

        pub fn calls(&self) -> usize {
            self.payloads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, payload: &str) -> Result<String> {
            self.payloads.lock().unwrap().push(payload.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err((status, message)) => Err(Error::GenerationFailed {
                    status: *status,
                    message: message.clone(),
                }),
            }
        }
    }
}
