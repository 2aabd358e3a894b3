//! HTTP client for the Gemini `generateContent` API.
//!
//! One request per call, no retries. The API key travels as a query
//! parameter; images are sent as base64 inline data.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;

use super::parse::looks_like_html;
use super::{TextRequest, TextService, REQUEST_TIMEOUT_SECS};
use crate::config::TextServiceConfig;
use crate::error::ServiceError;

/// Error bodies are cut to this many characters before being kept.
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    /// Build a client from config. Fails when no API key is configured.
    pub fn from_config(config: &TextServiceConfig) -> Result<Self, ServiceError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ServiceError::Configuration("no text service API key".to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn body(request: &TextRequest) -> serde_json::Value {
        let mut parts = vec![serde_json::json!({ "text": request.prompt })];
        if let Some(image) = &request.image {
            parts.push(serde_json::json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": base64::engine::general_purpose::STANDARD.encode(&image.bytes),
                }
            }));
        }
        serde_json::json!({ "contents": [{ "parts": parts }] })
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(body: &str) -> Result<String, ServiceError> {
    if looks_like_html(body) {
        return Err(ServiceError::HtmlResponse);
    }
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ServiceError::Malformed("reply has no text".to_string()));
    }
    Ok(text)
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[async_trait]
impl TextService for GeminiClient {
    async fn generate(&self, request: TextRequest) -> Result<String, ServiceError> {
        log::debug!(
            "Text service request to {} ({} prompt chars, image: {})",
            self.model,
            request.prompt.len(),
            request.image.is_some()
        );
        let resp = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&Self::body(&request))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimited);
        }
        if !status.is_success() {
            if looks_like_html(&body) {
                return Err(ServiceError::HtmlResponse);
            }
            return Err(ServiceError::Http {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }
        response_text(&body)
    }
}
