//! Generative text boundary.
//!
//! Three requests go out through a [`TextService`]: photo analysis, advisor
//! questions, and dashboard alerts. The façade functions here never fail;
//! any service or parse error is logged and turned into an empty result.
//! The `try_*` variants keep the error for callers that track call state.

pub mod gemini;
pub mod parse;
pub mod prompts;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::dashboard::FarmMetrics;
use crate::error::ServiceError;
use crate::state::FarmState;

pub use gemini::GeminiClient;
pub use parse::{Alert, Severity};

/// Per-request timeout for the text service.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Inline image sent alongside a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub prompt: String,
    pub image: Option<ImagePayload>,
}

impl TextRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }
}

#[async_trait]
pub trait TextService: Send + Sync {
    async fn generate(&self, request: TextRequest) -> Result<String, ServiceError>;
}

// =============================================================================
// Image analysis
// =============================================================================

pub async fn try_analyze_image(
    service: &dyn TextService,
    bytes: Vec<u8>,
    mime_type: &str,
) -> Result<String, ServiceError> {
    if bytes.is_empty() {
        return Err(ServiceError::Configuration("empty image payload".to_string()));
    }
    let request = TextRequest {
        prompt: prompts::IMAGE_ANALYSIS_PROMPT.to_string(),
        image: Some(ImagePayload {
            bytes,
            mime_type: mime_type.to_string(),
        }),
    };
    let text = service.generate(request).await?;
    plain_text(text)
}

/// Describe an animal photo. Empty string on failure.
pub async fn analyze_image(service: &dyn TextService, bytes: Vec<u8>, mime_type: &str) -> String {
    try_analyze_image(service, bytes, mime_type)
        .await
        .unwrap_or_else(|e| {
            log::warn!("Image analysis failed: {}", e);
            String::new()
        })
}

// =============================================================================
// Advisor
// =============================================================================

pub async fn try_ask_advisor(
    service: &dyn TextService,
    query: &str,
    context: &str,
) -> Result<String, ServiceError> {
    let text = service
        .generate(TextRequest::text(prompts::advisor_prompt(query, context)))
        .await?;
    plain_text(text)
}

/// Answer a free-form question with farm context. Empty string on failure.
pub async fn ask_advisor(service: &dyn TextService, query: &str, context: &str) -> String {
    if query.trim().is_empty() {
        return String::new();
    }
    try_ask_advisor(service, query, context)
        .await
        .unwrap_or_else(|e| {
            log::warn!("Advisor request failed: {}", e);
            String::new()
        })
}

/// Build advisor context from the current state.
pub fn advisor_context(state: &FarmState, today: NaiveDate) -> String {
    prompts::advisor_context(state, today)
}

// =============================================================================
// Alerts
// =============================================================================

pub async fn try_generate_alerts(
    service: &dyn TextService,
    metrics: &FarmMetrics,
) -> Result<Vec<Alert>, ServiceError> {
    let text = service
        .generate(TextRequest::text(prompts::alerts_prompt(metrics)))
        .await?;
    parse::parse_alerts(&text)
}

/// Ask for operational alerts from a metrics snapshot. Empty on failure.
pub async fn generate_alerts(service: &dyn TextService, metrics: &FarmMetrics) -> Vec<Alert> {
    match try_generate_alerts(service, metrics).await {
        Ok(alerts) => {
            log::debug!("Received {} alerts", alerts.len());
            alerts
        }
        Err(e) => {
            log::warn!("Alert generation failed: {}", e);
            Vec::new()
        }
    }
}

fn plain_text(text: String) -> Result<String, ServiceError> {
    if parse::looks_like_html(&text) {
        return Err(ServiceError::HtmlResponse);
    }
    Ok(text.trim().to_string())
}
