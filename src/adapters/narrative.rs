use crate::core::{ConfigProvider, NarrativeGenerator};
use crate::utils::error::{InsightError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

const SYSTEM_PROMPT: &str = "You are a professional data analyst. \
Analyze data and provide insights in both English and Arabic. \
Include: 1) Executive Summary (ملخص تنفيذي), 2) Key Findings (النتائج الرئيسية), \
3) Trends (الاتجاهات), 4) Recommendations (التوصيات). Use clear structure.";
const USER_SUFFIX: &str = "\n\nAnalyze this data completely.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client (DeepSeek by default).
pub struct DeepSeekNarrator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl DeepSeekNarrator {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl NarrativeGenerator for DeepSeekNarrator {
    async fn generate(&self, digest: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("{}{}", digest, USER_SUFFIX),
                },
            ],
            temperature: 0.7,
            max_tokens: 2000,
        };

        tracing::debug!("Requesting narrative from {}", self.completions_url());
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| InsightError::narrative(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::narrative(format!("HTTP {}", status)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| InsightError::narrative(format!("malformed response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| InsightError::narrative("response has no message content"))
    }
}

/// Stands in when no narrative service is configured.
pub struct DisabledNarrator {
    reason: String,
}

impl DisabledNarrator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for DisabledNarrator {
    async fn generate(&self, _digest: &str) -> Result<String> {
        Err(InsightError::narrative(self.reason.clone()))
    }
}

pub fn narrator_from_config<C: ConfigProvider>(config: &C) -> Result<Box<dyn NarrativeGenerator>> {
    if !config.narrative_enabled() {
        tracing::info!("Narrative generation disabled");
        return Ok(Box::new(DisabledNarrator::new("narrative generation disabled")));
    }

    match config.api_key() {
        Some(key) if !key.trim().is_empty() => {
            let narrator = DeepSeekNarrator::new(
                config.narrative_endpoint(),
                config.narrative_model(),
                key,
                Duration::from_secs(config.timeout_seconds()),
            )?;
            Ok(Box::new(narrator))
        }
        _ => {
            tracing::warn!("⚠️ No API key configured, narrative will use the fallback text");
            Ok(Box::new(DisabledNarrator::new("no API key configured")))
        }
    }
}
