mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use threadtally_common::Confidence;

use crate::traits::{ValidationAuthority, Verdict};
use client::LlmClient;
use types::{ChatRequest, ToolDefinitionWire, WireMessage};

/// What the LLM returns for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerdictWire {
    /// Whether the text names a real, identifiable creative work.
    pub is_real_title: bool,
    /// The canonical release title, if real.
    pub canonical_title: Option<String>,
    /// "high", "medium", or "low"
    pub confidence: String,
}

const VALIDATION_SYSTEM_PROMPT: &str = r#"You verify whether a short piece of text names a real creative work: a movie, TV show, song, album, book, or video game.

The text comes from a social-media reply thread where people answer a prompt like "what's your favorite movie?". It may be a misspelled title, a partial title, a title plus commentary, or not a title at all.

Rules:
- is_real_title: true only if the text clearly refers to one identifiable released work.
- canonical_title: the work's standard release title, with official capitalization and spelling. Correct misspellings and expand partial titles when the intended work is unambiguous ("the godfther" -> "The Godfather"). Never invent a title.
- If the text could refer to several different works with no way to pick one, set is_real_title false.
- confidence: "high" when the text is an exact or near-exact title, "medium" when you corrected spelling or expanded a partial title, "low" when the match is plausible but uncertain.

Plain conversation, opinions without a title, and generic phrases ("good one", "so true") are not titles."#;

/// LLM-backed validation authority.
#[derive(Clone)]
pub struct LlmAuthority {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl LlmAuthority {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    fn client(&self) -> LlmClient {
        let client = LlmClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    async fn verdict_wire(&self, candidate: &str) -> Result<VerdictWire> {
        let schema = serde_json::to_value(schemars::schema_for!(VerdictWire))?;

        let tool_name = "record_verdict";
        let mut request = ChatRequest::new(&self.model)
            .system(VALIDATION_SYSTEM_PROMPT)
            .message(WireMessage::user(format!(
                "Does this text name a real creative work?\n\n{candidate}"
            )))
            .temperature(0.0)
            .tool(ToolDefinitionWire {
                name: tool_name.to_string(),
                description: "Record the validation verdict for the candidate text.".to_string(),
                input_schema: schema,
            });
        request.tool_choice = Some(serde_json::json!({
            "type": "tool",
            "name": tool_name,
        }));

        let response = self.client().chat(&request).await?;

        let input = response
            .tool_input()
            .ok_or_else(|| anyhow!("No structured verdict in authority response"))?;
        serde_json::from_value(input.clone())
            .map_err(|e| anyhow!("Failed to deserialize verdict: {}", e))
    }
}

#[async_trait]
impl ValidationAuthority for LlmAuthority {
    async fn validate(&self, candidate: &str) -> Result<Verdict> {
        let wire = self.verdict_wire(candidate).await?;

        let confidence = match wire.confidence.as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        };

        // A validated verdict with no canonical spelling is malformed; treat
        // it as a rejection rather than inventing a title locally.
        let verdict = match (wire.is_real_title, wire.canonical_title) {
            (true, Some(title)) if !title.trim().is_empty() => {
                Verdict::confirmed(title.trim().to_string(), confidence)
            }
            (true, _) => {
                debug!(candidate, "authority confirmed without a canonical title, rejecting");
                Verdict::rejected(Confidence::Low)
            }
            (false, _) => Verdict::rejected(confidence),
        };

        Ok(verdict)
    }
}
