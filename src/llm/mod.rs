//! Completion-service boundary used to derive narrative text from deal
//! metadata. The rest of the crate only sees [`LLMProvider`]; the concrete
//! client and its credentials are constructed once at startup and carried in
//! application state.

use async_trait::async_trait;
use log::error;
use serde_json::Value;
use thiserror::Error;

pub mod prompts;

use self::prompts::DealContext;

pub const SUMMARY_MAX_TOKENS: u32 = 200;
pub const MARKET_RESEARCH_MAX_TOKENS: u32 = 2000;

pub const SUMMARY_FALLBACK: &str =
    "Unable to generate summary at this time. Please try again later.";
pub const MARKET_RESEARCH_FALLBACK: &str =
    "Unable to generate market research at this time. Please try again later.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("completion response carried no content")]
    EmptyResponse,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError>;
}

pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: String, base_url: Option<String>, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "max_tokens": max_tokens,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::Status(response.status()));
        }

        let result: Value = response.json().await?;
        result["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Executive summary for a deal. Generation failure degrades to a fixed
/// fallback string instead of propagating; the caller always gets text.
pub async fn generate_deal_summary(llm: &dyn LLMProvider, ctx: &DealContext) -> String {
    match llm
        .generate(&prompts::summary_prompt(ctx), SUMMARY_MAX_TOKENS)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            error!("deal summary generation failed: {e}");
            SUMMARY_FALLBACK.to_string()
        }
    }
}

/// Full market-research report body. Same degradation contract as
/// [`generate_deal_summary`].
pub async fn generate_market_research(llm: &dyn LLMProvider, ctx: &DealContext) -> String {
    match llm
        .generate(
            &prompts::market_research_prompt(ctx),
            MARKET_RESEARCH_MAX_TOKENS,
        )
        .await
    {
        Ok(text) => text,
        Err(e) => {
            error!("market research generation failed: {e}");
            MARKET_RESEARCH_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(&'static str);

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LLMProvider for FailingProvider {
        async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
            Err(LlmError::EmptyResponse)
        }
    }

    fn ctx() -> DealContext {
        DealContext {
            company: "Acme".to_string(),
            website: None,
            internal_contact: None,
            business_unit: None,
            deal_type: "Vendor".to_string(),
            investment_size: None,
            use_case: None,
            notes: Some("Met at conference".to_string()),
            tags: vec![],
            industry: None,
        }
    }

    #[tokio::test]
    async fn summary_passes_provider_output_through() {
        let out = generate_deal_summary(&FixedProvider("A promising deal."), &ctx()).await;
        assert_eq!(out, "A promising deal.");
    }

    #[tokio::test]
    async fn summary_degrades_to_fallback_on_provider_failure() {
        let out = generate_deal_summary(&FailingProvider, &ctx()).await;
        assert_eq!(out, SUMMARY_FALLBACK);
    }

    #[tokio::test]
    async fn market_research_degrades_to_fallback_on_provider_failure() {
        let out = generate_market_research(&FailingProvider, &ctx()).await;
        assert_eq!(out, MARKET_RESEARCH_FALLBACK);
    }
}
