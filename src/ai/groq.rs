use crate::ai::{
    build_llm_http_client, post_chat_completion, ChatResponse, CompletionRequest, LlmError,
    LlmProvider, Turn,
};
use crate::config::AppConfig;
use async_trait::async_trait;

pub const GROQ_DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Groq serves the open models (llama) through an OpenAI-style API.
#[derive(Clone)]
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GroqProvider {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_llm_http_client(cfg.llm_proxy.as_deref())?,
            api_key: cfg.groq_api_key.clone(),
            base_url: cfg.groq_base_url.clone(),
        })
    }

    /// Temperature and token limit go through unchanged, under `max_tokens`.
    pub fn build_request(
        model: &str,
        messages: Vec<Turn>,
        temperature: f32,
        max_output_tokens: u32,
    ) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens: Some(max_output_tokens),
            max_completion_tokens: None,
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn send(&self, req: CompletionRequest) -> Result<ChatResponse, LlmError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingEnv("GROQ_API_KEY"))?;
        log::info!(
            "groq request: model={} messages={} temperature={} max_tokens={:?}",
            req.model,
            req.messages.len(),
            req.temperature,
            req.max_tokens
        );
        post_chat_completion(&self.client, &self.base_url, key, &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_sampling_params_through() {
        let req = GroqProvider::build_request(
            "llama-3.1-8b-instant",
            vec![Turn::user("hey")],
            0.3,
            640,
        );
        assert_eq!(req.temperature, 0.3);
        assert_eq!(req.max_tokens, Some(640));
        assert_eq!(req.max_completion_tokens, None);

        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["max_tokens"], 640);
        assert!(v.get("max_completion_tokens").is_none());
    }

    #[tokio::test]
    async fn missing_key_fails_on_send() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        let provider = GroqProvider::from_config(&cfg).unwrap();
        let req = GroqProvider::build_request("llama-3.3-70b-versatile", vec![], 0.7, 1024);
        let err = provider.send(req).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingEnv("GROQ_API_KEY")));
    }
}
