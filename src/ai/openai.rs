use crate::ai::{
    build_llm_http_client, post_chat_completion, ChatResponse, CompletionRequest, LlmError,
    LlmProvider, Turn,
};
use crate::config::AppConfig;
use async_trait::async_trait;

pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// The gpt-5 family rejects any sampling temperature other than this.
pub const OPENAI_FIXED_TEMPERATURE: f32 = 1.0;

#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiProvider {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_llm_http_client(cfg.llm_proxy.as_deref())?,
            api_key: cfg.openai_api_key.clone(),
            base_url: cfg.openai_base_url.clone(),
        })
    }

    /// Caller temperature is ignored. The limit goes under `max_completion_tokens`;
    /// `max_tokens` is deprecated for these models.
    pub fn build_request(
        model: &str,
        messages: Vec<Turn>,
        _temperature: f32,
        max_output_tokens: u32,
    ) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages,
            temperature: OPENAI_FIXED_TEMPERATURE,
            max_tokens: None,
            max_completion_tokens: Some(max_output_tokens),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn send(&self, req: CompletionRequest) -> Result<ChatResponse, LlmError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingEnv("OPENAI_API_KEY"))?;
        log::info!(
            "openai request: model={} messages={} max_completion_tokens={:?}",
            req.model,
            req.messages.len(),
            req.max_completion_tokens
        );
        post_chat_completion(&self.client, &self.base_url, key, &req).await
    }
}
