use crate::ai::{CompletionRequest, LlmError, LlmProvider, Provider, Turn};
use crate::chat::config::GenerationConfig;
use crate::chat::models::ModelAlias;
use std::sync::Arc;

/// A client bound to one model. Holds no conversation state: every call is handed
/// the full history by its owner.
#[derive(Clone)]
pub struct ChatSession {
    alias: ModelAlias,
    client: Arc<dyn LlmProvider>,
}

impl ChatSession {
    pub(crate) fn new(alias: ModelAlias, client: Arc<dyn LlmProvider>) -> Self {
        Self { alias, client }
    }

    pub fn alias(&self) -> ModelAlias {
        self.alias
    }

    pub fn provider(&self) -> Provider {
        self.alias.provider()
    }

    pub fn model_id(&self) -> &'static str {
        self.alias.model_id()
    }

    /// Outgoing message list: system turn (if any), prior turns in order, new user turn.
    pub fn build_messages(
        conversation: &[Turn],
        user_message: &str,
        system_prompt: Option<&str>,
    ) -> Vec<Turn> {
        let mut messages = Vec::with_capacity(conversation.len() + 2);
        if let Some(prompt) = system_prompt.filter(|p| !p.trim().is_empty()) {
            messages.push(Turn::system(prompt));
        }
        messages.extend(conversation.iter().cloned());
        messages.push(Turn::user(user_message));
        messages
    }

    pub fn build_request(
        &self,
        conversation: &[Turn],
        user_message: &str,
        cfg: &GenerationConfig,
    ) -> CompletionRequest {
        let messages = Self::build_messages(conversation, user_message, cfg.system_prompt());
        self.provider().build_request(
            self.model_id(),
            messages,
            cfg.temperature,
            cfg.max_output_tokens,
        )
    }

    /// Sends one turn and returns the assistant's text (possibly empty).
    pub async fn respond(
        &self,
        conversation: &[Turn],
        user_message: &str,
        cfg: &GenerationConfig,
    ) -> Result<String, LlmError> {
        let req = self.build_request(conversation, user_message, cfg);
        let resp = self.client.send(req).await?;
        if let Some(ref raw) = resp.raw {
            log::debug!("{} raw reply: {}", self.model_id(), raw);
        }
        if resp.text.is_empty() {
            log::warn!("{} returned an empty reply", self.model_id());
        }
        Ok(resp.text)
    }
}
