use crate::ai::{GroqProvider, LlmError, LlmProvider, OpenAiProvider, Provider};
use crate::chat::models::ModelAlias;
use crate::chat::session::ChatSession;
use crate::config::AppConfig;
use std::str::FromStr;
use std::sync::Arc;

/// Owns one client per provider and hands out sessions bound to a nickname.
#[derive(Clone)]
pub struct ProviderRouter {
    groq: Arc<dyn LlmProvider>,
    openai: Arc<dyn LlmProvider>,
}

impl ProviderRouter {
    pub fn new(groq: Arc<dyn LlmProvider>, openai: Arc<dyn LlmProvider>) -> Self {
        Self { groq, openai }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, LlmError> {
        if cfg.groq_api_key.is_none() {
            log::warn!("GROQ_API_KEY not set; llama models will fail on first request");
        }
        if cfg.openai_api_key.is_none() {
            log::warn!("OPENAI_API_KEY not set; gpt models will fail on first request");
        }
        Ok(Self::new(
            Arc::new(GroqProvider::from_config(cfg)?),
            Arc::new(OpenAiProvider::from_config(cfg)?),
        ))
    }

    pub fn client_for(&self, provider: Provider) -> Arc<dyn LlmProvider> {
        match provider {
            Provider::Groq => Arc::clone(&self.groq),
            Provider::OpenAi => Arc::clone(&self.openai),
        }
    }

    pub fn bind_alias(&self, alias: ModelAlias) -> ChatSession {
        log::info!(
            "binding {} -> {} ({})",
            alias.nickname(),
            alias.model_id(),
            alias.provider()
        );
        ChatSession::new(alias, self.client_for(alias.provider()))
    }

    /// Fails with `LlmError::UnknownModel` for a nickname outside the alias table.
    pub fn bind(&self, nickname: &str) -> Result<ChatSession, LlmError> {
        let alias = ModelAlias::from_str(nickname)?;
        Ok(self.bind_alias(alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::session::tests::FakeProvider;
    use crate::chat::GenerationConfig;

    #[tokio::test]
    async fn llama_binds_groq_client() {
        let groq = FakeProvider::replying("from groq");
        let openai = FakeProvider::replying("from openai");
        let router = ProviderRouter::new(groq.clone(), openai.clone());

        let session = router.bind("llama3.1").unwrap();
        assert_eq!(session.provider(), Provider::Groq);
        assert_eq!(session.model_id(), "llama-3.1-8b-instant");

        let text = session
            .respond(&[], "hi", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(text, "from groq");
        assert!(openai.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn gpt5_binds_openai_and_forces_temperature() {
        let groq = FakeProvider::replying("from groq");
        let openai = FakeProvider::replying("from openai");
        let router = ProviderRouter::new(groq.clone(), openai.clone());

        let session = router.bind("gpt5").unwrap();
        assert_eq!(session.provider(), Provider::OpenAi);
        assert_eq!(session.model_id(), "gpt-5");

        let mut cfg = GenerationConfig::default();
        cfg.set_temperature(0.3);
        let text = session.respond(&[], "hi", &cfg).await.unwrap();
        assert_eq!(text, "from openai");
        assert_eq!(openai.last_request().temperature, 1.0);
        assert!(groq.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn every_alias_binds_its_own_provider() {
        let router = ProviderRouter::new(
            FakeProvider::replying("a"),
            FakeProvider::replying("b"),
        );
        for alias in ModelAlias::ALL {
            let session = router.bind(alias.nickname()).unwrap();
            assert_eq!(session.alias(), alias);
            assert_eq!(session.provider(), alias.provider());
            assert_eq!(session.model_id(), alias.model_id());
        }
    }

    #[test]
    fn unknown_nickname_fails() {
        let router = ProviderRouter::new(
            FakeProvider::replying("a"),
            FakeProvider::replying("b"),
        );
        let err = router.bind("claude").err().unwrap();
        assert!(matches!(err, LlmError::UnknownModel(ref n) if n == "claude"));
    }

    #[test]
    fn builds_from_config_without_keys() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        let router = ProviderRouter::from_config(&cfg).unwrap();
        assert_eq!(router.bind_alias(cfg.default_model).model_id(), "llama-3.3-70b-versatile");
    }
}
