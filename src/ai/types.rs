use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of a `/chat/completions` call. Exactly one of the token-limit fields is set,
/// depending on which provider the request was built for.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Turn>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct ChatResponse {
    pub text: String,
    pub raw: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("missing env {0}")]
    MissingEnv(&'static str),
    #[error("unknown model nickname: {0}")]
    UnknownModel(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Configuration problems won't go away by resubmitting the same turn.
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::MissingEnv(_) | LlmError::UnknownModel(_))
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn send(&self, req: CompletionRequest) -> Result<ChatResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&Turn::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
        assert_eq!(
            serde_json::from_str::<Role>("\"system\"").unwrap(),
            Role::System
        );
    }

    #[test]
    fn request_omits_unset_token_field() {
        let req = CompletionRequest {
            model: "gpt-5".to_string(),
            messages: vec![Turn::user("Hello")],
            temperature: 1.0,
            max_tokens: None,
            max_completion_tokens: Some(1024),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["max_completion_tokens"], 1024);
        assert!(v.get("max_tokens").is_none());
        assert_eq!(v["messages"][0]["role"], "user");
    }

    #[test]
    fn configuration_errors_are_flagged() {
        assert!(LlmError::MissingEnv("GROQ_API_KEY").is_configuration());
        assert!(LlmError::UnknownModel("gpt4".to_string()).is_configuration());
        assert!(!LlmError::RateLimited.is_configuration());
        assert!(!LlmError::Http("502".to_string()).is_configuration());
    }
}
