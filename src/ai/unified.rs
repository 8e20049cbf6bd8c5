use crate::ai::groq::GroqProvider;
use crate::ai::openai::OpenAiProvider;
use crate::ai::types::{CompletionRequest, Turn};

/// The two hosted backends a nickname can resolve to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    OpenAi,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
        }
    }

    /// Whether the caller's temperature reaches the wire.
    pub fn honours_temperature(&self) -> bool {
        matches!(self, Provider::Groq)
    }

    pub fn build_request(
        &self,
        model: &str,
        messages: Vec<Turn>,
        temperature: f32,
        max_output_tokens: u32,
    ) -> CompletionRequest {
        match self {
            Provider::Groq => {
                GroqProvider::build_request(model, messages, temperature, max_output_tokens)
            }
            Provider::OpenAi => {
                OpenAiProvider::build_request(model, messages, temperature, max_output_tokens)
            }
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_per_provider() {
        let groq = Provider::Groq.build_request("m", vec![], 0.25, 512);
        assert_eq!(groq.temperature, 0.25);
        assert_eq!(groq.max_tokens, Some(512));

        let openai = Provider::OpenAi.build_request("m", vec![], 0.25, 512);
        assert_eq!(openai.temperature, 1.0);
        assert_eq!(openai.max_completion_tokens, Some(512));
        assert!(!Provider::OpenAi.honours_temperature());
    }
}
