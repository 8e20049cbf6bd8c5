use crate::ai::{LlmError, Provider};
use std::str::FromStr;

/// User-facing model nicknames. Each one belongs to exactly one provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ModelAlias {
    Gpt5,
    Gpt5Mini,
    Gpt5Nano,
    Llama31,
    #[default]
    Llama33,
}

impl ModelAlias {
    /// Picker order.
    pub const ALL: [ModelAlias; 5] = [
        ModelAlias::Gpt5,
        ModelAlias::Gpt5Mini,
        ModelAlias::Gpt5Nano,
        ModelAlias::Llama31,
        ModelAlias::Llama33,
    ];

    pub fn nickname(&self) -> &'static str {
        match self {
            ModelAlias::Gpt5 => "gpt5",
            ModelAlias::Gpt5Mini => "gpt5mini",
            ModelAlias::Gpt5Nano => "gpt5nano",
            ModelAlias::Llama31 => "llama3.1",
            ModelAlias::Llama33 => "llama3.3",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ModelAlias::Gpt5 | ModelAlias::Gpt5Mini | ModelAlias::Gpt5Nano => Provider::OpenAi,
            ModelAlias::Llama31 | ModelAlias::Llama33 => Provider::Groq,
        }
    }

    /// The provider's own model identifier.
    pub fn model_id(&self) -> &'static str {
        match self {
            ModelAlias::Gpt5 => "gpt-5",
            ModelAlias::Gpt5Mini => "gpt-5-mini",
            ModelAlias::Gpt5Nano => "gpt-5-nano",
            ModelAlias::Llama31 => "llama-3.1-8b-instant",
            ModelAlias::Llama33 => "llama-3.3-70b-versatile",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|m| m == self).unwrap_or(0)
    }

    /// Next/previous entry in picker order, wrapping around.
    pub fn cycle(&self, forward: bool) -> ModelAlias {
        let n = Self::ALL.len();
        let i = self.index();
        let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
        Self::ALL[next]
    }
}

impl FromStr for ModelAlias {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        ModelAlias::ALL
            .into_iter()
            .find(|m| m.nickname() == t)
            .ok_or_else(|| LlmError::UnknownModel(t.to_string()))
    }
}

impl std::fmt::Display for ModelAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.nickname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groq_aliases_resolve() {
        let m = ModelAlias::from_str("llama3.1").unwrap();
        assert_eq!(m.provider(), Provider::Groq);
        assert_eq!(m.model_id(), "llama-3.1-8b-instant");

        let m = ModelAlias::from_str("llama3.3").unwrap();
        assert_eq!(m.provider(), Provider::Groq);
        assert_eq!(m.model_id(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn openai_aliases_resolve() {
        for (nick, id) in [
            ("gpt5", "gpt-5"),
            ("gpt5mini", "gpt-5-mini"),
            ("gpt5nano", "gpt-5-nano"),
        ] {
            let m = ModelAlias::from_str(nick).unwrap();
            assert_eq!(m.provider(), Provider::OpenAi);
            assert_eq!(m.model_id(), id);
        }
    }

    #[test]
    fn unknown_nickname_is_rejected() {
        let err = ModelAlias::from_str("gpt-5").unwrap_err();
        assert!(matches!(err, LlmError::UnknownModel(ref n) if n == "gpt-5"));
        assert!(ModelAlias::from_str("").is_err());
    }

    #[test]
    fn nickname_round_trips_and_cycles() {
        for m in ModelAlias::ALL {
            assert_eq!(ModelAlias::from_str(m.nickname()).unwrap(), m);
        }
        assert_eq!(ModelAlias::Llama33.cycle(true), ModelAlias::Gpt5);
        assert_eq!(ModelAlias::Gpt5.cycle(false), ModelAlias::Llama33);
        assert_eq!(ModelAlias::default().index(), 4);
    }
}
