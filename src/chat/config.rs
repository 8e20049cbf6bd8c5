pub const TEMPERATURE_STEP: f32 = 0.05;
pub const MAX_TOKENS_MIN: u32 = 512;
pub const MAX_TOKENS_MAX: u32 = 2048;
pub const MAX_TOKENS_STEP: u32 = 128;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const SYSTEM_PROMPT_PLACEHOLDER: &str = "You are a helpful assistant.";

/// Sampling settings supplied with every turn.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub system_prompt: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: None,
        }
    }
}

impl GenerationConfig {
    /// Clamped to [0, 1]; NaN falls back to the default.
    pub fn set_temperature(&mut self, t: f32) {
        self.temperature = if t.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            t.clamp(0.0, 1.0)
        };
    }

    pub fn set_max_output_tokens(&mut self, n: u32) {
        self.max_output_tokens = n.clamp(MAX_TOKENS_MIN, MAX_TOKENS_MAX);
    }

    /// Blank prompts are stored as `None`.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        let p = prompt.into();
        self.system_prompt = if p.trim().is_empty() { None } else { Some(p) };
    }

    pub fn step_temperature(&mut self, up: bool) {
        let delta = if up { TEMPERATURE_STEP } else { -TEMPERATURE_STEP };
        // snap to the step grid so repeated presses don't drift
        let next = ((self.temperature + delta) / TEMPERATURE_STEP).round() * TEMPERATURE_STEP;
        self.set_temperature(next);
    }

    pub fn step_max_output_tokens(&mut self, up: bool) {
        let next = if up {
            self.max_output_tokens.saturating_add(MAX_TOKENS_STEP)
        } else {
            self.max_output_tokens.saturating_sub(MAX_TOKENS_STEP)
        };
        self.set_max_output_tokens(next);
    }

    /// The prompt as typed, or `None` when blank.
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}
