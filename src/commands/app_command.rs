use crate::ai::Turn;
use crate::chat::{GenerationConfig, ModelAlias};
use std::str::FromStr;

/// Everything the background task needs to answer one turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub epoch: u64,
    pub history: Vec<Turn>,
    pub message: String,
    pub config: GenerationConfig,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Send(TurnRequest),
    SelectModel { nickname: String },
    ListModels,
    SetTemperature(f32),
    SetMaxTokens(u32),
    SetSystemPrompt(String),
    ClearHistory,
    Help,
    Quit,
    Unknown(String),
}

pub const COMMANDS: [&str; 8] = [
    "model", "models", "temp", "max", "system", "clear", "help", "quit",
];

pub const HELP_TEXT: &str = "commands: model <nickname> | models | temp <0..1> | max <512..2048> | system <text> | system clear | clear | help | quit";

impl AppCommand {
    /// Commands the TUI applies to its own state instead of forwarding.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AppCommand::SetTemperature(_)
                | AppCommand::SetMaxTokens(_)
                | AppCommand::SetSystemPrompt(_)
                | AppCommand::ClearHistory
                | AppCommand::Quit
        )
    }
}

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('/');
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(AppCommand::Unknown("".to_string()));
        }

        match parts[0] {
            "model" => match parts.get(1) {
                Some(nick) => Ok(AppCommand::SelectModel {
                    nickname: nick.to_string(),
                }),
                None => Ok(AppCommand::Unknown(format!(
                    "usage: model <{}>",
                    nickname_list()
                ))),
            },
            "models" => Ok(AppCommand::ListModels),
            "temp" | "temperature" => match parts.get(1).and_then(|s| s.parse::<f32>().ok()) {
                Some(t) if (0.0..=1.0).contains(&t) => Ok(AppCommand::SetTemperature(t)),
                _ => Ok(AppCommand::Unknown(
                    "usage: temp <0.0..1.0>".to_string(),
                )),
            },
            "max" | "max_tokens" => match parts.get(1).and_then(|s| s.parse::<u32>().ok()) {
                Some(n) => Ok(AppCommand::SetMaxTokens(n)),
                None => Ok(AppCommand::Unknown("usage: max <512..2048>".to_string())),
            },
            "system" => {
                let rest = s["system".len()..].trim();
                if rest == "clear" {
                    Ok(AppCommand::SetSystemPrompt(String::new()))
                } else if rest.is_empty() {
                    Ok(AppCommand::Unknown(
                        "usage: system <text> | system clear".to_string(),
                    ))
                } else {
                    Ok(AppCommand::SetSystemPrompt(rest.to_string()))
                }
            }
            "clear" => Ok(AppCommand::ClearHistory),
            "help" | "h" => Ok(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(AppCommand::Quit),
            _ => Ok(AppCommand::Unknown(format!("unknown command: {}", parts[0]))),
        }
    }
}

pub fn nickname_list() -> String {
    ModelAlias::ALL
        .iter()
        .map(|m| m.nickname())
        .collect::<Vec<_>>()
        .join("|")
}
