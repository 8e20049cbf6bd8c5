use crate::ai::Turn;
use crate::chat::{GenerationConfig, ModelAlias};
use crate::commands::app_command::{nickname_list, COMMANDS};
use crate::commands::{AppCommand, TurnRequest};
use crossterm::event::KeyCode;
use std::str::FromStr;
use tokio::sync::mpsc;

pub const BOT_NAME: &str = "Bestie";

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum InputMode {
    Normal,
    Chat,
    Command,
    SystemPrompt,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum FocusArea {
    Settings,
    Chat,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum SettingsRow {
    Model,
    Temperature,
    MaxTokens,
    SystemPrompt,
}

impl SettingsRow {
    pub const ALL: [SettingsRow; 4] = [
        SettingsRow::Model,
        SettingsRow::Temperature,
        SettingsRow::MaxTokens,
        SettingsRow::SystemPrompt,
    ];
}

#[derive(Debug)]
pub enum AppEvent {
    Message(String),
    Error(String),
    ModelBound(ModelAlias),
    Reply {
        epoch: u64,
        user: String,
        text: String,
    },
    Failed {
        epoch: u64,
        user: String,
        error: String,
        configuration: bool,
    },
}

pub struct App {
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub settings_selected: usize,
    pub model: ModelAlias,
    pub generation: GenerationConfig,
    pub conversation: Vec<Turn>,
    /// User text of the turn in flight.
    pub pending: Option<String>,
    /// Bumped whenever history is reset; replies from an older epoch are dropped.
    pub epoch: u64,
    /// Lines scrolled up from the bottom of the chat.
    pub chat_scroll: u16,
    pub input: String,
    pub cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        session_info: Vec<String>,
        model: ModelAlias,
        generation: GenerationConfig,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["app started".to_string()];
        log_messages.extend(session_info);

        App {
            input_mode: InputMode::Chat,
            focus_area: FocusArea::Chat,
            settings_selected: 0,
            model,
            generation,
            conversation: Vec::new(),
            pending: None,
            epoch: 0,
            chat_scroll: 0,
            input: String::new(),
            cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn add_log(&mut self, msg: impl Into<String>) {
        self.log_messages.push(msg.into());
    }

    pub fn selected_row(&self) -> SettingsRow {
        SettingsRow::ALL[self.settings_selected.min(SettingsRow::ALL.len() - 1)]
    }

    pub fn temperature_locked(&self) -> bool {
        !self.model.provider().honours_temperature()
    }

    /// What actually goes on the wire for the current model.
    pub fn effective_temperature(&self) -> f32 {
        if self.temperature_locked() {
            crate::ai::openai::OPENAI_FIXED_TEMPERATURE
        } else {
            self.generation.temperature
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Message(msg) | AppEvent::Error(msg) => {
                self.log_messages.push(msg)
            }
            AppEvent::ModelBound(alias) => {
                self.model = alias;
                let dropped = self.pending.take();
                self.reset_conversation();
                self.add_log(format!(
                    "✓ model {} -> {} ({}), history cleared",
                    alias.nickname(),
                    alias.model_id(),
                    alias.provider()
                ));
                // its reply belongs to the old epoch and will be dropped
                if let Some(text) = dropped {
                    if self.input.is_empty() {
                        self.input = text;
                        self.cursor = self.input.len();
                    }
                    self.add_log("⚠ message in flight during the model switch was discarded, press Enter to resend");
                }
            }
            AppEvent::Reply { epoch, user, text } => {
                if epoch != self.epoch {
                    log::debug!("dropping reply from epoch {} (now {})", epoch, self.epoch);
                    return;
                }
                if text.is_empty() {
                    self.add_log("⚠ model returned an empty reply");
                }
                self.conversation.push(Turn::user(user));
                self.conversation.push(Turn::assistant(text));
                self.pending = None;
                self.chat_scroll = 0;
            }
            AppEvent::Failed {
                epoch,
                user,
                error,
                configuration,
            } => {
                if epoch != self.epoch {
                    return;
                }
                self.pending = None;
                // give the text back so the user can resubmit
                if self.input.is_empty() {
                    self.input = user;
                    self.cursor = self.input.len();
                }
                if configuration {
                    self.add_log(format!("✗ configuration error: {}", error));
                } else {
                    self.add_log(format!("✗ request failed: {} (press Enter to retry)", error));
                }
            }
        }
    }

    fn reset_conversation(&mut self) {
        self.conversation.clear();
        self.pending = None;
        self.epoch += 1;
        self.chat_scroll = 0;
    }

    pub fn clear_history(&mut self) {
        self.reset_conversation();
        self.add_log("✓ chat history cleared");
    }

    pub fn submit_message(&mut self) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }
        if self.pending.is_some() {
            self.add_log("⚠ still waiting for the previous reply");
            return;
        }
        let turn = TurnRequest {
            epoch: self.epoch,
            history: self.conversation.clone(),
            message: text.clone(),
            config: self.generation.clone(),
        };
        if self.cmd_tx.send(AppCommand::Send(turn)).is_err() {
            self.add_log("✗ backend is not running");
            return;
        }
        self.pending = Some(text);
        self.chat_scroll = 0;
        self.clear_input();
    }

    pub fn request_model(&mut self, alias: ModelAlias) {
        if alias == self.model {
            return;
        }
        let _ = self.cmd_tx.send(AppCommand::SelectModel {
            nickname: alias.nickname().to_string(),
        });
    }

    /// Applies TUI-local commands, forwards the rest. Returns true on quit.
    pub fn dispatch(&mut self, cmd: AppCommand) -> bool {
        if !cmd.is_local() {
            if self.cmd_tx.send(cmd).is_err() {
                self.add_log("✗ backend is not running");
            }
            return false;
        }
        match cmd {
            AppCommand::Quit => return true,
            AppCommand::ClearHistory => self.clear_history(),
            AppCommand::SetTemperature(t) => {
                if self.temperature_locked() {
                    self.add_log(format!(
                        "⚠ temperature is fixed at 1.0 for {}",
                        self.model.nickname()
                    ));
                } else {
                    self.generation.set_temperature(t);
                    self.add_log(format!("✓ temperature {:.2}", self.generation.temperature));
                }
            }
            AppCommand::SetMaxTokens(n) => {
                self.generation.set_max_output_tokens(n);
                self.add_log(format!(
                    "✓ max tokens {}",
                    self.generation.max_output_tokens
                ));
            }
            AppCommand::SetSystemPrompt(p) => {
                self.generation.set_system_prompt(p);
                match self.generation.system_prompt() {
                    Some(_) => self.add_log("✓ system prompt set"),
                    None => self.add_log("✓ system prompt cleared"),
                }
            }
            _ => {}
        }
        false
    }

    pub fn adjust_setting(&mut self, up: bool) {
        match self.selected_row() {
            SettingsRow::Model => {
                let next = self.model.cycle(up);
                self.request_model(next);
            }
            SettingsRow::Temperature => {
                if self.temperature_locked() {
                    self.add_log(format!(
                        "⚠ temperature is fixed at 1.0 for {}",
                        self.model.nickname()
                    ));
                } else {
                    self.generation.step_temperature(up);
                }
            }
            SettingsRow::MaxTokens => self.generation.step_max_output_tokens(up),
            SettingsRow::SystemPrompt => {}
        }
    }

    /// Ghost-text suggestion for the command line.
    pub fn get_completion_hint(&self) -> Option<String> {
        let input = self.input.trim_start();
        if input.is_empty() {
            return None;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let trailing_space = input.ends_with(' ');
        if parts.len() == 1 && !trailing_space {
            for cmd in COMMANDS {
                if cmd.starts_with(parts[0]) && cmd != parts[0] {
                    return Some(cmd[parts[0].len()..].to_string());
                }
            }
            return None;
        }

        if parts[0] == "model" {
            let cur = if trailing_space {
                ""
            } else {
                parts.get(1).copied().unwrap_or("")
            };
            if parts.len() > 2 || (parts.len() == 2 && trailing_space) {
                return None;
            }
            for m in ModelAlias::ALL {
                let nick = m.nickname();
                if nick.starts_with(cur) && nick != cur {
                    return Some(nick[cur.len()..].to_string());
                }
            }
        }
        None
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn prev_boundary(&self) -> usize {
        self.input[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.input[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.cursor)
    }

    /// Cursor movement and editing shared by every text-entry mode.
    fn handle_edit_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let idx = self.prev_boundary();
                    self.input.remove(idx);
                    self.cursor = idx;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.input.len() {
                    self.input.remove(self.cursor);
                }
            }
            KeyCode::Left => self.cursor = self.prev_boundary(),
            KeyCode::Right => self.cursor = self.next_boundary(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.len(),
            KeyCode::Char(c) => {
                self.input.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            _ => {}
        }
    }

    fn handle_command_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Enter => {
                let cmd_owned = self.input.trim().to_string();
                self.clear_input();
                self.input_mode = InputMode::Normal;
                if cmd_owned.is_empty() {
                    return false;
                }
                self.command_history.push(cmd_owned.clone());
                self.command_history_index = None;
                let cmd = AppCommand::from_str(&cmd_owned)
                    .unwrap_or_else(|_| AppCommand::Unknown(cmd_owned.clone()));
                self.dispatch(cmd)
            }
            KeyCode::Esc => {
                self.clear_input();
                self.input_mode = InputMode::Normal;
                false
            }
            KeyCode::Tab => {
                if let Some(hint) = self.get_completion_hint() {
                    self.cursor = self.input.len();
                    let insert = format!("{} ", hint);
                    self.input.push_str(&insert);
                    self.cursor += insert.len();
                }
                false
            }
            KeyCode::Up => {
                if self.command_history.is_empty() {
                    return false;
                }
                let next = match self.command_history_index {
                    None => self.command_history.len().saturating_sub(1),
                    Some(i) => i.saturating_sub(1),
                };
                self.command_history_index = Some(next);
                if let Some(cmd) = self.command_history.get(next) {
                    self.input = cmd.clone();
                    self.cursor = self.input.len();
                }
                false
            }
            KeyCode::Down => {
                let Some(i) = self.command_history_index else {
                    return false;
                };
                let n = i + 1;
                if n >= self.command_history.len() {
                    self.command_history_index = None;
                    self.clear_input();
                    return false;
                }
                self.command_history_index = Some(n);
                self.input = self.command_history[n].clone();
                self.cursor = self.input.len();
                false
            }
            other => {
                self.handle_edit_key(other);
                false
            }
        }
    }

    /// Returns true when the app should exit.
    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        match self.input_mode {
            InputMode::Command => return self.handle_command_key(key),
            InputMode::Chat => {
                match key {
                    KeyCode::Enter => self.submit_message(),
                    KeyCode::Esc => self.input_mode = InputMode::Normal,
                    KeyCode::Up => self.chat_scroll = self.chat_scroll.saturating_add(1),
                    KeyCode::Down => self.chat_scroll = self.chat_scroll.saturating_sub(1),
                    KeyCode::Char('/') if self.input.is_empty() => {
                        self.input_mode = InputMode::Command;
                    }
                    other => self.handle_edit_key(other),
                }
                return false;
            }
            InputMode::SystemPrompt => {
                match key {
                    KeyCode::Enter => {
                        let prompt = std::mem::take(&mut self.input);
                        self.cursor = 0;
                        self.input_mode = InputMode::Normal;
                        self.dispatch(AppCommand::SetSystemPrompt(prompt));
                    }
                    KeyCode::Esc => {
                        self.clear_input();
                        self.input_mode = InputMode::Normal;
                    }
                    other => self.handle_edit_key(other),
                }
                return false;
            }
            InputMode::Normal => {}
        }

        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.clear_input();
                false
            }
            KeyCode::Char('q') => true,
            KeyCode::Char('i') => {
                self.focus_area = FocusArea::Chat;
                self.input_mode = InputMode::Chat;
                false
            }
            KeyCode::Char('s') => {
                self.start_system_prompt_edit();
                false
            }
            KeyCode::Char('x') => {
                self.clear_history();
                false
            }
            KeyCode::Left => {
                self.focus_area = FocusArea::Settings;
                false
            }
            KeyCode::Right => {
                self.focus_area = FocusArea::Chat;
                false
            }
            KeyCode::Up => {
                if self.focus_area == FocusArea::Settings {
                    self.settings_selected = self.settings_selected.saturating_sub(1);
                } else {
                    self.chat_scroll = self.chat_scroll.saturating_add(1);
                }
                false
            }
            KeyCode::Down => {
                if self.focus_area == FocusArea::Settings {
                    if self.settings_selected < SettingsRow::ALL.len() - 1 {
                        self.settings_selected += 1;
                    }
                } else {
                    self.chat_scroll = self.chat_scroll.saturating_sub(1);
                }
                false
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if self.focus_area == FocusArea::Settings {
                    self.adjust_setting(true);
                }
                false
            }
            KeyCode::Char('-') => {
                if self.focus_area == FocusArea::Settings {
                    self.adjust_setting(false);
                }
                false
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                if self.focus_area == FocusArea::Settings
                    && self.selected_row() == SettingsRow::SystemPrompt
                {
                    self.start_system_prompt_edit();
                } else {
                    self.focus_area = FocusArea::Chat;
                    self.input_mode = InputMode::Chat;
                }
                false
            }
            _ => false,
        }
    }

    fn start_system_prompt_edit(&mut self) {
        self.input = self.generation.system_prompt.clone().unwrap_or_default();
        self.cursor = self.input.len();
        self.input_mode = InputMode::SystemPrompt;
    }

    pub fn model_hint(&self) -> String {
        format!("models: {}", nickname_list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> (App, mpsc::UnboundedReceiver<AppCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (_evt_tx, evt_rx) = mpsc::unbounded_channel();
        let app = App::new(
            Vec::new(),
            ModelAlias::Llama33,
            GenerationConfig::default(),
            cmd_tx,
            evt_rx,
        );
        (app, cmd_rx)
    }

    fn type_text(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key_event(KeyCode::Char(c));
        }
    }

    #[test]
    fn submit_sends_history_snapshot() {
        let (mut app, mut cmd_rx) = app();
        app.conversation.push(Turn::user("hi"));
        app.conversation.push(Turn::assistant("hello"));
        type_text(&mut app, "what's up?");
        app.handle_key_event(KeyCode::Enter);

        match cmd_rx.try_recv().unwrap() {
            AppCommand::Send(turn) => {
                assert_eq!(turn.message, "what's up?");
                assert_eq!(turn.history, app.conversation);
                assert_eq!(turn.epoch, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(app.pending.as_deref(), Some("what's up?"));
        assert!(app.input.is_empty());
        // history only grows when the reply lands
        assert_eq!(app.conversation.len(), 2);
    }

    #[test]
    fn one_turn_in_flight_at_a_time() {
        let (mut app, mut cmd_rx) = app();
        type_text(&mut app, "first");
        app.handle_key_event(KeyCode::Enter);
        type_text(&mut app, "second");
        app.handle_key_event(KeyCode::Enter);

        assert!(matches!(cmd_rx.try_recv(), Ok(AppCommand::Send(_))));
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.input, "second");
    }

    #[test]
    fn reply_appends_both_turns() {
        let (mut app, _rx) = app();
        app.pending = Some("hello".to_string());
        app.apply_event(AppEvent::Reply {
            epoch: 0,
            user: "hello".to_string(),
            text: "hey!".to_string(),
        });
        assert_eq!(
            app.conversation,
            vec![Turn::user("hello"), Turn::assistant("hey!")]
        );
        assert!(app.pending.is_none());
    }

    #[test]
    fn failed_turn_is_not_appended() {
        let (mut app, _rx) = app();
        app.pending = Some("hello".to_string());
        app.apply_event(AppEvent::Failed {
            epoch: 0,
            user: "hello".to_string(),
            error: "rate limited".to_string(),
            configuration: false,
        });
        assert!(app.conversation.is_empty());
        assert!(app.pending.is_none());
        assert_eq!(app.input, "hello");
        assert!(app.log_messages.last().unwrap().contains("rate limited"));
    }

    #[test]
    fn stale_reply_after_clear_is_dropped() {
        let (mut app, _rx) = app();
        type_text(&mut app, "hello");
        app.handle_key_event(KeyCode::Enter);
        app.clear_history();
        app.apply_event(AppEvent::Reply {
            epoch: 0,
            user: "hello".to_string(),
            text: "late".to_string(),
        });
        assert!(app.conversation.is_empty());
        assert_eq!(app.epoch, 1);
    }

    #[test]
    fn model_change_clears_history() {
        let (mut app, _rx) = app();
        app.conversation.push(Turn::user("hi"));
        app.apply_event(AppEvent::ModelBound(ModelAlias::Gpt5));
        assert_eq!(app.model, ModelAlias::Gpt5);
        assert!(app.conversation.is_empty());
        assert!(app.temperature_locked());
        assert_eq!(app.effective_temperature(), 1.0);
    }

    #[test]
    fn message_sent_during_model_switch_returns_to_input() {
        let (mut app, mut cmd_rx) = app();
        app.request_model(ModelAlias::Gpt5);
        type_text(&mut app, "hello there");
        app.handle_key_event(KeyCode::Enter);
        assert!(matches!(cmd_rx.try_recv(), Ok(AppCommand::SelectModel { .. })));
        assert!(matches!(cmd_rx.try_recv(), Ok(AppCommand::Send(_))));
        assert!(app.input.is_empty());

        app.apply_event(AppEvent::ModelBound(ModelAlias::Gpt5));
        assert!(app.pending.is_none());
        assert_eq!(app.input, "hello there");
        assert_eq!(app.cursor, "hello there".len());
        assert!(app.log_messages.last().unwrap().contains("discarded"));

        // the reply to the discarded send is stale
        app.apply_event(AppEvent::Reply {
            epoch: 0,
            user: "hello there".to_string(),
            text: "hi from gpt-5".to_string(),
        });
        assert!(app.conversation.is_empty());
        assert_eq!(app.input, "hello there");
    }

    #[test]
    fn settings_keys_adjust_values() {
        let (mut app, mut cmd_rx) = app();
        app.handle_key_event(KeyCode::Esc);
        app.handle_key_event(KeyCode::Left);
        assert_eq!(app.focus_area, FocusArea::Settings);

        app.handle_key_event(KeyCode::Char('+'));
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(AppCommand::SelectModel { ref nickname }) if nickname == "gpt5"
        ));
        // not switched until the backend confirms
        assert_eq!(app.model, ModelAlias::Llama33);

        app.handle_key_event(KeyCode::Down);
        app.handle_key_event(KeyCode::Char('-'));
        assert!((app.generation.temperature - 0.65).abs() < 1e-4);

        app.handle_key_event(KeyCode::Down);
        app.handle_key_event(KeyCode::Char('+'));
        assert_eq!(app.generation.max_output_tokens, 1152);
    }

    #[test]
    fn temperature_locked_for_gpt_models() {
        let (mut app, _rx) = app();
        app.apply_event(AppEvent::ModelBound(ModelAlias::Gpt5Mini));
        app.dispatch(AppCommand::SetTemperature(0.2));
        assert_eq!(app.generation.temperature, 0.7);
        assert!(app.log_messages.last().unwrap().contains("fixed"));
    }

    #[test]
    fn command_mode_runs_local_and_remote_commands() {
        let (mut app, mut cmd_rx) = app();
        app.handle_key_event(KeyCode::Esc);

        app.handle_key_event(KeyCode::Char('/'));
        type_text(&mut app, "system Answer in French.");
        app.handle_key_event(KeyCode::Enter);
        assert_eq!(app.generation.system_prompt(), Some("Answer in French."));
        assert_eq!(app.input_mode, InputMode::Normal);

        app.handle_key_event(KeyCode::Char('/'));
        type_text(&mut app, "models");
        app.handle_key_event(KeyCode::Enter);
        assert!(matches!(cmd_rx.try_recv(), Ok(AppCommand::ListModels)));

        app.handle_key_event(KeyCode::Char('/'));
        app.handle_key_event(KeyCode::Up);
        assert_eq!(app.input, "models");

        app.handle_key_event(KeyCode::Esc);
        app.handle_key_event(KeyCode::Char('/'));
        type_text(&mut app, "quit");
        assert!(app.handle_key_event(KeyCode::Enter));
    }

    #[test]
    fn completion_hints() {
        let (mut app, _rx) = app();
        app.input = "cl".to_string();
        assert_eq!(app.get_completion_hint().as_deref(), Some("ear"));
        app.input = "model ll".to_string();
        assert_eq!(app.get_completion_hint().as_deref(), Some("ama3.1"));
        app.input = "model ".to_string();
        assert_eq!(app.get_completion_hint().as_deref(), Some("gpt5"));
        app.input = "model gpt5 x".to_string();
        assert_eq!(app.get_completion_hint(), None);
    }

    #[test]
    fn editing_handles_multibyte_chars() {
        let (mut app, _rx) = app();
        type_text(&mut app, "héllo");
        app.handle_key_event(KeyCode::Left);
        app.handle_key_event(KeyCode::Left);
        app.handle_key_event(KeyCode::Left);
        app.handle_key_event(KeyCode::Left);
        app.handle_key_event(KeyCode::Backspace);
        assert_eq!(app.input, "éllo");
        assert_eq!(app.cursor, 0);
    }
}
