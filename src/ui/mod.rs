use crate::ai::Role;
use crate::app_state::{App, FocusArea, InputMode, SettingsRow, BOT_NAME};
use crate::chat::config::SYSTEM_PROMPT_PLACEHOLDER;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // settings + chat
            Constraint::Length(3), // input
            Constraint::Length(8), // status log
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app);

    let middle_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(chunks[1]);

    render_settings(f, middle_chunks[0], app);
    render_chat(f, middle_chunks[1], app);
    render_input(f, chunks[2], app);
    render_log(f, chunks[3], app);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let title = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));

    let title_text = Line::from(vec![
        Span::styled(
            format!(" {} ", BOT_NAME),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - LLM chat  "),
        Span::styled(
            format!("[{} · {}]", app.model.nickname(), app.model.provider()),
            Style::default().fg(Color::Yellow),
        ),
    ]);

    let paragraph = Paragraph::new(title_text)
        .block(title)
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_settings(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let temperature = if app.temperature_locked() {
        format!("{:.2} (fixed)", app.effective_temperature())
    } else {
        format!("{:.2}", app.generation.temperature)
    };
    let system = app
        .generation
        .system_prompt()
        .map(str::to_string)
        .unwrap_or_else(|| format!("({})", SYSTEM_PROMPT_PLACEHOLDER));

    let items: Vec<ListItem> = SettingsRow::ALL
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let text = match row {
                SettingsRow::Model => format!("Model       {}", app.model.nickname()),
                SettingsRow::Temperature => format!("Temperature {}", temperature),
                SettingsRow::MaxTokens => {
                    format!("Max tokens  {}", app.generation.max_output_tokens)
                }
                SettingsRow::SystemPrompt => format!("System      {}", system),
            };
            let is_selected = i == app.settings_selected;
            let style = if is_selected && app.focus_area == FocusArea::Settings {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else if *row == SettingsRow::Temperature && app.temperature_locked() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Settings {
        "Settings (↑↓ select, +/- change)"
    } else {
        "Settings (← focus)"
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app.focus_area == FocusArea::Settings)),
    );
    f.render_widget(list, chunks[0]);

    let about = vec![
        Line::from(vec![Span::styled(
            app.model.model_id(),
            Style::default().fg(Color::Yellow),
        )]),
        Line::from(""),
        Line::from("Pick a model, tune the settings"),
        Line::from("and chat. gpt models always"),
        Line::from("sample at temperature 1.0."),
        Line::from(""),
        Line::from(Span::styled(
            app.model_hint(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "i chat  s system  x clear",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "/ command  q quit",
            Style::default().fg(Color::Gray),
        )),
    ];
    let paragraph = Paragraph::new(about)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("About"));
    f.render_widget(paragraph, chunks[1]);
}

fn chat_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let header = |role: Role| match role {
        Role::User => Span::styled(
            "You",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Role::Assistant => Span::styled(
            BOT_NAME,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Role::System => Span::styled("System", Style::default().fg(Color::Gray)),
    };

    for turn in &app.conversation {
        lines.push(Line::from(header(turn.role)));
        if turn.content.is_empty() {
            lines.push(Line::from(Span::styled(
                "(empty reply)",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        for l in turn.content.lines() {
            lines.push(Line::from(l));
        }
        lines.push(Line::from(""));
    }

    if let Some(ref pending) = app.pending {
        lines.push(Line::from(header(Role::User)));
        for l in pending.lines() {
            lines.push(Line::from(l));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(header(Role::Assistant)));
        lines.push(Line::from(Span::styled(
            "Thinking...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Say hi to {}. Type a message and press Enter.", BOT_NAME),
            Style::default().fg(Color::Gray),
        )));
    }
    lines
}

fn render_chat(f: &mut Frame, area: Rect, app: &mut App) {
    let focused = app.focus_area == FocusArea::Chat;
    let lines = chat_lines(app);

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    // same word wrapping the render below uses
    let total = Paragraph::new(lines.clone())
        .wrap(Wrap { trim: false })
        .line_count(inner_width);
    let total = total.min(u16::MAX as usize) as u16;
    let max_scroll = total.saturating_sub(inner_height);
    let scroll_up = app.chat_scroll.min(max_scroll);
    let offset = max_scroll - scroll_up;

    let title = format!(
        "Chat ({} turns){}",
        app.conversation.len(),
        if scroll_up > 0 { " ↑ scrolled" } else { "" }
    );
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(focus_style(focused)),
        )
        .scroll((offset, 0));
    f.render_widget(paragraph, area);

    app.chat_scroll = scroll_up;
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let (label, title, color) = match app.input_mode {
        InputMode::Chat => ("you: ", "Message (Enter send, Esc leave)", Color::Green),
        InputMode::Command => ("/", "Command (Enter run, Tab complete, Esc cancel)", Color::Green),
        InputMode::SystemPrompt => ("system: ", "System prompt (Enter save, Esc cancel)", Color::Magenta),
        InputMode::Normal => ("", "Input (i chat, / command, s system prompt)", Color::White),
    };

    let line = if app.input_mode == InputMode::Normal {
        Line::from(Span::styled(
            "press i to type a message",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = vec![Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        let cur = app.cursor.min(app.input.len());
        let (left, right) = app.input.split_at(cur);
        spans.push(Span::raw(left));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(right));
        if app.input_mode == InputMode::Command {
            if let Some(hint) = app.get_completion_hint() {
                spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
            }
        }
        if app.input_mode == InputMode::Chat && app.pending.is_some() {
            spans.push(Span::styled(
                "  (waiting for reply)",
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(color)),
    );
    f.render_widget(paragraph, area);
}

fn render_log(f: &mut Frame, area: Rect, app: &App) {
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(Color::Green)
            } else if msg.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Status ({} entries)", app.log_messages.len()))
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(log, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Turn;
    use crate::chat::{GenerationConfig, ModelAlias};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn app() -> App {
        let (cmd_tx, _cmd_rx) = mpsc::unbounded_channel();
        let (_evt_tx, evt_rx) = mpsc::unbounded_channel();
        App::new(
            Vec::new(),
            ModelAlias::Llama33,
            GenerationConfig::default(),
            cmd_tx,
            evt_rx,
        )
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn long_reply() -> String {
        format!("{}\nZZEND", "abcdefghijklmnopqrstuvw ".repeat(40))
    }

    #[test]
    fn end_of_long_reply_is_visible_at_bottom() {
        let mut app = app();
        app.conversation.push(Turn::user("tell me a lot"));
        app.conversation.push(Turn::assistant(long_reply()));

        let screen = render(&mut app);
        assert!(screen.contains("ZZEND"));
        assert_eq!(app.chat_scroll, 0);
    }

    #[test]
    fn scrolling_up_is_clamped_to_the_top() {
        let mut app = app();
        app.conversation.push(Turn::user("tell me a lot"));
        app.conversation.push(Turn::assistant(long_reply()));
        app.chat_scroll = u16::MAX;

        let screen = render(&mut app);
        assert!(!screen.contains("ZZEND"));
        assert!(screen.contains("tell me a lot"));
        // 44 wide: one word per row, plus headers, blanks and the last line
        assert!(app.chat_scroll >= 40 - 14);
        assert!(app.chat_scroll < u16::MAX);
    }

    #[test]
    fn pending_turn_shows_thinking() {
        let mut app = app();
        app.pending = Some("ping".to_string());
        let screen = render(&mut app);
        assert!(screen.contains("Thinking..."));
    }
}
