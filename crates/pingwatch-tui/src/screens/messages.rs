//! Messages screen: the MQTT message log, newest first, with the selected
//! payload rendered in full below the list.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pingwatch_core::{Dashboard, LoggedMessage, ServerEvent, SocketEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

const PAGE: isize = 10;

pub struct MessagesScreen {
    focused: bool,
    /// Index into the newest-first log. 0 follows the latest message.
    selected: usize,
}

impl MessagesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            selected: 0,
        }
    }

    fn move_by(&mut self, delta: isize, len: usize) {
        let last = len.saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }
}

impl Component for MessagesScreen {
    fn handle_key_event(&mut self, key: KeyEvent, dashboard: &Dashboard) -> Result<Option<Action>> {
        let len = dashboard.messages.len();
        match key.code {
            KeyCode::Char('x') => return Ok(Some(Action::ClearMessages)),
            KeyCode::Char('j') | KeyCode::Down => self.move_by(1, len),
            KeyCode::Char('k') | KeyCode::Up => self.move_by(-1, len),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_by(PAGE, len);
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_by(-PAGE, len);
            }
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => self.selected = len.saturating_sub(1),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ClearMessages => self.selected = 0,
            Action::Socket(event) => match event.as_ref() {
                SocketEvent::Server(ServerEvent::ClearMessages) => self.selected = 0,
                // Keep the same message selected while new ones push it down.
                SocketEvent::Server(ServerEvent::MqttMessage(_)) if self.selected > 0 => {
                    self.selected += 1;
                }
                _ => {}
            },
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
        let view = dashboard.messages.view();
        let selected = self.selected.min(view.rows.len().saturating_sub(1));

        let following = if self.selected == 0 {
            Span::styled("● LIVE", Style::default().fg(theme::SUCCESS_GREEN))
        } else {
            Span::styled("SCROLLED", Style::default().fg(theme::ELECTRIC_YELLOW))
        };

        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(" MQTT Messages ", theme::title_style()),
                Span::styled(
                    format!("{} ", view.count_label),
                    Style::default().fg(theme::BORDER_GRAY),
                ),
                following,
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Percentage(55),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("  {:<25}", "Timestamp"), theme::table_header()),
                Span::styled(format!("{:<16}", "Topic"), theme::table_header()),
                Span::styled("Payload", theme::table_header()),
            ])),
            layout[0],
        );

        if view.rows.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  Waiting for messages...",
                    Style::default().fg(theme::BORDER_GRAY),
                )),
                layout[1],
            );
        } else {
            let height = usize::from(layout[1].height).max(1);
            let start = selected.saturating_sub(height - 1);
            let width = usize::from(layout[1].width.saturating_sub(43)).max(10);
            let lines: Vec<Line> = view
                .rows
                .iter()
                .enumerate()
                .skip(start)
                .take(height)
                .map(|(i, entry)| message_row(entry, i == selected, width))
                .collect();
            frame.render_widget(Paragraph::new(lines), layout[1]);
        }

        if let Some(entry) = view.rows.get(selected) {
            let detail = Block::default()
                .title(Span::styled(
                    format!(" {} ", entry.message.topic),
                    theme::title_style(),
                ))
                .borders(Borders::TOP)
                .border_style(theme::border_default());
            let style = if entry.rendered.is_structured() {
                Style::default().fg(theme::NEON_CYAN)
            } else {
                theme::table_row()
            };
            frame.render_widget(
                Paragraph::new(entry.rendered.text())
                    .style(style)
                    .wrap(Wrap { trim: false })
                    .block(detail),
                layout[2],
            );
        }

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  j/k ", theme::key_hint_key()),
                Span::styled("scroll  ", theme::key_hint()),
                Span::styled("g ", theme::key_hint_key()),
                Span::styled("latest  ", theme::key_hint()),
                Span::styled("x ", theme::key_hint_key()),
                Span::styled("clear", theme::key_hint()),
            ])),
            layout[3],
        );
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Messages"
    }
}

/// One list row: the payload squashed onto a single line.
fn message_row(entry: &LoggedMessage, selected: bool, width: usize) -> Line<'static> {
    let (time_style, body_style) = if selected {
        (theme::table_selected(), theme::table_selected())
    } else {
        (
            Style::default().fg(theme::ELECTRIC_YELLOW),
            theme::table_row(),
        )
    };
    let flat: String = entry
        .message
        .payload
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(width)
        .collect();
    Line::from(vec![
        Span::styled(format!("  {:<25}", entry.message.timestamp), time_style),
        Span::styled(format!("{:<16}", entry.message.topic), body_style),
        Span::styled(flat, body_style),
    ])
}
