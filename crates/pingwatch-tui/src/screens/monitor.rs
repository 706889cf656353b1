//! Monitor screen: site status grid, countdown, unconfigured sites.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use pingwatch_core::{
    AlertLevel, Dashboard, ServerEvent, SiteCard, SocketEvent, StatusBoardView, UnconfiguredView,
};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

const CARD_WIDTH: u16 = 28;
const CARD_HEIGHT: u16 = 6;

pub struct MonitorScreen {
    focused: bool,
    /// Selected row in the unconfigured panel.
    selected: usize,
}

impl MonitorScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            selected: 0,
        }
    }

    fn clamp_selection(&mut self, rows: usize) {
        self.selected = self.selected.min(rows.saturating_sub(1));
    }
}

impl Component for MonitorScreen {
    fn handle_key_event(&mut self, key: KeyEvent, dashboard: &Dashboard) -> Result<Option<Action>> {
        let rows = dashboard.unconfigured.sites().len();
        if rows == 0 {
            return Ok(None);
        }
        self.clamp_selection(rows);

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected = (self.selected + 1).min(rows - 1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Ok(None)
            }
            KeyCode::Enter => Ok(Some(Action::ConfigureSite(self.selected))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::Socket(event) = action {
            if let SocketEvent::Server(ServerEvent::UnconfiguredSitesUpdate(sites)) = event.as_ref() {
                self.clamp_selection(sites.len());
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
        let status = &dashboard.status;
        let countdown = status.countdown().state();
        let updated = status
            .updated_at()
            .map_or_else(|| "never".to_owned(), |t| t.format("%H:%M:%S").to_string());

        let title = Line::from(vec![
            Span::styled(" Site Status ", theme::title_style()),
            Span::styled(
                format!(" next check in {}s │ updated {updated} ", countdown.value),
                Style::default().fg(theme::BORDER_GRAY),
            ),
        ]);

        let unconfigured = dashboard.unconfigured.view();
        let panel_height = match &unconfigured {
            UnconfiguredView::Hidden => 0,
            UnconfiguredView::Shown { rows, .. } => {
                u16::try_from(rows.len()).unwrap_or(u16::MAX).saturating_add(3).min(area.height / 2)
            }
        };

        let layout = Layout::vertical([Constraint::Min(CARD_HEIGHT), Constraint::Length(panel_height)])
            .split(area);

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(layout[0]);
        frame.render_widget(block, layout[0]);

        let body = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(inner);
        frame.render_widget(Paragraph::new(level_summary(status.level_counts())), body[0]);

        match status.view() {
            StatusBoardView::Placeholder(text) => {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("  {text}"),
                        Style::default().fg(theme::BORDER_GRAY),
                    )),
                    body[1],
                );
            }
            StatusBoardView::Grid(cards) => render_grid(frame, body[1], &cards),
        }

        if let UnconfiguredView::Shown { badge, rows } = unconfigured {
            let block = Block::default()
                .title(Line::from(vec![
                    Span::styled(" Unconfigured Sites ", theme::title_style()),
                    Span::styled(
                        format!(" {badge} "),
                        Style::default()
                            .fg(theme::BG_DARK)
                            .bg(theme::ALERT_1)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme::ALERT_1));
            let inner = block.inner(layout[1]);
            frame.render_widget(block, layout[1]);

            let selected = self.selected.min(rows.len().saturating_sub(1));
            let lines: Vec<Line> = rows
                .iter()
                .enumerate()
                .map(|(i, site)| {
                    let style = if i == selected {
                        theme::table_selected()
                    } else {
                        theme::table_row()
                    };
                    Line::from(vec![
                        Span::styled(format!("  {:<12}", site.site_id), style),
                        Span::styled(format!("{:<24}", site.devices.join(", ")), style),
                        Span::styled(format!("last seen {}  ", site.last_seen), theme::key_hint()),
                        Span::styled("Enter ", theme::key_hint_key()),
                        Span::styled("configure", theme::key_hint()),
                    ])
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Monitor"
    }
}

fn level_summary(counts: [usize; 4]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (raw, count) in (0_i64..).zip(counts) {
        let level = AlertLevel::new(raw);
        spans.push(Span::styled(
            format!("{} {count}", level.label()),
            Style::default().fg(theme::alert_color(level, "")),
        ));
        spans.push(Span::styled("   ", theme::key_hint()));
    }
    Line::from(spans)
}

/// Lay the cards out left to right, top to bottom. Cards that do not fit
/// are counted in a trailing note.
fn render_grid(frame: &mut Frame, area: Rect, cards: &[SiteCard]) {
    let columns = usize::from((area.width / CARD_WIDTH).max(1));
    let rows = usize::from(area.height / CARD_HEIGHT);
    let capacity = columns * rows;

    for (index, card) in cards.iter().take(capacity).enumerate() {
        let (Ok(col), Ok(row)) = (u16::try_from(index % columns), u16::try_from(index / columns))
        else {
            break;
        };
        let cell = Rect::new(
            area.x + col * CARD_WIDTH,
            area.y + row * CARD_HEIGHT,
            CARD_WIDTH.min(area.width),
            CARD_HEIGHT,
        );
        render_card(frame, cell, card);
    }

    if cards.len() > capacity && area.height > 0 {
        let note = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("  +{} more (enlarge the terminal)", cards.len() - capacity),
                theme::key_hint(),
            )),
            note,
        );
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &SiteCard) {
    let color = theme::alert_color(card.level, &card.color);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", card.site_id),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let device_line = |mark: &'static str, names: &[String], fg: Color| {
        Line::from(vec![
            Span::styled(format!(" {mark} "), Style::default().fg(fg)),
            Span::styled(
                if names.is_empty() {
                    "-".to_owned()
                } else {
                    names.join(", ")
                },
                theme::table_row(),
            ),
        ])
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {}", card.label),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", card.fraction), theme::key_hint()),
        ]),
        device_line("✓", &card.received, theme::SUCCESS_GREEN),
        device_line("✗", &card.missing, theme::ERROR_RED),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
