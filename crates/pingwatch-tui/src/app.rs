//! Application core: event loop, screen management, action dispatch.
//!
//! The loop owns every view-model. Background tasks (the data bridge, the
//! countdown ticker, registry requests) only send actions back to it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pingwatch_api::socket_url;
use pingwatch_config::ServerConfig;
use pingwatch_core::{
    ClientCommand, Dashboard, EventSocket, HandoffSlot, Notice, ReconnectConfig, SiteAction,
    SiteForm, SiteManager, SiteRegistryClient, Ticker, failure_notice,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Tabs},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader, Pulse};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,

    dashboard: Dashboard,
    handoff: HandoffSlot,
    ticker: Ticker,
    socket: EventSocket,
    manager: Arc<SiteManager>,
    server_label: String,

    /// Active notice toast with display timestamp.
    notice: Option<(Notice, Instant)>,
    pending_confirm: Option<ConfirmAction>,
    throbber_state: ThrobberState,

    cancel: CancellationToken,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    /// Build the app and start the event channel to `server`.
    ///
    /// `handoff` is the location the dashboard opens at; a pending handoff
    /// opens the add-site form on the first frame.
    pub fn new(server: &ServerConfig, handoff: HandoffSlot) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let client = SiteRegistryClient::new(server.base_url.clone(), &server.transport())?;
        let socket = EventSocket::connect(
            socket_url(&server.base_url)?,
            ReconnectConfig::default(),
            cancel.child_token(),
        );

        Ok(Self {
            active_screen: ScreenId::Monitor,
            previous_screen: None,
            screens: create_screens().into_iter().collect(),
            running: true,
            help_visible: false,
            dashboard: Dashboard::new(),
            handoff,
            ticker: Ticker::default(),
            socket,
            manager: Arc::new(SiteManager::new(client)),
            server_label: server.base_url.to_string(),
            notice: None,
            pending_confirm: None,
            throbber_state: ThrobberState::default(),
            cancel,
            action_tx,
            action_rx,
        })
    }

    fn init(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
            debug!(screen = screen.id(), "screen mounted");
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }

        tokio::spawn(spawn_data_bridge(
            self.socket.subscribe(),
            self.action_tx.clone(),
            self.cancel.child_token(),
        ));

        self.dashboard.status.countdown_mut().start();
        self.ticker.start(self.action_tx.clone(), Action::CountdownTick);

        self.action_tx.send(Action::LoadSites)?;
        if let Some(handoff) = self.handoff.take() {
            self.action_tx.send(Action::SwitchScreen(ScreenId::Sites))?;
            self.action_tx.send(Action::OpenHandoff(handoff))?;
        }
        Ok(())
    }

    /// Run the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init()?;

        let mut events = EventReader::spawn(Pulse::default());

        info!(server = %self.server_label, "TUI event loop started");

        while self.running {
            tokio::select! {
                event = events.next() => {
                    let Some(event) = event else { break };
                    match event {
                        Event::Key(key) => {
                            if let Some(action) = self.handle_key_event(key)? {
                                self.action_tx.send(action)?;
                            }
                        }
                        Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                        Event::Tick => self.action_tx.send(Action::Tick)?,
                        Event::Render => self.action_tx.send(Action::Render)?,
                    }
                }
                Some(action) = self.action_rx.recv() => {
                    self.dispatch(action, &mut tui)?;
                }
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.dispatch(action, &mut tui)?;
            }
        }

        events.stop();
        self.ticker.stop();
        self.socket.shutdown();
        self.cancel.cancel();
        info!("TUI event loop ended");
        Ok(())
    }

    fn dispatch(&mut self, action: Action, tui: &mut Tui) -> Result<()> {
        if let Action::Render = action {
            tui.draw(|frame| self.render(frame))?;
        } else {
            self.process_action(action)?;
        }
        Ok(())
    }

    /// Map a key to an action. Dialogs and text input see keys first,
    /// then global bindings, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let Some(screen) = self.screens.get_mut(&self.active_screen) else {
            return Ok(global_key_action(key, self.active_screen));
        };

        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }
        if screen.captures_input() {
            return screen.handle_key_event(key, &self.dashboard);
        }
        if let Some(action) = global_key_action(key, self.active_screen) {
            return Ok(Some(action));
        }
        screen.handle_key_event(key, &self.dashboard)
    }

    /// Apply one action to app state, then let the screens see it.
    fn process_action(&mut self, action: Action) -> Result<()> {
        match &action {
            Action::Quit => {
                self.running = false;
                return Ok(());
            }

            Action::SwitchScreen(target) => {
                self.switch_screen(*target);
                return Ok(());
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
                return Ok(());
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
                return Ok(());
            }

            Action::Socket(event) => {
                if let Some(notice) = self.dashboard.apply_socket(event) {
                    self.action_tx.send(Action::Notify(notice))?;
                }
            }

            Action::CountdownTick => {
                self.dashboard.tick();
                return Ok(());
            }

            Action::SendCommand(command) => {
                self.send_command(*command)?;
                return Ok(());
            }

            Action::ClearMessages => {
                let notice = self.dashboard.clear_messages();
                self.action_tx.send(Action::Notify(notice))?;
            }

            Action::ConfigureSite(index) => {
                self.configure_site(*index)?;
                return Ok(());
            }

            Action::LoadSites => self.load_sites(),
            Action::EditSite(site_id) => self.load_for_edit(site_id.clone()),
            Action::SubmitForm(form) => self.submit(form.as_ref().clone()),

            Action::RequestDelete(site_id) => {
                self.pending_confirm = Some(ConfirmAction::DeleteSite {
                    site_id: site_id.clone(),
                });
                return Ok(());
            }

            Action::ConfirmYes => {
                if let Some(ConfirmAction::DeleteSite { site_id }) = self.pending_confirm.take() {
                    self.delete(site_id);
                }
                return Ok(());
            }

            Action::ConfirmNo => {
                self.pending_confirm = None;
                return Ok(());
            }

            Action::Notify(notice) => {
                self.notice = Some((notice.clone(), Instant::now()));
                return Ok(());
            }

            Action::Tick => {
                if self.notice.as_ref().is_some_and(|(_, shown)| shown.elapsed() > NOTICE_TTL) {
                    self.notice = None;
                }
                if !self.dashboard.server_connected() {
                    self.throbber_state.calc_next();
                }
            }

            _ => {}
        }

        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(&action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn switch_screen(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.previous_screen = Some(self.active_screen);
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    // ── Event channel commands ──────────────────────────────────────

    fn send_command(&self, command: ClientCommand) -> Result<()> {
        let notice = match self.socket.emit(command) {
            Ok(()) => Dashboard::command_sent(command),
            Err(e) => {
                warn!(error = %e, ?command, "command not sent");
                Some(Notice::error("Not connected to server"))
            }
        };
        if let Some(notice) = notice {
            self.action_tx.send(Action::Notify(notice))?;
        }
        Ok(())
    }

    /// Hand an unconfigured site to the add-site form on the Sites screen.
    fn configure_site(&mut self, index: usize) -> Result<()> {
        let Some(handoff) = self.dashboard.unconfigured.configure(index) else {
            return Ok(());
        };
        self.handoff.navigate(handoff);
        debug!(location = self.handoff.location(), "configure unconfigured site");

        self.switch_screen(ScreenId::Sites);
        if let Some(handoff) = self.handoff.take() {
            self.action_tx.send(Action::OpenHandoff(handoff))?;
        }
        Ok(())
    }

    // ── Registry requests ───────────────────────────────────────────
    //
    // Each request runs on its own task and reports back as actions, so
    // a slow server never blocks rendering.

    fn load_sites(&self) {
        let manager = Arc::clone(&self.manager);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let _ = match manager.list().await {
                Ok(listing) => tx.send(Action::SitesLoaded(listing)),
                Err(e) => {
                    let _ = tx.send(Action::Notify(failure_notice(SiteAction::Load, &e)));
                    tx.send(Action::SitesLoadFailed)
                }
            };
        });
    }

    fn load_for_edit(&self, site_id: String) {
        let manager = Arc::clone(&self.manager);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let _ = match manager.load_for_edit(&site_id).await {
                Ok(form) => tx.send(Action::FormLoaded(Box::new(form))),
                Err(e) => tx.send(Action::Notify(failure_notice(SiteAction::LoadOne, &e))),
            };
        });
    }

    fn submit(&self, form: SiteForm) {
        let manager = Arc::clone(&self.manager);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match manager.submit(&form).await {
                Ok(notice) => {
                    let _ = tx.send(Action::Notify(notice));
                    let _ = tx.send(Action::FormSaved);
                    let _ = tx.send(Action::LoadSites);
                }
                Err(e) => {
                    let _ = tx.send(Action::Notify(failure_notice(SiteAction::Save, &e)));
                    let _ = tx.send(Action::FormFailed);
                }
            }
        });
    }

    fn delete(&self, site_id: String) {
        let manager = Arc::clone(&self.manager);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match manager.delete(&site_id, true).await {
                Ok(notice) => {
                    let _ = tx.send(Action::Notify(notice));
                    let _ = tx.send(Action::LoadSites);
                }
                Err(e) => {
                    let _ = tx.send(Action::Notify(failure_notice(SiteAction::Delete, &e)));
                }
            }
        });
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0], &self.dashboard);
        }

        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        if let Some((notice, _)) = &self.notice {
            render_notice(frame, area, notice);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    /// Server indicator, broker link, key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::horizontal([Constraint::Length(16), Constraint::Min(1)]).split(area);

        if self.dashboard.server_connected() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " ● server",
                    Style::default().fg(theme::SUCCESS_GREEN),
                )),
                layout[0],
            );
        } else {
            let throbber = Throbber::default()
                .label("connecting")
                .style(Style::default().fg(theme::ELECTRIC_YELLOW))
                .throbber_style(Style::default().fg(theme::ELECTRIC_YELLOW));
            frame.render_stateful_widget(throbber, layout[0], &mut self.throbber_state.clone());
        }

        let link = &self.dashboard.link;
        let link_style = if link.is_connected() {
            Style::default().fg(theme::SUCCESS_GREEN)
        } else {
            Style::default().fg(theme::ERROR_RED)
        };

        let line = Line::from(vec![
            Span::styled("│ MQTT ", theme::key_hint()),
            Span::styled(link.label(), link_style),
            Span::styled(format!(" │ {} │ ", self.server_label), theme::key_hint()),
            Span::styled("c", theme::key_hint_key()),
            Span::styled(" connect  ", theme::key_hint()),
            Span::styled("d", theme::key_hint_key()),
            Span::styled(" disconnect  ", theme::key_hint()),
            Span::styled("?", theme::key_hint_key()),
            Span::styled(" help  ", theme::key_hint()),
            Span::styled("q", theme::key_hint_key()),
            Span::styled(" quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), layout[1]);
    }
}

/// Global single-key bindings. `None` leaves the key to the screen.
fn global_key_action(key: KeyEvent, active: ScreenId) -> Option<Action> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (KeyModifiers::NONE, KeyCode::Char('q')) => {
            Some(Action::Quit)
        }
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('?')) => Some(Action::ToggleHelp),
        (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => c
            .to_digit(10)
            .and_then(|n| u8::try_from(n).ok())
            .and_then(ScreenId::from_number)
            .map(Action::SwitchScreen),
        (KeyModifiers::NONE, KeyCode::Tab) => Some(Action::SwitchScreen(active.next())),
        (KeyModifiers::SHIFT, KeyCode::BackTab) => Some(Action::SwitchScreen(active.prev())),
        (KeyModifiers::NONE, KeyCode::Char('c')) => {
            Some(Action::SendCommand(ClientCommand::ConnectMqtt))
        }
        (KeyModifiers::NONE, KeyCode::Char('d')) => {
            Some(Action::SendCommand(ClientCommand::DisconnectMqtt))
        }
        (KeyModifiers::NONE, KeyCode::Esc) => Some(Action::GoBack),
        _ => None,
    }
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let msg_len = u16::try_from(notice.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (border_color, icon) = theme::notice_style(notice.level);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        toast_area,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notice.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let width = 56u16.min(area.width.saturating_sub(4));
    let height = 5u16;

    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let dialog_area = Rect::new(area.x + x, area.y + y, width, height);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        dialog_area,
    );

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            format!("  {confirm}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_width = 56u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(4));

    let x = (area.width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        help_area,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let section = |title: &'static str| {
        [
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::NEON_CYAN),
            )),
            Line::from(Span::styled(
                format!("  {}", "─".repeat(title.chars().count())),
                theme::key_hint(),
            )),
        ]
    };
    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<10}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };

    let mut help_text = vec![Line::from("")];
    help_text.extend(section("Global"));
    help_text.extend([
        entry("1-3 Tab", "Switch screen"),
        entry("c / d", "Connect / disconnect MQTT broker"),
        entry("?", "This help"),
        entry("q", "Quit"),
        Line::from(""),
    ]);
    help_text.extend(section("Monitor & Messages"));
    help_text.extend([
        entry("j/k ↑/↓", "Move selection"),
        entry("Enter", "Configure unconfigured site"),
        entry("x", "Clear messages"),
        Line::from(""),
    ]);
    help_text.extend(section("Sites"));
    help_text.extend([
        entry("a / e", "Add / edit site"),
        entry("Del", "Delete site"),
        entry("Tab Space", "Next field / toggle checkbox"),
        entry("Enter Esc", "Save / cancel form"),
        Line::from(""),
        Line::from(Span::styled(
            "                     Esc or ? to close",
            theme::key_hint(),
        )),
    ]);

    frame.render_widget(Paragraph::new(help_text), inner);
}
