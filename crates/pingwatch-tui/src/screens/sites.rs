//! Sites screen: the site registry list and the add/edit form.
//!
//! The list and the form are screen-local state. Every registry request
//! goes out as an action; the app loop runs it and answers with
//! `SitesLoaded`, `FormLoaded`, `FormSaved` or `FormFailed`.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use pingwatch_core::{
    Dashboard, DeviceKind, FormField, SiteEntry, SiteForm, SiteListView, SiteListing,
};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use throbber_widgets_tui::{Throbber, ThrobberState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

/// An open add/edit form and which input has the cursor.
#[derive(Debug)]
struct FormState {
    form: SiteForm,
    field: usize,
    saving: bool,
}

impl FormState {
    fn new(form: SiteForm) -> Self {
        let mut state = Self {
            form,
            field: 0,
            saving: false,
        };
        if state.form.is_locked(state.current()) {
            state.step(1);
        }
        state
    }

    fn current(&self) -> FormField {
        FormField::ALL
            .get(self.field)
            .copied()
            .unwrap_or(FormField::SiteName)
    }

    /// Move the cursor, skipping locked inputs.
    fn step(&mut self, delta: isize) {
        let len = FormField::ALL.len();
        for _ in 0..len {
            self.field = match delta {
                d if d < 0 => (self.field + len - 1) % len,
                _ => (self.field + 1) % len,
            };
            if !self.form.is_locked(self.current()) {
                break;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let field = self.current();
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.step(1),
            KeyCode::BackTab | KeyCode::Up => self.step(-1),
            KeyCode::Enter if !self.saving => {
                self.saving = true;
                return Some(Action::SubmitForm(Box::new(self.form.clone())));
            }
            KeyCode::Char(' ') if field.is_toggle() => {
                self.form.toggle(field);
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.form.text_mut(field) {
                    text.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = self.form.text_mut(field) {
                    text.pop();
                }
            }
            _ => {}
        }
        None
    }
}

pub struct SitesScreen {
    focused: bool,
    listing: SiteListing,
    loaded: bool,
    loading: bool,
    selected: usize,
    form: Option<FormState>,
    throbber_state: ThrobberState,
}

impl SitesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            listing: SiteListing::default(),
            loaded: false,
            loading: false,
            selected: 0,
            form: None,
            throbber_state: ThrobberState::default(),
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.listing.site_id_at(self.selected).map(str::to_owned)
    }

    fn open_form(&mut self, form: SiteForm) {
        self.form = Some(FormState::new(form));
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        let len = self.listing.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected = (self.selected + 1).min(len.saturating_sub(1));
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Char('a') => {
                self.open_form(SiteForm::new_site());
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => self.selected_id().map(Action::EditSite),
            KeyCode::Delete => self.selected_id().map(Action::RequestDelete),
            KeyCode::Char('r') => Some(Action::LoadSites),
            _ => None,
        }
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(" Site Registry ", theme::title_style()),
                Span::styled(
                    format!(" {} sites ", self.listing.len()),
                    Style::default().fg(theme::BORDER_GRAY),
                ),
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
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

        if !self.loaded || self.loading {
            let throbber = Throbber::default()
                .label("  Loading sites...")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, layout[0], &mut self.throbber_state.clone());
        } else {
            frame.render_widget(Paragraph::new(header_line()), layout[0]);
        }

        if self.loaded {
            match self.listing.view() {
                SiteListView::Empty(text) => {
                    frame.render_widget(
                        Paragraph::new(Span::styled(
                            format!("  {text}"),
                            Style::default().fg(theme::BORDER_GRAY),
                        )),
                        layout[1],
                    );
                }
                SiteListView::Sites(entries) => {
                    let height = usize::from(layout[1].height).max(1);
                    let selected = self.selected.min(entries.len().saturating_sub(1));
                    let start = selected.saturating_sub(height - 1);
                    let lines: Vec<Line> = entries
                        .iter()
                        .enumerate()
                        .skip(start)
                        .take(height)
                        .map(|(i, entry)| site_row(entry, i == selected))
                        .collect();
                    frame.render_widget(Paragraph::new(lines), layout[1]);
                }
            }
        }

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  a ", theme::key_hint_key()),
                Span::styled("add  ", theme::key_hint()),
                Span::styled("e ", theme::key_hint_key()),
                Span::styled("edit  ", theme::key_hint()),
                Span::styled("Del ", theme::key_hint_key()),
                Span::styled("delete  ", theme::key_hint()),
                Span::styled("r ", theme::key_hint_key()),
                Span::styled("reload", theme::key_hint()),
            ])),
            layout[2],
        );
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, state: &FormState) {
        let block = Block::default()
            .title(Span::styled(format!(" {} ", state.form.title()), theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

        if state.saving {
            let throbber = Throbber::default()
                .label("  Saving...")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, layout[0], &mut self.throbber_state.clone());
        }

        let current = state.current();
        let mut rendered = Vec::with_capacity(FormField::ALL.len() + 1);
        for field in FormField::ALL {
            if field == FormField::Device(DeviceKind::Gsm1) {
                rendered.push(Line::from(Span::styled(
                    "  Active Devices",
                    theme::table_header(),
                )));
            }
            rendered.push(form_line(&state.form, field, field == current));
        }
        frame.render_widget(Paragraph::new(rendered), layout[1]);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  Tab ", theme::key_hint_key()),
                Span::styled("next  ", theme::key_hint()),
                Span::styled("Space ", theme::key_hint_key()),
                Span::styled("toggle  ", theme::key_hint()),
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("save  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ])),
            layout[2],
        );
    }
}

impl Component for SitesScreen {
    fn handle_key_event(&mut self, key: KeyEvent, _dashboard: &Dashboard) -> Result<Option<Action>> {
        if let Some(state) = self.form.as_mut() {
            if key.code == KeyCode::Esc {
                self.form = None;
                return Ok(None);
            }
            return Ok(state.handle_key(key));
        }
        Ok(self.handle_list_key(key))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoadSites => self.loading = true,
            Action::SitesLoaded(listing) => {
                self.listing = listing.clone();
                self.loaded = true;
                self.loading = false;
                self.selected = self.selected.min(self.listing.len().saturating_sub(1));
            }
            Action::SitesLoadFailed => {
                self.loaded = true;
                self.loading = false;
            }
            Action::FormLoaded(form) => self.open_form(form.as_ref().clone()),
            Action::OpenHandoff(handoff) => self.open_form(SiteForm::from_handoff(handoff)),
            Action::FormSaved => self.form = None,
            Action::FormFailed => {
                if let Some(state) = self.form.as_mut() {
                    state.saving = false;
                }
            }
            Action::Tick => {
                if self.loading || self.form.as_ref().is_some_and(|f| f.saving) {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, _dashboard: &Dashboard) {
        match &self.form {
            Some(state) => self.render_form(frame, area, state),
            None => self.render_list(frame, area),
        }
    }

    fn captures_input(&self) -> bool {
        self.form.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Sites"
    }
}

const COLUMNS: [(&str, usize); 6] = [
    ("Site ID", 10),
    ("Name", 20),
    ("Status", 10),
    ("Location", 18),
    ("Responsible", 18),
    ("Devices", 0),
];

fn header_line() -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (title, width) in COLUMNS {
        spans.push(Span::styled(format!("{title:<width$}"), theme::table_header()));
    }
    Line::from(spans)
}

fn site_row(entry: &SiteEntry, selected: bool) -> Line<'static> {
    let base = if selected {
        theme::table_selected()
    } else {
        theme::table_row()
    };
    let status = if entry.active {
        base.fg(theme::SUCCESS_GREEN)
    } else {
        base.fg(theme::BORDER_GRAY)
    };

    let mut spans = vec![
        Span::styled(format!("  {:<10}", entry.site_id), base),
        Span::styled(format!("{:<20}", entry.site_name), base),
        Span::styled(format!("{:<10}", entry.status_label()), status),
        Span::styled(format!("{:<18}", entry.location), base),
        Span::styled(format!("{:<18}", entry.responsible_person), base),
        Span::styled(entry.enabled.join(", "), base),
    ];
    if !entry.disabled.is_empty() {
        let off: Vec<&str> = entry.disabled.iter().copied().map(DeviceKind::as_str).collect();
        spans.push(Span::styled(
            format!(" (off: {})", off.join(", ")),
            base.fg(theme::BORDER_GRAY).add_modifier(Modifier::DIM),
        ));
    }
    Line::from(spans)
}

fn form_line(form: &SiteForm, field: FormField, focused: bool) -> Line<'static> {
    let label_style = if focused {
        theme::key_hint_key()
    } else {
        theme::key_hint()
    };
    let marker = if focused { "▸ " } else { "  " };

    if let Some(checked) = form.checked(field) {
        let box_text = if checked { "[x] " } else { "[ ] " };
        let indent = if matches!(field, FormField::Device(_)) { "  " } else { "" };
        return Line::from(vec![
            Span::styled(format!("{marker}{indent}{box_text}"), label_style),
            Span::styled(field.label(), theme::table_row()),
        ]);
    }

    let value = form.text(field).unwrap_or_default().to_owned();
    let value_style = if form.is_locked(field) {
        Style::default().fg(theme::BORDER_GRAY)
    } else if focused {
        Style::default().fg(theme::ELECTRIC_PURPLE).bg(theme::BG_HIGHLIGHT)
    } else {
        theme::table_row()
    };
    let cursor = if focused { "▏" } else { "" };
    Line::from(vec![
        Span::styled(format!("{marker}{:<20}", field.label()), label_style),
        Span::styled(format!("{value}{cursor}"), value_style),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use indexmap::IndexMap;
    use pingwatch_api::SiteRecord;
    use pingwatch_core::AddSiteHandoff;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(screen: &mut SitesScreen, code: KeyCode) -> Option<Action> {
        screen.handle_key_event(key(code), &Dashboard::new()).unwrap()
    }

    fn typed(screen: &mut SitesScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    fn record(name: &str) -> SiteRecord {
        SiteRecord {
            site_name: name.into(),
            location: "Ridge".into(),
            responsible_person: "Ops".into(),
            contact_email: None,
            contact_phone: "555-0100".into(),
            active: true,
            active_devices: vec!["GSM-1".into(), "ESP".into()],
        }
    }

    fn loaded_screen() -> SitesScreen {
        let mut sites = IndexMap::new();
        sites.insert("S02".to_owned(), record("North Tower"));
        sites.insert("S01".to_owned(), record("Quarry"));
        let mut screen = SitesScreen::new();
        screen
            .update(&Action::SitesLoaded(SiteListing::new(sites)))
            .unwrap();
        screen
    }

    #[test]
    fn list_keys_target_the_selected_site() {
        let mut screen = loaded_screen();
        assert!(matches!(press(&mut screen, KeyCode::Enter), Some(Action::EditSite(id)) if id == "S02"));
        press(&mut screen, KeyCode::Down);
        assert!(
            matches!(press(&mut screen, KeyCode::Delete), Some(Action::RequestDelete(id)) if id == "S01")
        );
    }

    #[test]
    fn add_form_collects_input_and_submits_once() {
        let mut screen = loaded_screen();
        press(&mut screen, KeyCode::Char('a'));
        assert!(screen.captures_input());

        typed(&mut screen, "S07");
        press(&mut screen, KeyCode::Tab);
        typed(&mut screen, "Mill");
        // Seven tabs from Site Name reach the GSM-2 checkbox.
        for _ in 0..7 {
            press(&mut screen, KeyCode::Tab);
        }
        press(&mut screen, KeyCode::Char(' '));

        let Some(Action::SubmitForm(form)) = press(&mut screen, KeyCode::Enter) else {
            panic!("expected a submit");
        };
        let submission = form.to_submission().unwrap();
        assert_eq!(submission.site_id, "S07");
        assert_eq!(submission.record.site_name, "Mill");
        assert_eq!(submission.record.active_devices, ["GSM-1", "ESP"]);

        // A second Enter while saving is ignored.
        assert!(press(&mut screen, KeyCode::Enter).is_none());
        screen.update(&Action::FormFailed).unwrap();
        assert!(press(&mut screen, KeyCode::Enter).is_some());

        screen.update(&Action::FormSaved).unwrap();
        assert!(!screen.captures_input());
    }

    #[test]
    fn edit_form_skips_the_locked_identifier() {
        let mut screen = loaded_screen();
        let form = SiteForm::edit("S02", &record("North Tower"));
        screen.update(&Action::FormLoaded(Box::new(form))).unwrap();

        typed(&mut screen, "!");
        let state = screen.form.as_ref().unwrap();
        assert_eq!(state.form.site_id, "S02");
        assert_eq!(state.form.site_name, "North Tower!");

        press(&mut screen, KeyCode::BackTab);
        assert_eq!(screen.form.as_ref().unwrap().current(), FormField::Device(DeviceKind::Esp));
    }

    #[test]
    fn handoff_opens_a_prefilled_form() {
        let mut screen = SitesScreen::new();
        let handoff = AddSiteHandoff::new("S14", vec!["ESP".into()]);
        screen.update(&Action::OpenHandoff(handoff)).unwrap();

        let state = screen.form.as_ref().unwrap();
        assert_eq!(state.form.site_id, "S14");
        assert_eq!(state.form.devices.to_wire(), ["ESP"]);
        assert_eq!(state.current(), FormField::SiteId);
    }

    #[test]
    fn escape_discards_the_form() {
        let mut screen = loaded_screen();
        press(&mut screen, KeyCode::Char('a'));
        typed(&mut screen, "S09");
        press(&mut screen, KeyCode::Esc);
        assert!(screen.form.is_none());
        assert!(matches!(press(&mut screen, KeyCode::Char('r')), Some(Action::LoadSites)));
    }
}
