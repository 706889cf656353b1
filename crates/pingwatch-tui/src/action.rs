//! Actions flowing through the app loop.
//!
//! Key handlers, the data bridge, the countdown ticker and spawned registry
//! requests all talk to the loop by sending one of these.

use std::fmt;
use std::sync::Arc;

use pingwatch_core::{
    AddSiteHandoff, ClientCommand, Notice, SiteForm, SiteListing, SocketEvent, delete_prompt,
};

use crate::screen::ScreenId;

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ───────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ──────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Event channel ───────────────────────────────────────────────
    /// One event from the server, forwarded by the data bridge.
    Socket(Arc<SocketEvent>),
    /// One second of the "next check" countdown.
    CountdownTick,
    /// Ask the server to connect or disconnect its MQTT broker link.
    SendCommand(ClientCommand),
    ClearMessages,

    // ── Unconfigured sites ──────────────────────────────────────────
    /// Configure the unconfigured row at this index.
    ConfigureSite(usize),
    /// Open the add-site form prefilled from a handoff.
    OpenHandoff(AddSiteHandoff),

    // ── Site registry ───────────────────────────────────────────────
    LoadSites,
    SitesLoaded(SiteListing),
    SitesLoadFailed,
    EditSite(String),
    FormLoaded(Box<SiteForm>),
    SubmitForm(Box<SiteForm>),
    FormSaved,
    FormFailed,
    RequestDelete(String),
    ConfirmYes,
    ConfirmNo,

    // ── Notices ─────────────────────────────────────────────────────
    Notify(Notice),
}

/// An operation waiting on a y/n answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteSite { site_id: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteSite { site_id } => f.write_str(&delete_prompt(site_id)),
        }
    }
}
