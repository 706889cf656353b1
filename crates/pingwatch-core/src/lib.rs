// pingwatch-core: Dashboard view-models and site registry workflows shared
// by the CLI and the TUI.

pub mod countdown;
pub mod dashboard;
pub mod device;
pub mod error;
pub mod handoff;
pub mod link;
pub mod manager;
pub mod message_log;
pub mod notice;
pub mod payload;
pub mod site_form;
pub mod site_list;
pub mod status_board;
pub mod unconfigured;

// ── Primary re-exports ──────────────────────────────────────────────
pub use countdown::{COUNTDOWN_START, Countdown, CountdownState, Ticker};
pub use dashboard::Dashboard;
pub use device::{DeviceKind, DeviceSelection};
pub use error::CoreError;
pub use handoff::{AddSiteHandoff, CONFIG_PATH, HandoffSlot};
pub use link::MqttLink;
pub use manager::{SiteAction, SiteManager, delete_prompt, failure_notice, not_found_as};
pub use message_log::{LoggedMessage, MESSAGE_LOG_CAPACITY, MessageLog, MessageLogView};
pub use notice::{Notice, NoticeLevel};
pub use payload::{RenderedPayload, render_payload};
pub use site_form::{FormField, FormMode, SiteForm};
pub use site_list::{EMPTY_REGISTRY_TEXT, SiteEntry, SiteListView, SiteListing};
pub use status_board::{AlertLevel, NO_STATUS_TEXT, SiteCard, StatusBoard, StatusBoardView};
pub use unconfigured::{UnconfiguredPanel, UnconfiguredView};

// Transport types consumers need alongside the view-models.
pub use pingwatch_api::{
    ClientCommand, EventSocket, ReconnectConfig, ServerEvent, SiteRegistryClient, SocketEvent,
    TransportState,
};
