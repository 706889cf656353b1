//! Screen implementations. Each screen is a top-level Component.

pub mod messages;
pub mod monitor;
pub mod sites;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create the screen components for the tab bar.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Monitor, Box::new(monitor::MonitorScreen::new())),
        (ScreenId::Messages, Box::new(messages::MessagesScreen::new())),
        (ScreenId::Sites, Box::new(sites::SitesScreen::new())),
    ]
}
