//! Component trait implemented by every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use pingwatch_core::Dashboard;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// A screen mounted in the app loop.
///
/// The loop owns the [`Dashboard`]; screens read it while handling keys
/// and rendering but never mutate it. Screen-local state (selection,
/// scroll, the open form) lives on the component.
///
/// Lifecycle: `init` → (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Called once when mounted, with the sender for dispatching actions.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Handle a key. Return an action to dispatch, or `None`.
    fn handle_key_event(&mut self, _key: KeyEvent, _dashboard: &Dashboard) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect, dashboard: &Dashboard);

    /// Whether the screen is taking raw text input, in which case global
    /// single-letter keys go to it instead of the app.
    fn captures_input(&self) -> bool {
        false
    }

    fn set_focused(&mut self, _focused: bool) {}

    fn id(&self) -> &str;
}
