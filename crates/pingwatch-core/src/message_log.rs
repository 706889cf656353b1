//! Most-recent-first log of relayed MQTT messages.
//!
//! The log holds at most [`MESSAGE_LOG_CAPACITY`] entries; the running
//! count keeps counting past that so the header still says how many
//! messages arrived since the last clear.

use std::collections::VecDeque;

use pingwatch_api::MqttMessage;

use crate::payload::{RenderedPayload, render_payload};

pub const MESSAGE_LOG_CAPACITY: usize = 1000;

/// One received message with its payload already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMessage {
    pub message: MqttMessage,
    pub rendered: RenderedPayload,
}

#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<LoggedMessage>,
    count: u64,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self::with_capacity(MESSAGE_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(MESSAGE_LOG_CAPACITY)),
            count: 0,
            capacity,
        }
    }

    /// Prepend a message, evicting the oldest once over capacity.
    pub fn on_message(&mut self, message: MqttMessage) {
        let rendered = render_payload(&message.payload);
        self.entries.push_front(LoggedMessage { message, rendered });
        self.count += 1;
        self.entries.truncate(self.capacity);
    }

    /// Empty the log and reset the count.
    ///
    /// Used for both the local clear action and the server's
    /// `clear_messages` event.
    pub fn on_clear(&mut self) {
        self.entries.clear();
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages received since the last clear.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LoggedMessage> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&LoggedMessage> {
        self.entries.get(index)
    }

    pub fn view(&self) -> MessageLogView<'_> {
        MessageLogView {
            count_label: format!("({})", self.count),
            rows: self.entries.iter().collect(),
        }
    }
}

/// Render-ready projection of the log.
#[derive(Debug)]
pub struct MessageLogView<'a> {
    /// `"(N)"` header badge.
    pub count_label: String,
    pub rows: Vec<&'a LoggedMessage>,
}
