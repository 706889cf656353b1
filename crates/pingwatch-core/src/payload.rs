// MQTT payload rendering: pretty JSON when it parses, raw text otherwise.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedPayload {
    /// Valid JSON, pretty-printed with two-space indentation in the
    /// payload's own key order.
    Structured(String),
    /// Anything else, verbatim.
    Raw(String),
}

impl RenderedPayload {
    pub fn text(&self) -> &str {
        match self {
            Self::Structured(s) | Self::Raw(s) => s,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

pub fn render_payload(raw: &str) -> RenderedPayload {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .map_or_else(|| RenderedPayload::Raw(raw.to_owned()), RenderedPayload::Structured)
}
