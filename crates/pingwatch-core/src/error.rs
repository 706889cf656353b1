// ── Core error types ──
//
// User-facing errors from pingwatch-core. Consumers never see reqwest or
// JSON failures directly; `From<pingwatch_api::Error>` translates them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The HTTP client gave up waiting. reqwest does not report which
    /// deadline fired, so no duration is claimed here.
    #[error("Server did not answer before the request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    /// `server_message` is the server's own wording, when it sent one.
    #[error("{}", not_found_text(.site_id, .server_message.as_deref()))]
    SiteNotFound {
        site_id: String,
        server_message: Option<String>,
    },

    // ── Operation errors ─────────────────────────────────────────────
    /// The server refused the request and said why.
    #[error("{message}")]
    Rejected { message: String },

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Refusing to {action} without confirmation")]
    ConfirmationRequired { action: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },
}

impl CoreError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

fn not_found_text(site_id: &str, server_message: Option<&str>) -> String {
    server_message.map_or_else(|| format!("Site not found: {site_id}"), str::to_owned)
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pingwatch_api::Error> for CoreError {
    fn from(err: pingwatch_api::Error) -> Self {
        use pingwatch_api::Error as ApiError;

        match err {
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::Api { status, message } if status < 500 => CoreError::Rejected { message },
            ApiError::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ApiError::InvalidUrl(e) => CoreError::validation("server URL", e.to_string()),
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            ApiError::NotConnected => CoreError::ConnectionFailed {
                url: String::new(),
                reason: "event channel is not connected".into(),
            },
            ApiError::ChannelClosed => CoreError::ConnectionFailed {
                url: String::new(),
                reason: "event channel closed".into(),
            },
            ApiError::Protocol(message) => CoreError::Api {
                message: format!("protocol error: {message}"),
                status: None,
            },
            ApiError::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}
