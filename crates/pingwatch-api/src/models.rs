// Wire types shared by the event channel and the REST site registry.
//
// Field names follow the server's JSON exactly. Optional fields carry
// `#[serde(default)]` so a sparse payload still deserializes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Event channel payloads ──────────────────────────────────────────

/// One MQTT message relayed by the server (`mqtt_message`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttMessage {
    /// Server-side receive time, `YYYY-MM-DD HH:MM:SS.mmm`.
    pub timestamp: String,
    pub topic: String,
    /// Raw payload text. May or may not be JSON.
    pub payload: String,
}

/// Broker link state reported by the server (`mqtt_status`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttStatus {
    /// `"connected"`, `"disconnected"`, or `"error"`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MqttStatus {
    pub fn is_connected(&self) -> bool {
        self.status == "connected"
    }
}

/// Per-site alert snapshot computed by the server once per check interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStatus {
    pub site_id: String,
    /// 0 = all devices reported, 1..=3 = that many devices missing.
    pub alert_level: i64,
    /// Display hint (hex colour) chosen by the server.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub received: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub total_received: u32,
    #[serde(default)]
    pub total_expected: u32,
}

/// A site seen on the wire with no entry in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnconfiguredSite {
    pub site_id: String,
    #[serde(default)]
    pub devices: Vec<String>,
    #[serde(default)]
    pub device_count: u32,
    #[serde(default)]
    pub first_seen: String,
    #[serde(default)]
    pub last_seen: String,
}

/// Envelope used by both `site_status_update` and `unconfigured_sites_update`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SitesPayload<T> {
    #[serde(default = "Vec::new")]
    pub sites: Vec<T>,
}

/// Reply to a `connect_mqtt` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ── Site registry ───────────────────────────────────────────────────

/// A configured site as stored by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub site_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub responsible_person: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub active_devices: Vec<String>,
}

/// Request body for create and update: the record plus its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSubmission {
    pub site_id: String,
    #[serde(flatten)]
    pub record: SiteRecord,
}

/// `GET /api/sites` response. Keeps the server's ordering.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SiteList {
    #[serde(default)]
    pub sites: IndexMap<String, SiteRecord>,
}

/// Body of a successful mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of a rejected request.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn site_status_round_trips_server_shape() {
        let json = serde_json::json!({
            "site_id": "S01",
            "alert_level": 1,
            "color": "#f59e0b",
            "received": ["GSM-1", "ESP"],
            "missing": ["GSM-2"],
            "total_expected": 3,
            "total_received": 2
        });
        let status: SiteStatus = serde_json::from_value(json).unwrap();
        assert_eq!(status.site_id, "S01");
        assert_eq!(status.alert_level, 1);
        assert_eq!(status.missing, vec!["GSM-2".to_string()]);
        assert_eq!(status.total_received + 1, status.total_expected);
    }

    #[test]
    fn submission_flattens_record_fields() {
        let submission = SiteSubmission {
            site_id: "S02".into(),
            record: SiteRecord {
                site_name: "North Tower".into(),
                location: "Ridge".into(),
                responsible_person: "Ops".into(),
                contact_email: None,
                contact_phone: "555-0100".into(),
                active: true,
                active_devices: vec!["ESP".into()],
            },
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["site_id"], "S02");
        assert_eq!(value["site_name"], "North Tower");
        assert_eq!(value["active_devices"][0], "ESP");
        assert!(value.get("contact_email").is_none());
    }

    #[test]
    fn site_list_preserves_server_order() {
        let body = r#"{"sites": {"Z9": {"site_name": "z"}, "A1": {"site_name": "a"}}}"#;
        let list: SiteList = serde_json::from_str(body).unwrap();
        let ids: Vec<&str> = list.sites.keys().map(String::as_str).collect();
        assert_eq!(ids, ["Z9", "A1"]);
    }
}
