// Broker link indicator, fed by `mqtt_status` and by event-channel drops.

use pingwatch_api::MqttStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MqttLink {
    /// No status received yet.
    #[default]
    Unknown,
    Connected {
        broker: Option<String>,
        topic: Option<String>,
    },
    Disconnected {
        error: Option<String>,
    },
}

impl MqttLink {
    pub fn from_status(status: &MqttStatus) -> Self {
        if status.is_connected() {
            Self::Connected {
                broker: status.broker.clone(),
                topic: status.topic.clone(),
            }
        } else {
            Self::Disconnected {
                error: status.error.clone(),
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// Indicator text.
    pub fn label(&self) -> String {
        match self {
            Self::Connected { topic, .. } => {
                format!("Connected | Topic: {}", topic.as_deref().unwrap_or(""))
            }
            Self::Unknown | Self::Disconnected { .. } => "Disconnected".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn status(s: &str) -> MqttStatus {
        MqttStatus {
            status: s.into(),
            broker: Some("broker.local:1883".into()),
            topic: Some("PING-WATCH".into()),
            error: None,
        }
    }

    #[test]
    fn connected_label_names_the_topic() {
        let link = MqttLink::from_status(&status("connected"));
        assert!(link.is_connected());
        assert_eq!(link.label(), "Connected | Topic: PING-WATCH");
    }

    #[test]
    fn error_status_reads_as_disconnected() {
        let mut st = status("error");
        st.error = Some("Connection refused".into());
        let link = MqttLink::from_status(&st);
        assert_eq!(
            link,
            MqttLink::Disconnected {
                error: Some("Connection refused".into())
            }
        );
        assert_eq!(link.label(), "Disconnected");
        assert_eq!(MqttLink::Unknown.label(), "Disconnected");
    }
}
