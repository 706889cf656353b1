//! Navigation handoff from the unconfigured-site panel to the add-site form.
//!
//! The handoff travels as a location string,
//! `/config?add={site_id}&devices={a,b,c}`, and is consumed exactly once by
//! whoever opens the site configuration view. Consuming it rewrites the
//! location to the bare [`CONFIG_PATH`].

use url::form_urlencoded;

pub const CONFIG_PATH: &str = "/config";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSiteHandoff {
    pub site_id: String,
    /// `None` when the location carried no device list.
    pub devices: Option<Vec<String>>,
}

impl AddSiteHandoff {
    /// An empty device list means "not specified", the same as a location
    /// without `devices`.
    pub fn new(site_id: impl Into<String>, devices: Vec<String>) -> Self {
        Self {
            site_id: site_id.into(),
            devices: Some(devices).filter(|d| !d.is_empty()),
        }
    }

    pub fn to_location(&self) -> String {
        let mut location = format!("{CONFIG_PATH}?add={}", encode(&self.site_id));
        if let Some(devices) = self.devices.as_ref().filter(|d| !d.is_empty()) {
            let joined: Vec<String> = devices.iter().map(|d| encode(d)).collect();
            location.push_str("&devices=");
            location.push_str(&joined.join(","));
        }
        location
    }

    /// Parse a location (path plus query, or a full URL).
    ///
    /// Returns `None` when there is no non-empty `add` parameter. An empty
    /// or missing `devices` parameter yields `devices: None`.
    pub fn from_location(location: &str) -> Option<Self> {
        let query = location.split_once('?').map_or("", |(_, q)| q);
        let query = query.split_once('#').map_or(query, |(q, _)| q);

        let mut site_id = None;
        let mut devices = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "add" if site_id.is_none() => site_id = Some(value.into_owned()),
                "devices" if devices.is_none() => devices = Some(value.into_owned()),
                _ => {}
            }
        }

        let site_id = site_id.filter(|s| !s.is_empty())?;
        let devices = devices
            .filter(|d| !d.is_empty())
            .map(|d| d.split(',').map(str::to_owned).collect());

        Some(Self { site_id, devices })
    }
}

fn encode(part: &str) -> String {
    form_urlencoded::byte_serialize(part.as_bytes()).collect()
}

/// The current location of the configuration view, holding at most one
/// pending handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffSlot {
    location: String,
    pending: Option<AddSiteHandoff>,
}

impl Default for HandoffSlot {
    fn default() -> Self {
        Self {
            location: CONFIG_PATH.to_owned(),
            pending: None,
        }
    }
}

impl HandoffSlot {
    /// Arrive at `location`, picking up a handoff if it carries one.
    pub fn load(location: &str) -> Self {
        Self {
            location: location.to_owned(),
            pending: AddSiteHandoff::from_location(location),
        }
    }

    /// Navigate to the add-site entry point with `handoff`.
    pub fn navigate(&mut self, handoff: AddSiteHandoff) {
        self.location = handoff.to_location();
        self.pending = Some(handoff);
    }

    /// Consume the pending handoff. The second call returns `None` and the
    /// location no longer carries parameters.
    pub fn take(&mut self) -> Option<AddSiteHandoff> {
        let handoff = self.pending.take()?;
        self.location = CONFIG_PATH.to_owned();
        Some(handoff)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::device::DeviceKind;
    use crate::site_form::{FormField, SiteForm};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_device_list_selects_every_kind_on_both_paths() {
        let mut slot = HandoffSlot::default();
        slot.navigate(AddSiteHandoff::new("S40", vec![]));
        let in_process = slot.take().unwrap();
        let via_url = HandoffSlot::load("/config?add=S40").take().unwrap();

        assert_eq!(in_process, via_url);
        assert_eq!(in_process.devices, None);

        for handoff in [&in_process, &via_url] {
            let form = SiteForm::from_handoff(handoff);
            for kind in [DeviceKind::Gsm1, DeviceKind::Gsm2, DeviceKind::Esp] {
                assert_eq!(form.checked(FormField::Device(kind)), Some(true), "{kind:?}");
            }
        }
    }

    #[test]
    fn location_carries_id_and_devices() {
        let handoff = AddSiteHandoff::new("S14", vec!["ESP".into(), "GSM-1".into()]);
        assert_eq!(handoff.to_location(), "/config?add=S14&devices=ESP,GSM-1");
        assert_eq!(
            AddSiteHandoff::from_location(&handoff.to_location()),
            Some(handoff)
        );
    }

    #[test]
    fn odd_ids_survive_encoding() {
        let handoff = AddSiteHandoff::new("North & South", vec!["ESP".into()]);
        let parsed = AddSiteHandoff::from_location(&handoff.to_location()).unwrap();
        assert_eq!(parsed.site_id, "North & South");
    }

    #[test]
    fn missing_or_empty_parameters() {
        assert_eq!(AddSiteHandoff::from_location("/config"), None);
        assert_eq!(AddSiteHandoff::from_location("/config?add="), None);
        assert_eq!(
            AddSiteHandoff::from_location("http://monitor:5000/config?add=S03&devices="),
            Some(AddSiteHandoff {
                site_id: "S03".into(),
                devices: None,
            })
        );
    }

    #[test]
    fn slot_is_consumed_once_and_cleans_location() {
        let mut slot = HandoffSlot::default();
        slot.navigate(AddSiteHandoff::new("S14", vec!["ESP".into(), "GSM-1".into()]));
        assert_eq!(slot.location(), "/config?add=S14&devices=ESP,GSM-1");

        let handoff = slot.take().unwrap();
        assert_eq!(handoff.site_id, "S14");
        assert_eq!(handoff.devices, Some(vec!["ESP".into(), "GSM-1".into()]));
        assert_eq!(slot.location(), CONFIG_PATH);
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn loading_a_plain_location_has_nothing_pending() {
        let mut slot = HandoffSlot::load("/config");
        assert!(!slot.is_pending());
        assert_eq!(slot.take(), None);
        assert_eq!(slot.location(), "/config");
    }
}
