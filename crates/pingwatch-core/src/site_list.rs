// Registry listing projection: one entry per configured site with its
// enabled and disabled device badges.

use indexmap::IndexMap;
use pingwatch_api::SiteRecord;

use crate::device::{DeviceKind, DeviceSelection};

pub const EMPTY_REGISTRY_TEXT: &str = "No sites configured yet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteEntry {
    pub site_id: String,
    pub site_name: String,
    pub active: bool,
    pub location: String,
    pub responsible_person: String,
    pub contact_phone: String,
    /// Only present when non-empty.
    pub contact_email: Option<String>,
    /// `active_devices` in registry order.
    pub enabled: Vec<String>,
    /// Known kinds missing from `active_devices`.
    pub disabled: Vec<DeviceKind>,
}

impl SiteEntry {
    pub fn status_label(&self) -> &'static str {
        if self.active { "Active" } else { "Inactive" }
    }

    pub fn from_record(site_id: &str, record: &SiteRecord) -> Self {
        Self {
            site_id: site_id.to_owned(),
            site_name: record.site_name.clone(),
            active: record.active,
            location: record.location.clone(),
            responsible_person: record.responsible_person.clone(),
            contact_phone: record.contact_phone.clone(),
            contact_email: record.contact_email.clone().filter(|e| !e.is_empty()),
            enabled: record.active_devices.clone(),
            disabled: DeviceSelection::from_names(&record.active_devices)
                .unselected()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteListView {
    Empty(&'static str),
    Sites(Vec<SiteEntry>),
}

/// Last fetched copy of the registry, in server order.
#[derive(Debug, Clone, Default)]
pub struct SiteListing {
    sites: IndexMap<String, SiteRecord>,
}

impl SiteListing {
    pub fn new(sites: IndexMap<String, SiteRecord>) -> Self {
        Self { sites }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn get(&self, site_id: &str) -> Option<&SiteRecord> {
        self.sites.get(site_id)
    }

    pub fn site_id_at(&self, index: usize) -> Option<&str> {
        self.sites.get_index(index).map(|(id, _)| id.as_str())
    }

    pub fn records(&self) -> &IndexMap<String, SiteRecord> {
        &self.sites
    }

    pub fn view(&self) -> SiteListView {
        if self.sites.is_empty() {
            SiteListView::Empty(EMPTY_REGISTRY_TEXT)
        } else {
            SiteListView::Sites(
                self.sites
                    .iter()
                    .map(|(id, record)| SiteEntry::from_record(id, record))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_registry_has_empty_state_text() {
        assert_eq!(
            SiteListing::default().view(),
            SiteListView::Empty("No sites configured yet")
        );
    }

    #[test]
    fn badges_split_enabled_and_disabled() {
        let mut sites = IndexMap::new();
        sites.insert(
            "S05".to_string(),
            SiteRecord {
                site_name: "Mill".into(),
                location: "Valley".into(),
                responsible_person: "Ari".into(),
                contact_email: Some(String::new()),
                contact_phone: "555-0105".into(),
                active: true,
                active_devices: vec!["ESP".into(), "GSM-1".into()],
            },
        );
        let listing = SiteListing::new(sites);
        let SiteListView::Sites(entries) = listing.view() else {
            panic!("expected entries");
        };
        assert_eq!(entries[0].enabled, vec!["ESP", "GSM-1"]);
        assert_eq!(entries[0].disabled, vec![DeviceKind::Gsm2]);
        assert_eq!(entries[0].contact_email, None);
        assert_eq!(entries[0].status_label(), "Active");
        assert_eq!(listing.site_id_at(0), Some("S05"));
    }
}
