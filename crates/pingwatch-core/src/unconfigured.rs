// Panel of sites that report over MQTT but have no registry entry.

use pingwatch_api::UnconfiguredSite;

use crate::handoff::AddSiteHandoff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnconfiguredView<'a> {
    Hidden,
    Shown {
        /// Badge count, always `rows.len()`.
        badge: usize,
        rows: &'a [UnconfiguredSite],
    },
}

#[derive(Debug, Clone, Default)]
pub struct UnconfiguredPanel {
    sites: Vec<UnconfiguredSite>,
}

impl UnconfiguredPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_unconfigured_update(&mut self, sites: Vec<UnconfiguredSite>) {
        self.sites = sites;
    }

    pub fn sites(&self) -> &[UnconfiguredSite] {
        &self.sites
    }

    pub fn is_visible(&self) -> bool {
        !self.sites.is_empty()
    }

    pub fn view(&self) -> UnconfiguredView<'_> {
        if self.sites.is_empty() {
            UnconfiguredView::Hidden
        } else {
            UnconfiguredView::Shown {
                badge: self.sites.len(),
                rows: &self.sites,
            }
        }
    }

    /// The row's "configure" action: a handoff to the add-site form.
    pub fn configure(&self, index: usize) -> Option<AddSiteHandoff> {
        self.sites
            .get(index)
            .map(|site| AddSiteHandoff::new(site.site_id.clone(), site.devices.clone()))
    }

    pub fn configure_site(&self, site_id: &str) -> Option<AddSiteHandoff> {
        let index = self.sites.iter().position(|s| s.site_id == site_id)?;
        self.configure(index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stray(id: &str, devices: &[&str]) -> UnconfiguredSite {
        UnconfiguredSite {
            site_id: id.into(),
            devices: devices.iter().map(|d| (*d).to_string()).collect(),
            device_count: u32::try_from(devices.len()).unwrap(),
            first_seen: "2026-10-19 08:00:00".into(),
            last_seen: "2026-10-19 08:05:00".into(),
        }
    }

    #[test]
    fn empty_update_hides_panel() {
        let mut panel = UnconfiguredPanel::new();
        panel.on_unconfigured_update(vec![stray("S40", &["ESP"])]);
        panel.on_unconfigured_update(Vec::new());
        assert_eq!(panel.view(), UnconfiguredView::Hidden);
    }

    #[test]
    fn one_site_shows_badge_one() {
        let mut panel = UnconfiguredPanel::new();
        panel.on_unconfigured_update(vec![stray("S40", &["ESP"])]);
        let UnconfiguredView::Shown { badge, rows } = panel.view() else {
            panic!("panel should be visible");
        };
        assert_eq!(badge, 1);
        assert_eq!(rows[0].site_id, "S40");
    }

    #[test]
    fn configure_hands_off_id_and_device_list() {
        let mut panel = UnconfiguredPanel::new();
        panel.on_unconfigured_update(vec![stray("S40", &["ESP", "GSM-1"])]);
        let handoff = panel.configure_site("S40").unwrap();
        assert_eq!(handoff.site_id, "S40");
        assert_eq!(handoff.devices, Some(vec!["ESP".into(), "GSM-1".into()]));
        assert_eq!(handoff.to_location(), "/config?add=S40&devices=ESP,GSM-1");
        assert!(panel.configure(3).is_none());
    }
}
