//! Per-site alert grid plus the countdown it resets.

use std::fmt;

use chrono::{DateTime, Local};
use pingwatch_api::SiteStatus;

use crate::countdown::Countdown;

pub const NO_STATUS_TEXT: &str = "No site data yet";

/// Server-computed alert level: the number of devices that missed the
/// last check window, capped at 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertLevel(i64);

impl AlertLevel {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i64 {
        self.0
    }

    /// `Some(0..=3)` for levels the dashboard knows how to show.
    pub fn known(self) -> Option<u8> {
        u8::try_from(self.0).ok().filter(|l| *l <= 3)
    }

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    pub fn label(self) -> &'static str {
        match self.known() {
            Some(0) => "ALL OK",
            Some(1) => "ALERT 1",
            Some(2) => "ALERT 2",
            Some(3) => "ALERT 3",
            _ => "UNKNOWN",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Render-ready card for one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteCard {
    pub site_id: String,
    pub level: AlertLevel,
    pub label: &'static str,
    /// Server colour hint, passed through untouched.
    pub color: String,
    /// `"2/3 devices"`.
    pub fraction: String,
    pub received: Vec<String>,
    pub missing: Vec<String>,
}

impl SiteCard {
    fn from_status(status: &SiteStatus) -> Self {
        let level = AlertLevel::new(status.alert_level);
        Self {
            site_id: status.site_id.clone(),
            level,
            label: level.label(),
            color: status.color.clone(),
            fraction: format!(
                "{}/{} devices",
                status.total_received, status.total_expected
            ),
            received: status.received.clone(),
            missing: status.missing.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusBoardView {
    Placeholder(&'static str),
    Grid(Vec<SiteCard>),
}

#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    sites: Vec<SiteStatus>,
    countdown: Countdown,
    updated_at: Option<DateTime<Local>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole grid, keeping input order, and reset the countdown.
    pub fn on_status_update(&mut self, sites: Vec<SiteStatus>) {
        tracing::debug!(sites = sites.len(), "site status update");
        self.sites = sites;
        self.countdown.reset();
        self.updated_at = Some(Local::now());
    }

    pub fn sites(&self) -> &[SiteStatus] {
        &self.sites
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn countdown_mut(&mut self) -> &mut Countdown {
        &mut self.countdown
    }

    /// Local time of the last status update, if any.
    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    /// How many sites are at each known alert level, indexed 0..=3.
    pub fn level_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for site in &self.sites {
            if let Some(level) = AlertLevel::new(site.alert_level).known() {
                counts[usize::from(level)] += 1;
            }
        }
        counts
    }

    pub fn view(&self) -> StatusBoardView {
        if self.sites.is_empty() {
            StatusBoardView::Placeholder(NO_STATUS_TEXT)
        } else {
            StatusBoardView::Grid(self.sites.iter().map(SiteCard::from_status).collect())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn site(id: &str, level: i64, received: &[&str], missing: &[&str]) -> SiteStatus {
        SiteStatus {
            site_id: id.into(),
            alert_level: level,
            color: "#10b981".into(),
            received: received.iter().map(|s| (*s).to_string()).collect(),
            missing: missing.iter().map(|s| (*s).to_string()).collect(),
            total_received: u32::try_from(received.len()).unwrap(),
            total_expected: 3,
        }
    }

    #[test]
    fn labels_cover_known_levels_and_unknown() {
        let labels: Vec<&str> = (0..=3).map(|l| AlertLevel::new(l).label()).collect();
        assert_eq!(labels, ["ALL OK", "ALERT 1", "ALERT 2", "ALERT 3"]);
        assert_eq!(AlertLevel::new(4).label(), "UNKNOWN");
        assert_eq!(AlertLevel::new(-1).label(), "UNKNOWN");
    }

    #[test]
    fn empty_update_shows_placeholder() {
        let mut board = StatusBoard::new();
        assert_eq!(board.view(), StatusBoardView::Placeholder(NO_STATUS_TEXT));
        board.on_status_update(vec![site("S01", 0, &["GSM-1", "GSM-2", "ESP"], &[])]);
        board.on_status_update(Vec::new());
        assert_eq!(board.view(), StatusBoardView::Placeholder(NO_STATUS_TEXT));
    }

    #[test]
    fn grid_preserves_input_order() {
        let mut board = StatusBoard::new();
        board.on_status_update(vec![
            site("S09", 1, &["GSM-1", "ESP"], &["GSM-2"]),
            site("S01", 0, &["GSM-1", "GSM-2", "ESP"], &[]),
        ]);
        let StatusBoardView::Grid(cards) = board.view() else {
            panic!("expected grid");
        };
        assert_eq!(cards[0].site_id, "S09");
        assert_eq!(cards[0].label, "ALERT 1");
        assert_eq!(cards[0].fraction, "2/3 devices");
        assert_eq!(cards[0].missing, vec!["GSM-2".to_string()]);
        assert_eq!(cards[1].label, "ALL OK");
        assert_eq!(board.level_counts(), [1, 1, 0, 0]);
    }

    #[test]
    fn status_update_resets_countdown_mid_tick() {
        let mut board = StatusBoard::new();
        board.countdown_mut().start();
        for _ in 0..25 {
            board.countdown_mut().tick();
        }
        assert_eq!(board.countdown().value(), 35);
        board.on_status_update(vec![site("S01", 3, &[], &["GSM-1", "GSM-2", "ESP"])]);
        assert_eq!(board.countdown().value(), 60);
        assert!(board.updated_at().is_some());
    }
}
