// ── Device kinds ──
//
// Every site carries up to three reporting devices. The string forms are
// the exact tokens used on the wire and in MQTT payloads.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum DeviceKind {
    #[strum(serialize = "GSM-1")]
    #[serde(rename = "GSM-1")]
    Gsm1,
    #[strum(serialize = "GSM-2")]
    #[serde(rename = "GSM-2")]
    Gsm2,
    #[strum(serialize = "ESP")]
    #[serde(rename = "ESP")]
    Esp,
}

impl DeviceKind {
    pub const COUNT: usize = 3;

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    fn slot(self) -> usize {
        match self {
            Self::Gsm1 => 0,
            Self::Gsm2 => 1,
            Self::Esp => 2,
        }
    }
}

/// Which device kinds are switched on for a site.
///
/// Always iterates in canonical order (`GSM-1`, `GSM-2`, `ESP`), so the
/// wire list it produces is stable regardless of how it was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceSelection {
    slots: [bool; DeviceKind::COUNT],
}

impl DeviceSelection {
    pub fn all() -> Self {
        Self {
            slots: [true; DeviceKind::COUNT],
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Select exactly the known kinds named in `names`. Unknown names are
    /// ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::none();
        for name in names {
            if let Ok(kind) = name.as_ref().parse::<DeviceKind>() {
                selection.set(kind, true);
            }
        }
        selection
    }

    pub fn contains(&self, kind: DeviceKind) -> bool {
        self.slots[kind.slot()]
    }

    pub fn set(&mut self, kind: DeviceKind, on: bool) {
        self.slots[kind.slot()] = on;
    }

    pub fn toggle(&mut self, kind: DeviceKind) {
        let slot = &mut self.slots[kind.slot()];
        *slot = !*slot;
    }

    pub fn selected(&self) -> impl Iterator<Item = DeviceKind> + '_ {
        DeviceKind::iter().filter(|k| self.contains(*k))
    }

    pub fn unselected(&self) -> impl Iterator<Item = DeviceKind> + '_ {
        DeviceKind::iter().filter(|k| !self.contains(*k))
    }

    /// `active_devices` as sent to the registry.
    pub fn to_wire(&self) -> Vec<String> {
        self.selected().map(|k| k.as_str().to_owned()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn string_forms_are_exact_and_case_sensitive() {
        assert_eq!(DeviceKind::Gsm1.to_string(), "GSM-1");
        assert_eq!("ESP".parse::<DeviceKind>().unwrap(), DeviceKind::Esp);
        assert!("esp".parse::<DeviceKind>().is_err());
        assert!("GSM-3".parse::<DeviceKind>().is_err());
    }

    #[test]
    fn selection_keeps_canonical_order_and_drops_unknown() {
        let sel = DeviceSelection::from_names(["ESP", "LORA", "GSM-1"]);
        assert_eq!(sel.to_wire(), vec!["GSM-1", "ESP"]);
        assert_eq!(sel.unselected().collect::<Vec<_>>(), vec![DeviceKind::Gsm2]);
    }

    #[test]
    fn toggle_flips_one_kind() {
        let mut sel = DeviceSelection::all();
        sel.toggle(DeviceKind::Gsm2);
        assert!(!sel.contains(DeviceKind::Gsm2));
        assert_eq!(sel.to_wire(), vec!["GSM-1", "ESP"]);
        sel.toggle(DeviceKind::Gsm2);
        assert_eq!(sel, DeviceSelection::all());
    }
}
