//! Add/edit form for a site registry entry.
//!
//! The form is plain editable state. Three constructors cover the three
//! ways it opens: a blank new site, a prefilled new site from an
//! [`AddSiteHandoff`], and an existing record in edit mode with its
//! identifier locked.

use pingwatch_api::{SiteRecord, SiteSubmission};

use crate::device::{DeviceKind, DeviceSelection};
use crate::error::CoreError;
use crate::handoff::AddSiteHandoff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Add,
    /// Editing `site_id`; the identifier cannot change.
    Edit { site_id: String },
}

/// Every input on the form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    SiteId,
    SiteName,
    Location,
    ResponsiblePerson,
    ContactEmail,
    ContactPhone,
    Active,
    Device(DeviceKind),
}

impl FormField {
    pub const ALL: [Self; 10] = [
        Self::SiteId,
        Self::SiteName,
        Self::Location,
        Self::ResponsiblePerson,
        Self::ContactEmail,
        Self::ContactPhone,
        Self::Active,
        Self::Device(DeviceKind::Gsm1),
        Self::Device(DeviceKind::Gsm2),
        Self::Device(DeviceKind::Esp),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::SiteId => "Site ID",
            Self::SiteName => "Site Name",
            Self::Location => "Location",
            Self::ResponsiblePerson => "Responsible Person",
            Self::ContactEmail => "Contact Email",
            Self::ContactPhone => "Contact Phone",
            Self::Active => "Active",
            Self::Device(kind) => kind.as_str(),
        }
    }

    /// Checkbox rather than text input.
    pub fn is_toggle(self) -> bool {
        matches!(self, Self::Active | Self::Device(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteForm {
    mode: FormMode,
    pub site_id: String,
    pub site_name: String,
    pub location: String,
    pub responsible_person: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub active: bool,
    pub devices: DeviceSelection,
}

impl SiteForm {
    /// Blank form: active, every device selected.
    pub fn new_site() -> Self {
        Self {
            mode: FormMode::Add,
            site_id: String::new(),
            site_name: String::new(),
            location: String::new(),
            responsible_person: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            active: true,
            devices: DeviceSelection::all(),
        }
    }

    /// New-site form prefilled from the unconfigured panel.
    ///
    /// Only the handed-off devices that are known kinds are selected; with
    /// no device list at all, every kind is.
    pub fn from_handoff(handoff: &AddSiteHandoff) -> Self {
        let devices = handoff
            .devices
            .as_ref()
            .map_or_else(DeviceSelection::all, DeviceSelection::from_names);
        Self {
            site_id: handoff.site_id.clone(),
            devices,
            ..Self::new_site()
        }
    }

    /// Edit form for an existing record. The identifier is locked.
    pub fn edit(site_id: &str, record: &SiteRecord) -> Self {
        Self {
            mode: FormMode::Edit {
                site_id: site_id.to_owned(),
            },
            site_id: site_id.to_owned(),
            site_name: record.site_name.clone(),
            location: record.location.clone(),
            responsible_person: record.responsible_person.clone(),
            contact_email: record.contact_email.clone().unwrap_or_default(),
            contact_phone: record.contact_phone.clone(),
            active: record.active,
            devices: DeviceSelection::from_names(&record.active_devices),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add New Site",
            FormMode::Edit { .. } => "Edit Site",
        }
    }

    pub fn is_locked(&self, field: FormField) -> bool {
        field == FormField::SiteId && self.is_edit()
    }

    /// Current text of a text field; `None` for toggles.
    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::SiteId => Some(&self.site_id),
            FormField::SiteName => Some(&self.site_name),
            FormField::Location => Some(&self.location),
            FormField::ResponsiblePerson => Some(&self.responsible_person),
            FormField::ContactEmail => Some(&self.contact_email),
            FormField::ContactPhone => Some(&self.contact_phone),
            FormField::Active | FormField::Device(_) => None,
        }
    }

    /// Mutable text of an editable text field. Locked fields and toggles
    /// yield `None`.
    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        if self.is_locked(field) {
            return None;
        }
        match field {
            FormField::SiteId => Some(&mut self.site_id),
            FormField::SiteName => Some(&mut self.site_name),
            FormField::Location => Some(&mut self.location),
            FormField::ResponsiblePerson => Some(&mut self.responsible_person),
            FormField::ContactEmail => Some(&mut self.contact_email),
            FormField::ContactPhone => Some(&mut self.contact_phone),
            FormField::Active | FormField::Device(_) => None,
        }
    }

    /// Checkbox state; `None` for text fields.
    pub fn checked(&self, field: FormField) -> Option<bool> {
        match field {
            FormField::Active => Some(self.active),
            FormField::Device(kind) => Some(self.devices.contains(kind)),
            _ => None,
        }
    }

    /// Flip a checkbox. Returns `false` if `field` is not one.
    pub fn toggle(&mut self, field: FormField) -> bool {
        match field {
            FormField::Active => self.active = !self.active,
            FormField::Device(kind) => self.devices.toggle(kind),
            _ => return false,
        }
        true
    }

    pub fn set_site_id(&mut self, site_id: impl Into<String>) -> Result<(), CoreError> {
        match self.text_mut(FormField::SiteId) {
            Some(slot) => {
                *slot = site_id.into();
                Ok(())
            }
            None => Err(CoreError::validation(
                "site_id",
                "the identifier cannot change while editing",
            )),
        }
    }

    /// Trimmed request body. In edit mode the locked identifier is used.
    pub fn to_submission(&self) -> Result<SiteSubmission, CoreError> {
        let site_id = match &self.mode {
            FormMode::Edit { site_id } => site_id.clone(),
            FormMode::Add => self.site_id.trim().to_owned(),
        };
        if site_id.is_empty() {
            return Err(CoreError::validation("site_id", "a site ID is required"));
        }

        Ok(SiteSubmission {
            site_id,
            record: SiteRecord {
                site_name: self.site_name.trim().to_owned(),
                location: self.location.trim().to_owned(),
                responsible_person: self.responsible_person.trim().to_owned(),
                contact_email: Some(self.contact_email.trim().to_owned()),
                contact_phone: self.contact_phone.trim().to_owned(),
                active: self.active,
                active_devices: self.devices.to_wire(),
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> SiteRecord {
        SiteRecord {
            site_name: "Quarry".into(),
            location: "East pit".into(),
            responsible_person: "Sam".into(),
            contact_email: None,
            contact_phone: "555-0142".into(),
            active: false,
            active_devices: vec!["GSM-2".into()],
        }
    }

    #[test]
    fn new_site_defaults_active_with_all_devices() {
        let form = SiteForm::new_site();
        assert!(form.active);
        assert_eq!(form.devices, DeviceSelection::all());
        assert_eq!(form.title(), "Add New Site");
    }

    #[test]
    fn handoff_selects_only_known_handed_off_devices() {
        let handoff = AddSiteHandoff::new("S40", vec!["ESP".into(), "GSM-1".into(), "X".into()]);
        let form = SiteForm::from_handoff(&handoff);
        assert_eq!(form.site_id, "S40");
        assert!(form.active);
        assert!(!form.is_locked(FormField::SiteId));
        assert_eq!(form.devices.to_wire(), vec!["GSM-1", "ESP"]);
    }

    #[test]
    fn handoff_without_devices_selects_all() {
        let handoff = AddSiteHandoff {
            site_id: "S41".into(),
            devices: None,
        };
        assert_eq!(
            SiteForm::from_handoff(&handoff).devices,
            DeviceSelection::all()
        );
    }

    #[test]
    fn edit_locks_identifier_and_blanks_missing_email() {
        let mut form = SiteForm::edit("S02", &record());
        assert_eq!(form.title(), "Edit Site");
        assert_eq!(form.contact_email, "");
        assert!(!form.active);
        assert!(form.text_mut(FormField::SiteId).is_none());
        assert!(form.set_site_id("S99").is_err());
        assert_eq!(form.to_submission().unwrap().site_id, "S02");
    }

    #[test]
    fn submission_trims_and_round_trips_devices() {
        let mut form = SiteForm::new_site();
        form.set_site_id("  S50 ").unwrap();
        form.site_name = " Harbor ".into();
        form.toggle(FormField::Device(DeviceKind::Gsm1));
        form.toggle(FormField::Active);

        let submission = form.to_submission().unwrap();
        assert_eq!(submission.site_id, "S50");
        assert_eq!(submission.record.site_name, "Harbor");
        assert_eq!(submission.record.contact_email.as_deref(), Some(""));
        assert!(!submission.record.active);
        assert_eq!(submission.record.active_devices, vec!["GSM-2", "ESP"]);

        let reopened = SiteForm::edit(&submission.site_id, &submission.record);
        assert_eq!(reopened.devices, form.devices);
        assert_eq!(reopened.active, form.active);
    }

    #[test]
    fn blank_identifier_is_rejected() {
        let err = SiteForm::new_site().to_submission().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "site_id"));
    }

    #[test]
    fn toggles_and_text_fields_are_distinct() {
        let mut form = SiteForm::new_site();
        assert!(!form.toggle(FormField::SiteName));
        assert_eq!(form.checked(FormField::Active), Some(true));
        assert_eq!(form.text(FormField::Active), None);
        assert!(FormField::ALL.iter().filter(|f| f.is_toggle()).count() == 4);
    }
}
