//! Site registry command handlers.

use std::fmt::Write;

use pingwatch_api::SiteRecord;
use pingwatch_config::ServerConfig;
use pingwatch_core::{
    DeviceKind, DeviceSelection, HandoffSlot, SiteEntry, SiteForm, SiteListView, SiteManager,
    SiteRegistryClient, delete_prompt, not_found_as,
};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, OutputFormat, SiteDetailArgs, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Responsible")]
    responsible: String,
    #[tabled(rename = "Devices")]
    devices: String,
}

impl From<&SiteEntry> for SiteRow {
    fn from(e: &SiteEntry) -> Self {
        Self {
            id: e.site_id.clone(),
            name: e.site_name.clone(),
            status: e.status_label().into(),
            location: e.location.clone(),
            responsible: e.responsible_person.clone(),
            devices: device_summary(e),
        }
    }
}

/// Serialized form: the registry record keyed by its identifier.
#[derive(Serialize)]
struct SiteDoc<'a> {
    site_id: &'a str,
    #[serde(flatten)]
    record: &'a SiteRecord,
}

fn device_summary(entry: &SiteEntry) -> String {
    let mut out = entry.enabled.join(", ");
    if !entry.disabled.is_empty() {
        let off: Vec<&str> = entry.disabled.iter().copied().map(DeviceKind::as_str).collect();
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "(off: {})", off.join(", "));
    }
    out
}

fn detail(site_id: &str, record: &SiteRecord) -> String {
    let devices = if record.active_devices.is_empty() {
        "none".to_owned()
    } else {
        record.active_devices.join(", ")
    };
    let lines = [
        format!("Site:        {site_id}"),
        format!("Name:        {}", record.site_name),
        format!(
            "Status:      {}",
            if record.active { "Active" } else { "Inactive" }
        ),
        format!("Location:    {}", record.location),
        format!("Responsible: {}", record.responsible_person),
        format!("Phone:       {}", record.contact_phone),
        format!(
            "Email:       {}",
            record.contact_email.as_deref().unwrap_or("")
        ),
        format!("Devices:     {devices}"),
    ];
    lines.join("\n")
}

// ── Form overrides ──────────────────────────────────────────────────

/// Layer command-line values over a form. Unset flags leave fields alone.
fn apply_details(form: &mut SiteForm, name: Option<String>, details: SiteDetailArgs) {
    if let Some(name) = name {
        form.site_name = name;
    }
    if let Some(location) = details.location {
        form.location = location;
    }
    if let Some(responsible) = details.responsible {
        form.responsible_person = responsible;
    }
    if let Some(email) = details.email {
        form.contact_email = email;
    }
    if let Some(phone) = details.phone {
        form.contact_phone = phone;
    }
    if !details.devices.is_empty() {
        form.devices = DeviceSelection::from_names(&details.devices);
    }
    if details.active {
        form.active = true;
    } else if details.inactive {
        form.active = false;
    }
}

fn report(notice: &pingwatch_core::Notice, global: &GlobalOpts) {
    if !global.quiet {
        eprintln!(
            "{}",
            output::format_notice(notice, output::should_color(&global.color))
        );
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    server: &ServerConfig,
    args: SitesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = SiteRegistryClient::new(server.base_url.clone(), &server.transport())?;
    let manager = SiteManager::new(client);

    match args.command {
        SitesCommand::List => {
            let listing = manager.list().await?;
            if let SiteListView::Empty(text) = listing.view() {
                if matches!(global.output, OutputFormat::Table) {
                    output::print_output(text, global.quiet);
                    return Ok(());
                }
            }
            let docs: Vec<SiteDoc<'_>> = listing
                .records()
                .iter()
                .map(|(id, record)| SiteDoc { site_id: id, record })
                .collect();
            let out = output::render_list(
                &global.output,
                &docs,
                |d| SiteRow::from(&SiteEntry::from_record(d.site_id, d.record)),
                |d| d.site_id.to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Get { site_id } => {
            let record = manager
                .client()
                .get_site(&site_id)
                .await
                .map_err(|e| not_found_as(&site_id, e))?;
            let doc = SiteDoc {
                site_id: &site_id,
                record: &record,
            };
            let out = output::render_single(
                &global.output,
                &doc,
                |d| detail(d.site_id, d.record),
                |d| d.site_id.to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Create {
            site_id,
            name,
            details,
        } => {
            let mut form = SiteForm::new_site();
            form.set_site_id(site_id)?;
            apply_details(&mut form, Some(name), details);
            let notice = manager.submit(&form).await?;
            report(&notice, global);
            Ok(())
        }

        SitesCommand::Update {
            site_id,
            name,
            details,
        } => {
            let mut form = manager.load_for_edit(&site_id).await?;
            apply_details(&mut form, name, details);
            let notice = manager.submit(&form).await?;
            report(&notice, global);
            Ok(())
        }

        SitesCommand::Delete { site_id } => {
            if !util::confirm(
                &delete_prompt(&site_id),
                &format!("delete site {site_id}"),
                global.yes,
            )? {
                return Ok(());
            }
            let notice = manager.delete(&site_id, true).await?;
            report(&notice, global);
            Ok(())
        }

        SitesCommand::Add {
            from_handoff,
            name,
            details,
        } => {
            let mut slot = HandoffSlot::load(&from_handoff);
            let handoff = slot.take().ok_or_else(|| CliError::Validation {
                field: "from-handoff".into(),
                reason: format!("'{from_handoff}' carries no add= site identifier"),
            })?;
            tracing::debug!(site_id = %handoff.site_id, location = slot.location(), "handoff consumed");

            let mut form = SiteForm::from_handoff(&handoff);
            let name = name.or_else(|| Some(handoff.site_id.clone()));
            apply_details(&mut form, name, details);
            let notice = manager.submit(&form).await?;
            report(&notice, global);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pingwatch_core::AddSiteHandoff;

    #[test]
    fn flags_only_touch_named_fields() {
        let handoff = AddSiteHandoff::new("S14", vec!["ESP".into()]);
        let mut form = SiteForm::from_handoff(&handoff);
        apply_details(
            &mut form,
            None,
            SiteDetailArgs {
                phone: Some("555-0199".into()),
                inactive: true,
                ..SiteDetailArgs::default()
            },
        );
        assert_eq!(form.site_id, "S14");
        assert_eq!(form.contact_phone, "555-0199");
        assert!(!form.active);
        assert!(form.devices.contains(DeviceKind::Esp));
        assert!(!form.devices.contains(DeviceKind::Gsm1));
    }

    #[test]
    fn device_flags_replace_selection() {
        let mut form = SiteForm::new_site();
        apply_details(
            &mut form,
            Some("Quarry".into()),
            SiteDetailArgs {
                devices: vec!["GSM-2".into()],
                ..SiteDetailArgs::default()
            },
        );
        assert_eq!(form.site_name, "Quarry");
        assert_eq!(form.devices.to_wire(), vec!["GSM-2".to_string()]);
    }

    #[test]
    fn summary_lists_disabled_devices() {
        let entry = SiteEntry {
            site_id: "S01".into(),
            site_name: "North".into(),
            active: true,
            location: String::new(),
            responsible_person: String::new(),
            contact_phone: String::new(),
            contact_email: None,
            enabled: vec!["GSM-1".into()],
            disabled: vec![DeviceKind::Gsm2, DeviceKind::Esp],
        };
        assert_eq!(device_summary(&entry), "GSM-1 (off: GSM-2, ESP)");
    }
}
