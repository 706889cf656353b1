//! Site configuration workflows over the registry client.
//!
//! Each operation returns either the data the caller asked for or a
//! [`Notice`] describing the outcome. Failures leave the caller's form
//! untouched so it can be resubmitted.

use pingwatch_api::{ActionAck, SiteRegistryClient};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::notice::Notice;
use crate::site_form::SiteForm;
use crate::site_list::SiteListing;

pub struct SiteManager {
    client: SiteRegistryClient,
}

impl SiteManager {
    pub fn new(client: SiteRegistryClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SiteRegistryClient {
        &self.client
    }

    pub async fn list(&self) -> Result<SiteListing, CoreError> {
        let sites = self.client.list_sites().await?;
        Ok(SiteListing::new(sites))
    }

    /// Fetch a record and open it in an edit form.
    pub async fn load_for_edit(&self, site_id: &str) -> Result<SiteForm, CoreError> {
        let record = self
            .client
            .get_site(site_id)
            .await
            .map_err(|e| not_found_as(site_id, e))?;
        Ok(SiteForm::edit(site_id, &record))
    }

    /// Create or update depending on the form's mode.
    pub async fn submit(&self, form: &SiteForm) -> Result<Notice, CoreError> {
        let submission = form.to_submission()?;
        let ack = if form.is_edit() {
            self.client
                .update_site(&submission)
                .await
                .map_err(|e| not_found_as(&submission.site_id, e))?
        } else {
            self.client.create_site(&submission).await?
        };
        info!(site_id = %submission.site_id, edit = form.is_edit(), "site saved");
        Ok(success_notice(ack, "Site saved successfully"))
    }

    /// Delete a site. Refuses unless the caller obtained confirmation.
    pub async fn delete(&self, site_id: &str, confirmed: bool) -> Result<Notice, CoreError> {
        if !confirmed {
            return Err(CoreError::ConfirmationRequired {
                action: format!("delete site {site_id}"),
            });
        }
        let ack = self
            .client
            .delete_site(site_id)
            .await
            .map_err(|e| not_found_as(site_id, e))?;
        info!(site_id, "site deleted");
        Ok(success_notice(ack, "Site deleted successfully"))
    }
}

/// The confirmation prompt shown before a delete.
pub fn delete_prompt(site_id: &str) -> String {
    format!("Are you sure you want to delete site {site_id}?")
}

/// Notice for a failed registry operation.
///
/// Server rejections show the server's own words; anything else is
/// prefixed with what was being attempted.
pub fn failure_notice(action: SiteAction, err: &CoreError) -> Notice {
    warn!(error = %err, ?action, "site registry operation failed");
    match err {
        CoreError::Rejected { message } if !message.is_empty() => Notice::error(message.clone()),
        CoreError::SiteNotFound {
            server_message: Some(message),
            ..
        } => Notice::error(message.clone()),
        CoreError::Rejected { .. } => Notice::error(action.fallback()),
        other => Notice::error(format!("{}: {other}", action.prefix())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteAction {
    Load,
    LoadOne,
    Save,
    Delete,
}

impl SiteAction {
    fn prefix(self) -> &'static str {
        match self {
            Self::Load => "Error loading sites",
            Self::LoadOne => "Error loading site",
            Self::Save => "Error saving site",
            Self::Delete => "Error deleting site",
        }
    }

    fn fallback(self) -> &'static str {
        match self {
            Self::Load => "Error loading sites",
            Self::LoadOne => "Error loading site details",
            Self::Save => "Failed to save site",
            Self::Delete => "Failed to delete site",
        }
    }
}

fn success_notice(ack: ActionAck, default: &str) -> Notice {
    Notice::success(
        ack.message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default.to_owned()),
    )
}

/// A 404 becomes [`CoreError::SiteNotFound`], keeping the server's wording
/// unless it only sent the bare status line.
pub fn not_found_as(site_id: &str, err: pingwatch_api::Error) -> CoreError {
    if !err.is_not_found() {
        return err.into();
    }
    let server_message = match err {
        pingwatch_api::Error::Api { status, message }
            if !message.is_empty() && message != format!("HTTP {status}") =>
        {
            Some(message)
        }
        _ => None,
    };
    CoreError::SiteNotFound {
        site_id: site_id.to_owned(),
        server_message,
    }
}
