// Site registry REST client
//
// `/api/sites` CRUD. Successful mutations answer `{"message": "..."}`,
// rejections answer a non-2xx status with `{"error": "..."}`.

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ActionAck, ApiErrorBody, SiteList, SiteRecord, SiteSubmission};
use crate::transport::TransportConfig;

/// HTTP client for the monitoring server's site registry.
pub struct SiteRegistryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SiteRegistryClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn sites_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join("api/sites")?)
    }

    fn site_url(&self, site_id: &str) -> Result<Url, Error> {
        let mut url = self.sites_url()?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(site_id);
        Ok(url)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /api/sites`, in server order.
    pub async fn list_sites(&self) -> Result<IndexMap<String, SiteRecord>, Error> {
        let url = self.sites_url()?;
        debug!("listing sites");
        let list: SiteList = send(self.http.get(url)).await?;
        Ok(list.sites)
    }

    /// `GET /api/sites/{id}`
    pub async fn get_site(&self, site_id: &str) -> Result<SiteRecord, Error> {
        let url = self.site_url(site_id)?;
        debug!(site_id, "fetching site");
        send(self.http.get(url)).await
    }

    /// `POST /api/sites`
    pub async fn create_site(&self, submission: &SiteSubmission) -> Result<ActionAck, Error> {
        let url = self.sites_url()?;
        debug!(site_id = %submission.site_id, "creating site");
        send_json(self.http.post(url), submission).await
    }

    /// `PUT /api/sites/{id}`. The body repeats the id.
    pub async fn update_site(&self, submission: &SiteSubmission) -> Result<ActionAck, Error> {
        let url = self.site_url(&submission.site_id)?;
        debug!(site_id = %submission.site_id, "updating site");
        send_json(self.http.put(url), submission).await
    }

    /// `DELETE /api/sites/{id}`
    pub async fn delete_site(&self, site_id: &str) -> Result<ActionAck, Error> {
        let url = self.site_url(site_id)?;
        debug!(site_id, "deleting site");
        send(self.http.delete(url)).await
    }
}

// ── Request helpers ──────────────────────────────────────────────────

async fn send_json<T: DeserializeOwned>(
    builder: reqwest::RequestBuilder,
    body: &(impl Serialize + Sync),
) -> Result<T, Error> {
    send(builder.json(body)).await
}

async fn send<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> Result<T, Error> {
    let resp = builder.send().await.map_err(Error::Transport)?;
    parse_response(resp).await
}

/// Map non-2xx to [`Error::Api`], otherwise decode the body.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    // Some mutations answer with an empty body.
    let text = if body.trim().is_empty() { "{}" } else { body.as_str() };

    serde_json::from_str(text).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}
