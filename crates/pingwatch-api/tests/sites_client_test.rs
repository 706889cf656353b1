#![allow(clippy::unwrap_used)]
// Integration tests for `SiteRegistryClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pingwatch_api::{Error, SiteRecord, SiteRegistryClient, SiteSubmission};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SiteRegistryClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = SiteRegistryClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn north_tower() -> SiteSubmission {
    SiteSubmission {
        site_id: "S07".into(),
        record: SiteRecord {
            site_name: "North Tower".into(),
            location: "Ridge road".into(),
            responsible_person: "Dana".into(),
            contact_email: Some("ops@example.net".into()),
            contact_phone: "555-0107".into(),
            active: true,
            active_devices: vec!["GSM-1".into(), "ESP".into()],
        },
    }
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sites_keeps_server_order() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sites": {
                "S10": { "site_name": "Harbor", "active": true, "active_devices": ["ESP"] },
                "S02": { "site_name": "Quarry", "active": false, "active_devices": [] }
            }
        })))
        .mount(&server)
        .await;

    let sites = client.list_sites().await.unwrap();
    let ids: Vec<&str> = sites.keys().map(String::as_str).collect();
    assert_eq!(ids, ["S10", "S02"]);
    assert_eq!(sites["S10"].site_name, "Harbor");
    assert!(!sites["S02"].active);
}

#[tokio::test]
async fn test_list_sites_empty_registry() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sites": {} })))
        .mount(&server)
        .await;

    assert!(client.list_sites().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_site() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/sites/S07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "site_name": "North Tower",
            "location": "Ridge road",
            "responsible_person": "Dana",
            "contact_phone": "555-0107",
            "active": true,
            "active_devices": ["GSM-1", "ESP"]
        })))
        .mount(&server)
        .await;

    let site = client.get_site("S07").await.unwrap();
    assert_eq!(site.site_name, "North Tower");
    assert_eq!(site.contact_email, None);
    assert_eq!(site.active_devices, vec!["GSM-1".to_string(), "ESP".to_string()]);
}

#[tokio::test]
async fn test_get_missing_site_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/sites/NOPE"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Site not found" })),
        )
        .mount(&server)
        .await;

    let err = client.get_site("NOPE").await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
    assert_eq!(err.to_string(), "API error (HTTP 404): Site not found");
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_site_posts_flat_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/sites"))
        .and(body_json(json!({
            "site_id": "S07",
            "site_name": "North Tower",
            "location": "Ridge road",
            "responsible_person": "Dana",
            "contact_email": "ops@example.net",
            "contact_phone": "555-0107",
            "active": true,
            "active_devices": ["GSM-1", "ESP"]
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "message": "Site added successfully" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.create_site(&north_tower()).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Site added successfully"));
}

#[tokio::test]
async fn test_create_duplicate_site_surfaces_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/sites"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Site ID already exists" })),
        )
        .mount(&server)
        .await;

    let result = client.create_site(&north_tower()).await;
    assert!(
        matches!(&result, Err(Error::Api { status: 400, message }) if message == "Site ID already exists"),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_update_site_puts_to_id_path() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/sites/S07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Site updated" })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.update_site(&north_tower()).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Site updated"));
}

#[tokio::test]
async fn test_delete_site_tolerates_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/sites/S07"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.delete_site("S07").await.unwrap();
    assert_eq!(ack.message, None);
}

#[tokio::test]
async fn test_error_without_body_uses_status() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/sites/S07"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.delete_site("S07").await.unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(&err, Error::Api { message, .. } if message == "HTTP 500"), "got {err:?}");
}
