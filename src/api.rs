//! REST client for the blood bank API
//!
//! Single-shot request/response: no retries, no timeout, no backoff. Every
//! failure is logged and pushed to the notifier before it is returned, so
//! callers only need to stop their own processing.

use crate::constants::API_ERROR_FALLBACK;
use crate::notifications::Notifier;
use crate::types::*;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    notifier: Notifier,
}

impl ApiClient {
    pub fn new(base_url: &str, notifier: Notifier) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            notifier,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Log and notify, then hand the error back for `?` propagation
    fn surface(&self, endpoint: &str, err: ApiError) -> ApiError {
        error!(endpoint, error = %err, "API error");
        self.notifier.error(err.to_string());
        err
    }

    /// Issue one request and return the decoded JSON body
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        debug!(%method, endpoint, "API request");

        let mut request = self
            .client
            .request(method, self.url(endpoint))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return Err(self.surface(endpoint, ApiError::Transport(e.to_string()))),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => return Err(self.surface(endpoint, ApiError::Transport(e.to_string()))),
        };
        let parsed = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| API_ERROR_FALLBACK.to_string());
            return Err(self.surface(
                endpoint,
                ApiError::Status {
                    status: status.as_u16(),
                    message,
                },
            ));
        }

        parsed.map_err(|e| self.surface(endpoint, ApiError::Decode(e.to_string())))
    }

    fn decode<T: DeserializeOwned>(&self, endpoint: &str, value: Value) -> Result<T, ApiError> {
        serde_json::from_value(value).map_err(|e| self.surface(endpoint, ApiError::Decode(e.to_string())))
    }

    async fn list_of<T: DeserializeOwned>(&self, kind: EntityKind) -> Result<Vec<T>, ApiError> {
        let endpoint = kind.endpoint();
        let mut body = self.call(endpoint, Method::GET, None).await?;
        let Some(records) = body.get_mut(kind.collection_key()).map(Value::take) else {
            return Err(self.surface(
                endpoint,
                ApiError::Decode(format!("missing `{}`", kind.collection_key())),
            ));
        };
        self.decode(endpoint, records)
    }

    /// Fetch a whole collection
    pub async fn list(&self, kind: EntityKind) -> Result<Collection, ApiError> {
        let collection = match kind {
            EntityKind::Donors => Collection::Donors(self.list_of(kind).await?),
            EntityKind::Patients => Collection::Patients(self.list_of(kind).await?),
            EntityKind::Inventory => Collection::Inventory(self.list_of(kind).await?),
            EntityKind::Requests => Collection::Requests(self.list_of(kind).await?),
            EntityKind::Donations => Collection::Donations(self.list_of(kind).await?),
        };
        debug!(?kind, count = collection.len(), "Collection fetched");
        Ok(collection)
    }

    pub async fn create(&self, kind: EntityKind, fields: Map<String, Value>) -> Result<Value, ApiError> {
        self.call(kind.endpoint(), Method::POST, Some(&Value::Object(fields)))
            .await
    }

    pub async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        fields: Map<String, Value>,
    ) -> Result<Value, ApiError> {
        self.call(&kind.item_endpoint(id), Method::PUT, Some(&Value::Object(fields)))
            .await
    }

    pub async fn delete(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError> {
        self.call(&kind.item_endpoint(id), Method::DELETE, None).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let endpoint = "/dashboard-stats";
        let body = self.call(endpoint, Method::GET, None).await?;
        self.decode(endpoint, body)
    }
}


#[cfg(test)]
mod tests {
    use super::test_server::serve_once;
    use super::*;
    use crate::notifications::NotificationKind;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delete_404_surfaces_server_message() {
        let (base, seen) = serve_once(404, r#"{"error":"not found"}"#);
        let notifier = Notifier::new();
        let client = ApiClient::new(&base, notifier.clone());

        let err = client.delete(EntityKind::Donors, 9).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 404,
                message: "not found".into()
            }
        );
        assert_eq!(err.to_string(), "not found");

        let toasts = notifier.active(Instant::now());
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, NotificationKind::Error);
        assert_eq!(toasts[0].message, "not found");

        assert_eq!(seen.recv().unwrap().request_line, "DELETE /api/donors/9 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_error_without_message_uses_fallback() {
        let (base, _seen) = serve_once(500, "oops");
        let notifier = Notifier::new();
        let client = ApiClient::new(&base, notifier.clone());

        let err = client.call("/dashboard-stats", Method::GET, None).await.unwrap_err();
        assert_eq!(err.to_string(), API_ERROR_FALLBACK);
        assert_eq!(notifier.active(Instant::now())[0].message, API_ERROR_FALLBACK);
    }

    #[tokio::test]
    async fn test_list_unwraps_envelope() {
        let (base, _seen) = serve_once(
            200,
            r#"{"donation_records":[{"id":1,"donor_id":4,"donor_name":"Bo","blood_group":"O-",
                "date_of_donation":"2024-02-01","units_donated":1}]}"#,
        );
        let client = ApiClient::new(&base, Notifier::new());

        match client.list(EntityKind::Donations).await.unwrap() {
            Collection::Donations(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].donor_name, "Bo");
            }
            other => panic!("unexpected collection {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_list_without_envelope_key_is_decode_error() {
        let (base, _seen) = serve_once(200, r#"{"items":[{"id":1}]}"#);
        let notifier = Notifier::new();
        let client = ApiClient::new(&base, notifier.clone());

        let err = client.list(EntityKind::Donors).await.unwrap_err();
        assert_eq!(err, ApiError::Decode("missing `donors`".into()));

        let toasts = notifier.active(Instant::now());
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_create_posts_json_body() {
        let (base, seen) = serve_once(201, r#"{"message":"Patient created successfully"}"#);
        let client = ApiClient::new(&format!("{}/", base), Notifier::new());

        let mut fields = Map::new();
        fields.insert("name".into(), Value::from("Cara"));
        fields.insert("units_needed".into(), Value::from(2));
        client.create(EntityKind::Patients, fields).await.unwrap();

        let seen = seen.recv().unwrap();
        assert_eq!(seen.request_line, "POST /api/patients HTTP/1.1");
        let sent: Value = serde_json::from_str(&seen.body).unwrap();
        assert_eq!(sent["name"], "Cara");
        assert_eq!(sent["units_needed"], 2);
    }

    #[tokio::test]
    async fn test_transport_failure_is_notified() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let notifier = Notifier::new();
        let client = ApiClient::new(&format!("http://127.0.0.1:{}/api", port), notifier.clone());

        let err = client.list(EntityKind::Donors).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(notifier.active(Instant::now()).len(), 1);
    }
}
