//! Shared JSON-over-HTTP plumbing for the service clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::services::ServiceError;

/// Builds the HTTP client shared by every service.
pub fn build_client(timeout: Duration) -> Result<Client, ServiceError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// One remote service reachable under a base URL.
#[derive(Debug, Clone)]
pub struct HttpService {
    name: &'static str,
    base_url: String,
    http: Client,
}

/// Error bodies sent by the services: FastAPI's `detail`, or a `message`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

impl HttpService {
    #[must_use]
    pub fn new(name: &'static str, base_url: &str, http: Client) -> Self {
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        self.send(self.http.get(self.url(path)).query(query)).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = request.send().await?;

        debug!(service = self.name, status = %response.status(), url = %response.url(), "response received");

        self.read(response).await
    }

    async fn read<T: DeserializeOwned>(&self, response: Response) -> Result<T, ServiceError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                service: self.name,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|error| ServiceError::malformed(self.name, error.to_string()))
    }
}

/// Pulls a human-readable message out of an error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;

    match (parsed.message, parsed.detail) {
        (Some(message), _) => Some(message),
        (None, Some(serde_json::Value::String(detail))) => Some(detail),
        (None, Some(detail)) => Some(detail.to_string()),
        (None, None) => None,
    }
}
