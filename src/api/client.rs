use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, AppResult};

use super::envelope::Envelope;

/// Bearer-token JSON client for the portal REST API.
///
/// Non-2xx answers become `AppError`s classified by status (401 → auth failure),
/// carrying the backend's envelope message when one was sent. A 2xx answer with
/// `success: false` is returned as-is for the caller to report.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: &str, timeout: Duration) -> AppResult<Self> {
        let base = Url::parse(base.trim_end_matches('/'))
            .map_err(|e| AppError::user("invalid_base_url".to_string(), format!("invalid API base URL '{}': {}", base, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal("http_client".to_string(), e.to_string()))?;
        Ok(Self { base, client })
    }

    /// Append `path` to the base, keeping any path prefix the base carries (`/api`).
    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        let joined = format!("{}/{}", self.base.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| AppError::internal("bad_endpoint".to_string(), format!("{}: {}", joined, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, bearer: Option<&str>) -> AppResult<Envelope<T>> {
        self.send::<(), T>(Method::GET, path, None, bearer).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B, bearer: Option<&str>) -> AppResult<Envelope<T>> {
        self.send(Method::POST, path, Some(body), bearer).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> AppResult<Envelope<T>> {
        let url = self.endpoint(path)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = bearer {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AppError::auth("bad_token".to_string(), "stored token is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        debug!(target: "campusgate::api", "{} {}", method, url);
        let mut req = self.client.request(method.clone(), url.clone()).headers(headers);
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await.map_err(|e| {
            AppError::transport("transport".to_string(), format!("{} {} failed: {}", method, url.path(), e))
        })?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| AppError::transport("transport".to_string(), format!("reading response body failed: {}", e)))?;
        debug!(target: "campusgate::api", "{} {} -> {}", method, url.path(), status.as_u16());

        if !status.is_success() {
            return Err(AppError::from_status(status.as_u16(), error_message(status, &text)));
        }
        serde_json::from_str::<Envelope<T>>(&text).map_err(|e| {
            AppError::remote("bad_envelope".to_string(), format!("unexpected response from {}: {}", url.path(), e))
        })
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status))
}
