use std::future::Future;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::api::{ApiClient, Envelope, TokenData};
use crate::error::{AppError, AppResult};

use super::profile::Profile;
use super::role::Role;
use super::session::SessionToken;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    #[serde(skip)]
    pub role: Role,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub role: Role,
    pub token: SessionToken,
    pub message: String,
}

/// Backend operations the portal needs around a session. Every call is a single
/// request/response; nothing here retries.
pub trait AuthProvider: Send + Sync {
    fn login(&self, req: &LoginRequest) -> impl Future<Output = AppResult<LoginResponse>> + Send;

    /// Self-lookup for the signed-in role. `Ok(envelope)` with `success: false`
    /// is a soft failure; `Err` with an auth code means the token was rejected.
    fn my_details(&self, role: Role, token: &str) -> impl Future<Output = AppResult<Envelope<Profile>>> + Send;

    fn forget_password(&self, role: Role, email: &str) -> impl Future<Output = AppResult<Envelope<serde_json::Value>>> + Send;

    fn update_password(&self, role: Role, reset_id: &str, password: &str) -> impl Future<Output = AppResult<Envelope<serde_json::Value>>> + Send;
}

/// `AuthProvider` over the portal REST API.
#[derive(Clone, Debug)]
pub struct HttpAuthProvider {
    api: ApiClient,
}

impl HttpAuthProvider {
    pub fn new(api: ApiClient) -> Self { Self { api } }
}

impl AuthProvider for HttpAuthProvider {
    async fn login(&self, req: &LoginRequest) -> AppResult<LoginResponse> {
        let path = format!("/{}/login", req.role.slug());
        let env: Envelope<TokenData> = self.api.post(&path, req, None).await?;
        if !env.success {
            return Err(AppError::auth("login_failed".to_string(), env.message_or("Login failed")));
        }
        let token = env
            .data
            .as_ref()
            .map(|d| d.token.clone())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::remote("missing_token".to_string(), "login response carried no token".to_string()))?;
        info!(target: "campusgate::api", "auth.login role={} email={}", req.role, req.email);
        Ok(LoginResponse { role: req.role, token, message: env.message })
    }

    async fn my_details(&self, role: Role, token: &str) -> AppResult<Envelope<Profile>> {
        self.api.get(&format!("/{}/my-details", role.slug()), Some(token)).await
    }

    async fn forget_password(&self, role: Role, email: &str) -> AppResult<Envelope<serde_json::Value>> {
        self.api.post(&format!("/{}/forget-password", role.slug()), &json!({ "email": email }), None).await
    }

    async fn update_password(&self, role: Role, reset_id: &str, password: &str) -> AppResult<Envelope<serde_json::Value>> {
        let path = format!("/{}/update-password/{}", role.slug(), urlencoding::encode(reset_id));
        self.api.post(&path, &json!({ "password": password, "resetId": reset_id }), None).await
    }
}
