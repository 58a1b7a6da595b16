use crate::client::{HttpClient, RequestConfig};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Admin login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub admin_pass: String,
}

/// Body returned by `POST /admin/auth`. The token sits next to the envelope
/// fields, not inside `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Admin session management.
pub struct AuthApi<'a> {
    client: &'a HttpClient,
}

impl<'a> AuthApi<'a> {
    pub const LOGIN_PATH: &'static str = "/admin/auth";

    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Log in and store the returned token, so later client-side requests
    /// carry it as a bearer credential.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let resp: LoginResponse = self
            .client
            .post(Self::LOGIN_PATH, Some(credentials), &RequestConfig::new())
            .await?
            .data;

        if let Some(err) = &resp.error {
            return Err(Error::runtime_with_context(
                err.clone(),
                ErrorContext::new().with_source("login"),
            ));
        }
        let token = resp.token.as_deref().ok_or_else(|| {
            Error::validation_with_context(
                "login response carried no token",
                ErrorContext::new().with_field_path("token"),
            )
        })?;
        self.client.set_token(token)?;
        info!(email = %credentials.email, "admin session started");
        Ok(resp)
    }

    /// Forget the stored token and every cached response.
    pub async fn logout(&self) -> Result<()> {
        self.client.logout()?;
        self.client.invalidate_cache(None).await?;
        Ok(())
    }
}
