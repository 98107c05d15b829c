//! Credential transport: the remote auth endpoints.
//!
//! Stateless. The session core owns every piece of state; the transport only
//! performs exchanges and reports what the server said.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::types::{
    ApiResponse, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    RefreshRequest, ResetPasswordRequest, TokenRefresh,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Non-2xx response. `message` is the server's, or an operation fallback.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Parse(String),
}

impl TransportError {
    /// Text to surface to the user, verbatim.
    pub fn message(&self) -> String {
        match self {
            TransportError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait CredentialTransport: Send + Sync {
    /// Exchange a username (or email) and password for a session.
    async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<ApiResponse<AuthResponse>, TransportError>;

    /// Exchange a refresh token for a fresh token pair.
    async fn refresh(&self, refresh_token: &str)
    -> Result<ApiResponse<TokenRefresh>, TransportError>;

    /// Best-effort server-side logout.
    async fn logout(&self, access_token: Option<&str>) -> Result<ApiResponse<Value>, TransportError>;

    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<ApiResponse<Value>, TransportError>;

    async fn forgot_password(&self, email: &str) -> Result<ApiResponse<Value>, TransportError>;

    async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<ApiResponse<Value>, TransportError>;
}

/// `CredentialTransport` over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    api_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            api_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn post<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
        fallback: &str,
    ) -> Result<ApiResponse<T>, TransportError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.api_url, path);
        let mut req = self.client.post(&url);

        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<Value>>(&text)
                .ok()
                .map(|envelope| envelope.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| fallback.to_string());

            tracing::debug!(%url, status = status.as_u16(), %message, "auth API rejected request");
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| TransportError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CredentialTransport for HttpTransport {
    async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<ApiResponse<AuthResponse>, TransportError> {
        let body = LoginRequest {
            username: identifier.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", Some(&body), None, "Login failed").await
    }

    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<ApiResponse<TokenRefresh>, TransportError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.post("/auth/refresh-token", Some(&body), None, "Token refresh failed")
            .await
    }

    async fn logout(&self, access_token: Option<&str>) -> Result<ApiResponse<Value>, TransportError> {
        self.post::<(), _>("/auth/logout", None, access_token, "Logout failed")
            .await
    }

    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<ApiResponse<Value>, TransportError> {
        let body = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.post(
            "/auth/change-password",
            Some(&body),
            Some(access_token),
            "Password change failed",
        )
        .await
    }

    async fn forgot_password(&self, email: &str) -> Result<ApiResponse<Value>, TransportError> {
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.post(
            "/auth/forgot-password",
            Some(&body),
            None,
            "Failed to send reset email",
        )
        .await
    }

    async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<ApiResponse<Value>, TransportError> {
        let body = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        self.post("/auth/reset-password", Some(&body), None, "Password reset failed")
            .await
    }
}
