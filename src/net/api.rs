//! API gateway client for the auth routes.
//!
//! Bound once to `<base><prefix>` (e.g. `https://api.example.com/api`); every
//! request is decorated by [`CorsDecorator`] before it reaches the transport.
//!
//! ERROR HANDLING
//! ==============
//! 401/403 are reported separately from other statuses so the auth provider
//! can tell an expired session from a flaky server.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::cors::CorsDecorator;
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use super::types::{AuthenticateResponse, Credentials, SessionToken};

pub const AUTH_ROUTE: &str = "/auth";
pub const LOGOUT_ROUTE: &str = "/auth/logout";

/// Errors produced by API gateway calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No HTTP response was received.
    #[error("API request failed: {0}")]
    Network(String),

    /// The server rejected the caller's credentials or session.
    #[error("unauthorized: status {status}")]
    Unauthorized { status: u16 },

    /// Any other non-success HTTP status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("API response parse failed: {0}")]
    Malformed(String),
}

/// Typed client for the remote API.
pub struct ApiClient<T> {
    transport: T,
    api_root: String,
    cors: CorsDecorator,
}

impl<T: HttpTransport> ApiClient<T> {
    /// `api_root` is the resolved base URL plus path prefix.
    pub fn new(transport: T, api_root: impl Into<String>, page_origin: &str) -> Self {
        let api_root = api_root.into().trim_end_matches('/').to_owned();
        Self { transport, api_root, cors: CorsDecorator::new(page_origin) }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Absolute URL for `route` under the API root.
    pub fn url(&self, route: &str) -> String {
        format!("{}/{}", self.api_root, route.trim_start_matches('/'))
    }

    /// Sign in via `POST /auth`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` on bad credentials; see [`ApiError`] for the rest.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticateResponse, ApiError> {
        let resp: AuthenticateResponse = self.send_json(Method::Post, AUTH_ROUTE, Some(credentials), None).await?;
        if !resp.claims.is_identified() {
            return Err(ApiError::Malformed("login response has no user identity".to_owned()));
        }
        Ok(resp)
    }

    /// Identity check via `GET /auth` with `token` attached.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the session is absent or expired.
    pub async fn current_session(&self, token: &SessionToken) -> Result<AuthenticateResponse, ApiError> {
        let resp: AuthenticateResponse = self.send_json(Method::Get, AUTH_ROUTE, None::<&()>, Some(token)).await?;
        if !resp.claims.is_identified() {
            return Err(ApiError::Malformed("identity response has no user identity".to_owned()));
        }
        Ok(resp)
    }

    /// Invalidate the server-side session via `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Any non-success outcome; callers treat logout as best-effort.
    pub async fn logout(&self, token: Option<&SessionToken>) -> Result<(), ApiError> {
        let mut request = ApiRequest::new(Method::Post, self.url(LOGOUT_ROUTE));
        if let Some(token) = token {
            attach_token(&mut request, token);
        }
        self.send(request).await.map(|_| ())
    }

    /// Send a JSON request and decode a JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn send_json<B, R>(
        &self,
        method: Method,
        route: &str,
        body: Option<&B>,
        token: Option<&SessionToken>,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = ApiRequest::new(method, self.url(route));
        if let Some(body) = body {
            let raw = serde_json::to_string(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
            request.set_header("Content-Type", "application/json");
            request.body = Some(raw);
        }
        if let Some(token) = token {
            attach_token(&mut request, token);
        }
        let resp = self.send(request).await?;
        decode_body(&resp.body)
    }

    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.cors.decorate(&mut request);
        log::debug!("api: {:?} {}", request.method, request.url);
        let resp = self.transport.send(request).await.map_err(|e| ApiError::Network(e.to_string()))?;
        classify(resp)
    }
}

fn attach_token(request: &mut ApiRequest, token: &SessionToken) {
    let (name, value) = token.header();
    request.set_header(name, value);
}

fn classify(resp: ApiResponse) -> Result<ApiResponse, ApiError> {
    if resp.ok() {
        return Ok(resp);
    }
    match resp.status {
        401 | 403 => Err(ApiError::Unauthorized { status: resp.status }),
        status => Err(ApiError::Status { status, body: resp.body }),
    }
}

fn decode_body<R: DeserializeOwned>(body: &str) -> Result<R, ApiError> {
    // An empty 2xx body decodes as `null` so `()`/`Option` targets still work.
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))
}
