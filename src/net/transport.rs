//! HTTP transport seam.
//!
//! Client-side (hydrate): `GlooTransport` issues real fetch calls via
//! `gloo-net`. Everywhere else the caller supplies an implementation; tests
//! use a scripted one.
//!
//! ERROR HANDLING
//! ==============
//! A transport only fails for transport reasons (offline, DNS, CORS, timeout).
//! Non-2xx responses are returned as `Ok` and classified by `api`.

/// HTTP method used by the auth API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Fetch `credentials` option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CredentialsMode {
    Omit,
    #[default]
    SameOrigin,
    Include,
}

/// Fetch `mode` option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestMode {
    #[default]
    SameOrigin,
    Cors,
}

/// Outgoing request as seen by the decorator and transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub credentials: CredentialsMode,
    pub mode: RequestMode,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            credentials: CredentialsMode::default(),
            mode: RequestMode::default(),
        }
    }

    /// Set `name` to `value`, replacing any existing header of that name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response: status plus body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure (no HTTP response was received).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends one request and returns the raw response.
///
/// Futures are `!Send`: the client runs on the browser's single event loop.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response could be obtained.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// `fetch`-backed transport for the browser build.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

#[cfg(feature = "hydrate")]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        use gloo_net::http::Request;

        let builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
        };
        let builder = request.headers.iter().fold(builder, |b, (name, value)| b.header(name, value));
        let builder = builder
            .credentials(match request.credentials {
                CredentialsMode::Omit => web_sys::RequestCredentials::Omit,
                CredentialsMode::SameOrigin => web_sys::RequestCredentials::SameOrigin,
                CredentialsMode::Include => web_sys::RequestCredentials::Include,
            })
            .mode(match request.mode {
                RequestMode::SameOrigin => web_sys::RequestMode::SameOrigin,
                RequestMode::Cors => web_sys::RequestMode::Cors,
            });
        let prepared = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError(e.to_string()))?;

        let resp = prepared.send().await.map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| TransportError(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}
