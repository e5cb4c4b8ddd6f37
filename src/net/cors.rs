//! Cross-origin request decoration.
//!
//! SYSTEM CONTEXT
//! ==============
//! The API may live on a different origin than the page (`ApiBaseUrl`). The
//! browser only sends session cookies cross-origin when the fetch asks for
//! `credentials: include` in `cors` mode, so every request is routed through
//! here before it reaches the transport.

#[cfg(test)]
#[path = "cors_test.rs"]
mod cors_test;

use url::{Origin, Url};

use super::transport::{ApiRequest, CredentialsMode, RequestMode};

/// Stateless request decorator bound to the page origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsDecorator {
    /// `None` when the page origin could not be parsed; every absolute URL is
    /// then treated as cross-origin.
    page_origin: Option<Origin>,
}

impl CorsDecorator {
    pub fn new(page_origin: &str) -> Self {
        Self { page_origin: Url::parse(page_origin).ok().map(|url| url.origin()) }
    }

    /// Apply the credentials policy to `request`. Never fails.
    pub fn decorate(&self, request: &mut ApiRequest) {
        if request.header("Accept").is_none() {
            request.set_header("Accept", "application/json");
        }
        if self.is_cross_origin(&request.url) {
            request.mode = RequestMode::Cors;
            request.credentials = CredentialsMode::Include;
        } else {
            request.credentials = CredentialsMode::SameOrigin;
        }
    }

    /// Origins are compared the way the browser does after URL parsing, so
    /// default ports, case, percent-encoded hosts, and backslashes all
    /// normalize away. Relative URLs are same-origin.
    pub fn is_cross_origin(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(url) => self.page_origin.as_ref() != Some(&url.origin()),
            Err(_) => false,
        }
    }
}
