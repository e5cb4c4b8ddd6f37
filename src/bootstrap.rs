//! Service wiring for the browser client.
//!
//! Builds the API client, credential store, and auth provider from
//! [`ClientConfig`] and hands them back as one owned value. Nothing here is
//! global; the app keeps the returned services and passes them down.

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod bootstrap_test;

use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::transport::HttpTransport;
use crate::state::provider::AuthStateProvider;
use crate::util::credential_store::CredentialStore;
use crate::util::storage::KeyValueStore;

/// Wired client services.
pub struct ClientServices<K, T> {
    pub config: ClientConfig,
    pub auth: AuthStateProvider<K, T>,
}

impl<K, T> ClientServices<K, T>
where
    K: KeyValueStore + 'static,
    T: HttpTransport + 'static,
{
    /// Wire services against explicit storage and transport backends.
    ///
    /// `page_origin` is the origin serving the app; it is the API base when
    /// `ApiBaseUrl` is unset and the reference for cross-origin decisions.
    pub fn new(config: ClientConfig, page_origin: &str, storage: K, transport: T) -> Self {
        let api_root = config.resolve_api_root(page_origin);
        log::info!("bootstrap: API root {api_root}");
        let api = ApiClient::new(transport, api_root, page_origin);
        let store = CredentialStore::new(storage, config.storage_key.clone());
        Self { auth: AuthStateProvider::new(store, api), config }
    }
}

#[cfg(feature = "hydrate")]
pub type BrowserServices =
    ClientServices<crate::util::storage::BrowserStorage, crate::net::transport::GlooTransport>;

#[cfg(feature = "hydrate")]
impl BrowserServices {
    /// Wire services for the running page: `localStorage`, fetch, and the
    /// page's own origin.
    pub fn browser(config: ClientConfig) -> Self {
        let origin = page_origin().unwrap_or_default();
        Self::new(config, &origin, crate::util::storage::BrowserStorage, crate::net::transport::GlooTransport)
    }
}

/// Origin of the current page (`window.location.origin`).
#[cfg(feature = "hydrate")]
pub fn page_origin() -> Option<String> {
    web_sys::window().and_then(|w| w.location().origin().ok())
}

/// Route panics and `log` output to the browser console.
///
/// Safe to call more than once; later calls keep the first logger.
pub fn init_logging(level: log::Level) {
    #[cfg(feature = "hydrate")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(level);
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = level;
    }
}
