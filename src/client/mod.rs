//! The public client: composes the session, the page parsers and the caches.
//!
//! Operations are grouped by area in the submodules. Each one is a sequence
//! of awaited requests followed by synchronous parsing; caches and dropdown
//! options sit behind `std::sync::Mutex` and are never locked across an
//! `.await`.

mod account;
mod catalog;
mod orders;
mod search;
mod tools;
mod vehicle;

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

pub use vehicle::Vehicle;

use crate::cache::{CacheStats, CatalogCache, ClearedCounts};
use crate::config::{CacheConfig, CacheUpdate, ClientConfig};
use crate::error::Result;
use crate::models::{PartWithPricing, ToolWithPricing};
use crate::session::{AuthenticationStatus, ReqwestTransport, Session, Transport, lock};

pub struct RockAutoClient<T: Transport = ReqwestTransport> {
    session: Session<T>,
    config: Mutex<ClientConfig>,
    cache: Mutex<CatalogCache>,
}

impl RockAutoClient {
    /// Client over a pooled `reqwest` transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> RockAutoClient<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        info!(
            "Creating client ({:?} profile, cache {})",
            config.profile,
            if config.cache.enabled { "on" } else { "off" }
        );
        Self {
            session: Session::new(transport, config.profile),
            cache: Mutex::new(CatalogCache::new(&config.cache)),
            config: Mutex::new(config),
        }
    }

    /// Current configuration, including cache changes made since construction.
    pub fn config(&self) -> ClientConfig {
        lock(&self.config).clone()
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Closes the transport. Consuming `self` makes this happen exactly once.
    pub async fn close(self) {
        debug!("Closing client");
        self.session.close().await;
    }

    pub async fn login(&self, identity: &str, secret: &str, keep_alive: bool) -> Result<bool> {
        self.session.login(identity, secret, keep_alive).await
    }

    pub async fn logout(&self) -> Result<bool> {
        self.session.logout().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn authentication_status(&self) -> AuthenticationStatus {
        self.session.authentication_status()
    }

    fn cache(&self) -> MutexGuard<'_, CatalogCache> {
        lock(&self.cache)
    }

    fn cache_enabled(&self) -> bool {
        lock(&self.config).cache.enabled
    }

    fn navigation_priming(&self) -> bool {
        lock(&self.config).navigation_priming
    }

    /// GETs `url` the way a browser would before an in-page AJAX call.
    ///
    /// The outcome is only reported: a failed priming never fails the
    /// operation that asked for it. On success the page becomes the referer
    /// of later AJAX calls.
    async fn prime_navigation(&self, url: &str) -> bool {
        if !self.navigation_priming() {
            return false;
        }
        match self.session.get(url).await {
            Ok(_) => {
                self.session.set_navigation_context(url);
                true
            }
            Err(e) => {
                warn!("Navigation priming of {} failed: {}", url, e);
                false
            }
        }
    }

    /// Entry counts, capacity use and the active cache settings.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    /// Cached static data for `part_number` with its price history, if any.
    pub fn part_with_pricing(&self, part_number: &str) -> Option<PartWithPricing> {
        self.cache().part_with_pricing(part_number)
    }

    pub fn tool_with_pricing(&self, part_number: &str) -> Option<ToolWithPricing> {
        self.cache().tool_with_pricing(part_number)
    }

    pub fn clear_all_caches(&self) -> ClearedCounts {
        let cleared = self.cache().clear_all();
        info!(
            "Cleared {} cache entries ({} dropdown lists)",
            cleared.total(),
            cleared.dropdowns
        );
        cleared
    }

    pub fn clear_expired_caches(&self) -> ClearedCounts {
        let cleared = self.cache().clear_expired();
        debug!("Cleared {} expired cache entries", cleared.total());
        cleared
    }

    /// Applies `update` to the cache configuration.
    ///
    /// The update is rejected as a whole when the result fails
    /// [`CacheConfig::validate`]. Live entries are kept, except that a lowered
    /// capacity evicts immediately and disabling the cache empties it.
    pub fn configure_cache(&self, update: &CacheUpdate) -> Result<CacheConfig> {
        let cache_config = {
            let mut config = lock(&self.config);
            let mut candidate = config.cache.clone();
            update.apply(&mut candidate);
            candidate.validate()?;
            config.cache = candidate.clone();
            candidate
        };
        self.cache().reconfigure(&cache_config);
        info!("Cache reconfigured: {:?}", cache_config);
        Ok(cache_config)
    }

    pub fn clear_search_option_cache(&self) {
        let cleared = self.cache().clear_dropdowns();
        debug!("Cleared {} search dropdown lists", cleared);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::session::HttpResponse;

    /// Serves pages by URL substring and counts requests.
    #[derive(Default)]
    pub(crate) struct PageTransport {
        pages: Vec<(String, String)>,
        pub(crate) requests: StdMutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl PageTransport {
        pub(crate) fn with(mut self, url_part: &str, body: &str) -> Self {
            self.pages.push((url_part.to_string(), body.to_string()));
            self
        }

        fn reply(&self, url: &str, form: &[(String, String)]) -> HttpResponse {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), form.to_vec()));
            // AJAX calls are keyed by func, pages by URL
            let key = form
                .iter()
                .find(|(k, _)| k == "func")
                .map_or(url, |(_, v)| v.as_str());
            self.pages
                .iter()
                .find(|(part, _)| key.contains(part.as_str()))
                .map_or_else(
                    || HttpResponse {
                        status: 404,
                        headers: Vec::new(),
                        body: String::new(),
                    },
                    |(_, body)| HttpResponse::ok(body.clone()),
                )
        }

        pub(crate) fn count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub(crate) fn form_of(&self, url_part: &str) -> Vec<(String, String)> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(url, form)| url.contains(url_part) && !form.is_empty())
                .map(|(_, form)| form.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Transport for PageTransport {
        async fn get(&self, url: &str, _headers: &[(String, String)]) -> Result<HttpResponse> {
            Ok(self.reply(url, &[]))
        }

        async fn post(
            &self,
            url: &str,
            form: &[(String, String)],
            _headers: &[(String, String)],
        ) -> Result<HttpResponse> {
            Ok(self.reply(url, form))
        }
    }

    pub(crate) fn field<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub(crate) fn client(transport: PageTransport) -> RockAutoClient<PageTransport> {
        RockAutoClient::with_transport(transport, ClientConfig::default())
    }

    #[test]
    fn configure_cache_updates_reported_config() {
        let client = client(PageTransport::default());
        let applied = client
            .configure_cache(&CacheUpdate {
                max_results: Some(3),
                pricing_ttl_minutes: Some(5),
                ..CacheUpdate::default()
            })
            .unwrap();
        assert_eq!(applied.max_results, 3);
        assert_eq!(client.config().cache.pricing_ttl_minutes, 5);
        assert_eq!(client.config().cache.max_parts, 1000);
        assert_eq!(client.cache_stats().settings, applied);
    }

    #[test]
    fn invalid_cache_update_changes_nothing() {
        let client = client(PageTransport::default());
        let err = client
            .configure_cache(&CacheUpdate {
                max_results: Some(3),
                part_ttl_hours: Some(i64::MAX),
                ..CacheUpdate::default()
            })
            .unwrap_err();

        assert!(matches!(err, crate::error::ClientError::Validation(_)));
        assert_eq!(client.config().cache, CacheConfig::default());
        assert_eq!(client.cache_stats().settings.max_results, 100);
    }

    #[tokio::test]
    async fn failed_priming_is_swallowed() {
        let client = client(PageTransport::default());
        assert!(!client.prime_navigation("https://www.rockauto.com/en/catalog/honda").await);
        assert_eq!(client.session().navigation_context(), None);
    }

    #[tokio::test]
    async fn successful_priming_sets_referer_context() {
        let transport = PageTransport::default().with("/en/catalog/honda", "<html></html>");
        let client = client(transport);
        assert!(client.prime_navigation("https://www.rockauto.com/en/catalog/honda").await);
        assert_eq!(
            client.session().navigation_context().as_deref(),
            Some("https://www.rockauto.com/en/catalog/honda")
        );
    }
}
