//! Client configuration and the fixed site endpoints.
//!
//! Everything is constructor-level: build a [`ClientConfig`] in code, or read
//! overrides from the environment with [`ClientConfig::from_env`].

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ClientError;

pub const BASE_URL: &str = "https://www.rockauto.com";
pub const CATALOG_BASE: &str = "https://www.rockauto.com/en/catalog";
pub const API_ENDPOINT: &str = "https://www.rockauto.com/catalog/catalogapi.php";
pub const PARTSEARCH_URL: &str = "https://www.rockauto.com/en/partsearch/";
pub const TOOLS_BASE: &str = "https://www.rockauto.com/en/tools";
pub const ORDER_STATUS_URL: &str = "https://www.rockauto.com/orderstatus/";
pub const ORDER_STATUS_HANDLER: &str = "https://www.rockauto.com/orderstatus/orderstatus.php";
pub const PROFILE_URL: &str = "https://www.rockauto.com/en/profile/";
pub const ACCOUNT_ACTIVITY_URL: &str = "https://www.rockauto.com/en/accountactivity/";
pub const ORDER_HISTORY_URL: &str = "https://www.rockauto.com/en/orderhistory/";

/// Longest accepted cache TTL: ten years.
pub const MAX_TTL_HOURS: i64 = 24 * 365 * 10;
const MAX_TTL_MINUTES: i64 = MAX_TTL_HOURS * 60;

/// Browser identity presented to the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeaderProfile {
    #[default]
    Desktop,
    Mobile,
}

impl FromStr for HeaderProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            other => Err(format!("unknown header profile '{other}'")),
        }
    }
}

/// TTLs and capacities for the three cache tiers plus the search dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Static part/tool data.
    pub part_ttl_hours: i64,
    /// Whole vehicle+category results.
    pub result_ttl_hours: i64,
    pub pricing_ttl_minutes: i64,
    /// Parts-search dropdown options.
    pub dropdown_ttl_hours: i64,
    pub max_parts: usize,
    pub max_results: usize,
    pub max_pricing_entries: usize,
    pub max_history_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            part_ttl_hours: 12,
            result_ttl_hours: 12,
            pricing_ttl_minutes: 30,
            dropdown_ttl_hours: 24,
            max_parts: 1000,
            max_results: 100,
            max_pricing_entries: 5000,
            max_history_entries: 50,
        }
    }
}

impl CacheConfig {
    /// Long-lived static data (one week) with short-lived search results.
    pub fn enhanced() -> Self {
        Self {
            part_ttl_hours: 168,
            result_ttl_hours: 2,
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// TTLs must be positive and at most ten years; capacities non-zero.
    pub fn validate(&self) -> crate::error::Result<()> {
        let ttls = [
            ("part_ttl_hours", self.part_ttl_hours, MAX_TTL_HOURS),
            ("result_ttl_hours", self.result_ttl_hours, MAX_TTL_HOURS),
            ("pricing_ttl_minutes", self.pricing_ttl_minutes, MAX_TTL_MINUTES),
            ("dropdown_ttl_hours", self.dropdown_ttl_hours, MAX_TTL_HOURS),
        ];
        for (name, value, max) in ttls {
            if !(1..=max).contains(&value) {
                return Err(ClientError::validation(format!(
                    "{name} must be between 1 and {max}, got {value}"
                )));
            }
        }

        let capacities = [
            ("max_parts", self.max_parts),
            ("max_results", self.max_results),
            ("max_pricing_entries", self.max_pricing_entries),
            ("max_history_entries", self.max_history_entries),
        ];
        if let Some((name, _)) = capacities.iter().find(|(_, value)| *value == 0) {
            return Err(ClientError::validation(format!("{name} must be at least 1")));
        }
        Ok(())
    }
}

/// Partial update applied by `RockAutoClient::configure_cache`.
#[derive(Debug, Clone, Default)]
pub struct CacheUpdate {
    pub enabled: Option<bool>,
    pub part_ttl_hours: Option<i64>,
    pub result_ttl_hours: Option<i64>,
    pub pricing_ttl_minutes: Option<i64>,
    pub dropdown_ttl_hours: Option<i64>,
    pub max_parts: Option<usize>,
    pub max_results: Option<usize>,
    pub max_pricing_entries: Option<usize>,
}

impl CacheUpdate {
    pub fn apply(&self, config: &mut CacheConfig) {
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(hours) = self.part_ttl_hours {
            config.part_ttl_hours = hours;
        }
        if let Some(hours) = self.result_ttl_hours {
            config.result_ttl_hours = hours;
        }
        if let Some(minutes) = self.pricing_ttl_minutes {
            config.pricing_ttl_minutes = minutes;
        }
        if let Some(hours) = self.dropdown_ttl_hours {
            config.dropdown_ttl_hours = hours;
        }
        if let Some(max) = self.max_parts {
            config.max_parts = max;
        }
        if let Some(max) = self.max_results {
            config.max_results = max;
        }
        if let Some(max) = self.max_pricing_entries {
            config.max_pricing_entries = max;
        }
    }
}

/// Thresholds of the order-data sanity filter.
///
/// These are guesses about how the order page leaks its localization blob
/// into parsed fields, so they are tunable rather than hard-coded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDataLimits {
    pub max_field_len: usize,
    pub max_item_field_len: usize,
    pub max_short_status_len: usize,
}

impl Default for OrderDataLimits {
    fn default() -> Self {
        Self {
            max_field_len: 1000,
            max_item_field_len: 500,
            max_short_status_len: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub profile: HeaderProfile,
    pub timeout: Duration,
    /// Issue a catalog page GET before deep lookups.
    pub navigation_priming: bool,
    pub cache: CacheConfig,
    pub order_limits: OrderDataLimits,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            profile: HeaderProfile::Desktop,
            timeout: Duration::from_secs(30),
            navigation_priming: true,
            cache: CacheConfig::default(),
            order_limits: OrderDataLimits::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `ROCKAUTO_*` environment variables.
    ///
    /// Unparseable or out-of-range values are logged and ignored, leaving
    /// the default in place.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(profile) = env_value::<HeaderProfile>("ROCKAUTO_PROFILE") {
            config.profile = profile;
        }
        if let Some(secs) = env_value::<u64>("ROCKAUTO_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(priming) = env_value::<bool>("ROCKAUTO_NAVIGATION_PRIMING") {
            config.navigation_priming = priming;
        }

        let update = CacheUpdate {
            enabled: env_value("ROCKAUTO_CACHE_ENABLED"),
            part_ttl_hours: env_bounded("ROCKAUTO_PART_CACHE_HOURS", MAX_TTL_HOURS),
            result_ttl_hours: env_bounded("ROCKAUTO_SEARCH_CACHE_HOURS", MAX_TTL_HOURS),
            pricing_ttl_minutes: env_bounded("ROCKAUTO_PRICING_CACHE_MINUTES", MAX_TTL_MINUTES),
            dropdown_ttl_hours: env_bounded("ROCKAUTO_DROPDOWN_CACHE_HOURS", MAX_TTL_HOURS),
            max_parts: env_capacity("ROCKAUTO_MAX_CACHED_PARTS"),
            max_results: env_capacity("ROCKAUTO_MAX_CACHED_SEARCHES"),
            max_pricing_entries: env_capacity("ROCKAUTO_MAX_PRICING_ENTRIES"),
        };
        update.apply(&mut config.cache);

        config
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {} - could not parse '{}'", key, raw);
            None
        }
    }
}

fn env_bounded(key: &str, max: i64) -> Option<i64> {
    let value = env_value::<i64>(key)?;
    if (1..=max).contains(&value) {
        Some(value)
    } else {
        warn!("Ignoring {} - {} is outside 1..={}", key, value, max);
        None
    }
}

fn env_capacity(key: &str) -> Option<usize> {
    let value = env_value::<usize>(key)?;
    if value == 0 {
        warn!("Ignoring {} - capacity must be at least 1", key);
        return None;
    }
    Some(value)
}
