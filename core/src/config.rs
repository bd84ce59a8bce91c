//! Service configuration: where to connect and which behaviour variants to
//! use for site information and latest posts.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_BASE_URL;

pub const ENV_BASE_URL: &str = "HYCOM_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "HYCOM_TIMEOUT_SECS";
pub const ENV_SITE_INFO_MODE: &str = "HYCOM_SITE_INFO_MODE";
pub const ENV_LAST_POSTS_SOURCE: &str = "HYCOM_LAST_POSTS_SOURCE";

/// How `site_information` builds its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteInfoMode {
    /// Return the site-info payload as is; `ping` and `last_post` stay empty.
    Raw,
    /// Time the site-info request and attach the single latest post,
    /// fetched by a second sequential request.
    #[default]
    Augmented,
}

impl FromStr for SiteInfoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(SiteInfoMode::Raw),
            "augmented" => Ok(SiteInfoMode::Augmented),
            other => Err(format!("unknown site info mode: {other}")),
        }
    }
}

/// Which endpoint serves `last_posts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastPostsSource {
    /// `/api/last-posts?limit=N`.
    #[default]
    Dedicated,
    /// `/api/explore` sorted newest first, page 1, no search or tag filter.
    ExploreNewest,
}

impl FromStr for LastPostsSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dedicated" | "last-posts" => Ok(LastPostsSource::Dedicated),
            "explore" | "explore_newest" => Ok(LastPostsSource::ExploreNewest),
            other => Err(format!("unknown last posts source: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Whole round-trip bound per request; `None` waits indefinitely.
    /// Never `Some(Duration::ZERO)`, which would fail every request at once.
    #[serde(rename = "timeout_ms", with = "millis")]
    pub timeout: Option<Duration>,
    pub site_info_mode: SiteInfoMode,
    pub last_posts_source: LastPostsSource,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            site_info_mode: SiteInfoMode::default(),
            last_posts_source: LastPostsSource::default(),
        }
    }
}

impl ServiceConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_site_info_mode(mut self, mode: SiteInfoMode) -> Self {
        self.site_info_mode = mode;
        self
    }

    pub fn with_last_posts_source(mut self, source: LastPostsSource) -> Self {
        self.last_posts_source = source;
        self
    }

    /// A zero timeout is logged and ignored.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            tracing::warn!("ignoring zero timeout");
        } else {
            self.timeout = Some(timeout);
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Read `HYCOM_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults;
    /// unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(0) => tracing::warn!(value = %raw, "ignoring zero {ENV_TIMEOUT_SECS}"),
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring {ENV_TIMEOUT_SECS}"),
            }
        }
        if let Some(raw) = lookup(ENV_SITE_INFO_MODE) {
            match raw.parse() {
                Ok(mode) => config.site_info_mode = mode,
                Err(e) => tracing::warn!(error = %e, "ignoring {ENV_SITE_INFO_MODE}"),
            }
        }
        if let Some(raw) = lookup(ENV_LAST_POSTS_SOURCE) {
            match raw.parse() {
                Ok(source) => config.last_posts_source = source,
                Err(e) => tracing::warn!(error = %e, "ignoring {ENV_LAST_POSTS_SOURCE}"),
            }
        }
        config
    }
}

/// `Option<Duration>` as whole milliseconds; `0` reads back as `None`.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let ms = Option::<u64>::deserialize(d)?;
        Ok(ms.filter(|&ms| ms > 0).map(Duration::from_millis))
    }
}
