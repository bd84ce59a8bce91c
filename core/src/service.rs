//! `ContentService` pairs the stateless `HycomClient` with a `Transport` and
//! performs one operation per remote endpoint.
//!
//! Calls are independent: each one builds its request, executes it, and
//! parses the response. Only the augmented site-information call issues two
//! requests, one after the other. Nothing is cached or shared between calls,
//! so a service can be used from several threads at once if its transport
//! allows it.

use std::time::Instant;

use crate::client::HycomClient;
use crate::config::{LastPostsSource, ServiceConfig, SiteInfoMode};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{
    Author, AuthorPostsQuery, ExploreQuery, ExploreSort, Post, SearchQuery, SiteInformation, Tag,
};

#[derive(Debug, Clone)]
pub struct ContentService<T> {
    client: HycomClient,
    transport: T,
    config: ServiceConfig,
}

#[cfg(feature = "ureq")]
impl ContentService<crate::transport::UreqTransport> {
    /// Service over a blocking ureq agent honouring `config.timeout()`.
    pub fn from_config(config: ServiceConfig) -> Self {
        let transport = crate::transport::UreqTransport::new(config.timeout());
        Self::new(config, transport)
    }

    pub fn from_env() -> Self {
        Self::from_config(ServiceConfig::from_env())
    }
}

impl<T: Transport> ContentService<T> {
    pub fn new(config: ServiceConfig, transport: T) -> Self {
        Self {
            client: HycomClient::new(&config.base_url),
            transport,
            config,
        }
    }

    pub fn client(&self) -> &HycomClient {
        &self.client
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// View of this service whose operations return `None` on any failure.
    pub fn compat(&self) -> Compat<'_, T> {
        Compat { service: self }
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(url = %request.url, "GET");
        let response = self.transport.execute(&request)?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "response");
        Ok(response)
    }

    /// Top authors by total views.
    #[tracing::instrument(level = "debug", skip(self), err(level = "warn"))]
    pub fn top_authors(&self, limit: u32) -> Result<Vec<Author>, ApiError> {
        let response = self.send(self.client.build_top_authors(limit))?;
        self.client.parse_authors(response)
    }

    /// Published posts of one author; `display_name` is the `name-code`
    /// composite.
    #[tracing::instrument(level = "debug", skip(self), err(level = "warn"))]
    pub fn author_posts(
        &self,
        display_name: &str,
        query: &AuthorPostsQuery,
    ) -> Result<Vec<Post>, ApiError> {
        let response = self.send(self.client.build_author_posts(display_name, query)?)?;
        self.client.parse_posts(response)
    }

    #[tracing::instrument(level = "debug", skip(self), err(level = "warn"))]
    pub fn tags(&self, limit: u32) -> Result<Vec<Tag>, ApiError> {
        let response = self.send(self.client.build_tags(limit))?;
        self.client.parse_tags(response)
    }

    #[tracing::instrument(level = "debug", skip(self), err(level = "warn"))]
    pub fn explore(&self, query: &ExploreQuery) -> Result<Vec<Post>, ApiError> {
        let response = self.send(self.client.build_explore(query))?;
        self.client.parse_posts(response)
    }

    /// Site statistics, shaped by `config.site_info_mode`.
    ///
    /// In augmented mode `ping` is the wall-clock time of the site-info
    /// request in milliseconds and `last_post` is the first entry of a
    /// one-item latest-posts fetch. Either request failing fails the call.
    #[tracing::instrument(level = "debug", skip(self), err(level = "warn"))]
    pub fn site_information(&self) -> Result<SiteInformation, ApiError> {
        let request = self.client.build_site_info();
        match self.config.site_info_mode {
            SiteInfoMode::Raw => {
                let response = self.send(request)?;
                Ok(self.client.parse_site_statistics(response)?.into())
            }
            SiteInfoMode::Augmented => {
                let started = Instant::now();
                let response = self.send(request)?;
                let ping = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                let stats = self.client.parse_site_statistics(response)?;

                let last_post = self.last_posts(1)?.into_iter().next();
                Ok(SiteInformation {
                    last_post,
                    ping: Some(ping),
                    ..SiteInformation::from(stats)
                })
            }
        }
    }

    /// Most recent posts, from the endpoint chosen by
    /// `config.last_posts_source`.
    #[tracing::instrument(level = "debug", skip(self), err(level = "warn"))]
    pub fn last_posts(&self, limit: u32) -> Result<Vec<Post>, ApiError> {
        let request = match self.config.last_posts_source {
            LastPostsSource::Dedicated => self.client.build_last_posts(limit),
            LastPostsSource::ExploreNewest => self.client.build_explore(&ExploreQuery {
                limit,
                sort: ExploreSort::Newest,
                ..ExploreQuery::default()
            }),
        };
        let response = self.send(request)?;
        self.client.parse_posts(response)
    }

    #[tracing::instrument(level = "debug", skip(self), err(level = "warn"))]
    pub fn search_posts(&self, query: &SearchQuery) -> Result<Vec<Post>, ApiError> {
        let response = self.send(self.client.build_search_posts(query)?)?;
        self.client.parse_posts(response)
    }

    /// PNG bytes of a QR code encoding `url`.
    #[tracing::instrument(level = "debug", skip(self), err(level = "warn"))]
    pub fn qr_code(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.send(self.client.build_qr_code(url)?)?;
        self.client.parse_qr_code(response)
    }
}

/// Null-sentinel view over a `ContentService`.
///
/// Every failure (transport, status, decoding, invalid argument) becomes
/// `None` with no further detail, for callers that only care whether the
/// operation produced a value.
#[derive(Debug, Clone, Copy)]
pub struct Compat<'a, T> {
    service: &'a ContentService<T>,
}

impl<T: Transport> Compat<'_, T> {
    pub fn top_authors(&self, limit: u32) -> Option<Vec<Author>> {
        self.service.top_authors(limit).ok()
    }

    pub fn author_posts(&self, display_name: &str, query: &AuthorPostsQuery) -> Option<Vec<Post>> {
        self.service.author_posts(display_name, query).ok()
    }

    pub fn tags(&self, limit: u32) -> Option<Vec<Tag>> {
        self.service.tags(limit).ok()
    }

    pub fn explore(&self, query: &ExploreQuery) -> Option<Vec<Post>> {
        self.service.explore(query).ok()
    }

    pub fn site_information(&self) -> Option<SiteInformation> {
        self.service.site_information().ok()
    }

    pub fn last_posts(&self, limit: u32) -> Option<Vec<Post>> {
        self.service.last_posts(limit).ok()
    }

    pub fn search_posts(&self, query: &SearchQuery) -> Option<Vec<Post>> {
        self.service.search_posts(query).ok()
    }

    pub fn qr_code(&self, url: &str) -> Option<Vec<u8>> {
        self.service.qr_code(url).ok()
    }
}
