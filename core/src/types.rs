//! Domain DTOs for the content platform API.
//!
//! # Design
//! These types mirror the remote service's JSON schema but are defined
//! independently from the mock-server crate. Integration tests against the
//! mock server catch schema drift between the two.
//!
//! Every response is wrapped in an [`Envelope`]. The client reads `data`
//! and does not branch on `success`; a missing or ill-shaped payload fails
//! deserialization instead.

use serde::{Deserialize, Serialize};

use crate::client::{
    DEFAULT_AUTHOR_POSTS_LIMIT, DEFAULT_EXPLORE_LIMIT, DEFAULT_PAGE, DEFAULT_SEARCH_LIMIT,
};

/// The `{ success, data }` wrapper every JSON response uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: T,
}

/// An author as listed by the top-authors endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub display_name: String,
    pub profile_id: String,
    pub url: String,
    pub article_count: u64,
    pub total_views: u64,
    pub profile_image: String,
}

impl Author {
    /// The `name-code` composite used as the author-posts path segment.
    pub fn path_name(&self) -> String {
        format!("{}-{}", self.display_name, self.profile_id)
    }
}

/// A published article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub image: String,
    pub view_count: u64,
    pub like_count: u64,
    pub created_at: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Minutes.
    pub reading_time: u32,
}

/// A tag with the number of posts carrying it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub slug: String,
    pub post_count: u64,
}

/// The raw payload of the site-info endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SiteStatistics {
    pub total_tags: u64,
    pub total_views: u64,
    pub total_posts: u64,
    pub total_authors: u64,
}

/// Site statistics, optionally augmented client-side with the latest post
/// and the measured round trip of the statistics request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteInformation {
    pub last_post: Option<Post>,
    /// Milliseconds.
    pub ping: Option<u64>,
    pub total_tags: u64,
    pub total_views: u64,
    pub total_posts: u64,
    pub total_authors: u64,
}

impl From<SiteStatistics> for SiteInformation {
    fn from(stats: SiteStatistics) -> Self {
        Self {
            last_post: None,
            ping: None,
            total_tags: stats.total_tags,
            total_views: stats.total_views,
            total_posts: stats.total_posts,
            total_authors: stats.total_authors,
        }
    }
}

/// Payload of the qr-code endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QrCodePayload {
    pub qr_code: String,
}

/// Sort order accepted by the author-posts endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSort {
    #[default]
    Newest,
    MostViewed,
}

impl PostSort {
    pub fn as_str(self) -> &'static str {
        match self {
            PostSort::Newest => "newest",
            PostSort::MostViewed => "most_viewed",
        }
    }
}

/// Sort order accepted by the explore endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExploreSort {
    #[default]
    Recommended,
    Newest,
    MostViewed,
}

impl ExploreSort {
    pub fn as_str(self) -> &'static str {
        match self {
            ExploreSort::Recommended => "recommended",
            ExploreSort::Newest => "newest",
            ExploreSort::MostViewed => "most_viewed",
        }
    }
}

impl From<PostSort> for ExploreSort {
    fn from(sort: PostSort) -> Self {
        match sort {
            PostSort::Newest => ExploreSort::Newest,
            PostSort::MostViewed => ExploreSort::MostViewed,
        }
    }
}

/// Parameters for the author-posts endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorPostsQuery {
    pub limit: u32,
    pub sort: PostSort,
}

impl Default for AuthorPostsQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_AUTHOR_POSTS_LIMIT,
            sort: PostSort::Newest,
        }
    }
}

/// Parameters for the explore endpoint. Empty `search` and `tag` are still
/// sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreQuery {
    pub search: String,
    pub page: u32,
    pub limit: u32,
    pub sort: ExploreSort,
    pub tag: String,
}

impl Default for ExploreQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_EXPLORE_LIMIT,
            sort: ExploreSort::Recommended,
            tag: String::new(),
        }
    }
}

/// Parameters for the search-posts endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub limit: u32,
    pub page: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_SEARCH_LIMIT,
            page: DEFAULT_PAGE,
        }
    }
}
