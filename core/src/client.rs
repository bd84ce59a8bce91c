//! Stateless HTTP request builder and response parser for the content API.
//!
//! # Design
//! `HycomClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint has a `build_*` method producing an `HttpRequest`;
//! responses are consumed by one `parse_*` method per payload shape (the four
//! post-list endpoints share `parse_posts`). Executing the round-trip is left
//! to the caller, which keeps this layer deterministic and free of I/O.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::qr;
use crate::query::{encode_component, QueryString};
use crate::types::{
    Author, AuthorPostsQuery, Envelope, ExploreQuery, Post, QrCodePayload, SearchQuery,
    SiteStatistics, Tag,
};

pub const DEFAULT_BASE_URL: &str = "https://hycom.ir";

pub const DEFAULT_TOP_AUTHORS_LIMIT: u32 = 10;
pub const DEFAULT_TAGS_LIMIT: u32 = 20;
pub const DEFAULT_LAST_POSTS_LIMIT: u32 = 10;
pub const DEFAULT_AUTHOR_POSTS_LIMIT: u32 = 10;
pub const DEFAULT_EXPLORE_LIMIT: u32 = 12;
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
/// Pages are 1-based.
pub const DEFAULT_PAGE: u32 = 1;

const TOP_AUTHORS: &str = "/api/top-authors";
const AUTHOR_POSTS: &str = "/api/author-posts";
const TAGS: &str = "/api/tags";
const EXPLORE: &str = "/api/explore";
const SITE_INFO: &str = "/api/site-info";
const LAST_POSTS: &str = "/api/last-posts";
const SEARCH_POSTS: &str = "/api/search-posts";
const QR_CODE: &str = "/api/qr-code";

/// Synchronous, stateless client for the content API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HycomClient {
    base_url: String,
}

impl Default for HycomClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl HycomClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, query: QueryString) -> HttpRequest {
        HttpRequest::get(query.append_to(&format!("{}{path}", self.base_url)))
    }

    pub fn build_top_authors(&self, limit: u32) -> HttpRequest {
        self.get(TOP_AUTHORS, QueryString::new().param("limit", limit))
    }

    /// `display_name` is the `name-code` composite; it is encoded as one
    /// path segment.
    pub fn build_author_posts(
        &self,
        display_name: &str,
        query: &AuthorPostsQuery,
    ) -> Result<HttpRequest, ApiError> {
        if display_name.is_empty() {
            return Err(ApiError::InvalidArgument("display name must not be empty".to_string()));
        }
        let path = format!("{AUTHOR_POSTS}/{}", encode_component(display_name));
        Ok(self.get(
            &path,
            QueryString::new()
                .param("limit", query.limit)
                .param("sort", query.sort.as_str()),
        ))
    }

    pub fn build_tags(&self, limit: u32) -> HttpRequest {
        self.get(TAGS, QueryString::new().param("limit", limit))
    }

    pub fn build_explore(&self, query: &ExploreQuery) -> HttpRequest {
        self.get(
            EXPLORE,
            QueryString::new()
                .param("search", &query.search)
                .param("page", query.page)
                .param("limit", query.limit)
                .param("sort", query.sort.as_str())
                .param("tag", &query.tag),
        )
    }

    pub fn build_site_info(&self) -> HttpRequest {
        self.get(SITE_INFO, QueryString::new())
    }

    pub fn build_last_posts(&self, limit: u32) -> HttpRequest {
        self.get(LAST_POSTS, QueryString::new().param("limit", limit))
    }

    pub fn build_search_posts(&self, query: &SearchQuery) -> Result<HttpRequest, ApiError> {
        if query.query.trim().is_empty() {
            return Err(ApiError::InvalidArgument("search query must not be empty".to_string()));
        }
        Ok(self.get(
            SEARCH_POSTS,
            QueryString::new()
                .param("q", &query.query)
                .param("limit", query.limit)
                .param("page", query.page),
        ))
    }

    pub fn build_qr_code(&self, url: &str) -> Result<HttpRequest, ApiError> {
        if url.is_empty() {
            return Err(ApiError::InvalidArgument("qr code url must not be empty".to_string()));
        }
        Ok(self.get(QR_CODE, QueryString::new().param("url", url)))
    }

    pub fn parse_authors(&self, response: HttpResponse) -> Result<Vec<Author>, ApiError> {
        parse_envelope(response)
    }

    /// Shared by author-posts, explore, last-posts and search-posts.
    pub fn parse_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_tags(&self, response: HttpResponse) -> Result<Vec<Tag>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_site_statistics(&self, response: HttpResponse) -> Result<SiteStatistics, ApiError> {
        parse_envelope(response)
    }

    /// Returns the decoded PNG bytes.
    pub fn parse_qr_code(&self, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
        let payload: QrCodePayload = parse_envelope(response)?;
        qr::decode_data_uri(&payload.qr_code)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn parse_envelope<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    let envelope: Envelope<T> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Deserialization(e.to_string()))?;
    if !envelope.success {
        tracing::warn!("response envelope reports success=false; using its data anyway");
    }
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExploreSort, PostSort};

    fn client() -> HycomClient {
        HycomClient::new("http://localhost:3000")
    }

    const POST_JSON: &str = r#"{"url":"https://hycom.ir/p/1","title":"Hello","summary":"s",
        "image":"https://hycom.ir/i.png","view_count":120,"like_count":4,
        "created_at":"2024-05-01T10:00:00Z","tags":["rust","web"],"reading_time":6}"#;

    #[test]
    fn build_top_authors_uses_limit() {
        let req = client().build_top_authors(DEFAULT_TOP_AUTHORS_LIMIT);
        assert_eq!(req.url, "http://localhost:3000/api/top-authors?limit=10");
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_author_posts_embeds_display_name() {
        let query = AuthorPostsQuery {
            limit: 5,
            sort: PostSort::MostViewed,
        };
        let req = client().build_author_posts("name-123", &query).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/api/author-posts/name-123?limit=5&sort=most_viewed"
        );
    }

    #[test]
    fn build_author_posts_encodes_path_segment() {
        let req = client()
            .build_author_posts("a/b c-1", &AuthorPostsQuery::default())
            .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/api/author-posts/a%2Fb%20c-1?limit=10&sort=newest"
        );
    }

    #[test]
    fn build_author_posts_rejects_empty_name() {
        let err = client().build_author_posts("", &AuthorPostsQuery::default()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn build_tags_default_limit() {
        let req = client().build_tags(DEFAULT_TAGS_LIMIT);
        assert_eq!(req.url, "http://localhost:3000/api/tags?limit=20");
    }

    #[test]
    fn build_explore_sends_empty_values_literally() {
        let req = client().build_explore(&ExploreQuery::default());
        assert_eq!(
            req.url,
            "http://localhost:3000/api/explore?search=&page=1&limit=12&sort=recommended&tag="
        );
    }

    #[test]
    fn build_explore_encodes_search_and_tag() {
        let query = ExploreQuery {
            search: "rust & go".to_string(),
            page: 2,
            limit: 6,
            sort: ExploreSort::MostViewed,
            tag: "web-dev".to_string(),
        };
        let req = client().build_explore(&query);
        assert_eq!(
            req.url,
            "http://localhost:3000/api/explore?search=rust%20%26%20go&page=2&limit=6&sort=most_viewed&tag=web-dev"
        );
    }

    #[test]
    fn build_site_info_has_no_query() {
        assert_eq!(client().build_site_info().url, "http://localhost:3000/api/site-info");
    }

    #[test]
    fn build_last_posts_uses_limit() {
        assert_eq!(
            client().build_last_posts(3).url,
            "http://localhost:3000/api/last-posts?limit=3"
        );
    }

    #[test]
    fn build_search_posts_orders_q_limit_page() {
        let req = client().build_search_posts(&SearchQuery::new("tokio")).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/api/search-posts?q=tokio&limit=10&page=1"
        );
    }

    #[test]
    fn build_search_posts_rejects_blank_query() {
        let err = client().build_search_posts(&SearchQuery::new("  ")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn build_qr_code_encodes_url() {
        let req = client().build_qr_code("https://hycom.ir/p?id=1").unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/api/qr-code?url=https%3A%2F%2Fhycom.ir%2Fp%3Fid%3D1"
        );
    }

    #[test]
    fn build_qr_code_rejects_empty_url() {
        assert!(matches!(client().build_qr_code(""), Err(ApiError::InvalidArgument(_))));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = HycomClient::new("http://localhost:3000/");
        assert_eq!(client.build_tags(1).url, "http://localhost:3000/api/tags?limit=1");
    }

    #[test]
    fn default_client_targets_hycom() {
        assert_eq!(HycomClient::default().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn parse_posts_success() {
        let body = format!(r#"{{"success":true,"data":[{POST_JSON}]}}"#);
        let posts = client().parse_posts(HttpResponse::new(200, body)).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Hello");
        assert_eq!(posts[0].tags, ["rust", "web"]);
    }

    #[test]
    fn parse_authors_success() {
        let body = r#"{"success":true,"data":[{"display_name":"sara","profile_id":"4821",
            "url":"https://hycom.ir/@sara-4821","article_count":12,"total_views":3400,
            "profile_image":"https://hycom.ir/a.png"}]}"#;
        let authors = client().parse_authors(HttpResponse::new(200, body)).unwrap();
        assert_eq!(authors[0].total_views, 3400);
    }

    #[test]
    fn parse_tags_success() {
        let body = r#"{"success":true,"data":[{"name":"Rust","slug":"rust","post_count":7}]}"#;
        let tags = client().parse_tags(HttpResponse::new(200, body)).unwrap();
        assert_eq!(tags[0].slug, "rust");
    }

    #[test]
    fn parse_site_statistics_success() {
        let body = r#"{"success":true,"data":{"total_tags":3,"total_views":900,
            "total_posts":40,"total_authors":5}}"#;
        let stats = client().parse_site_statistics(HttpResponse::new(200, body)).unwrap();
        assert_eq!(stats.total_posts, 40);
    }

    #[test]
    fn parse_qr_code_strips_prefix() {
        let body = r#"{"success":true,"data":{"qr_code":"data:image/png;base64,AAAA"}}"#;
        let bytes = client().parse_qr_code(HttpResponse::new(200, body)).unwrap();
        assert_eq!(bytes, vec![0, 0, 0]);
    }

    #[test]
    fn parse_unsuccessful_envelope_still_returns_data() {
        let body = r#"{"success":false,"data":[]}"#;
        assert!(client().parse_tags(HttpResponse::new(200, body)).unwrap().is_empty());
    }

    #[test]
    fn parse_not_found() {
        let err = client().parse_posts(HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_server_error() {
        let err = client().parse_tags(HttpResponse::new(500, "boom")).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
    }

    #[test]
    fn parse_bad_json() {
        let err = client().parse_authors(HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_wrong_shape() {
        let body = r#"{"success":true,"data":{"unexpected":1}}"#;
        let err = client().parse_posts(HttpResponse::new(200, body)).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
