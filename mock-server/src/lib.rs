//! In-memory stand-in for the hycom.ir content API.
//!
//! Serves the same eight GET endpoints with the `{success, data}` envelope
//! over a seeded catalog. Limits are clamped to the ranges the real service
//! documents (authors and posts 1-50, tags 1-100).

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use hycom_core::qr::encode_data_uri;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub display_name: String,
    pub profile_id: String,
    pub url: String,
    pub article_count: u64,
    pub total_views: u64,
    pub profile_image: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub image: String,
    pub view_count: u64,
    pub like_count: u64,
    pub created_at: String,
    pub tags: Vec<String>,
    pub reading_time: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub slug: String,
    pub post_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteStatistics {
    pub total_tags: u64,
    pub total_views: u64,
    pub total_posts: u64,
    pub total_authors: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    pub qr_code: String,
}

/// A post together with the `name-code` of its author.
#[derive(Clone, Debug)]
pub struct CatalogPost {
    pub author: String,
    pub post: Post,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub authors: Vec<Author>,
    pub posts: Vec<CatalogPost>,
}

pub type Db = Arc<Catalog>;

type Failure = (StatusCode, Json<Envelope<()>>);

type Reply<T> = Result<Json<Envelope<T>>, Failure>;

/// Query extraction that reports malformed parameters in the envelope.
type Params<T> = Result<Query<T>, QueryRejection>;

fn ok<T>(data: T) -> Reply<T> {
    Ok(Json(Envelope {
        success: true,
        data,
    }))
}

fn fail<T>(status: StatusCode) -> Reply<T> {
    Err(failure(status))
}

fn failure(status: StatusCode) -> Failure {
    (
        status,
        Json(Envelope {
            success: false,
            data: (),
        }),
    )
}

fn query_params<T>(query: Params<T>) -> Result<T, Failure> {
    match query {
        Ok(Query(params)) => Ok(params),
        Err(rejection) => {
            tracing::debug!(%rejection, "malformed query");
            Err(failure(StatusCode::BAD_REQUEST))
        }
    }
}

fn clamp(limit: Option<u32>, default: u32, max: u32) -> usize {
    limit.unwrap_or(default).clamp(1, max) as usize
}

impl Catalog {
    /// Deterministic demo data: three authors, eight posts, five tags.
    pub fn seeded() -> Self {
        let authors = vec![
            author("sara", "4821", 3, 5400),
            author("omid", "1177", 3, 2100),
            author("neda", "9034", 2, 800),
        ];
        let posts = vec![
            post("sara-4821", "async-rust", "Async Rust in practice", 2400, 90, "2024-05-03T09:00:00Z", &["rust", "async"], 9),
            post("sara-4821", "serde-tips", "Ten serde tips", 1800, 60, "2024-04-12T08:30:00Z", &["rust", "serde"], 6),
            post("sara-4821", "tokio-io", "Tokio IO deep dive", 1200, 30, "2024-02-20T17:45:00Z", &["rust", "async"], 12),
            post("omid-1177", "css-grid", "CSS grid from scratch", 900, 45, "2024-05-10T12:00:00Z", &["css", "web"], 5),
            post("omid-1177", "http-caching", "HTTP caching explained", 700, 25, "2024-03-01T10:15:00Z", &["web"], 7),
            post("omid-1177", "flexbox", "Flexbox or grid?", 500, 12, "2023-12-24T19:00:00Z", &["css"], 4),
            post("neda-9034", "sqlite-wal", "SQLite WAL mode", 600, 20, "2024-05-12T06:20:00Z", &["database"], 8),
            post("neda-9034", "indexes", "Picking the right index", 200, 3, "2024-01-05T14:00:00Z", &["database"], 6),
        ];
        Self { authors, posts }
    }

    pub fn tags(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = Vec::new();
        for entry in &self.posts {
            for slug in &entry.post.tags {
                match tags.iter_mut().find(|t| &t.slug == slug) {
                    Some(tag) => tag.post_count += 1,
                    None => tags.push(Tag {
                        name: title_case(slug),
                        slug: slug.clone(),
                        post_count: 1,
                    }),
                }
            }
        }
        tags.sort_by(|a, b| b.post_count.cmp(&a.post_count).then_with(|| a.slug.cmp(&b.slug)));
        tags
    }

    pub fn statistics(&self) -> SiteStatistics {
        SiteStatistics {
            total_tags: self.tags().len() as u64,
            total_views: self.posts.iter().map(|p| p.post.view_count).sum(),
            total_posts: self.posts.len() as u64,
            total_authors: self.authors.len() as u64,
        }
    }
}

fn author(name: &str, code: &str, article_count: u64, total_views: u64) -> Author {
    Author {
        display_name: name.to_string(),
        profile_id: code.to_string(),
        url: format!("https://hycom.ir/@{name}-{code}"),
        article_count,
        total_views,
        profile_image: format!("https://hycom.ir/media/{name}.png"),
    }
}

#[allow(clippy::too_many_arguments)]
fn post(
    author: &str,
    slug: &str,
    title: &str,
    view_count: u64,
    like_count: u64,
    created_at: &str,
    tags: &[&str],
    reading_time: u32,
) -> CatalogPost {
    CatalogPost {
        author: author.to_string(),
        post: Post {
            url: format!("https://hycom.ir/post/{slug}"),
            title: title.to_string(),
            summary: format!("{title}: a short summary."),
            image: format!("https://hycom.ir/media/{slug}.jpg"),
            view_count,
            like_count,
            created_at: created_at.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            reading_time,
        },
    }
}

fn title_case(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    Recommended,
    Newest,
    MostViewed,
}

fn sort_posts(posts: &mut [Post], sort: Sort) {
    match sort {
        Sort::Recommended => posts.sort_by(|a, b| {
            b.like_count
                .cmp(&a.like_count)
                .then_with(|| b.view_count.cmp(&a.view_count))
        }),
        Sort::Newest => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        Sort::MostViewed => posts.sort_by(|a, b| b.view_count.cmp(&a.view_count)),
    }
}

fn page_of(posts: Vec<Post>, page: Option<u32>, limit: usize) -> Vec<Post> {
    let page = page.unwrap_or(1).max(1) as usize;
    posts.into_iter().skip((page - 1) * limit).take(limit).collect()
}

fn matches_search(entry: &CatalogPost, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    entry.post.title.to_lowercase().contains(&needle)
        || entry.author.to_lowercase().contains(&needle)
        || entry.post.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

pub fn app() -> Router {
    app_with(Catalog::seeded())
}

pub fn app_with(catalog: Catalog) -> Router {
    let db: Db = Arc::new(catalog);
    Router::new()
        .route("/api/top-authors", get(top_authors))
        .route("/api/author-posts/{display_name}", get(author_posts))
        .route("/api/tags", get(tags))
        .route("/api/explore", get(explore))
        .route("/api/site-info", get(site_info))
        .route("/api/last-posts", get(last_posts))
        .route("/api/search-posts", get(search_posts))
        .route("/api/qr-code", get(qr_code))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthorPostsParams {
    pub limit: Option<u32>,
    pub sort: Option<Sort>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExploreParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<Sort>,
    pub tag: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QrParams {
    pub url: Option<String>,
}

async fn top_authors(State(db): State<Db>, query: Params<LimitParams>) -> Reply<Vec<Author>> {
    let params = query_params(query)?;
    let mut authors = db.authors.clone();
    authors.sort_by(|a, b| b.total_views.cmp(&a.total_views));
    authors.truncate(clamp(params.limit, 10, 50));
    ok(authors)
}

async fn author_posts(
    State(db): State<Db>,
    Path(display_name): Path<String>,
    query: Params<AuthorPostsParams>,
) -> Reply<Vec<Post>> {
    let params = query_params(query)?;
    let known = db
        .authors
        .iter()
        .any(|a| format!("{}-{}", a.display_name, a.profile_id) == display_name);
    if !known {
        tracing::debug!(%display_name, "unknown author");
        return fail(StatusCode::NOT_FOUND);
    }
    let mut posts: Vec<Post> = db
        .posts
        .iter()
        .filter(|p| p.author == display_name)
        .map(|p| p.post.clone())
        .collect();
    // Authors only support newest and most_viewed.
    let sort = match params.sort.unwrap_or(Sort::Newest) {
        Sort::MostViewed => Sort::MostViewed,
        _ => Sort::Newest,
    };
    sort_posts(&mut posts, sort);
    posts.truncate(clamp(params.limit, 10, 50));
    ok(posts)
}

async fn tags(State(db): State<Db>, query: Params<LimitParams>) -> Reply<Vec<Tag>> {
    let params = query_params(query)?;
    let mut tags = db.tags();
    tags.truncate(clamp(params.limit, 20, 100));
    ok(tags)
}

async fn explore(State(db): State<Db>, query: Params<ExploreParams>) -> Reply<Vec<Post>> {
    let params = query_params(query)?;
    let search = params.search.unwrap_or_default();
    let tag = params.tag.unwrap_or_default();
    let mut posts: Vec<Post> = db
        .posts
        .iter()
        .filter(|p| search.is_empty() || matches_search(p, &search))
        .filter(|p| tag.is_empty() || p.post.tags.contains(&tag))
        .map(|p| p.post.clone())
        .collect();
    sort_posts(&mut posts, params.sort.unwrap_or_default());
    ok(page_of(posts, params.page, clamp(params.limit, 12, 50)))
}

async fn site_info(State(db): State<Db>) -> Reply<SiteStatistics> {
    ok(db.statistics())
}

async fn last_posts(State(db): State<Db>, query: Params<LimitParams>) -> Reply<Vec<Post>> {
    let params = query_params(query)?;
    let mut posts: Vec<Post> = db.posts.iter().map(|p| p.post.clone()).collect();
    sort_posts(&mut posts, Sort::Newest);
    posts.truncate(clamp(params.limit, 10, 50));
    ok(posts)
}

async fn search_posts(State(db): State<Db>, query: Params<SearchParams>) -> Reply<Vec<Post>> {
    let params = query_params(query)?;
    let Some(q) = params.q.filter(|q| !q.trim().is_empty()) else {
        return fail(StatusCode::BAD_REQUEST);
    };
    let mut posts: Vec<Post> = db
        .posts
        .iter()
        .filter(|p| matches_search(p, &q))
        .map(|p| p.post.clone())
        .collect();
    sort_posts(&mut posts, Sort::Newest);
    ok(page_of(posts, params.page, clamp(params.limit, 10, 50)))
}

/// Not a real QR image: the PNG signature followed by the URL bytes, which
/// is enough for clients to verify the transport and decoding path.
pub fn qr_png(url: &str) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(url.as_bytes());
    bytes
}

async fn qr_code(query: Params<QrParams>) -> Reply<QrCode> {
    let params = query_params(query)?;
    let Some(url) = params.url.filter(|u| !u.is_empty()) else {
        return fail(StatusCode::BAD_REQUEST);
    };
    ok(QrCode {
        qr_code: encode_data_uri(&qr_png(&url)),
    })
}
