use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Author, Envelope, Post, QrCode, SiteStatistics, Tag, PNG_SIGNATURE};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(uri: &str) -> axum::response::Response {
    app()
        .oneshot(Request::builder().uri(uri).body(String::new()).unwrap())
        .await
        .unwrap()
}

fn titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}

// --- top authors ---

#[tokio::test]
async fn top_authors_sorted_by_views() {
    let resp = get("/api/top-authors?limit=2").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<Vec<Author>> = body_json(resp).await;
    assert!(env.success);
    let names: Vec<_> = env.data.iter().map(|a| a.display_name.as_str()).collect();
    assert_eq!(names, ["sara", "omid"]);
}

#[tokio::test]
async fn top_authors_limit_is_clamped() {
    let env: Envelope<Vec<Author>> = body_json(get("/api/top-authors?limit=0").await).await;
    assert_eq!(env.data.len(), 1);
}

// --- author posts ---

#[tokio::test]
async fn author_posts_most_viewed() {
    let resp = get("/api/author-posts/sara-4821?limit=2&sort=most_viewed").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<Vec<Post>> = body_json(resp).await;
    assert_eq!(titles(&env.data), ["Async Rust in practice", "Ten serde tips"]);
}

#[tokio::test]
async fn author_posts_default_newest() {
    let env: Envelope<Vec<Post>> = body_json(get("/api/author-posts/omid-1177").await).await;
    assert_eq!(
        titles(&env.data),
        ["CSS grid from scratch", "HTTP caching explained", "Flexbox or grid?"]
    );
}

#[tokio::test]
async fn author_posts_unknown_author_returns_404_envelope() {
    let resp = get("/api/author-posts/nobody-0").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
}

// --- tags ---

#[tokio::test]
async fn tags_ranked_by_post_count() {
    let env: Envelope<Vec<Tag>> = body_json(get("/api/tags?limit=2").await).await;
    assert_eq!(env.data.len(), 2);
    assert_eq!(env.data[0].slug, "rust");
    assert_eq!(env.data[0].post_count, 3);
}

// --- explore ---

#[tokio::test]
async fn explore_with_empty_search_and_tag_lists_everything() {
    let resp = get("/api/explore?search=&page=1&limit=12&sort=recommended&tag=").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<Vec<Post>> = body_json(resp).await;
    assert_eq!(env.data.len(), 8);
    assert_eq!(env.data[0].title, "Async Rust in practice");
}

#[tokio::test]
async fn explore_filters_by_tag_and_paginates() {
    let env: Envelope<Vec<Post>> =
        body_json(get("/api/explore?search=&page=2&limit=1&sort=newest&tag=database").await).await;
    assert_eq!(titles(&env.data), ["Picking the right index"]);
}

#[tokio::test]
async fn explore_search_matches_title_tags_and_author() {
    let env: Envelope<Vec<Post>> =
        body_json(get("/api/explore?search=neda&page=1&limit=12&sort=most_viewed&tag=").await).await;
    assert_eq!(titles(&env.data), ["SQLite WAL mode", "Picking the right index"]);
}

// --- site info ---

#[tokio::test]
async fn site_info_reports_totals() {
    let env: Envelope<SiteStatistics> = body_json(get("/api/site-info").await).await;
    assert_eq!(
        env.data,
        SiteStatistics {
            total_tags: 6,
            total_views: 8300,
            total_posts: 8,
            total_authors: 3,
        }
    );
}

// --- last posts ---

#[tokio::test]
async fn last_posts_newest_first() {
    let env: Envelope<Vec<Post>> = body_json(get("/api/last-posts?limit=2").await).await;
    assert_eq!(titles(&env.data), ["SQLite WAL mode", "CSS grid from scratch"]);
}

// --- search ---

#[tokio::test]
async fn search_posts_by_tag_name() {
    let env: Envelope<Vec<Post>> = body_json(get("/api/search-posts?q=css&limit=10&page=1").await).await;
    assert_eq!(titles(&env.data), ["CSS grid from scratch", "Flexbox or grid?"]);
}

#[tokio::test]
async fn search_posts_without_query_is_400() {
    let resp = get("/api/search-posts?limit=10").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["success"], false);
}

// --- qr code ---

#[tokio::test]
async fn qr_code_returns_png_data_uri() {
    let resp = get("/api/qr-code?url=https%3A%2F%2Fhycom.ir").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let env: Envelope<QrCode> = body_json(resp).await;
    assert!(env.data.qr_code.starts_with(hycom_core::qr::DATA_URI_PREFIX));

    let bytes = hycom_core::qr::decode_data_uri(&env.data.qr_code).unwrap();
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    assert_eq!(&bytes[8..], b"https://hycom.ir");
}

#[tokio::test]
async fn unknown_sort_is_400_envelope() {
    for uri in [
        "/api/explore?sort=oldest",
        "/api/author-posts/sara-4821?sort=oldest",
        "/api/top-authors?limit=many",
    ] {
        let resp = get(uri).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = body_json(resp).await;
        assert_eq!(body["success"], false, "{uri}");
        assert!(body["data"].is_null(), "{uri}");
    }
}

#[tokio::test]
async fn qr_code_without_url_is_400() {
    assert_eq!(get("/api/qr-code").await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_404() {
    assert_eq!(get("/api/nothing").await.status(), StatusCode::NOT_FOUND);
}
