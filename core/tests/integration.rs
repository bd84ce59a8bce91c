//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every service
//! operation over real HTTP through `UreqTransport`. Validates that request
//! building, percent-encoding and response parsing agree with the server's
//! schema.

use std::net::SocketAddr;
use std::time::Duration;

use hycom_core::{
    ApiError, AuthorPostsQuery, ContentService, ErrorKind, ExploreQuery, ExploreSort,
    LastPostsSource, PostSort, SearchQuery, ServiceConfig, SiteInfoMode, UreqTransport,
};

/// Start the mock server on a random port in a background thread.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn service(addr: SocketAddr, config: ServiceConfig) -> ContentService<UreqTransport> {
    let timeout = config.timeout.or(Some(Duration::from_secs(10)));
    ContentService::from_config(ServiceConfig {
        base_url: format!("http://{addr}"),
        timeout,
        ..config
    })
}

#[test]
fn every_operation_round_trips() {
    let addr = start_server();
    let service = service(addr, ServiceConfig::default());

    // Step 1: top authors.
    let authors = service.top_authors(10).unwrap();
    assert_eq!(authors.len(), 3);
    assert_eq!(authors[0].display_name, "sara");

    // Step 2: posts of the top author, addressed by name-code.
    let query = AuthorPostsQuery {
        limit: 5,
        sort: PostSort::MostViewed,
    };
    let posts = service.author_posts(&authors[0].path_name(), &query).unwrap();
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].title, "Async Rust in practice");

    // Step 3: tags.
    let tags = service.tags(20).unwrap();
    assert_eq!(tags.len(), 6);
    assert_eq!(tags[0].slug, "rust");

    // Step 4: explore with defaults, then filtered by a tag slug.
    let all = service.explore(&ExploreQuery::default()).unwrap();
    assert_eq!(all.len(), 8);
    let css = service
        .explore(&ExploreQuery {
            tag: "css".to_string(),
            sort: ExploreSort::Newest,
            ..ExploreQuery::default()
        })
        .unwrap();
    assert_eq!(css.len(), 2);

    // Step 5: augmented site information.
    let info = service.site_information().unwrap();
    assert_eq!(info.total_posts, 8);
    assert_eq!(info.total_views, 8300);
    assert!(info.ping.is_some());
    assert_eq!(info.last_post.unwrap().title, "SQLite WAL mode");

    // Step 6: last posts.
    let latest = service.last_posts(2).unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].title, "SQLite WAL mode");

    // Step 7: search.
    let found = service.search_posts(&SearchQuery::new("rust")).unwrap();
    assert_eq!(found.len(), 3);

    // Step 8: QR code for a URL with reserved characters.
    let url = "https://hycom.ir/post/async-rust?ref=qr&lang=fa";
    let png = service.qr_code(url).unwrap();
    assert_eq!(&png[..8], &mock_server::PNG_SIGNATURE);
    assert_eq!(&png[8..], url.as_bytes());
}

#[test]
fn search_with_reserved_characters_reaches_server_intact() {
    let addr = start_server();
    let service = service(addr, ServiceConfig::default());

    // Unencoded, the `&` would split the query and the server would see `q=serde `.
    let found = service.search_posts(&SearchQuery::new("serde & tips")).unwrap();
    assert!(found.is_empty());
    let found = service.search_posts(&SearchQuery::new("Ten serde")).unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn raw_site_information_and_explore_last_posts() {
    let addr = start_server();
    let config = ServiceConfig::default()
        .with_site_info_mode(SiteInfoMode::Raw)
        .with_last_posts_source(LastPostsSource::ExploreNewest);
    let service = service(addr, config);

    let info = service.site_information().unwrap();
    assert!(info.ping.is_none());
    assert!(info.last_post.is_none());
    assert_eq!(info.total_authors, 3);

    let latest = service.last_posts(3).unwrap();
    let titles: Vec<_> = latest.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        ["SQLite WAL mode", "CSS grid from scratch", "Async Rust in practice"]
    );
}

#[test]
fn unknown_author_is_not_found() {
    let addr = start_server();
    let service = service(addr, ServiceConfig::default());

    let err = service
        .author_posts("nobody-0", &AuthorPostsQuery::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    assert!(service
        .compat()
        .author_posts("nobody-0", &AuthorPostsQuery::default())
        .is_none());
}

#[test]
fn unreachable_server_is_a_transport_failure() {
    // Bind then drop to obtain a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let service = service(addr, ServiceConfig::default());

    let err = service.tags(20).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(service.compat().site_information().is_none());
    assert!(service.compat().qr_code("https://hycom.ir").is_none());
}

#[test]
fn sub_second_timeout_still_reaches_server() {
    let addr = start_server();
    let config = ServiceConfig::default().with_timeout(Duration::from_millis(500));
    let service = service(addr, config);

    assert_eq!(service.config().timeout(), Some(Duration::from_millis(500)));
    let tags = service.tags(20).unwrap();
    assert!(!tags.is_empty());
}
