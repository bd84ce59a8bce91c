//! Typed client for the hycom.ir content platform API: articles, authors,
//! tags, site statistics and QR codes.
//!
//! # Overview
//! Two layers:
//! - [`HycomClient`] builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern). Foreign
//!   hosts drive it through the `hycom-ffi` crate.
//! - [`ContentService`] pairs the client with a [`Transport`] and performs
//!   one call per endpoint, returning `Result<_, ApiError>`. Its
//!   [`compat`](ContentService::compat) view flattens every failure to
//!   `None`.
//!
//! # Design
//! - Both layers are stateless; calls never share data.
//! - Query values and the author path segment are percent-encoded.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//!
//! ```no_run
//! use hycom_core::{ContentService, ExploreQuery, ServiceConfig};
//!
//! let service = ContentService::from_config(ServiceConfig::from_env());
//! let posts = service.compat().explore(&ExploreQuery::default()).unwrap_or_default();
//! println!("{} posts", posts.len());
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod qr;
pub mod query;
pub mod service;
pub mod transport;
pub mod types;

pub use client::HycomClient;
pub use config::{LastPostsSource, ServiceConfig, SiteInfoMode};
pub use error::{ApiError, ErrorKind, TransportError};
pub use http::{HttpRequest, HttpResponse};
pub use service::{Compat, ContentService};
pub use transport::{FnTransport, Transport};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    Author, AuthorPostsQuery, Envelope, ExploreQuery, ExploreSort, Post, PostSort, SearchQuery,
    SiteInformation, SiteStatistics, Tag,
};
