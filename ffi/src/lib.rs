//! C-ABI wrapper around `hycom-core`.
//!
//! # Overview
//! Exposes every content API endpoint through `extern "C"` functions so a
//! host with its own HTTP fetch primitive can build request URLs and parse
//! response bodies without linking an HTTP stack into this library.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `hycom_build_*` per endpoint; one `hycom_parse_*` per payload
//!   shape (`hycom_parse_posts` serves all four post-list endpoints).
//! - A single `FfiHycomResult` envelope with `FfiDataTag` + `void* data`
//!   conveys payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `hycom_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use hycom_core::{AuthorPostsQuery, ExploreQuery, ExploreSort, HttpResponse, PostSort, SearchQuery};

use types::*;

pub const HYCOM_SORT_NEWEST: i32 = 0;
pub const HYCOM_SORT_MOST_VIEWED: i32 = 1;

pub const HYCOM_EXPLORE_RECOMMENDED: i32 = 0;
pub const HYCOM_EXPLORE_NEWEST: i32 = 1;
pub const HYCOM_EXPLORE_MOST_VIEWED: i32 = 2;

/// Borrow a C string as `&str`. Null and invalid UTF-8 yield `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn post_sort(sort: i32) -> Option<PostSort> {
    match sort {
        HYCOM_SORT_NEWEST => Some(PostSort::Newest),
        HYCOM_SORT_MOST_VIEWED => Some(PostSort::MostViewed),
        _ => None,
    }
}

fn explore_sort(sort: i32) -> Option<ExploreSort> {
    match sort {
        HYCOM_EXPLORE_RECOMMENDED => Some(ExploreSort::Recommended),
        HYCOM_EXPLORE_NEWEST => Some(ExploreSort::Newest),
        HYCOM_EXPLORE_MOST_VIEWED => Some(ExploreSort::MostViewed),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`; null selects `https://hycom.ir`.
///
/// Returns null if `base_url` is not valid UTF-8 or if an internal panic
/// occurs. The caller must free the returned pointer with `hycom_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_client_new(base_url: *const c_char) -> *mut FfiHycomClient {
    catch_unwind(|| {
        let inner = if base_url.is_null() {
            hycom_core::HycomClient::default()
        } else {
            match unsafe { read_str(base_url) } {
                Some(url) => hycom_core::HycomClient::new(url),
                None => return std::ptr::null_mut(),
            }
        };
        Box::into_raw(Box::new(FfiHycomClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `hycom_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_client_free(client: *mut FfiHycomClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a top-authors request.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `hycom_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_build_top_authors(
    client: *const FfiHycomClient,
    limit: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_top_authors(limit))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an author-posts request. `display_name` is the `name-code`
/// composite; `sort` is one of the `HYCOM_SORT_*` constants.
///
/// Returns null if `client` or `display_name` is null or empty, or if
/// `sort` is unknown.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_build_author_posts(
    client: *const FfiHycomClient,
    display_name: *const c_char,
    limit: u32,
    sort: i32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(name), Some(sort)) = (unsafe { read_str(display_name) }, post_sort(sort)) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_author_posts(name, &AuthorPostsQuery { limit, sort }) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a tags request.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_build_tags(client: *const FfiHycomClient, limit: u32) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_tags(limit))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an explore request. Null `search` or `tag` is sent as an empty
/// value; `sort` is one of the `HYCOM_EXPLORE_*` constants.
///
/// Returns null if `client` is null or `sort` is unknown.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_build_explore(
    client: *const FfiHycomClient,
    search: *const c_char,
    page: u32,
    limit: u32,
    sort: i32,
    tag: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(sort) = explore_sort(sort) else {
            return std::ptr::null_mut();
        };
        let query = ExploreQuery {
            search: unsafe { read_str(search) }.unwrap_or("").to_string(),
            page,
            limit,
            sort,
            tag: unsafe { read_str(tag) }.unwrap_or("").to_string(),
        };
        FfiHttpRequest::from_core(client.inner.build_explore(&query))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a site-info request. The host may time the fetch itself to
/// obtain a ping.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_build_site_info(client: *const FfiHycomClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_site_info())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a last-posts request against the dedicated endpoint.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_build_last_posts(
    client: *const FfiHycomClient,
    limit: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_last_posts(limit))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a search-posts request.
///
/// Returns null if `client` or `query` is null, or if `query` is blank.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_build_search_posts(
    client: *const FfiHycomClient,
    query: *const c_char,
    limit: u32,
    page: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(query) = (unsafe { read_str(query) }) else {
            return std::ptr::null_mut();
        };
        let query = SearchQuery {
            query: query.to_string(),
            limit,
            page,
        };
        match client.inner.build_search_posts(&query) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a qr-code request for `url`.
///
/// Returns null if `client` or `url` is null or empty.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_build_qr_code(
    client: *const FfiHycomClient,
    url: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(url) = (unsafe { read_str(url) }) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_qr_code(url) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// treated as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = unsafe { read_str(resp.body) }.unwrap_or("");
    HttpResponse::new(resp.status, body)
}

/// Shared null checks and conversion for every `hycom_parse_*` function.
fn parse_with(
    client: *const FfiHycomClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&hycom_core::HycomClient, HttpResponse) -> *mut FfiHycomResult,
) -> *mut FfiHycomResult {
    if client.is_null() {
        return FfiHycomResult::null_arg("client");
    }
    if response.is_null() {
        return FfiHycomResult::null_arg("response");
    }
    let client = unsafe { &*client };
    let resp = unsafe { &*response };
    parse(&client.inner, ffi_response_to_core(resp))
}

/// Parse a top-authors response.
///
/// Returns a result with `data_tag = AuthorList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_parse_authors(
    client: *const FfiHycomClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHycomResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| match c.parse_authors(resp) {
            Ok(authors) => FfiHycomResult::ok_authors(authors),
            Err(e) => FfiHycomResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiHycomResult::panic("panic in hycom_parse_authors"))
}

/// Parse an author-posts, explore, last-posts or search-posts response.
///
/// Returns a result with `data_tag = PostList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_parse_posts(
    client: *const FfiHycomClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHycomResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| match c.parse_posts(resp) {
            Ok(posts) => FfiHycomResult::ok_posts(posts),
            Err(e) => FfiHycomResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiHycomResult::panic("panic in hycom_parse_posts"))
}

/// Parse a tags response.
///
/// Returns a result with `data_tag = TagList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_parse_tags(
    client: *const FfiHycomClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHycomResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| match c.parse_tags(resp) {
            Ok(tags) => FfiHycomResult::ok_tags(tags),
            Err(e) => FfiHycomResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiHycomResult::panic("panic in hycom_parse_tags"))
}

/// Parse a site-info response.
///
/// Returns a result with `data_tag = SiteStatistics` on success.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_parse_site_statistics(
    client: *const FfiHycomClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHycomResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| match c.parse_site_statistics(resp) {
            Ok(stats) => FfiHycomResult::ok_site_statistics(stats),
            Err(e) => FfiHycomResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiHycomResult::panic("panic in hycom_parse_site_statistics"))
}

/// Parse a qr-code response into PNG bytes.
///
/// Returns a result with `data_tag = Bytes` on success.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_parse_qr_code(
    client: *const FfiHycomClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHycomResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| match c.parse_qr_code(resp) {
            Ok(bytes) => FfiHycomResult::ok_bytes(bytes),
            Err(e) => FfiHycomResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiHycomResult::panic("panic in hycom_parse_qr_code"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `hycom_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        unsafe { free_c_string(req.url) };
    });
}

/// Free an `FfiHycomResult` returned by any `hycom_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_free_result(result: *mut FfiHycomResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe { free_c_string(result.error_message) };
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::AuthorList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiAuthorList) };
                let items = unsafe { from_raw_slice(list.items, list.len) };
                for item in &items {
                    unsafe { item.free_fields() };
                }
            }
            FfiDataTag::PostList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiPostList) };
                let items = unsafe { from_raw_slice(list.items, list.len) };
                for item in &items {
                    unsafe { item.free_fields() };
                }
            }
            FfiDataTag::TagList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiTagList) };
                let items = unsafe { from_raw_slice(list.items, list.len) };
                for item in &items {
                    unsafe { item.free_fields() };
                }
            }
            FfiDataTag::SiteStatistics => {
                drop(unsafe { Box::from_raw(result.data as *mut FfiSiteStatistics) });
            }
            FfiDataTag::Bytes => {
                let bytes = unsafe { Box::from_raw(result.data as *mut FfiBytes) };
                drop(unsafe { from_raw_slice(bytes.data, bytes.len) });
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hycom_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
