//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! tagged enums with explicit discriminants. Arrays are handed out as boxed
//! slices so they can be released with exactly the length they were created
//! with. Conversion helpers live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use hycom_core::{ApiError, Author, HttpRequest, Post, SiteStatistics, Tag};

/// Opaque handle to a `HycomClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiHycomClient {
    pub(crate) inner: hycom_core::HycomClient,
}

// ---------------------------------------------------------------------------
// Allocation helpers
// ---------------------------------------------------------------------------

/// Convert to an owned C string, dropping interior NUL bytes.
pub(crate) fn c_string(s: String) -> *mut c_char {
    CString::new(s)
        .or_else(|e| {
            let mut bytes = e.into_vec();
            bytes.retain(|b| *b != 0);
            CString::new(bytes)
        })
        .unwrap_or_default()
        .into_raw()
}

/// Release a string produced by `c_string`. Null is ignored.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Leak `items` as a boxed slice; empty input yields a null pointer.
pub(crate) fn into_raw_slice<T>(items: Vec<T>) -> (*mut T, usize) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len();
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// Reclaim a slice produced by `into_raw_slice`.
pub(crate) unsafe fn from_raw_slice<T>(ptr: *mut T, len: usize) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// A GET request described as C-compatible plain data.
///
/// Built by `hycom_build_*` functions. The C caller fetches `url` and passes
/// the response back through `hycom_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiHttpRequest {
            url: c_string(req.url),
        }))
    }
}

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing a request and passes a
/// pointer to a `hycom_parse_*` function. The FFI layer reads but does not
/// free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiHycomResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    QrDecode = 4,
    InvalidArgument = 5,
    Transport = 6,
    Panic = 7,
    NullArg = 8,
}

/// Tag that tells `hycom_free_result` what `FfiHycomResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    AuthorList = 1,
    PostList = 2,
    TagList = 3,
    SiteStatistics = 4,
    Bytes = 5,
}

#[repr(C)]
pub struct FfiAuthor {
    pub display_name: *mut c_char,
    pub profile_id: *mut c_char,
    pub url: *mut c_char,
    pub article_count: u64,
    pub total_views: u64,
    pub profile_image: *mut c_char,
}

#[repr(C)]
pub struct FfiPost {
    pub url: *mut c_char,
    pub title: *mut c_char,
    pub summary: *mut c_char,
    pub image: *mut c_char,
    pub view_count: u64,
    pub like_count: u64,
    pub created_at: *mut c_char,
    pub tags: *mut *mut c_char,
    pub tags_len: usize,
    /// Minutes.
    pub reading_time: u32,
}

#[repr(C)]
pub struct FfiTag {
    pub name: *mut c_char,
    pub slug: *mut c_char,
    pub post_count: u64,
}

#[repr(C)]
pub struct FfiSiteStatistics {
    pub total_tags: u64,
    pub total_views: u64,
    pub total_posts: u64,
    pub total_authors: u64,
}

#[repr(C)]
pub struct FfiAuthorList {
    pub items: *mut FfiAuthor,
    pub len: usize,
}

#[repr(C)]
pub struct FfiPostList {
    pub items: *mut FfiPost,
    pub len: usize,
}

#[repr(C)]
pub struct FfiTagList {
    pub items: *mut FfiTag,
    pub len: usize,
}

/// Decoded PNG bytes of a QR code.
#[repr(C)]
pub struct FfiBytes {
    pub data: *mut u8,
    pub len: usize,
}

impl From<Author> for FfiAuthor {
    fn from(a: Author) -> Self {
        FfiAuthor {
            display_name: c_string(a.display_name),
            profile_id: c_string(a.profile_id),
            url: c_string(a.url),
            article_count: a.article_count,
            total_views: a.total_views,
            profile_image: c_string(a.profile_image),
        }
    }
}

impl From<Post> for FfiPost {
    fn from(p: Post) -> Self {
        let (tags, tags_len) = into_raw_slice(p.tags.into_iter().map(c_string).collect());
        FfiPost {
            url: c_string(p.url),
            title: c_string(p.title),
            summary: c_string(p.summary),
            image: c_string(p.image),
            view_count: p.view_count,
            like_count: p.like_count,
            created_at: c_string(p.created_at),
            tags,
            tags_len,
            reading_time: p.reading_time,
        }
    }
}

impl From<Tag> for FfiTag {
    fn from(t: Tag) -> Self {
        FfiTag {
            name: c_string(t.name),
            slug: c_string(t.slug),
            post_count: t.post_count,
        }
    }
}

impl From<SiteStatistics> for FfiSiteStatistics {
    fn from(s: SiteStatistics) -> Self {
        FfiSiteStatistics {
            total_tags: s.total_tags,
            total_views: s.total_views,
            total_posts: s.total_posts,
            total_authors: s.total_authors,
        }
    }
}

impl FfiAuthor {
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.display_name);
            free_c_string(self.profile_id);
            free_c_string(self.url);
            free_c_string(self.profile_image);
        }
    }
}

impl FfiPost {
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.url);
            free_c_string(self.title);
            free_c_string(self.summary);
            free_c_string(self.image);
            free_c_string(self.created_at);
            let tags = from_raw_slice(self.tags, self.tags_len);
            for tag in tags {
                free_c_string(tag);
            }
        }
    }
}

impl FfiTag {
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.name);
            free_c_string(self.slug);
        }
    }
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiHycomResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiHycomResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiHycomResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn error(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiHycomResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_authors(authors: Vec<Author>) -> *mut Self {
        let (items, len) = into_raw_slice(authors.into_iter().map(FfiAuthor::from).collect());
        let list = Box::into_raw(Box::new(FfiAuthorList { items, len }));
        Self::ok(FfiDataTag::AuthorList, list as *mut c_void)
    }

    pub(crate) fn ok_posts(posts: Vec<Post>) -> *mut Self {
        let (items, len) = into_raw_slice(posts.into_iter().map(FfiPost::from).collect());
        let list = Box::into_raw(Box::new(FfiPostList { items, len }));
        Self::ok(FfiDataTag::PostList, list as *mut c_void)
    }

    pub(crate) fn ok_tags(tags: Vec<Tag>) -> *mut Self {
        let (items, len) = into_raw_slice(tags.into_iter().map(FfiTag::from).collect());
        let list = Box::into_raw(Box::new(FfiTagList { items, len }));
        Self::ok(FfiDataTag::TagList, list as *mut c_void)
    }

    pub(crate) fn ok_site_statistics(stats: SiteStatistics) -> *mut Self {
        let stats = Box::into_raw(Box::new(FfiSiteStatistics::from(stats)));
        Self::ok(FfiDataTag::SiteStatistics, stats as *mut c_void)
    }

    pub(crate) fn ok_bytes(bytes: Vec<u8>) -> *mut Self {
        let (data, len) = into_raw_slice(bytes);
        let bytes = Box::into_raw(Box::new(FfiBytes { data, len }));
        Self::ok(FfiDataTag::Bytes, bytes as *mut c_void)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = match &err {
            ApiError::NotFound => FfiErrorCode::NotFound,
            ApiError::Http { .. } => FfiErrorCode::Http,
            ApiError::Deserialization(_) => FfiErrorCode::Deserialization,
            ApiError::QrDecode(_) => FfiErrorCode::QrDecode,
            ApiError::InvalidArgument(_) => FfiErrorCode::InvalidArgument,
            ApiError::Transport(_) => FfiErrorCode::Transport,
        };
        Self::error(code, err.status().unwrap_or(0), err.to_string())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_string_drops_interior_nul() {
        let ptr = c_string("a\0b".to_string());
        let s = unsafe { CString::from_raw(ptr) };
        assert_eq!(s.to_str().unwrap(), "ab");
    }

    #[test]
    fn raw_slice_round_trip() {
        let (ptr, len) = into_raw_slice(vec![1u8, 2, 3]);
        assert_eq!(len, 3);
        assert_eq!(unsafe { from_raw_slice(ptr, len) }, vec![1, 2, 3]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn raw_slice_keeps_lengths_past_u32() {
        let n = u32::MAX as usize + 2;
        let mut units: Vec<()> = Vec::with_capacity(n);
        // Zero-sized elements need no initialisation or storage.
        unsafe { units.set_len(n) };
        let (ptr, len) = into_raw_slice(units);
        assert_eq!(len, n);
        assert_eq!(unsafe { from_raw_slice(ptr, len) }.len(), n);
    }

    #[test]
    fn empty_slice_is_null() {
        let (ptr, len) = into_raw_slice(Vec::<u8>::new());
        assert!(ptr.is_null());
        assert_eq!(len, 0);
    }
}
