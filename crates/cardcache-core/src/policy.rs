//! Pure URL policy functions.
//!
//! Two decisions drive the interception policy and both are plain functions
//! of the URL string: whether a successful response should be persisted
//! opportunistically, and what fallback to synthesize when the network
//! fails entirely.

use reqwest::StatusCode;

use crate::http::Response;

/// Inline placeholder served in place of images that cannot be fetched.
const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300"><rect width="100%" height="100%" fill="#f8f9fa"/><text x="50%" y="50%" text-anchor="middle" fill="#666" font-family="Arial">image unavailable offline</text></svg>"##;

const AUDIO_FALLBACK_BODY: &str = "audio unavailable offline";
const GENERIC_FALLBACK_BODY: &str = "network unavailable";

/// Should a successful (200) response for this URL be persisted into the
/// cache store after delivery?
pub fn is_runtime_cache_candidate(url: &str) -> bool {
    url.contains("/images/")
        || url.contains("/audio/")
        || url.ends_with(".html")
        || url.ends_with(".js")
        || url.ends_with(".json")
}

/// Class of fallback synthesized when a network request fails outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// Image extensions get a placeholder graphic with a success status.
    Image,
    /// Audio extensions get a not-found status with a short explanation.
    Audio,
    /// Everything else, including failing pages and scripts, gets a
    /// service-unavailable status.
    Generic,
}

/// Classify a failing request by its URL extension. Case-insensitive.
pub fn fallback_kind(url: &str) -> FallbackKind {
    match extension(url).as_deref() {
        Some("jpg") | Some("jpeg") | Some("png") | Some("gif") => FallbackKind::Image,
        Some("mp3") | Some("wav") => FallbackKind::Audio,
        _ => FallbackKind::Generic,
    }
}

/// Synthesize the offline fallback response for a failing request.
pub fn fallback_response(url: &str) -> Response {
    match fallback_kind(url) {
        FallbackKind::Image => Response::new(
            StatusCode::OK,
            Some("image/svg+xml".to_string()),
            PLACEHOLDER_SVG.as_bytes().to_vec(),
        ),
        FallbackKind::Audio => Response::new(
            StatusCode::NOT_FOUND,
            Some("text/plain".to_string()),
            AUDIO_FALLBACK_BODY.as_bytes().to_vec(),
        ),
        FallbackKind::Generic => Response::new(
            StatusCode::SERVICE_UNAVAILABLE,
            Some("text/plain".to_string()),
            GENERIC_FALLBACK_BODY.as_bytes().to_vec(),
        ),
    }
}

/// Lowercased extension of the final path segment, if any.
fn extension(url: &str) -> Option<String> {
    let name = url.rsplit('/').next().unwrap_or(url);
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

// ============================================================================
// Tests
// ============================================================================
