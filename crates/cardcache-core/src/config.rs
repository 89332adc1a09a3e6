//! Cache manager configuration.
//!
//! The version tag and asset lists are an explicit immutable value handed to
//! the manager's constructor, so the policy can be exercised against
//! arbitrary lists without editing source.

/// Store name for the current release. Changing the tag invalidates every
/// previously stored entry at the next activation.
pub const DEFAULT_CACHE_NAME: &str = "phonetic-cards-v2.0";

/// Human-readable app version, for log lines only.
pub const DEFAULT_APP_VERSION: &str = "2.0.0";

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Named cache store identifier, embedding the version tag.
    pub cache_name: String,
    /// App version reported in lifecycle log lines.
    pub app_version: String,
    /// Controlling origin; requests outside it are never intercepted.
    pub origin: String,
    /// Install-time critical subset: the application shell. Cached
    /// all-or-nothing before the new version may take over.
    pub shell_assets: Vec<String>,
    /// The full intended static list, logged when the install batch fails.
    pub static_assets: Vec<String>,
    /// Post-activation best-effort list (icons, the manager script itself).
    pub warmup_assets: Vec<String>,
}

impl CacheConfig {
    /// Flashcard app defaults for the given origin.
    pub fn for_origin(origin: impl Into<String>) -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            origin: origin.into(),
            shell_assets: vec!["./index.html".to_string(), "./manifest.json".to_string()],
            static_assets: vec![
                "./index.html".to_string(),
                "./manifest.json".to_string(),
                "./service-worker.js".to_string(),
                "./images/icon-192.png".to_string(),
                "./images/icon-512.png".to_string(),
            ],
            warmup_assets: vec![
                "./images/icon-192.png".to_string(),
                "./images/icon-512.png".to_string(),
                "./service-worker.js".to_string(),
            ],
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::for_origin("http://localhost:8080")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_is_subset_of_static_list() {
        let config = CacheConfig::default();
        for asset in &config.shell_assets {
            assert!(
                config.static_assets.contains(asset),
                "shell asset {} missing from static list",
                asset
            );
        }
    }

    #[test]
    fn test_default_version_tag() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_name, "phonetic-cards-v2.0");
        assert!(!config.warmup_assets.is_empty());
    }
}
