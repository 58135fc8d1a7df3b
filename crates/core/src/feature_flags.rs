//! Feature flag keys and effective-value resolution.
//!
//! A flag has a global default. A package may include a flag, turning it on
//! for every event on that package. A host or admin may override a flag for
//! a single event, which wins over everything else.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Maximum length of a flag key.
pub const MAX_KEY_LENGTH: usize = 64;

/// Keys of the seeded flags the server itself checks.
pub mod keys {
    pub const VIDEO_UPLOADS: &str = "video_uploads";
    pub const DOWNLOADS: &str = "downloads";
    pub const GUESTBOOK: &str = "guestbook";
    pub const FACE_SEARCH: &str = "face_search";
    pub const MOSAIC_WALL: &str = "mosaic_wall";
    pub const DRAWBOT: &str = "drawbot";
    pub const SPINNER: &str = "spinner";
}

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)*$").expect("valid flag regex"));

/// Validate a flag key (`snake_case`, starts with a letter).
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() || key.len() > MAX_KEY_LENGTH {
        return Err(format!(
            "Feature flag key must be 1 to {MAX_KEY_LENGTH} characters"
        ));
    }
    if !KEY_RE.is_match(key) {
        return Err(format!("Feature flag key '{key}' must be snake_case"));
    }
    Ok(())
}

/// Where an effective value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSource {
    Override,
    Package,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveFlag {
    pub key: String,
    pub enabled: bool,
    pub source: FlagSource,
}

/// Resolve one flag.
pub fn resolve(
    default_enabled: bool,
    included_in_package: bool,
    override_value: Option<bool>,
) -> (bool, FlagSource) {
    match override_value {
        Some(enabled) => (enabled, FlagSource::Override),
        None if included_in_package => (true, FlagSource::Package),
        None => (default_enabled, FlagSource::Default),
    }
}

/// Resolve every known flag for an event, sorted by key.
///
/// Overrides and package entries for keys that are not globally defined
/// are ignored.
pub fn resolve_all(
    defaults: &[(String, bool)],
    package_features: &HashSet<String>,
    overrides: &HashMap<String, bool>,
) -> Vec<EffectiveFlag> {
    let sorted: BTreeMap<&str, bool> = defaults.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    sorted
        .into_iter()
        .map(|(key, default_enabled)| {
            let (enabled, source) = resolve(
                default_enabled,
                package_features.contains(key),
                overrides.get(key).copied(),
            );
            EffectiveFlag {
                key: key.to_string(),
                enabled,
                source,
            }
        })
        .collect()
}

/// Extract the included feature keys from a package's `features` JSON list.
/// Non-string entries are skipped.
pub fn package_feature_set(features: &serde_json::Value) -> HashSet<String> {
    features
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_validation() {
        assert!(validate_key("face_search").is_ok());
        assert!(validate_key("mosaic2").is_ok());
        assert!(validate_key("FaceSearch").is_err());
        assert!(validate_key("_hidden").is_err());
        assert!(validate_key("double__underscore").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key(&"a".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn override_wins() {
        assert_eq!(resolve(true, true, Some(false)), (false, FlagSource::Override));
        assert_eq!(resolve(false, false, Some(true)), (true, FlagSource::Override));
    }

    #[test]
    fn package_enables_flag() {
        assert_eq!(resolve(false, true, None), (true, FlagSource::Package));
    }

    #[test]
    fn default_applies_last() {
        assert_eq!(resolve(true, false, None), (true, FlagSource::Default));
        assert_eq!(resolve(false, false, None), (false, FlagSource::Default));
    }

    #[test]
    fn resolve_all_is_sorted_and_ignores_unknown_keys() {
        let defaults = vec![
            ("mosaic_wall".to_string(), false),
            ("drawbot".to_string(), false),
            ("downloads".to_string(), true),
        ];
        let package = package_feature_set(&json!(["mosaic_wall", "unknown", 5]));
        let overrides = HashMap::from([
            ("downloads".to_string(), false),
            ("ghost".to_string(), true),
        ]);

        let flags = resolve_all(&defaults, &package, &overrides);
        let keys: Vec<_> = flags.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["downloads", "drawbot", "mosaic_wall"]);
        assert_eq!(flags[0].source, FlagSource::Override);
        assert!(!flags[0].enabled);
        assert_eq!(flags[1].source, FlagSource::Default);
        assert_eq!(flags[2].source, FlagSource::Package);
        assert!(flags[2].enabled);
    }

    #[test]
    fn package_feature_set_handles_non_arrays() {
        assert!(package_feature_set(&json!(null)).is_empty());
        assert!(package_feature_set(&json!({"a": 1})).is_empty());
    }
}
