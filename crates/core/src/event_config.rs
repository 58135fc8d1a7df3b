//! Validation of the per-event JSON configuration blobs.
//!
//! Events carry two free-form JSON columns: `design_config` (how the guest
//! gallery looks) and `feature_config` (what guests may do). Both are parsed
//! into typed structs with unknown keys rejected, then range-checked. All
//! violations are collected so the client can fix them in one round trip.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum length of the gallery welcome text.
pub const MAX_WELCOME_TEXT_LENGTH: usize = 500;

/// Bounds for `max_uploads_per_guest`.
pub const MIN_UPLOADS_PER_GUEST: i32 = 1;
pub const MAX_UPLOADS_PER_GUEST: i32 = 1000;

/// Recognised gallery layouts.
pub const LAYOUTS: &[&str] = &["grid", "masonry", "carousel"];

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid colour regex"));

// ---------------------------------------------------------------------------
// Design config
// ---------------------------------------------------------------------------

/// Visual configuration of the guest gallery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo_id: Option<i64>,
}

impl DesignConfig {
    /// Range and format checks on an already-parsed config.
    pub fn check(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("primary_color", &self.primary_color),
            ("accent_color", &self.accent_color),
        ] {
            if let Some(color) = value {
                if !HEX_COLOR_RE.is_match(color) {
                    errors.push(format!("{field} must be a #RRGGBB colour, got '{color}'"));
                }
            }
        }
        if let Some(layout) = &self.layout {
            if !LAYOUTS.contains(&layout.as_str()) {
                errors.push(format!(
                    "layout must be one of {}, got '{layout}'",
                    LAYOUTS.join(", ")
                ));
            }
        }
        if let Some(text) = &self.welcome_text {
            if text.chars().count() > MAX_WELCOME_TEXT_LENGTH {
                errors.push(format!(
                    "welcome_text must be at most {MAX_WELCOME_TEXT_LENGTH} characters"
                ));
            }
        }
        if let Some(id) = self.cover_photo_id {
            if id <= 0 {
                errors.push("cover_photo_id must be a positive id".to_string());
            }
        }
        errors
    }
}

// ---------------------------------------------------------------------------
// Feature config
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// Guest-facing feature switches of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureConfig {
    #[serde(default = "default_true")]
    pub allow_uploads: bool,
    #[serde(default = "default_true")]
    pub allow_videos: bool,
    #[serde(default)]
    pub moderation_required: bool,
    #[serde(default = "default_true")]
    pub allow_downloads: bool,
    #[serde(default)]
    pub guestbook_enabled: bool,
    #[serde(default)]
    pub drawbot_enabled: bool,
    #[serde(default)]
    pub spinner_enabled: bool,
    #[serde(default)]
    pub mosaic_enabled: bool,
    #[serde(default)]
    pub face_search_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uploads_per_guest: Option<i32>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            allow_uploads: true,
            allow_videos: true,
            moderation_required: false,
            allow_downloads: true,
            guestbook_enabled: false,
            drawbot_enabled: false,
            spinner_enabled: false,
            mosaic_enabled: false,
            face_search_enabled: false,
            max_uploads_per_guest: None,
        }
    }
}

impl FeatureConfig {
    pub fn check(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(max) = self.max_uploads_per_guest {
            if !(MIN_UPLOADS_PER_GUEST..=MAX_UPLOADS_PER_GUEST).contains(&max) {
                errors.push(format!(
                    "max_uploads_per_guest must be between {MIN_UPLOADS_PER_GUEST} and {MAX_UPLOADS_PER_GUEST}"
                ));
            }
        }
        errors
    }

    /// Parse a stored blob, falling back to defaults for rows written before
    /// a field existed or with corrupted content.
    pub fn from_stored(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

fn parse_and_check<T, F>(name: &str, value: &serde_json::Value, check: F) -> Result<T, String>
where
    T: for<'de> Deserialize<'de>,
    F: Fn(&T) -> Vec<String>,
{
    if !value.is_object() {
        return Err(format!("{name} must be a JSON object"));
    }
    let parsed: T =
        serde_json::from_value(value.clone()).map_err(|e| format!("{name}: {e}"))?;
    let errors = check(&parsed);
    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(format!("{name}: {}", errors.join("; ")))
    }
}

/// Validate a `design_config` blob.
pub fn validate_design_config(value: &serde_json::Value) -> Result<DesignConfig, String> {
    parse_and_check("design_config", value, DesignConfig::check)
}

/// Validate a `feature_config` blob.
pub fn validate_feature_config(value: &serde_json::Value) -> Result<FeatureConfig, String> {
    parse_and_check("feature_config", value, FeatureConfig::check)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_objects_use_defaults() {
        let design = validate_design_config(&json!({})).unwrap();
        assert_eq!(design, DesignConfig::default());

        let features = validate_feature_config(&json!({})).unwrap();
        assert!(features.allow_uploads);
        assert!(features.allow_videos);
        assert!(!features.moderation_required);
        assert!(!features.drawbot_enabled);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(validate_design_config(&json!([1, 2])).is_err());
        assert!(validate_feature_config(&json!("on")).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = validate_feature_config(&json!({"allow_everything": true})).unwrap_err();
        assert!(err.contains("allow_everything"), "got: {err}");
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(validate_feature_config(&json!({"allow_uploads": "yes"})).is_err());
    }

    #[test]
    fn all_design_violations_are_reported() {
        let err = validate_design_config(&json!({
            "primary_color": "red",
            "accent_color": "#12345",
            "layout": "spiral",
        }))
        .unwrap_err();
        assert!(err.contains("primary_color"));
        assert!(err.contains("accent_color"));
        assert!(err.contains("layout"));
    }

    #[test]
    fn valid_design_config_passes() {
        let design = validate_design_config(&json!({
            "primary_color": "#AABBCC",
            "layout": "masonry",
            "welcome_text": "Willkommen!",
        }))
        .unwrap();
        assert_eq!(design.layout.as_deref(), Some("masonry"));
    }

    #[test]
    fn welcome_text_length_counts_chars() {
        let ok = "ä".repeat(MAX_WELCOME_TEXT_LENGTH);
        assert!(validate_design_config(&json!({ "welcome_text": ok })).is_ok());
        let too_long = "a".repeat(MAX_WELCOME_TEXT_LENGTH + 1);
        assert!(validate_design_config(&json!({ "welcome_text": too_long })).is_err());
    }

    #[test]
    fn upload_cap_bounds() {
        assert!(validate_feature_config(&json!({"max_uploads_per_guest": 0})).is_err());
        assert!(validate_feature_config(&json!({"max_uploads_per_guest": 50})).is_ok());
        assert!(validate_feature_config(&json!({"max_uploads_per_guest": 1001})).is_err());
    }

    #[test]
    fn stored_garbage_falls_back_to_defaults() {
        let parsed = FeatureConfig::from_stored(&json!({"bogus": 1}));
        assert_eq!(parsed, FeatureConfig::default());
        let parsed = FeatureConfig::from_stored(&json!({"drawbot_enabled": true}));
        assert!(parsed.drawbot_enabled);
    }
}
