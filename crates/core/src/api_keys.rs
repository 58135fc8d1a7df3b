//! API key generation, hashing and scope checks.
//!
//! Keys are handed to booth hardware (drawbots, spinners) and third-party
//! integrations. Only the SHA-256 hash is persisted; the plaintext is shown
//! exactly once at creation or rotation time.

use rand::Rng;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fixed prefix marking a string as a Gästefotos API key.
pub const KEY_MARKER: &str = "gf_";

/// Number of random alphanumeric characters following [`KEY_MARKER`].
pub const KEY_RANDOM_LENGTH: usize = 40;

/// Number of leading characters stored as a human-visible prefix
/// (marker included).
pub const KEY_PREFIX_LENGTH: usize = 11;

/// Default requests-per-minute limit for read operations.
pub const DEFAULT_RATE_LIMIT_READ: i32 = 120;

/// Default requests-per-minute limit for write operations.
pub const DEFAULT_RATE_LIMIT_WRITE: i32 = 30;

/// Upper bound accepted for either per-minute limit.
pub const MAX_RATE_LIMIT_PER_MIN: i32 = 10_000;

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// Known API key scope names.
pub mod scopes {
    pub const EVENTS_READ: &str = "events:read";
    pub const PHOTOS_READ: &str = "photos:read";
    pub const PHOTOS_WRITE: &str = "photos:write";
    pub const BOOTH_READ: &str = "booth:read";
    pub const BOOTH_WRITE: &str = "booth:write";

    pub const ALL: &[&str] = &[EVENTS_READ, PHOTOS_READ, PHOTOS_WRITE, BOOTH_READ, BOOTH_WRITE];
}

/// Check whether a scope name is recognised.
pub fn is_valid_scope(scope: &str) -> bool {
    scopes::ALL.contains(&scope)
}

/// Validate a requested scope list: non-empty, known names, no duplicates.
pub fn validate_scopes(requested: &[String]) -> Result<(), String> {
    if requested.is_empty() {
        return Err("At least one scope is required".to_string());
    }
    for (i, scope) in requested.iter().enumerate() {
        if !is_valid_scope(scope) {
            return Err(format!(
                "Unknown scope '{scope}'. Valid scopes: {}",
                scopes::ALL.join(", ")
            ));
        }
        if requested[..i].contains(scope) {
            return Err(format!("Duplicate scope '{scope}'"));
        }
    }
    Ok(())
}

/// Whether a granted scope list satisfies `required`.
///
/// A `:write` scope implies the matching `:read` scope.
pub fn scope_allows(granted: &[String], required: &str) -> bool {
    if granted.iter().any(|g| g == required) {
        return true;
    }
    match required.strip_suffix(":read") {
        Some(resource) => {
            let write = format!("{resource}:write");
            granted.iter().any(|g| *g == write)
        }
        None => false,
    }
}

/// Validate a per-minute limit value.
pub fn validate_rate_limit(value: i32) -> Result<(), String> {
    if !(1..=MAX_RATE_LIMIT_PER_MIN).contains(&value) {
        return Err(format!(
            "Rate limit {value} must be between 1 and {MAX_RATE_LIMIT_PER_MIN}"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// API key generation
// ---------------------------------------------------------------------------

/// The result of generating a new API key.
pub struct GeneratedApiKey {
    /// The plaintext key (shown to the user exactly once, never stored).
    pub plaintext: String,
    /// The first [`KEY_PREFIX_LENGTH`] characters of the key for display.
    pub prefix: String,
    /// The SHA-256 hex digest of the plaintext key (stored in the database).
    pub hash: String,
}

/// Generate a new random API key.
pub fn generate_api_key() -> GeneratedApiKey {
    let random: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(KEY_RANDOM_LENGTH)
        .map(char::from)
        .collect();
    let key = format!("{KEY_MARKER}{random}");

    let prefix = extract_prefix(&key).to_string();
    let hash = hash_api_key(&key);

    GeneratedApiKey {
        plaintext: key,
        prefix,
        hash,
    }
}

/// Compute the SHA-256 hex digest of an API key.
pub fn hash_api_key(key: &str) -> String {
    crate::hashing::sha256_hex(key.as_bytes())
}

/// Extract the display prefix from a plaintext API key.
pub fn extract_prefix(key: &str) -> &str {
    &key[..KEY_PREFIX_LENGTH.min(key.len())]
}

/// Cheap shape check run before any database lookup.
pub fn looks_like_api_key(candidate: &str) -> bool {
    candidate.len() == KEY_MARKER.len() + KEY_RANDOM_LENGTH
        && candidate.starts_with(KEY_MARKER)
        && candidate[KEY_MARKER.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(scopes: &[&str]) -> Vec<String> {
        scopes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn generated_key_has_marker_and_length() {
        let key = generate_api_key();
        assert!(key.plaintext.starts_with(KEY_MARKER));
        assert_eq!(key.plaintext.len(), KEY_MARKER.len() + KEY_RANDOM_LENGTH);
        assert!(looks_like_api_key(&key.plaintext));
    }

    #[test]
    fn generated_key_prefix_matches_start() {
        let key = generate_api_key();
        assert_eq!(&key.plaintext[..KEY_PREFIX_LENGTH], key.prefix);
    }

    #[test]
    fn hash_matches_regeneration() {
        let key = generate_api_key();
        assert_eq!(key.hash, hash_api_key(&key.plaintext));
        assert_eq!(key.hash.len(), 64);
    }

    #[test]
    fn different_keys_produce_different_hashes() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn extract_prefix_handles_short_key() {
        assert_eq!(extract_prefix("gf_a"), "gf_a");
    }

    #[test]
    fn malformed_keys_are_rejected_early() {
        assert!(!looks_like_api_key(""));
        assert!(!looks_like_api_key("gf_short"));
        let wrong_marker = format!("xx_{}", "a".repeat(KEY_RANDOM_LENGTH));
        assert!(!looks_like_api_key(&wrong_marker));
        let bad_char = format!("gf_{}!", "a".repeat(KEY_RANDOM_LENGTH - 1));
        assert!(!looks_like_api_key(&bad_char));
    }

    #[test]
    fn scope_validation() {
        assert!(validate_scopes(&owned(&["booth:write"])).is_ok());
        assert!(validate_scopes(&[]).is_err());
        assert!(validate_scopes(&owned(&["admin:all"])).is_err());
        assert!(validate_scopes(&owned(&["booth:read", "booth:read"])).is_err());
    }

    #[test]
    fn write_scope_implies_read() {
        let granted = owned(&["booth:write"]);
        assert!(scope_allows(&granted, "booth:read"));
        assert!(scope_allows(&granted, "booth:write"));
        assert!(!scope_allows(&granted, "photos:read"));
    }

    #[test]
    fn read_scope_does_not_imply_write() {
        let granted = owned(&["photos:read"]);
        assert!(!scope_allows(&granted, "photos:write"));
    }

    #[test]
    fn rate_limit_bounds() {
        assert!(validate_rate_limit(1).is_ok());
        assert!(validate_rate_limit(MAX_RATE_LIMIT_PER_MIN).is_ok());
        assert!(validate_rate_limit(0).is_err());
        assert!(validate_rate_limit(MAX_RATE_LIMIT_PER_MIN + 1).is_err());
    }
}
