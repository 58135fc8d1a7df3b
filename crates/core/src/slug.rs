//! Event slug generation and validation.
//!
//! Slugs are the guest-facing event address (`/e/{slug}`, QR codes), so
//! they stay lowercase ASCII with single hyphens. German umlauts are
//! transliterated rather than dropped.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum slug length in characters.
pub const MAX_SLUG_LENGTH: usize = 60;

/// Minimum slug length in characters.
pub const MIN_SLUG_LENGTH: usize = 3;

/// Fallback base used when a title contains no usable characters.
pub const FALLBACK_SLUG: &str = "event";

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Turn a free-form event title into a slug.
///
/// `"Hochzeit Müller & Söhne 2026"` becomes `"hochzeit-mueller-soehne-2026"`.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for ch in title.chars() {
        let mapped: Option<&str> = match ch {
            'ä' | 'Ä' => Some("ae"),
            'ö' | 'Ö' => Some("oe"),
            'ü' | 'Ü' => Some("ue"),
            'ß' => Some("ss"),
            'é' | 'è' | 'ê' | 'É' | 'È' => Some("e"),
            'á' | 'à' | 'â' | 'Á' | 'À' => Some("a"),
            'ó' | 'ò' | 'ô' => Some("o"),
            'í' | 'ì' | 'î' => Some("i"),
            'ú' | 'ù' | 'û' => Some("u"),
            'ç' => Some("c"),
            'ñ' => Some("n"),
            _ => None,
        };

        let piece = match mapped {
            Some(s) => s.to_string(),
            None if ch.is_ascii_alphanumeric() => ch.to_ascii_lowercase().to_string(),
            None => {
                pending_hyphen = !out.is_empty();
                continue;
            }
        };

        if pending_hyphen {
            out.push('-');
            pending_hyphen = false;
        }
        out.push_str(&piece);
    }

    if out.len() > MAX_SLUG_LENGTH {
        out.truncate(MAX_SLUG_LENGTH);
        while out.ends_with('-') {
            out.pop();
        }
    }

    if out.len() < MIN_SLUG_LENGTH {
        return FALLBACK_SLUG.to_string();
    }
    out
}

/// Append a numeric suffix (`-2`, `-3`, ...) keeping the length bound.
pub fn with_suffix(base: &str, n: u32) -> String {
    let suffix = format!("-{n}");
    let max_base = MAX_SLUG_LENGTH - suffix.len();
    let mut trimmed = base[..base.len().min(max_base)].to_string();
    while trimmed.ends_with('-') {
        trimmed.pop();
    }
    format!("{trimmed}{suffix}")
}

/// Validate a host-supplied slug.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.len() < MIN_SLUG_LENGTH || slug.len() > MAX_SLUG_LENGTH {
        return Err(format!(
            "Slug must be between {MIN_SLUG_LENGTH} and {MAX_SLUG_LENGTH} characters"
        ));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(
            "Slug may only contain lowercase letters, digits and single hyphens".to_string(),
        );
    }
    Ok(())
}
