use std::path::PathBuf;

use gaestefotos_core::media::MAX_VIDEO_BYTES;

use crate::auth::jwt::JwtConfig;

/// Largest video plus 1 MiB for the other multipart fields and boundaries.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = MAX_VIDEO_BYTES as usize + 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// Defaults suit local development; production overrides via the
/// environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Directory media files are written to and served from.
    pub storage_root: PathBuf,
    /// Request body limit, sized for the largest video upload.
    pub max_upload_bytes: usize,
    /// Requests per minute per client IP on guest write endpoints.
    pub guest_rate_limit_per_min: u32,
    /// Take the client IP from `X-Forwarded-For` / `X-Real-IP`. Only safe
    /// behind a reverse proxy that overwrites these headers.
    pub trust_forwarded_headers: bool,
    /// Upstream for the consent proxy. `None` disables the proxy.
    pub wordpress_consent_url: Option<String>,
    pub rate_limit_sweep_secs: u64,
    /// Initial admin account, created at startup when no admin exists.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                  |
    /// |----------------------------|--------------------------|
    /// | `HOST`                     | `0.0.0.0`                |
    /// | `PORT`                     | `3000`                   |
    /// | `CORS_ORIGINS`             | `http://localhost:3001`  |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                     |
    /// | `STORAGE_ROOT`             | `storage`                |
    /// | `MAX_UPLOAD_BYTES`         | `525336576`              |
    /// | `GUEST_RATE_LIMIT_PER_MIN` | `60`                     |
    /// | `TRUST_FORWARDED_HEADERS`  | `false`                  |
    /// | `WORDPRESS_CONSENT_URL`    | unset                    |
    /// | `RATE_LIMIT_SWEEP_SECS`    | `60`                     |
    /// | `ADMIN_EMAIL` + `ADMIN_PASSWORD` | unset              |
    ///
    /// JWT settings are read by [`JwtConfig`].
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.into());
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST", "0.0.0.0");

        let port: u16 = var("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:3001")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let storage_root = PathBuf::from(var("STORAGE_ROOT", "storage"));

        let max_upload_bytes: usize = var("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let guest_rate_limit_per_min: u32 = var("GUEST_RATE_LIMIT_PER_MIN", "60")
            .parse()
            .expect("GUEST_RATE_LIMIT_PER_MIN must be a valid u32");

        let trust_forwarded_headers: bool = var("TRUST_FORWARDED_HEADERS", "false")
            .parse()
            .expect("TRUST_FORWARDED_HEADERS must be true or false");

        let rate_limit_sweep_secs: u64 = var("RATE_LIMIT_SWEEP_SECS", "60")
            .parse()
            .expect("RATE_LIMIT_SWEEP_SECS must be a valid u64");
        assert!(rate_limit_sweep_secs > 0, "RATE_LIMIT_SWEEP_SECS must be positive");

        let bootstrap_admin = match (non_empty("ADMIN_EMAIL"), non_empty("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => panic!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_lookup(&lookup),
            storage_root,
            max_upload_bytes,
            guest_rate_limit_per_min,
            trust_forwarded_headers,
            wordpress_consent_url: non_empty("WORDPRESS_CONSENT_URL"),
            rate_limit_sweep_secs,
            bootstrap_admin,
        }
    }
}
