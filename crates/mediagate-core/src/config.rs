//! Configuration module
//!
//! Environment-driven configuration for the gateway. Loaded once at startup
//! via [`Config::from_env`] and treated as read-only for the process
//! lifetime. Validation is fail-fast: a missing public search-path list or a
//! weak service token aborts startup instead of failing at first request.
//!
//! S3 credentials are not held here; the storage backend reads the standard
//! `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` variables itself.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_UPLOAD_GRANT_TTL_SECS: u64 = 900;
const DEFAULT_MAX_UPLOAD_SIZE_MB: u64 = 10;
const DEFAULT_MAX_AVATAR_SIZE_MB: u64 = 1;
const MIN_SERVICE_TOKEN_LEN: usize = 32;

const DEFAULT_IMAGE_CONTENT_TYPES: &str = "image/jpeg,image/png,image/webp,image/gif";
const DEFAULT_POST_CONTENT_TYPES: &str =
    "image/jpeg,image/png,image/webp,image/gif,video/mp4,video/webm,video/quicktime";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_json: bool,
    /// Bearer token for service-to-service authentication.
    pub service_token: String,
    pub storage_backend: StorageBackend,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...).
    pub s3_endpoint: Option<String>,
    /// Ordered list of `/bucket/prefix` roots searched by public resolution.
    pub public_search_paths: Vec<String>,
    /// `/bucket/prefix` root for private objects.
    pub private_object_root: String,
    /// Absolute URL prefix stripped when normalizing legacy object URLs.
    pub storage_public_base_url: Option<String>,
    pub upload_grant_ttl_secs: u64,
    pub max_upload_bytes: u64,
    pub max_avatar_bytes: u64,
    pub product_content_types: Vec<String>,
    pub profile_content_types: Vec<String>,
    pub post_content_types: Vec<String>,
    /// Run the storage write/read/delete round trip at startup.
    pub startup_diagnostics: bool,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// First public search path; generated uploads land under it.
    pub fn primary_public_root(&self) -> &str {
        &self.public_search_paths[0]
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse::<StorageBackend>()?;

        let public_search_paths = env::var("PUBLIC_OBJECT_SEARCH_PATHS")
            .map_err(|_| {
                anyhow::anyhow!(
                    "PUBLIC_OBJECT_SEARCH_PATHS must be set (comma-separated /bucket/prefix list)"
                )
            })?
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let private_object_root = env::var("PRIVATE_OBJECT_ROOT")
            .map_err(|_| anyhow::anyhow!("PRIVATE_OBJECT_ROOT must be set (/bucket/prefix)"))?
            .trim()
            .trim_end_matches('/')
            .to_string();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            environment,
            log_json: env::var("LOG_FORMAT")
                .map(|s| s.to_lowercase() == "json")
                .unwrap_or(false),
            service_token: env::var("SERVICE_API_TOKEN")
                .map_err(|_| anyhow::anyhow!("SERVICE_API_TOKEN must be set for authentication"))?,
            storage_backend,
            s3_region: env::var("S3_REGION").ok().or(env::var("AWS_REGION").ok()),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            public_search_paths,
            private_object_root,
            storage_public_base_url: env::var("STORAGE_PUBLIC_BASE_URL")
                .ok()
                .map(|s| s.trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
            upload_grant_ttl_secs: env::var("UPLOAD_GRANT_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_GRANT_TTL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_UPLOAD_GRANT_TTL_SECS),
            max_upload_bytes: parse_mb_env("MAX_UPLOAD_SIZE_MB", DEFAULT_MAX_UPLOAD_SIZE_MB),
            max_avatar_bytes: parse_mb_env("MAX_AVATAR_SIZE_MB", DEFAULT_MAX_AVATAR_SIZE_MB),
            product_content_types: parse_type_list_env(
                "PRODUCT_CONTENT_TYPES",
                DEFAULT_IMAGE_CONTENT_TYPES,
            ),
            profile_content_types: parse_type_list_env(
                "PROFILE_CONTENT_TYPES",
                DEFAULT_IMAGE_CONTENT_TYPES,
            ),
            post_content_types: parse_type_list_env(
                "POST_CONTENT_TYPES",
                DEFAULT_POST_CONTENT_TYPES,
            ),
            startup_diagnostics: env::var("STARTUP_DIAGNOSTICS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.service_token.len() < MIN_SERVICE_TOKEN_LEN {
            return Err(anyhow::anyhow!(
                "SERVICE_API_TOKEN must be at least {} characters long",
                MIN_SERVICE_TOKEN_LEN
            ));
        }

        if self.public_search_paths.is_empty() {
            return Err(anyhow::anyhow!(
                "PUBLIC_OBJECT_SEARCH_PATHS must contain at least one /bucket/prefix entry"
            ));
        }
        for path in &self.public_search_paths {
            validate_object_root("PUBLIC_OBJECT_SEARCH_PATHS", path)?;
        }
        validate_object_root("PRIVATE_OBJECT_ROOT", &self.private_object_root)?;

        if self.storage_backend == StorageBackend::S3 && self.s3_region.is_none() {
            return Err(anyhow::anyhow!(
                "S3_REGION or AWS_REGION must be set when using the S3 storage backend"
            ));
        }

        if self.upload_grant_ttl_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_GRANT_TTL_SECS must be positive"));
        }
        if self.max_upload_bytes == 0 || self.max_avatar_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be positive"));
        }
        if self.max_avatar_bytes > self.max_upload_bytes {
            return Err(anyhow::anyhow!(
                "MAX_AVATAR_SIZE_MB must not exceed MAX_UPLOAD_SIZE_MB"
            ));
        }

        if self.product_content_types.is_empty()
            || self.profile_content_types.is_empty()
            || self.post_content_types.is_empty()
        {
            return Err(anyhow::anyhow!(
                "Category content-type allow-lists must not be empty"
            ));
        }

        Ok(())
    }
}

fn parse_mb_env(name: &str, default_mb: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default_mb)
        * 1024
        * 1024
}

fn parse_type_list_env(name: &str, default: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A storage root must be `/bucket` or `/bucket/prefix`, with a non-empty
/// bucket segment and no traversal components.
fn validate_object_root(name: &str, value: &str) -> Result<(), anyhow::Error> {
    let rest = value.strip_prefix('/').ok_or_else(|| {
        anyhow::anyhow!("{} entry {:?} must start with '/' (got a relative path)", name, value)
    })?;
    let bucket = rest.split('/').next().unwrap_or("");
    if bucket.is_empty() {
        return Err(anyhow::anyhow!(
            "{} entry {:?} is missing a bucket segment",
            name,
            value
        ));
    }
    if rest.split('/').any(|seg| seg == "..") {
        return Err(anyhow::anyhow!(
            "{} entry {:?} must not contain '..' segments",
            name,
            value
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            log_json: false,
            service_token: "0123456789abcdef0123456789abcdef".to_string(),
            storage_backend: StorageBackend::Memory,
            s3_region: None,
            s3_endpoint: None,
            public_search_paths: vec!["/media-bucket/public".to_string()],
            private_object_root: "/media-bucket/.private".to_string(),
            storage_public_base_url: None,
            upload_grant_ttl_secs: 900,
            max_upload_bytes: 10 * 1024 * 1024,
            max_avatar_bytes: 1024 * 1024,
            product_content_types: vec!["image/png".to_string()],
            profile_content_types: vec!["image/png".to_string()],
            post_content_types: vec!["image/png".to_string(), "video/mp4".to_string()],
            startup_diagnostics: false,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_production_rejects_wildcard_cors() {
        let mut config = valid_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.cors_origins = vec!["https://app.example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_token_rejected() {
        let mut config = valid_config();
        config.service_token = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_search_paths_rejected() {
        let mut config = valid_config();
        config.public_search_paths.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_roots_rejected() {
        let mut config = valid_config();
        config.private_object_root = "no-leading-slash".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.public_search_paths = vec!["/bucket/../escape".to_string()];
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.public_search_paths = vec!["//double".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_backend_requires_region() {
        let mut config = valid_config();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.s3_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_avatar_cap_must_fit_general_cap() {
        let mut config = valid_config();
        config.max_avatar_bytes = config.max_upload_bytes + 1;
        assert!(config.validate().is_err());
    }
}
