//! Upload categories and their policy limits.
//!
//! Every gateway upload targets exactly one category; a category carries a
//! hard byte cap and a MIME allow-list. Both come from configuration and are
//! read-only for the process lifetime.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::config::Config;

pub const MIB: u64 = 1024 * 1024;

/// Default hard cap for uploads, 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * MIB;
/// Tighter cap for profile avatars, 1 MiB; clients are expected to
/// pre-compress avatars.
pub const DEFAULT_MAX_AVATAR_BYTES: u64 = MIB;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum UploadCategory {
    Product,
    Profile,
    Post,
}

impl UploadCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadCategory::Product => "product",
            UploadCategory::Profile => "profile",
            UploadCategory::Post => "post",
        }
    }
}

impl FromStr for UploadCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "product" => Ok(UploadCategory::Product),
            "profile" => Ok(UploadCategory::Profile),
            "post" => Ok(UploadCategory::Post),
            _ => Err(anyhow::anyhow!("Invalid upload category: {}", s)),
        }
    }
}

impl Display for UploadCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category byte caps and MIME allow-lists, resolved once from config.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_upload_bytes: u64,
    max_avatar_bytes: u64,
    product_types: Vec<String>,
    profile_types: Vec<String>,
    post_types: Vec<String>,
}

impl UploadPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            max_avatar_bytes: config.max_avatar_bytes,
            product_types: config.product_content_types.clone(),
            profile_types: config.profile_content_types.clone(),
            post_types: config.post_content_types.clone(),
        }
    }

    /// Hard byte cap for a category. Profile uploads use the avatar cap,
    /// which is never allowed to exceed the general cap.
    pub fn max_bytes(&self, category: UploadCategory) -> u64 {
        match category {
            UploadCategory::Profile => self.max_avatar_bytes.min(self.max_upload_bytes),
            _ => self.max_upload_bytes,
        }
    }

    pub fn allowed_types(&self, category: UploadCategory) -> &[String] {
        match category {
            UploadCategory::Product => &self.product_types,
            UploadCategory::Profile => &self.profile_types,
            UploadCategory::Post => &self.post_types,
        }
    }

    /// Checks a declared MIME type against the category allow-list.
    /// Parameters (`; charset=...`) are ignored; comparison is
    /// case-insensitive.
    pub fn is_type_allowed(&self, category: UploadCategory, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        if essence.is_empty() {
            return false;
        }
        self.allowed_types(category).iter().any(|t| *t == essence)
    }
}
