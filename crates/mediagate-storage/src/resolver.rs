use mediagate_core::ObjectRef;
use percent_encoding::percent_decode_str;

use crate::traits::{Storage, StorageError, StorageResult};

/// Marker every private logical path must start with.
const PRIVATE_PATH_MARKER: &str = "/objects/";

/// Maps logical paths to object references.
///
/// Public resolution walks an ordered list of search roots and takes the
/// first root under which the object actually exists, so operators control
/// precedence by ordering `PUBLIC_OBJECT_SEARCH_PATHS`. Private resolution is
/// purely syntactic; callers probe existence themselves.
pub struct PathResolver {
    search_paths: Vec<String>,
    private_root: String,
    public_base_url: Option<String>,
}

impl PathResolver {
    /// Build a resolver from configured roots. Each root must be a
    /// `/bucket/prefix` style path; malformed roots are rejected here so
    /// resolution never has to re-validate them.
    pub fn new(
        search_paths: Vec<String>,
        private_root: String,
        public_base_url: Option<String>,
    ) -> StorageResult<Self> {
        if search_paths.is_empty() {
            return Err(StorageError::ConfigError(
                "no public search paths configured".to_string(),
            ));
        }
        for root in search_paths.iter().chain(std::iter::once(&private_root)) {
            parse_object_path(root)?;
        }

        Ok(PathResolver {
            search_paths,
            private_root,
            public_base_url,
        })
    }

    pub fn search_paths(&self) -> &[String] {
        &self.search_paths
    }

    pub fn private_root(&self) -> &str {
        &self.private_root
    }

    /// First search root; new public uploads land under this one.
    pub fn primary_public_root(&self) -> &str {
        &self.search_paths[0]
    }

    /// Object reference a public upload of `relative_path` would be written
    /// to. Purely syntactic, no existence check.
    pub fn public_upload_target(&self, relative_path: &str) -> StorageResult<ObjectRef> {
        candidate_for(self.primary_public_root(), relative_path)
    }

    /// Resolve a public logical path by probing each search root in order.
    /// Returns `None` when no root holds the object.
    pub async fn resolve_public(
        &self,
        storage: &dyn Storage,
        logical_path: &str,
    ) -> StorageResult<Option<ObjectRef>> {
        let relative = logical_path.trim_start_matches('/');
        if relative.is_empty() {
            return Err(StorageError::InvalidPath(
                "empty logical path".to_string(),
            ));
        }

        for root in &self.search_paths {
            let candidate = candidate_for(root, relative)?;
            if storage.exists(&candidate).await? {
                return Ok(Some(candidate));
            }
            tracing::debug!(
                root = %root,
                path = %logical_path,
                "no object under search root"
            );
        }
        Ok(None)
    }

    /// Resolve a private logical path (`/objects/...`) to its reference.
    /// Does not probe existence.
    pub fn resolve_private(&self, logical_path: &str) -> StorageResult<ObjectRef> {
        let Some(remainder) = logical_path.strip_prefix(PRIVATE_PATH_MARKER) else {
            return Err(StorageError::InvalidPath(format!(
                "private path must start with {}",
                PRIVATE_PATH_MARKER
            )));
        };
        if remainder.is_empty() {
            return Err(StorageError::InvalidPath(
                "private path names no object".to_string(),
            ));
        }
        candidate_for(&self.private_root, remainder)
    }

    /// Reduce a fully-qualified storage URL (written before this service
    /// fronted the bucket) to a logical path. Keys under the private root map
    /// back to their `/objects/...` form; anything that does not carry the
    /// configured base URL passes through unchanged.
    pub fn normalize_legacy_url(&self, url: &str) -> String {
        let Some(base) = self.public_base_url.as_deref() else {
            return url.to_string();
        };
        let Some(rest) = url.strip_prefix(base.trim_end_matches('/')) else {
            return url.to_string();
        };

        let decoded = percent_decode_str(rest)
            .decode_utf8()
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| rest.to_string());
        let logical = format!("/{}", decoded.trim_start_matches('/'));

        let private_prefix = format!("{}/", self.private_root.trim_end_matches('/'));
        if let Some(id) = logical.strip_prefix(&private_prefix) {
            return format!("{}{}", PRIVATE_PATH_MARKER, id);
        }
        logical
    }
}

/// Parse a `/bucket/key` path into an object reference.
pub fn parse_object_path(path: &str) -> StorageResult<ObjectRef> {
    let trimmed = path.strip_prefix('/').ok_or_else(|| {
        StorageError::InvalidPath(format!("object path must start with '/': {}", path))
    })?;

    let (bucket, key) = trimmed.split_once('/').ok_or_else(|| {
        StorageError::InvalidPath(format!("object path names no key: {}", path))
    })?;

    if bucket.is_empty() || key.is_empty() {
        return Err(StorageError::InvalidPath(format!(
            "object path has empty bucket or key: {}",
            path
        )));
    }
    reject_traversal(key)?;

    Ok(ObjectRef::new(bucket, key))
}

fn candidate_for(root: &str, relative: &str) -> StorageResult<ObjectRef> {
    reject_traversal(relative)?;
    let base = parse_object_path(root)?;
    Ok(ObjectRef::new(
        base.bucket,
        join_collapsing(&base.key, relative),
    ))
}

fn reject_traversal(path: &str) -> StorageResult<()> {
    if path.split('/').any(|seg| seg == "..") {
        return Err(StorageError::InvalidPath(format!(
            "path traversal rejected: {}",
            path
        )));
    }
    Ok(())
}

/// Join a root key and a relative path, collapsing a duplicated boundary
/// segment (root `.../public` + path `public/...` keeps one `public`).
///
/// This exists only because historical writers disagreed about whether the
/// shared segment belonged to the root or the path; keys written since are
/// consistent, but old objects remain reachable through this rule. A key
/// migration would retire it.
fn join_collapsing(root_key: &str, relative: &str) -> String {
    let root_segments: Vec<&str> = root_key.split('/').filter(|s| !s.is_empty()).collect();
    let mut rel_segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();

    if let (Some(last), Some(first)) = (root_segments.last(), rel_segments.first()) {
        if last == first {
            rel_segments.remove(0);
        }
    }

    let mut joined = root_segments;
    joined.extend(rel_segments);
    joined.join("/")
}
