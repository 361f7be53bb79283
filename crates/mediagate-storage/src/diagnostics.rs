use mediagate_core::StorageBackend;
use serde::Serialize;
use uuid::Uuid;

use crate::resolver::parse_object_path;
use crate::traits::Storage;

const PROBE_CONTENT: &[u8] = b"mediagate storage diagnostics probe";
const PROBE_CONTENT_TYPE: &str = "text/plain";

/// Outcome of the storage self-test. Failures land in `issues` with matching
/// `recommendations`; the function itself never returns an error so a health
/// probe cannot crash the caller.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub backend: StorageBackend,
    pub bucket_exists: bool,
    pub can_write: bool,
    pub can_read: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DiagnosticsReport {
    pub fn healthy(&self) -> bool {
        self.bucket_exists && self.can_write && self.can_read
    }
}

/// Verify the configured credentials actually work end to end.
///
/// A bucket-existence call alone is not trusted: restricted credentials can
/// make it lie in both directions. The probe writes a throwaway object under
/// `{root}/.diagnostics/`, reads it back, compares content, and deletes it.
pub async fn run_diagnostics(storage: &dyn Storage, root: &str) -> DiagnosticsReport {
    let mut report = DiagnosticsReport {
        backend: storage.backend_type(),
        bucket_exists: false,
        can_write: false,
        can_read: false,
        issues: Vec::new(),
        recommendations: Vec::new(),
    };

    let base = match parse_object_path(root) {
        Ok(base) => base,
        Err(e) => {
            report.issues.push(format!("storage root {:?} is malformed: {}", root, e));
            report
                .recommendations
                .push("Set the root to a /bucket/prefix style path".to_string());
            return report;
        }
    };

    match storage.bucket_exists(&base.bucket).await {
        Ok(true) => report.bucket_exists = true,
        Ok(false) => {
            report
                .issues
                .push(format!("bucket {:?} does not exist or is unreachable", base.bucket));
            report.recommendations.push(format!(
                "Create bucket {:?} or point the path roots at an existing one",
                base.bucket
            ));
        }
        Err(e) => {
            report
                .issues
                .push(format!("bucket check for {:?} failed: {}", base.bucket, e));
            report
                .recommendations
                .push("Verify storage credentials and endpoint configuration".to_string());
        }
    }

    // The round trip is the ground truth; run it even when the bucket check
    // came back negative.
    let probe = base.child(format!(".diagnostics/{}", Uuid::new_v4()));

    match storage
        .save(&probe, PROBE_CONTENT_TYPE, PROBE_CONTENT.into())
        .await
    {
        Ok(()) => report.can_write = true,
        Err(e) => {
            report.issues.push(format!("probe write failed: {}", e));
            report.recommendations.push(format!(
                "Grant the service account write access to bucket {:?}",
                probe.bucket
            ));
        }
    }

    if report.can_write {
        match read_all(storage, &probe).await {
            Ok(bytes) if bytes == PROBE_CONTENT => report.can_read = true,
            Ok(_) => {
                report
                    .issues
                    .push("probe read returned different content than written".to_string());
                report
                    .recommendations
                    .push("Check for a cache or proxy between the service and storage".to_string());
            }
            Err(e) => {
                report.issues.push(format!("probe read failed: {}", e));
                report.recommendations.push(format!(
                    "Grant the service account read access to bucket {:?}",
                    probe.bucket
                ));
            }
        }

        if let Err(e) = storage.delete(&probe).await {
            tracing::warn!(
                bucket = %probe.bucket,
                key = %probe.key,
                error = %e,
                "failed to remove diagnostics probe object"
            );
            report
                .issues
                .push(format!("probe cleanup failed: {}", e));
        }
    }

    if report.healthy() {
        tracing::info!(backend = %report.backend, "storage diagnostics passed");
    } else {
        tracing::warn!(
            backend = %report.backend,
            issues = ?report.issues,
            "storage diagnostics found problems"
        );
    }

    report
}

async fn read_all(
    storage: &dyn Storage,
    object: &mediagate_core::ObjectRef,
) -> crate::traits::StorageResult<Vec<u8>> {
    use futures::StreamExt;

    let mut stream = storage.read_stream(object, None).await?;
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk?);
    }
    Ok(out)
}
