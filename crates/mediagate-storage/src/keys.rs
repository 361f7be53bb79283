use chrono::Utc;
use mediagate_core::UploadCategory;
use rand::distr::Alphanumeric;
use rand::Rng;

/// Characters of random suffix in generated object names.
const RANDOM_SUFFIX_LEN: usize = 8;

/// Longest extension carried over from a client-supplied file name.
const MAX_EXTENSION_LEN: usize = 10;

/// Longest sanitized file name we will echo back in metadata.
const MAX_FILE_NAME_LEN: usize = 100;

/// Generate a collision-resistant object name for an upload.
///
/// The name is `{unix_millis}-{category}-{random}.{ext}`: sortable by upload
/// time, greppable by category, and never derived from the client-supplied
/// file name beyond its extension.
pub fn generate_object_name(category: UploadCategory, original_file_name: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let random: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();
    let ext = extension_of(original_file_name);
    format!("{}-{}-{}.{}", timestamp, category.as_str(), random, ext)
}

/// Lower-cased alphanumeric extension of `file_name`, or "bin" when the name
/// has none worth keeping.
pub fn extension_of(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(stem, ext)| if stem.is_empty() { "" } else { ext })
        .unwrap_or("");

    let cleaned: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_ascii_lowercase();

    if cleaned.is_empty() {
        "bin".to_string()
    } else {
        cleaned
    }
}

/// Reduce a client-supplied file name to a safe token for logs and metadata.
///
/// Path separators and control characters become underscores, leading dots
/// are stripped so the result can never reference a parent directory, and the
/// whole thing is capped at a sane length.
pub fn sanitize_file_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        return "file".to_string();
    }

    trimmed.chars().take(MAX_FILE_NAME_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_name_carries_category_and_extension() {
        let name = generate_object_name(UploadCategory::Product, "Catalog Shot.JPG");
        let mut parts = name.splitn(3, '-');

        let millis: i64 = parts.next().unwrap().parse().unwrap();
        assert!(millis > 0);
        assert_eq!(parts.next().unwrap(), "product");

        let tail = parts.next().unwrap();
        let (random, ext) = tail.split_once('.').unwrap();
        assert_eq!(random.len(), 8);
        assert!(random.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn object_names_do_not_collide() {
        let a = generate_object_name(UploadCategory::Post, "a.png");
        let b = generate_object_name(UploadCategory::Post, "a.png");
        assert_ne!(a, b);
    }

    #[test]
    fn extension_falls_back_to_bin() {
        assert_eq!(extension_of("noext"), "bin");
        assert_eq!(extension_of(".hidden"), "bin");
        assert_eq!(extension_of("weird.!!"), "bin");
        assert_eq!(extension_of("archive.TAR"), "tar");
    }

    #[test]
    fn sanitize_strips_traversal_and_separators() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("photo name.jpg"), "photo_name.jpg");
        assert_eq!(sanitize_file_name("...."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "a".repeat(500);
        assert_eq!(sanitize_file_name(&long).len(), 100);
    }
}
