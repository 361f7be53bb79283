//! Cache policy engine.
//!
//! Derives HTTP caching directives from a content type and a visibility. This
//! is the only place caching headers are computed; handlers render the result
//! verbatim and never assemble `Cache-Control` strings themselves.

/// Whether a response may be stored by shared caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    fn token(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

const DAY_SECS: u64 = 86_400;

/// Freshness window for images, one day.
const IMAGE_MAX_AGE: u64 = DAY_SECS;
/// Fonts effectively never change once deployed, thirty days and immutable.
const FONT_MAX_AGE: u64 = 30 * DAY_SECS;
/// Video freshness, seven days. Stale-if-error doubles it so a transient
/// backend failure does not interrupt playback.
const VIDEO_MAX_AGE: u64 = 7 * DAY_SECS;
/// Conservative fallback for everything else, one hour.
const DEFAULT_MAX_AGE: u64 = 3_600;

/// A derived caching decision. Computed per response, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirective {
    pub max_age_seconds: u64,
    pub stale_while_revalidate_seconds: u64,
    pub stale_if_error_seconds: Option<u64>,
    pub immutable: bool,
    pub visibility: Visibility,
}

impl CacheDirective {
    /// Derive the directive for a content type and visibility.
    ///
    /// Tiering: images one day, fonts thirty days and immutable, video seven
    /// days with a stale-if-error allowance of twice the freshness window,
    /// everything else a conservative default. `stale-while-revalidate` is
    /// always a tenth of `max-age`.
    pub fn derive(content_type: &str, visibility: Visibility) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        let (max_age, immutable, stale_if_error) = if essence.starts_with("image/") {
            (IMAGE_MAX_AGE, false, None)
        } else if essence.starts_with("font/") {
            (FONT_MAX_AGE, true, None)
        } else if essence.starts_with("video/") {
            (VIDEO_MAX_AGE, false, Some(2 * VIDEO_MAX_AGE))
        } else {
            (DEFAULT_MAX_AGE, false, None)
        };

        Self {
            max_age_seconds: max_age,
            stale_while_revalidate_seconds: max_age / 10,
            stale_if_error_seconds: stale_if_error,
            immutable,
            visibility,
        }
    }

    /// Render into standard `Cache-Control` vocabulary.
    pub fn render(&self) -> String {
        let mut value = format!(
            "{}, max-age={}",
            self.visibility.token(),
            self.max_age_seconds
        );
        if self.immutable {
            value.push_str(", immutable");
        }
        value.push_str(&format!(
            ", stale-while-revalidate={}",
            self.stale_while_revalidate_seconds
        ));
        if let Some(sie) = self.stale_if_error_seconds {
            value.push_str(&format!(", stale-if-error={}", sie));
        }
        value
    }
}
