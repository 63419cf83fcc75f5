//! Image harvesting: pull candidate photo URLs out of a scraped page and
//! keep only plausible property photography.
//!
//! Listing pages are noisy with decorative and third-party imagery, and
//! portal markup varies too much for any single signal to be reliable.
//! The filter therefore combines a substring blocklist (UI chrome,
//! tracking, social assets) with an inclusion heuristic (raster extension
//! or media-CDN-shaped path).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Output never exceeds this many URLs.
pub const MAX_IMAGES: usize = 10;

static MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)\s]+)").unwrap());

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img[^>]*\ssrc\s*=\s*["']([^"']+)["']"#).unwrap());

// Both attribute orders occur in the wild.
static OG_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]*property\s*=\s*["']og:image["'][^>]*content\s*=\s*["']([^"']+)["']"#,
    )
    .unwrap()
});
static OG_IMAGE_REVERSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]*content\s*=\s*["']([^"']+)["'][^>]*property\s*=\s*["']og:image["']"#,
    )
    .unwrap()
});

/// Substrings that mark a URL as UI chrome, tracking, or other
/// non-content imagery.
const BLOCKED_FRAGMENTS: &[&str] = &[
    "icon",
    "logo",
    "avatar",
    "sprite",
    "favicon",
    "badge",
    "app-store",
    "appstore",
    "google-play",
    "playstore",
    "facebook",
    "twitter",
    "linkedin",
    "instagram",
    "whatsapp",
    "pixel",
    "tracking",
    "analytics",
    "emoji",
    "placeholder",
    "spinner",
    ".svg",
];

const RASTER_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".gif", ".avif"];

/// Path fragments suggesting a content/media CDN.
const MEDIA_FRAGMENTS: &[&str] = &[
    "/media/",
    "/images/",
    "/photos/",
    "/img/",
    "/listing",
    "cdn.",
    "cloudfront",
    "imgix",
    "cloudinary",
    "twicpics",
];

/// Markers that rescue a thumbnail-shaped URL.
const LARGE_MARKERS: &[&str] = &["large", "full", "original", "big", "high", "1024", "xl"];

/// Harvest property photo URLs from a scraped page.
///
/// `preview_images` are social-preview URLs from page metadata; they are
/// curated by the page author and go first in the output. Discovery order
/// is otherwise preserved, deduplicated, filtered, capped at
/// [`MAX_IMAGES`].
pub fn harvest(markdown: &str, html: &str, preview_images: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    let mut push = |url: &str| {
        let url = url.trim();
        if !url.is_empty() && seen.insert(url.to_string()) {
            candidates.push(url.to_string());
        }
    };

    for url in preview_images {
        push(url);
    }
    for caps in OG_IMAGE.captures_iter(html) {
        push(&caps[1]);
    }
    for caps in OG_IMAGE_REVERSED.captures_iter(html) {
        push(&caps[1]);
    }
    for caps in MD_IMAGE.captures_iter(markdown) {
        push(&caps[1]);
    }
    for caps in IMG_TAG.captures_iter(html) {
        push(&caps[1]);
    }

    candidates
        .into_iter()
        .filter(|url| is_property_image(url))
        .take(MAX_IMAGES)
        .collect()
}

/// Blocklist check alone, for URLs from sources that are already curated
/// (e.g. an AI-selected preview image without a recognizable extension).
pub fn passes_blocklist(url: &str) -> bool {
    let lower = url.to_lowercase();
    !BLOCKED_FRAGMENTS.iter().any(|f| lower.contains(f))
}

/// Full filter: blocklist, then the inclusion heuristic, then the
/// thumbnail rule.
pub fn is_property_image(url: &str) -> bool {
    let lower = url.to_lowercase();
    if BLOCKED_FRAGMENTS.iter().any(|f| lower.contains(f)) {
        return false;
    }

    // Query strings carry cache busters and size hints, not the asset name.
    let path = lower.split('?').next().unwrap_or(&lower);
    let has_raster_ext = RASTER_EXTENSIONS.iter().any(|ext| path.ends_with(ext));
    let media_path = MEDIA_FRAGMENTS.iter().any(|f| lower.contains(f));
    if !has_raster_ext && !media_path {
        return false;
    }

    let looks_thumbnail = lower.contains("thumb") || lower.contains("mini");
    if looks_thumbnail && !LARGE_MARKERS.iter().any(|m| lower.contains(m)) {
        return false;
    }

    true
}
