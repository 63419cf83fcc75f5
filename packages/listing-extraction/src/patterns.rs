//! Deterministic pattern extraction over scraped listing text.
//!
//! Each field has an ordered cascade of regular expressions, tried most
//! specific first. The first pattern whose first match survives value
//! sanitation wins; later tiers are never consulted once a tier has
//! produced an accepted value. Reordering a cascade changes extraction
//! precision, so the ordering is part of the contract and covered by
//! tests.
//!
//! Field extractions are independent: a miss on one field never aborts
//! the others. Partial results are the expected common case and are what
//! triggers the AI fallback pass.

use std::sync::LazyLock;

use regex::Regex;

use crate::images;
use crate::sources::SourceId;
use crate::types::{DeterministicExtraction, ListingDocument};

/// Lowest plausible sale price (CHF). Anything below is extraction noise
/// (lot numbers, monthly charges) and is discarded, not returned.
pub const PRICE_FLOOR: u64 = 10_000;

/// Accepted living-surface range in m². Out-of-range values are dropped,
/// never clamped.
pub const SURFACE_MIN: u32 = 10;
pub const SURFACE_MAX: u32 = 10_000;

// A price numeral: grouped thousands (1'250'000 / 850 000 / 450,000) or a
// plain run of 4+ digits. Decimal and ".-" tails stay outside the capture.
const GENERIC_PRICE: &[&str] = &[
    r"(?i)(?:prix(?:\s+de\s+vente|\s+d['’]achat)?|price)\s*:?\s*(?:CHF|Fr\.?)?\s*((?:\d{1,3}(?:['’\u{202f}\u{a0} .,]\d{3})+|\d{4,9}))",
    r"(?i)(?:CHF|Fr\.)\s*((?:\d{1,3}(?:['’\u{202f}\u{a0} .,]\d{3})+|\d{4,9}))",
    r"(?i)((?:\d{1,3}(?:['’\u{202f}\u{a0} .,]\d{3})+|\d{4,9}))\s*(?:CHF|Fr\.)",
    // Apostrophe-grouped numerals are price-shaped on Swiss portals even
    // without a currency marker nearby.
    r"(\d{1,3}(?:['’]\d{3})+)",
];

const GENERIC_SURFACE: &[&str] = &[
    r"(?i)surface\s*(?:habitable|utile|nette|brute|de\s+plancher)?\s*:?\s*(\d{1,6})(?:[.,]\d+)?\s*m[²2]",
    r"(?i)(?:wohnfl[äa]che|living\s+(?:area|space))\s*:?\s*(\d{1,6})(?:[.,]\d+)?\s*m[²2]",
    r"(\d{1,6})(?:[.,]\d+)?\s*m[²2]",
];

const GENERIC_ROOMS: &[&str] = &[
    r"(?i)(\d{1,2}(?:[.,]\d)?)\s*(?:pi[èe]ces?|pces?|zimmer|rooms?)\b",
    r"(?i)(?:pi[èe]ces?|zimmer|rooms?)\s*:?\s*(\d{1,2}(?:[.,]\d)?)",
];

// Portal-specific labeled variants, tried before the generic tiers.
const IMMOSCOUT_PRICE: &[&str] = &[
    r"(?i)(?:prix\s+d['’]achat|kaufpreis)\s*:?\s*(?:CHF|Fr\.?)?\s*((?:\d{1,3}(?:['’\u{202f}\u{a0} .,]\d{3})+|\d{4,9}))",
];
const IMMOSCOUT_SURFACE: &[&str] = &[
    r"(?i)surface\s+habitable\s*:?\s*(\d{1,6})(?:[.,]\d+)?\s*m[²2]",
];
const IMMOSCOUT_ROOMS: &[&str] = &[
    r"(?i)nombre\s+de\s+pi[èe]ces\s*:?\s*(\d{1,2}(?:[.,]\d)?)",
];

const HOMEGATE_PRICE: &[&str] = &[
    r"(?i)(?:prix\s+de\s+vente|kaufpreis)\s*:?\s*(?:CHF|Fr\.?)?\s*((?:\d{1,3}(?:['’\u{202f}\u{a0} .,]\d{3})+|\d{4,9}))",
];
const HOMEGATE_SURFACE: &[&str] = &[
    r"(?i)(?:surface\s+habitable|espace\s+habitable|wohnfl[äa]che)\s*:?\s*(\d{1,6})(?:[.,]\d+)?\s*m[²2]",
];
const HOMEGATE_ROOMS: &[&str] = &[
    r"(?i)(?:nb\.?\s+de\s+pi[èe]ces|zimmeranzahl)\s*:?\s*(\d{1,2}(?:[.,]\d)?)",
];

/// Ordered field cascades for one source.
pub struct PatternSet {
    price: Vec<Regex>,
    surface: Vec<Regex>,
    rooms: Vec<Regex>,
}

impl PatternSet {
    fn compile(price: &[&str], surface: &[&str], rooms: &[&str]) -> Self {
        let build = |patterns: &[&str]| {
            patterns
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect::<Vec<_>>()
        };
        Self {
            price: build(price),
            surface: build(surface),
            rooms: build(rooms),
        }
    }

    /// Portal set: portal-specific tiers first, then the generic tiers.
    fn for_portal(price: &[&str], surface: &[&str], rooms: &[&str]) -> Self {
        let chain = |specific: &[&str], generic: &[&str]| {
            specific
                .iter()
                .chain(generic.iter())
                .map(|p| Regex::new(p).unwrap())
                .collect::<Vec<_>>()
        };
        Self {
            price: chain(price, GENERIC_PRICE),
            surface: chain(surface, GENERIC_SURFACE),
            rooms: chain(rooms, GENERIC_ROOMS),
        }
    }
}

static GENERIC_SET: LazyLock<PatternSet> =
    LazyLock::new(|| PatternSet::compile(GENERIC_PRICE, GENERIC_SURFACE, GENERIC_ROOMS));

static IMMOSCOUT_SET: LazyLock<PatternSet> = LazyLock::new(|| {
    PatternSet::for_portal(IMMOSCOUT_PRICE, IMMOSCOUT_SURFACE, IMMOSCOUT_ROOMS)
});

static HOMEGATE_SET: LazyLock<PatternSet> =
    LazyLock::new(|| PatternSet::for_portal(HOMEGATE_PRICE, HOMEGATE_SURFACE, HOMEGATE_ROOMS));

/// Select the pattern set for a source. Unknown portals use the generic set.
pub fn pattern_set(source: SourceId) -> &'static PatternSet {
    match source {
        SourceId::ImmoScout24 => &IMMOSCOUT_SET,
        SourceId::Homegate => &HOMEGATE_SET,
        _ => &GENERIC_SET,
    }
}

// Address sub-patterns, tried in order. Swiss postal codes are 1000-9999.
static POSTAL_LOCALITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([1-9]\d{3})\s+(\p{Lu}[\p{Ll}'’.\-]+(?:\s+\p{Lu}[\p{Ll}'’.\-]+){0,2})")
        .unwrap()
});

static LABELED_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:adresse|address|lieu|localit[ée]|emplacement|situation)\s*:\s*([^\n]{4,100})")
        .unwrap()
});

static STREET_FR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:rue|chemin|ch\.|avenue|av\.|route|rte|impasse|place|boulevard|bd|quai|sentier)\s+(?:de\s+la\s+|de\s+l['’]|de\s+|du\s+|des\s+|d['’])?[\p{L}'’\-]+(?:\s+[\p{L}'’\-]+){0,3}\s+\d{1,4}\s?[a-zA-Z]?)\b",
    )
    .unwrap()
});

static STREET_DE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([\p{L}\-]+(?:strasse|str\.|weg|platz|gasse)\s+\d{1,4}\s?[a-zA-Z]?)\b")
        .unwrap()
});

/// Run the deterministic pass over a fetched document.
pub fn extract(doc: &ListingDocument, source: SourceId) -> DeterministicExtraction {
    let corpus = doc.search_corpus();
    let set = pattern_set(source);

    let price = first_accepted(&set.price, &corpus, sanitize_price);
    let surface = first_accepted(&set.surface, &corpus, sanitize_surface);
    let room_count = first_accepted(&set.rooms, &corpus, normalize_room_count);
    let address = extract_address(&corpus);
    let property_type = classify_property_type(&corpus).map(String::from);
    let images = images::harvest(&doc.markdown, &doc.html, &doc.og_images);

    tracing::debug!(
        source = %source,
        price_found = price.is_some(),
        surface_found = surface.is_some(),
        rooms_found = room_count.is_some(),
        address_found = address.is_some(),
        image_count = images.len(),
        "deterministic extraction complete"
    );

    DeterministicExtraction {
        source: source.as_str().to_string(),
        address,
        price,
        surface,
        room_count,
        property_type,
        images,
    }
}

/// Walk a cascade: per tier, the first match's first capture group goes
/// through the sanitizer; the first tier to yield an accepted value wins
/// and no later tier is consulted.
fn first_accepted(
    cascade: &[Regex],
    corpus: &str,
    sanitize: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    for pattern in cascade {
        if let Some(caps) = pattern.captures(corpus) {
            if let Some(value) = caps.get(1).and_then(|m| sanitize(m.as_str())) {
                return Some(value);
            }
        }
    }
    None
}

/// Address extraction: postal-code + locality, then a labeled address
/// field, then a street-suffix pattern. A street found alongside a
/// locality is concatenated, not substituted.
fn extract_address(corpus: &str) -> Option<String> {
    let locality = POSTAL_LOCALITY
        .captures(corpus)
        .map(|c| format!("{} {}", &c[1], &c[2]));

    let street = STREET_FR
        .captures(corpus)
        .or_else(|| STREET_DE.captures(corpus))
        .map(|c| c[1].trim().to_string());

    if let Some(loc) = locality {
        return Some(match street {
            Some(st) => format!("{}, {}", st, loc),
            None => loc,
        });
    }

    if let Some(caps) = LABELED_ADDRESS.captures(corpus) {
        let value = caps[1].trim().trim_end_matches(['.', ',', ';']).trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    street
}

/// Clean a price numeral and enforce the plausibility floor.
///
/// Accepts raw pattern captures as well as AI-sourced values, so it
/// tolerates currency markers, grouping separators and decimal tails.
pub fn sanitize_price(raw: &str) -> Option<String> {
    let mut value = raw.trim().to_string();
    for tail in [".-", ".–", ".—", "-", "–"] {
        if let Some(stripped) = value.strip_suffix(tail) {
            value = stripped.trim_end().to_string();
        }
    }
    // Drop a 1-2 digit decimal tail before stripping separators, so
    // "1250000.50" does not become 125000050.
    static DECIMAL_TAIL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[.,]\d{1,2}$").unwrap());
    let value = DECIMAL_TAIL.replace(&value, "");

    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let amount: u64 = digits.parse().ok()?;
    if amount < PRICE_FLOOR {
        return None;
    }
    Some(amount.to_string())
}

/// Clean a surface numeral and enforce the [10, 10000] m² range.
pub fn sanitize_surface(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches(['m', '²', '2', ' ']).trim();
    let integer_part = trimmed
        .split(['.', ','])
        .next()
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>();
    let surface: u32 = integer_part.parse().ok()?;
    if !(SURFACE_MIN..=SURFACE_MAX).contains(&surface) {
        return None;
    }
    Some(surface.to_string())
}

/// Normalize a room count: comma decimal separator becomes a dot, no
/// range validation (room counts are loosely bounded in this domain).
pub fn normalize_room_count(raw: &str) -> Option<String> {
    let value = raw.trim().replace(',', ".");
    let parsed: f64 = value.parse().ok()?;
    if parsed <= 0.0 {
        return None;
    }
    Some(value)
}

const APARTMENT_TERMS: &[&str] = &[
    "appartement",
    "apartment",
    "wohnung",
    "studio",
    "duplex",
    "attique",
    "penthouse",
    "loft",
    "flat",
];
const HOUSE_TERMS: &[&str] = &[
    "maison",
    "villa",
    "house",
    "haus",
    "chalet",
    "einfamilienhaus",
];
const LAND_TERMS: &[&str] = &["terrain", "parcelle", "bauland", "grundstück"];

/// Case-insensitive keyword test against the three category groups,
/// first matching group wins. Absence means unset, never a guessed
/// default.
pub fn classify_property_type(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let contains_any = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

    if contains_any(APARTMENT_TERMS) {
        Some("appartement")
    } else if contains_any(HOUSE_TERMS) {
        Some("maison")
    } else if contains_any(LAND_TERMS) {
        Some("terrain")
    } else {
        None
    }
}
