//! Merge policy: deterministic extraction wins, AI fills the blanks.
//!
//! Pure and deterministic: the same two inputs always produce the same
//! record. AI-sourced values pass through the same sanitizers as the
//! pattern pass before acceptance; the model output is never trusted
//! uncritically.

use crate::images;
use crate::patterns::{
    classify_property_type, normalize_room_count, sanitize_price, sanitize_surface,
};
use crate::types::{AiExtraction, DeterministicExtraction, NormalizedComparable};

/// Combine the two extraction passes into the final comparable record.
///
/// `description` is the site-provided meta description, passed through
/// verbatim (or empty).
pub fn merge(
    det: &DeterministicExtraction,
    ai: Option<&AiExtraction>,
    description: Option<&str>,
) -> NormalizedComparable {
    let price = det
        .price
        .clone()
        .or_else(|| ai.and_then(|a| a.price.as_deref().and_then(sanitize_price)));

    let surface = det
        .surface
        .clone()
        .or_else(|| ai.and_then(|a| a.surface.as_deref().and_then(sanitize_surface)));

    let room_count = det
        .room_count
        .clone()
        .or_else(|| ai.and_then(|a| a.room_count.as_deref().and_then(normalize_room_count)));

    // The category keyword whitelist also guards AI values: an off-list
    // label ("bureau", "garage") stays out of the record.
    let property_type = det.property_type.clone().or_else(|| {
        ai.and_then(|a| a.property_type.as_deref())
            .and_then(classify_property_type)
            .map(String::from)
    });

    let address = det
        .address
        .clone()
        .or_else(|| ai.and_then(assemble_ai_address));

    let images = if !det.images.is_empty() {
        det.images.clone()
    } else {
        ai.map(|a| {
            a.image_urls
                .iter()
                .filter(|url| images::passes_blocklist(url))
                .take(images::MAX_IMAGES)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
    };

    NormalizedComparable {
        source: det.source.clone(),
        address: address.unwrap_or_default(),
        price: price.unwrap_or_default(),
        surface: surface.unwrap_or_default(),
        room_count: room_count.unwrap_or_default(),
        property_type: property_type.unwrap_or_default(),
        description: description.unwrap_or_default().trim().to_string(),
        images,
    }
}

/// Street, then "postal-code locality" or locality alone, skipping
/// absent parts.
fn assemble_ai_address(ai: &AiExtraction) -> Option<String> {
    let locale = match (ai.postal_code.as_deref(), ai.locality.as_deref()) {
        (Some(code), Some(locality)) => Some(format!("{} {}", code, locality)),
        (None, Some(locality)) => Some(locality.to_string()),
        (Some(code), None) => Some(code.to_string()),
        (None, None) => None,
    };

    match (ai.street.as_deref(), locale) {
        (Some(street), Some(locale)) => Some(format!("{}, {}", street, locale)),
        (Some(street), None) => Some(street.to_string()),
        (None, Some(locale)) => Some(locale),
        (None, None) => None,
    }
}
