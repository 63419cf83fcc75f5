//! Extraction results and the final comparable record.

use serde::{Deserialize, Serialize};

/// Output of the deterministic pattern pass.
///
/// Every field is optional; `None` means "not found", never "empty".
/// Field extractions are independent, so partial results are the normal
/// case, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeterministicExtraction {
    /// Source portal label (e.g. "homegate", "generic")
    pub source: String,

    /// Address, assembled from postal/locality/street sub-patterns
    pub address: Option<String>,

    /// Price as a positive integer string, no grouping separators
    pub price: Option<String>,

    /// Living surface in m², integer string within [10, 10000]
    pub surface: Option<String>,

    /// Room count, decimal preserved with a dot separator ("4.5")
    pub room_count: Option<String>,

    /// Normalized property category ("appartement" / "maison" / "terrain")
    pub property_type: Option<String>,

    /// Harvested property photo URLs, capped at 10
    pub images: Vec<String>,
}

impl DeterministicExtraction {
    /// True when the AI fallback should be consulted: any of the fields
    /// the comparable record actually needs is still missing.
    pub fn needs_ai(&self) -> bool {
        self.price.is_none()
            || self.surface.is_none()
            || self.address.is_none()
            || self.images.is_empty()
    }
}

/// Output of the AI fallback pass.
///
/// Parsed defensively from an untrusted model reply; every field is
/// optional and re-validated by the merger before use. Never
/// authoritative on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiExtraction {
    pub price: Option<String>,
    pub surface: Option<String>,
    pub room_count: Option<String>,
    pub property_type: Option<String>,
    pub locality: Option<String>,
    pub postal_code: Option<String>,
    pub street: Option<String>,
    /// Model's pick among the candidate preview photos
    pub best_image_url: Option<String>,
    /// Candidate image URLs, best pick first
    pub image_urls: Vec<String>,
}

impl AiExtraction {
    /// True when the model produced nothing usable.
    pub fn is_empty(&self) -> bool {
        self.price.is_none()
            && self.surface.is_none()
            && self.room_count.is_none()
            && self.property_type.is_none()
            && self.locality.is_none()
            && self.postal_code.is_none()
            && self.street.is_none()
            && self.image_urls.is_empty()
    }
}

/// The final merged record returned to the caller.
///
/// String fields are a validated value or empty, never null, so the
/// consuming form can bind them directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedComparable {
    pub source: String,
    pub address: String,
    pub price: String,
    pub surface: String,
    pub room_count: String,
    pub property_type: String,
    pub description: String,
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_ai_when_price_missing() {
        let det = DeterministicExtraction {
            source: "generic".into(),
            surface: Some("85".into()),
            address: Some("1204 Genève".into()),
            images: vec!["https://cdn.example.com/p.jpg".into()],
            ..Default::default()
        };
        assert!(det.needs_ai());
    }

    #[test]
    fn test_needs_ai_when_images_empty() {
        let det = DeterministicExtraction {
            source: "generic".into(),
            price: Some("1250000".into()),
            surface: Some("85".into()),
            address: Some("1204 Genève".into()),
            ..Default::default()
        };
        assert!(det.needs_ai());
    }

    #[test]
    fn test_complete_extraction_skips_ai() {
        let det = DeterministicExtraction {
            source: "homegate".into(),
            price: Some("1250000".into()),
            surface: Some("110".into()),
            address: Some("1204 Genève".into()),
            room_count: None, // room count alone never triggers the AI pass
            images: vec!["https://cdn.example.com/p.jpg".into()],
            ..Default::default()
        };
        assert!(!det.needs_ai());
    }

    #[test]
    fn test_comparable_serializes_camel_case() {
        let rec = NormalizedComparable {
            source: "homegate".into(),
            room_count: "4.5".into(),
            property_type: "appartement".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["roomCount"], "4.5");
        assert_eq!(json["propertyType"], "appartement");
    }
}
