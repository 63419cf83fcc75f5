//! Source classification: map a listing URL to a known portal.
//!
//! Pure string matching, no network access. The classifier selects which
//! pattern set the deterministic extractor uses; unknown portals fall back
//! to the generic set.

use serde::{Deserialize, Serialize};

/// A known listing portal, or the generic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    ImmoScout24,
    Homegate,
    Anibis,
    AcheterLouer,
    Immostreet,
    Comparis,
    Newhome,
    Generic,
}

/// Domain fragments checked in order; first containment match wins.
const PORTAL_DOMAINS: &[(&str, SourceId)] = &[
    ("immoscout24", SourceId::ImmoScout24),
    ("homegate", SourceId::Homegate),
    ("anibis", SourceId::Anibis),
    ("acheter-louer", SourceId::AcheterLouer),
    ("immostreet", SourceId::Immostreet),
    ("comparis", SourceId::Comparis),
    ("newhome", SourceId::Newhome),
];

impl SourceId {
    /// Classify a URL by portal domain.
    ///
    /// Total function: any unrecognized or malformed URL classifies as
    /// [`SourceId::Generic`].
    pub fn classify(url: &str) -> Self {
        let lower = url.to_lowercase();
        PORTAL_DOMAINS
            .iter()
            .find(|(fragment, _)| lower.contains(fragment))
            .map(|(_, id)| *id)
            .unwrap_or(Self::Generic)
    }

    /// Stable label used in responses and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImmoScout24 => "immoscout24",
            Self::Homegate => "homegate",
            Self::Anibis => "anibis",
            Self::AcheterLouer => "acheter-louer",
            Self::Immostreet => "immostreet",
            Self::Comparis => "comparis",
            Self::Newhome => "newhome",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_portals() {
        assert_eq!(
            SourceId::classify("https://www.homegate.ch/acheter/4000123"),
            SourceId::Homegate
        );
        assert_eq!(
            SourceId::classify("https://www.immoscout24.ch/fr/d/appartement-acheter"),
            SourceId::ImmoScout24
        );
        assert_eq!(
            SourceId::classify("https://www.acheter-louer.ch/fr/annonce/123"),
            SourceId::AcheterLouer
        );
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(
            SourceId::classify("https://WWW.HOMEGATE.CH/acheter/1"),
            SourceId::Homegate
        );
    }

    #[test]
    fn test_classify_unknown_falls_back_to_generic() {
        assert_eq!(
            SourceId::classify("https://agence-immobiliere.example/bien/42"),
            SourceId::Generic
        );
        assert_eq!(SourceId::classify(""), SourceId::Generic);
        assert_eq!(SourceId::classify("not a url at all"), SourceId::Generic);
    }
}
