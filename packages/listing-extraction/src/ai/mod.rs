//! AI fallback extraction.
//!
//! Invoked only when the deterministic pass leaves required fields empty.
//! The model reply is untrusted external input: it is parsed defensively
//! and every field is re-validated by the merger before use. Any failure
//! on this path (transport, non-2xx, malformed JSON) degrades to `None`;
//! the fallback is a supplement, never a dependency.

pub mod openai;

pub use openai::OpenAiCompletion;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CompletionResult;
use crate::sources::SourceId;
use crate::types::{AiExtraction, ListingDocument};

/// Character budget for the document excerpt sent to the model. Bounds
/// cost and latency and keeps the prompt inside model context.
const PROMPT_CHAR_BUDGET: usize = 12_000;

/// At most this many social-preview image URLs accompany the prompt.
const MAX_PREVIEW_IMAGES: usize = 5;

const SYSTEM_PROMPT: &str = "You extract structured data from real-estate listings. \
You reply with a single JSON object and nothing else. \
Fields you cannot determine from the text stay as empty strings; never guess.";

/// Boundary to the hosted completion endpoint: one user message in, one
/// text completion out.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> CompletionResult<String>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

/// AI fallback extractor over a [`CompletionModel`].
pub struct AiFallback {
    model: Arc<dyn CompletionModel>,
}

impl AiFallback {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Best-effort extraction. Returns `None` on any failure; the caller
    /// proceeds with the deterministic result alone.
    pub async fn extract(&self, doc: &ListingDocument, source: SourceId) -> Option<AiExtraction> {
        let preview: Vec<&str> = doc
            .og_images
            .iter()
            .map(String::as_str)
            .take(MAX_PREVIEW_IMAGES)
            .collect();
        let prompt = build_prompt(doc, &preview);

        let reply = match self.model.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(source = %source, model = self.model.model(), error = %e,
                    "AI fallback request failed");
                return None;
            }
        };

        let parsed = parse_reply(&reply, &preview);
        if parsed.is_none() {
            tracing::warn!(source = %source, "AI fallback reply was not parseable JSON");
        }
        parsed
    }
}

/// Assemble the bounded prompt: meta description first (cleaner than body
/// text), then the document excerpt, then the candidate preview photos.
fn build_prompt(doc: &ListingDocument, preview: &[&str]) -> String {
    let mut text = String::new();
    if let Some(desc) = &doc.description {
        text.push_str(desc);
        text.push('\n');
    }
    text.push_str(&doc.markdown);
    let excerpt = truncate_chars(&text, PROMPT_CHAR_BUDGET);

    let mut prompt = format!(
        "Extract the following fields from this real-estate listing and return ONLY a JSON \
object with exactly these keys: price, surface, roomCount, propertyType, locality, \
postalCode, street, bestImageUrl.\n\
- price: sale price as digits only, no separators\n\
- surface: living surface in m², digits only\n\
- roomCount: number of rooms, decimal point allowed (e.g. \"4.5\")\n\
- propertyType: one of \"appartement\", \"maison\", \"terrain\"\n\
- locality, postalCode, street: address parts\n\
- bestImageUrl: the candidate photo URL best representing the property, or \"\"\n\n\
Listing text:\n{}",
        excerpt
    );

    if !preview.is_empty() {
        prompt.push_str("\n\nCandidate photo URLs:\n");
        for url in preview {
            prompt.push_str(url);
            prompt.push('\n');
        }
    }
    prompt
}

/// Truncate on a char boundary.
fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Defensive parse of a model reply.
///
/// The model may wrap the JSON in prose despite instructions, so the
/// first `{` .. last `}` substring is taken. Values arrive as strings or
/// numbers depending on the model's mood; both are accepted. Anything
/// unparseable yields `None`.
pub fn parse_reply(reply: &str, preview: &[&str]) -> Option<AiExtraction> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: Value = serde_json::from_str(&reply[start..=end]).ok()?;
    let obj = value.as_object()?;

    let field = |key: &str| -> Option<String> {
        match obj.get(key) {
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    };

    let best_image_url = field("bestImageUrl");

    // Best pick first, then the remaining candidates, deduplicated.
    let mut image_urls = Vec::new();
    if let Some(best) = &best_image_url {
        image_urls.push(best.clone());
    }
    for url in preview {
        if !image_urls.iter().any(|u| u == url) {
            image_urls.push((*url).to_string());
        }
    }

    Some(AiExtraction {
        price: field("price"),
        surface: field("surface"),
        room_count: field("roomCount"),
        property_type: field("propertyType"),
        locality: field("locality"),
        postal_code: field("postalCode"),
        street: field("street"),
        best_image_url,
        image_urls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let reply = r#"{"price":"980000","surface":"120","roomCount":"5.5","propertyType":"maison","locality":"Nyon","postalCode":"1260","street":"","bestImageUrl":""}"#;
        let parsed = parse_reply(reply, &[]).unwrap();
        assert_eq!(parsed.price.as_deref(), Some("980000"));
        assert_eq!(parsed.locality.as_deref(), Some("Nyon"));
        assert_eq!(parsed.street, None); // empty string means absent
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let reply = "Here is the extracted data:\n```json\n{\"price\": \"450000\"}\n```\nLet me know!";
        let parsed = parse_reply(reply, &[]).unwrap();
        assert_eq!(parsed.price.as_deref(), Some("450000"));
    }

    #[test]
    fn test_parse_numeric_typed_fields() {
        let reply = r#"{"price": 980000, "surface": 120, "roomCount": 4.5}"#;
        let parsed = parse_reply(reply, &[]).unwrap();
        assert_eq!(parsed.price.as_deref(), Some("980000"));
        assert_eq!(parsed.surface.as_deref(), Some("120"));
        assert_eq!(parsed.room_count.as_deref(), Some("4.5"));
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_reply("the page does not contain a listing", &[]).is_none());
        assert!(parse_reply("{not json}", &[]).is_none());
        assert!(parse_reply("", &[]).is_none());
    }

    #[test]
    fn test_best_image_first_then_preview_deduped() {
        let preview = ["https://a.example/1.jpg", "https://a.example/2.jpg"];
        let reply = r#"{"bestImageUrl": "https://a.example/2.jpg"}"#;
        let parsed = parse_reply(reply, &preview).unwrap();
        assert_eq!(
            parsed.image_urls,
            vec![
                "https://a.example/2.jpg",
                "https://a.example/1.jpg",
            ]
        );
    }

    #[test]
    fn test_prompt_is_bounded() {
        let long = "x".repeat(50_000);
        let doc = ListingDocument::new("https://example.ch", long);
        let prompt = build_prompt(&doc, &[]);
        assert!(prompt.chars().count() < PROMPT_CHAR_BUDGET + 1_000);
    }
}
