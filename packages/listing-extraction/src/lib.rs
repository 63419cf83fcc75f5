//! Listing-Data Extraction Pipeline
//!
//! Turns an arbitrary third-party real-estate listing URL into a
//! normalized comparable record (price, surface, rooms, address,
//! property type, photos).
//!
//! # Design
//!
//! Deterministic first, AI second:
//!
//! - Source-specific regex cascades extract whatever they can with
//!   confidence ([`patterns`]).
//! - Heuristic filtering separates property photos from UI chrome
//!   ([`images`]).
//! - Only when required fields are still missing does a single hosted
//!   completion fill the blanks ([`ai`]) — best effort, re-validated,
//!   never trusted uncritically.
//! - A deterministic merge reconciles the two ([`merge`]).
//!
//! Every collaborator failure degrades the result instead of aborting
//! it; the consuming UI always has manual entry as a fallback.
//!
//! # Usage
//!
//! ```rust,ignore
//! use listing_extraction::{Credentials, ListingPipeline, PipelineOutcome};
//!
//! let pipeline = ListingPipeline::from_credentials(&Credentials::from_env());
//! match pipeline.run("https://www.homegate.ch/acheter/4001234").await? {
//!     PipelineOutcome::Success { data, ai_used } => { /* bind to the form */ }
//!     PipelineOutcome::Fallback { error, .. } => { /* offer manual entry */ }
//! }
//! ```

pub mod ai;
pub mod error;
pub mod fetchers;
pub mod images;
pub mod merge;
pub mod patterns;
pub mod pipeline;
pub mod security;
pub mod sources;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use error::{CompletionError, ExtractError, FetchError};
pub use pipeline::{ListingPipeline, PipelineOutcome};
pub use security::{Credentials, SecretString};
pub use sources::SourceId;
pub use types::{AiExtraction, DeterministicExtraction, ListingDocument, NormalizedComparable};

// Re-export collaborator boundaries
pub use ai::{AiFallback, CompletionModel, OpenAiCompletion};
pub use fetchers::{FirecrawlFetcher, PageFetcher};

// Re-export pipeline building blocks
pub use merge::merge;
pub use patterns::{
    classify_property_type, normalize_room_count, sanitize_price, sanitize_surface,
};
