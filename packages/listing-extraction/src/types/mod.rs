//! Data types for the extraction pipeline.

pub mod comparable;
pub mod document;

pub use comparable::{AiExtraction, DeterministicExtraction, NormalizedComparable};
pub use document::ListingDocument;
