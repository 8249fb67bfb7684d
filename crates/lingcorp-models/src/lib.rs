//! Shared data models for the lingcorp corpus builder.
//!
//! This crate provides Serde-serializable types for:
//! - Language codes derived from input file names
//! - Video identifiers and watch URLs
//! - Seeds and candidate items flowing through the acquisition loop
//! - Output file naming

pub mod candidate;
pub mod error;
pub mod language;
pub mod output;
pub mod video;

// Re-export common types
pub use candidate::{CandidateItem, Seed};
pub use error::{ModelError, ModelResult};
pub use language::LanguageCode;
pub use output::OutputKind;
pub use video::VideoId;
