//! Search phrase extraction.
//!
//! Samples documents from a JSON-lines corpus and ranks word n-grams per
//! document by TF-IDF. The output is a flat list of candidate phrases,
//! unvalidated; language and structure checks happen downstream.

pub mod corpus;
pub mod error;
pub mod tfidf;

pub use corpus::{sample_documents, Document};
pub use error::{PhraseError, PhraseResult};
pub use tfidf::{PhraseProducer, TfidfPhraseProducer};
