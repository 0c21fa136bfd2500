pub mod bm25;
pub mod corpus;
pub mod cosine;
pub mod error;
pub mod rerank;
pub mod search;
pub mod stats;
pub mod tokenizer;
pub mod vector;

pub type DocId = u32;
pub type TermId = u32;
pub type FeatureId = u32;

pub use corpus::{Corpus, Document};
pub use error::EngineError;
pub use search::{EngineConfig, SearchEngine, SearchResult};
