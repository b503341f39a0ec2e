//! Semantic search over the tool catalog.
//!
//! Uses fastembed-rs to embed tool descriptions and queries, then ranks by
//! brute-force cosine similarity. Nothing is indexed or persisted: the
//! catalog is re-embedded on every ranked query.
//!
//! # Architecture
//!
//! - `embeddings`: The `Embedder` trait and its fastembed implementation
//! - `ranker`: Scoring, thresholding and ordering of records
//! - `service`: Lazy one-time model load and configured ranking

pub mod embeddings;
mod ranker;
mod service;

pub use embeddings::{Embedder, EmbeddingError, EmbeddingModel};
pub use ranker::{cosine_similarity, rank, RankError, Ranking, ScoredRecord};
pub use service::{SemanticSearchError, SemanticSearchService};

/// Default embedding model (384 dimensions)
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Default minimum similarity for a record to appear in ranked results
pub const DEFAULT_THRESHOLD: f32 = 0.4;
