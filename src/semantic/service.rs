//! Semantic search service.
//!
//! Owns the embedding model and hands out rankings:
//! - The model is loaded at most once per service, on `initialize()` or the first ranked query
//! - After load the model is shared read-only; a failed load is reported and may be retried

use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::ToolRecord;
use crate::config::SemanticSearchConfig;
use crate::semantic::embeddings::{Embedder, EmbeddingError, EmbeddingModel};
use crate::semantic::ranker::{self, RankError, Ranking};

#[derive(Debug, thiserror::Error)]
pub enum SemanticSearchError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Ranking error: {0}")]
    Rank(#[from] RankError),
}

pub struct SemanticSearchService {
    config: SemanticSearchConfig,
    cache_dir: PathBuf,
    /// Set exactly once. `get_or_try_init` runs the loader for a single
    /// caller; concurrent callers block until it finishes.
    embedder: OnceCell<Arc<dyn Embedder>>,
}

impl SemanticSearchService {
    /// Create a service that loads `config.model` on first use.
    ///
    /// # Arguments
    /// * `config` - Semantic search configuration
    /// * `cache_dir` - Base directory; model files live under `models/`
    pub fn new(config: SemanticSearchConfig, cache_dir: PathBuf) -> Self {
        Self {
            config,
            cache_dir,
            embedder: OnceCell::new(),
        }
    }

    /// Create a service around an already-loaded embedder.
    pub fn with_embedder(config: SemanticSearchConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            cache_dir: PathBuf::new(),
            embedder: OnceCell::with_value(embedder),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.config.threshold
    }

    pub fn is_initialized(&self) -> bool {
        self.embedder.get().is_some()
    }

    /// Load the model now instead of on the first ranked query.
    pub fn initialize(&self) -> Result<(), SemanticSearchError> {
        self.embedder().map(|_| ())
    }

    /// Rank `records` against `query` with the configured threshold.
    pub fn rank<'a>(
        &self,
        query: Option<&str>,
        records: &'a [ToolRecord],
    ) -> Result<Ranking<'a>, SemanticSearchError> {
        let query = query.filter(|q| !q.is_empty());
        if query.is_none() {
            // pass-through never touches the model
            return Ok(Ranking::Unranked(records.iter().collect()));
        }

        let embedder = self.embedder()?;
        Ok(ranker::rank(
            embedder.as_ref(),
            query,
            records,
            self.config.threshold,
        )?)
    }

    fn embedder(&self) -> Result<&Arc<dyn Embedder>, SemanticSearchError> {
        let embedder = self.embedder.get_or_try_init(|| {
            log::info!(
                "Initializing semantic search with model '{}'",
                self.config.model
            );

            let model = EmbeddingModel::new(
                &self.config.model,
                self.cache_dir.clone(),
                self.config.batch_size,
            )?;

            log::info!(
                "Loaded model '{}' ({} dimensions)",
                model.name(),
                model.dimensions()
            );

            Ok::<_, EmbeddingError>(Arc::new(model) as Arc<dyn Embedder>)
        })?;

        Ok(embedder)
    }
}
