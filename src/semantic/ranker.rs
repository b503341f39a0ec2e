//! Brute-force similarity ranking of catalog records against a query.
//!
//! Every invocation embeds the whole candidate set in one batch, scores each
//! record by cosine similarity to the query, drops records under the
//! threshold and orders the rest by descending score. Scores are only
//! comparable within a single invocation.

use std::time::Instant;

use crate::catalog::{filter_by_category, ToolRecord};
use crate::semantic::embeddings::{Embedder, EmbeddingError};

/// A record paired with its similarity to the current query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRecord<'a> {
    pub record: &'a ToolRecord,
    /// Cosine similarity in [-1.0, 1.0]
    pub similarity: f32,
}

/// Outcome of a browse pass.
///
/// `Unranked` is the no-query pass-through and carries no scores at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Ranking<'a> {
    Unranked(Vec<&'a ToolRecord>),
    Ranked(Vec<ScoredRecord<'a>>),
}

impl<'a> Ranking<'a> {
    pub fn is_ranked(&self) -> bool {
        matches!(self, Ranking::Ranked(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Ranking::Unranked(records) => records.len(),
            Ranking::Ranked(scored) => scored.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records in result order.
    pub fn records(&self) -> Vec<&'a ToolRecord> {
        match self {
            Ranking::Unranked(records) => records.clone(),
            Ranking::Ranked(scored) => scored.iter().map(|s| s.record).collect(),
        }
    }

    /// Narrow the result to one category without re-ranking.
    pub fn filter_by_category(self, category: &str) -> Self {
        match self {
            Ranking::Unranked(records) => Ranking::Unranked(filter_by_category(records, category)),
            Ranking::Ranked(mut scored) => {
                scored.retain(|s| s.record.matches_category(category));
                Ranking::Ranked(scored)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RankError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Dimension mismatch: query has {query}, record {index} has {record}")]
    DimensionMismatch {
        index: usize,
        query: usize,
        record: usize,
    },
}

/// Rank `records` by similarity of their descriptions to `query`.
///
/// An absent or empty query skips the model entirely and returns every
/// record in catalog order. Any other query, whitespace included, is ranked.
pub fn rank<'a>(
    embedder: &dyn Embedder,
    query: Option<&str>,
    records: &'a [ToolRecord],
    threshold: f32,
) -> Result<Ranking<'a>, RankError> {
    let query = match query.filter(|q| !q.is_empty()) {
        Some(query) => query,
        None => return Ok(Ranking::Unranked(records.iter().collect())),
    };

    if records.is_empty() {
        return Ok(Ranking::Ranked(vec![]));
    }

    let now = Instant::now();

    let texts = records
        .iter()
        .map(|r| r.description_text().to_string())
        .collect::<Vec<_>>();
    let embeddings = embedder.embed_batch(&texts)?;
    if embeddings.len() != records.len() {
        return Err(EmbeddingError::CountMismatch {
            expected: records.len(),
            got: embeddings.len(),
        }
        .into());
    }

    let query_embedding = embedder.embed(query)?;

    let mut scored = Vec::with_capacity(records.len());
    for (index, (record, embedding)) in records.iter().zip(embeddings.iter()).enumerate() {
        if embedding.len() != query_embedding.len() {
            return Err(RankError::DimensionMismatch {
                index,
                query: query_embedding.len(),
                record: embedding.len(),
            });
        }

        let similarity = cosine_similarity(&query_embedding, embedding);
        if similarity >= threshold {
            scored.push(ScoredRecord { record, similarity });
        }
    }

    // sort_by is stable: equal scores keep catalog order
    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    log::debug!(
        "ranked {} candidates against a {}-char query: {} above {threshold} in {}ms",
        records.len(),
        query.chars().count(),
        scored.len(),
        now.elapsed().as_micros() as f64 / 1000.0
    );

    Ok(Ranking::Ranked(scored))
}

/// Cosine similarity of two equal-length vectors, 0.0 if either has zero norm.
///
/// Accumulates in f64 so tiny or huge components neither underflow nor overflow.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.3, -1.2, 4.0, 0.0];
        let score = cosine_similarity(&v, &v);
        assert!((score - 1.0).abs() < 1e-6);
        assert!(score <= 1.0 + 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_ignores_magnitude() {
        let a = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 1.0, 0.0]);
        let b = cosine_similarity(&[10.0, 20.0, 30.0], &[0.2, 0.1, 0.0]);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_tiny_vectors_are_not_zero() {
        let score = cosine_similarity(&[1e-30, 0.0], &[2e-30, 0.0]);
        assert!((score - 1.0).abs() < 1e-6);

        let score = cosine_similarity(&[1e-20, 1e-20], &[1e-20, 0.0]);
        assert!((score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_huge_vectors_stay_finite() {
        let score = cosine_similarity(&[1e30, 1e30], &[3e38, 0.0]);
        assert!(score.is_finite());
        assert!((score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }
}
