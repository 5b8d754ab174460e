//! Weighted-sum fusion of keyword and semantic result lists

use std::collections::HashMap;

use crate::engine::RawHit;
use crate::search::QueryError;

/// Weights for combining the two hybrid legs
#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub keyword: f32,
    pub semantic: f32,
}

impl FusionWeights {
    pub fn new(keyword: f32, semantic: f32) -> Result<Self, QueryError> {
        if !keyword.is_finite() || !semantic.is_finite() || keyword <= 0.0 || semantic <= 0.0 {
            return Err(QueryError::InvalidWeights);
        }
        Ok(Self { keyword, semantic })
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            keyword: 1.0,
            semantic: 1.0,
        }
    }
}

/// A fused result before hydration into a `ScoredHit`
#[derive(Debug, Clone)]
pub struct FusedHit {
    pub id: String,
    pub score: f32,
    pub keyword_score: f32,
    pub semantic_score: f32,
    pub source: serde_json::Value,
}

/// Combine the two legs: `score = w_kw * kw + w_sem * sem`, missing leg
/// scores count as zero. Sorted by fused score descending; ties broken by
/// keyword score, then id for determinism.
pub fn weighted_sum_fusion(
    keyword_hits: Vec<RawHit>,
    semantic_hits: Vec<RawHit>,
    weights: &FusionWeights,
) -> Vec<FusedHit> {
    struct Legs {
        keyword: f32,
        semantic: f32,
        source: serde_json::Value,
    }

    let mut merged: HashMap<String, Legs> = HashMap::new();

    for hit in keyword_hits {
        merged.insert(
            hit.id,
            Legs {
                keyword: hit.score,
                semantic: 0.0,
                source: hit.source,
            },
        );
    }

    for hit in semantic_hits {
        match merged.get_mut(&hit.id) {
            Some(legs) => legs.semantic = hit.score,
            None => {
                merged.insert(
                    hit.id,
                    Legs {
                        keyword: 0.0,
                        semantic: hit.score,
                        source: hit.source,
                    },
                );
            }
        }
    }

    let mut fused: Vec<FusedHit> = merged
        .into_iter()
        .map(|(id, legs)| FusedHit {
            id,
            score: weights.keyword * legs.keyword + weights.semantic * legs.semantic,
            keyword_score: legs.keyword,
            semantic_score: legs.semantic,
            source: legs.source,
        })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.keyword_score
                    .partial_cmp(&a.keyword_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.id.cmp(&b.id))
    });

    fused
}
