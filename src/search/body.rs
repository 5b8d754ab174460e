//! Query DSL bodies sent to the search engine

use serde_json::{json, Value};

/// Full-text query: multi_match over name (boosted) and description with
/// automatic fuzziness.
pub fn keyword_query(text: &str, size: usize) -> Value {
    json!({
        "size": size,
        "query": {
            "multi_match": {
                "query": text,
                "fields": ["name^3", "description"],
                "fuzziness": "AUTO"
            }
        }
    })
}

/// Vector query: script_score with cosine similarity over the dense_vector
/// field. The `+ 1.0` keeps scores non-negative, which script_score
/// requires.
pub fn semantic_query(vector: &[f32], size: usize) -> Value {
    json!({
        "size": size,
        "query": {
            "script_score": {
                "query": { "match_all": {} },
                "script": {
                    "source": "cosineSimilarity(params.q, 'embedding') + 1.0",
                    "params": { "q": vector }
                }
            }
        }
    })
}
