//! Index settings and mapping for the product catalog

use serde_json::{json, Value};

/// Settings and mappings sent on index creation.
///
/// Single shard, no replicas: this is a demo catalog, not a cluster. The
/// `embedding` field is a cosine-similarity dense_vector whose dims must
/// match the embedding model's output.
pub fn index_mapping(dims: usize) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        },
        "mappings": {
            "properties": {
                "name":        { "type": "text" },
                "description": { "type": "text" },
                "category":    { "type": "keyword" },
                "brand":       { "type": "keyword" },
                "price":       { "type": "float" },
                "embedding": {
                    "type": "dense_vector",
                    "dims": dims,
                    "index": true,
                    "similarity": "cosine"
                }
            }
        }
    })
}
