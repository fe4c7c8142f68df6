//! Weighted Reciprocal Rank Fusion merging lexical and semantic result lists.

use std::collections::HashMap;

const RRF_K: f64 = 60.0;
const WEIGHT_FTS: f64 = 0.7;
const WEIGHT_SEM: f64 = 0.3;

/// Merge two ranked id lists (lexical first, semantic second) using
/// weighted Reciprocal Rank Fusion, returning the top `limit` ids ordered by
/// descending fused score, ties broken by id.
pub fn rrf_merge(fts_ids: &[String], semantic_ids: &[String], limit: usize) -> Vec<String> {
    let mut scores: HashMap<&str, f64> = HashMap::new();

    for (idx, id) in fts_ids.iter().enumerate() {
        let rank = (idx + 1) as f64;
        *scores.entry(id.as_str()).or_insert(0.0) += WEIGHT_FTS / (RRF_K + rank);
    }
    for (idx, id) in semantic_ids.iter().enumerate() {
        let rank = (idx + 1) as f64;
        *scores.entry(id.as_str()).or_insert(0.0) += WEIGHT_SEM / (RRF_K + rank);
    }

    let mut ranked: Vec<(&str, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(id, _)| id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_only_in_fts_is_ranked() {
        let fts = vec!["a".to_string(), "b".to_string()];
        let sem = vec![];
        let merged = rrf_merge(&fts, &sem, 10);
        assert_eq!(merged, vec!["a", "b"]);
    }

    #[test]
    fn id_present_in_both_lists_ranks_above_single_list_hits() {
        let fts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let sem = vec!["c".to_string(), "d".to_string()];
        let merged = rrf_merge(&fts, &sem, 10);
        assert_eq!(merged[0], "a");
        assert!(merged.contains(&"c".to_string()));
    }

    #[test]
    fn ties_break_by_id() {
        let fts = vec!["b".to_string(), "a".to_string()];
        let sem = vec!["a".to_string(), "b".to_string()];
        let merged = rrf_merge(&fts, &sem, 10);
        // both ids appear once at rank 1 and once at rank 2, scores tie; "a" < "b"
        assert_eq!(merged, vec!["a", "b"]);
    }

    #[test]
    fn respects_limit() {
        let fts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let merged = rrf_merge(&fts, &[], 2);
        assert_eq!(merged.len(), 2);
    }
}
