//! Pairwise paper similarity.
//!
//! Pure, stateless scoring functions used by the local graph-construction
//! fallback: Jaccard word overlap over abstracts, a flat category-overlap
//! tier, and the weighted combination of the two.
//!
//! [`build_similarities`] is O(n²) over the paper set and is the dominant
//! cost of a local build; callers cap the paper count upstream
//! (see [`crate::graph::DEFAULT_MAX_PAPERS`]).

use std::collections::HashSet;

use crate::models::{Paper, SimilarityPair};

/// Weight of the text-similarity component in the combined score.
pub const TEXT_WEIGHT: f64 = 0.7;

/// Weight of the category-similarity component in the combined score.
pub const CATEGORY_WEIGHT: f64 = 0.3;

/// Category score when the papers share at least one exact category.
const SHARED_CATEGORY_SCORE: f64 = 0.3;

/// Category score when only the top-level segments match (e.g., both "cs").
const SHARED_MAIN_CATEGORY_SCORE: f64 = 0.15;

/// Tokens shorter than this carry little signal and are dropped before
/// comparison.
const MIN_TOKEN_LEN: usize = 4;

/// Lowercased word set of a text, keeping only tokens of at least
/// [`MIN_TOKEN_LEN`] characters.
fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity between the word sets of two texts.
///
/// # Returns
/// `|intersection| / |union|` in [0, 1]; 0 when the union is empty.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let words_a = token_set(a);
    let words_b = token_set(b);

    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    intersection as f64 / union as f64
}

/// Category-overlap similarity between two papers.
///
/// Flat, non-additive tiers: 0.3 when the category sets intersect, 0.15 when
/// only the top-level segments of the primary categories match, 0 otherwise.
/// The tier is never weighted by how many categories overlap.
pub fn category_similarity(p1: &Paper, p2: &Paper) -> f64 {
    let cats1 = category_set(p1);
    let cats2 = category_set(p2);

    if !cats1.is_disjoint(&cats2) {
        return SHARED_CATEGORY_SCORE;
    }

    if p1.main_category() == p2.main_category() {
        return SHARED_MAIN_CATEGORY_SCORE;
    }

    0.0
}

/// A paper's category set, falling back to the primary category when the
/// category list is empty.
fn category_set(paper: &Paper) -> HashSet<&str> {
    if paper.categories.is_empty() {
        HashSet::from([paper.primary_category.as_str()])
    } else {
        paper.categories.iter().map(String::as_str).collect()
    }
}

/// Combined similarity score for two papers.
///
/// `min(1, 0.7 * text_similarity(abstracts) + 0.3 * category_similarity)`.
pub fn combined_similarity(p1: &Paper, p2: &Paper) -> f64 {
    let text = text_similarity(&p1.abstract_text, &p2.abstract_text);
    let category = category_similarity(p1, p2);

    (TEXT_WEIGHT * text + CATEGORY_WEIGHT * category).min(1.0)
}

/// Score every unordered paper pair and keep those at or above `threshold`.
///
/// Each unordered pair appears at most once, never paired with itself, and
/// never with a score below the threshold.
pub fn build_similarities(papers: &[Paper], threshold: f64) -> Vec<SimilarityPair> {
    let mut similarities = Vec::new();

    for i in 0..papers.len() {
        for j in (i + 1)..papers.len() {
            let score = combined_similarity(&papers[i], &papers[j]);
            if score >= threshold {
                similarities.push(SimilarityPair {
                    paper1_id: papers[i].id.clone(),
                    paper2_id: papers[j].id.clone(),
                    score,
                });
            }
        }
    }

    similarities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str, abstract_text: &str, primary: &str, categories: &[&str]) -> Paper {
        Paper {
            id: id.to_string(),
            title: format!("Paper {}", id),
            abstract_text: abstract_text.to_string(),
            authors: vec![],
            primary_category: primary.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            citations: None,
        }
    }

    #[test]
    fn test_text_similarity_bounds_and_symmetry() {
        let a = "deep learning transformers attention mechanisms";
        let b = "graph neural networks require attention mechanisms";

        let score = text_similarity(a, b);
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(score, text_similarity(b, a));
    }

    #[test]
    fn test_text_similarity_identical_text() {
        let a = "transformers dominate language modelling benchmarks";
        assert_eq!(text_similarity(a, a), 1.0);
    }

    #[test]
    fn test_text_similarity_empty_union() {
        // Every token is <= 3 chars, so both word sets are empty.
        assert_eq!(text_similarity("a an the", "of to in"), 0.0);
        assert_eq!(text_similarity("", ""), 0.0);
    }

    #[test]
    fn test_text_similarity_case_insensitive() {
        assert_eq!(text_similarity("Deep Learning", "deep learning"), 1.0);
    }

    #[test]
    fn test_token_length_cutoff() {
        // Three-character tokens are dropped; four-character tokens count.
        assert_eq!(text_similarity("gan abc", "gan xyz"), 0.0);
        assert_eq!(text_similarity("gans abc", "gans xyz"), 1.0);
    }

    #[test]
    fn test_category_similarity_tiers() {
        let ai = paper("a", "", "cs.AI", &["cs.AI"]);
        let ai2 = paper("b", "", "cs.AI", &["cs.AI", "cs.LG"]);
        let cv = paper("c", "", "cs.CV", &["cs.CV"]);
        let math = paper("d", "", "math.CO", &["math.CO"]);

        // Exact overlap, same top-level, no relation.
        assert_eq!(category_similarity(&ai, &ai2), 0.3);
        assert_eq!(category_similarity(&ai, &cv), 0.15);
        assert_eq!(category_similarity(&ai, &math), 0.0);
    }

    #[test]
    fn test_category_similarity_only_flat_values() {
        let papers = [
            paper("a", "", "cs.AI", &["cs.AI", "cs.LG", "stat.ML"]),
            paper("b", "", "cs.LG", &["cs.LG", "stat.ML"]),
            paper("c", "", "cs.CV", &["cs.CV"]),
            paper("d", "", "q-bio.NC", &["q-bio.NC"]),
        ];
        for p1 in &papers {
            for p2 in &papers {
                let score = category_similarity(p1, p2);
                assert!(
                    score == 0.0 || score == 0.15 || score == 0.3,
                    "unexpected tier value {}",
                    score
                );
            }
        }
    }

    #[test]
    fn test_combined_similarity_capped_at_one() {
        let p1 = paper("a", "identical abstracts everywhere", "cs.AI", &["cs.AI"]);
        let p2 = paper("b", "identical abstracts everywhere", "cs.AI", &["cs.AI"]);

        let score = combined_similarity(&p1, &p2);
        assert!(score <= 1.0);
        // 0.7 * 1.0 + 0.3 * 0.3
        assert!((score - 0.79).abs() < 1e-9);
    }

    #[test]
    fn test_build_similarities_pair_hygiene() {
        let papers = vec![
            paper("a", "deep learning transformers attention", "cs.AI", &["cs.AI"]),
            paper("b", "deep learning transformers vision", "cs.CV", &["cs.CV"]),
            paper("c", "quantum chromodynamics lattice", "hep-lat", &["hep-lat"]),
        ];

        let pairs = build_similarities(&papers, 0.0);

        for pair in &pairs {
            assert_ne!(pair.paper1_id, pair.paper2_id);
        }

        let mut seen = std::collections::HashSet::new();
        for pair in &pairs {
            let mut key = [pair.paper1_id.as_str(), pair.paper2_id.as_str()];
            key.sort();
            assert!(seen.insert(key), "duplicate unordered pair");
        }
    }

    #[test]
    fn test_build_similarities_respects_threshold() {
        let papers = vec![
            paper("a", "deep learning transformers attention", "cs.AI", &["cs.AI"]),
            paper("b", "deep learning transformers vision", "cs.CV", &["cs.CV"]),
            paper("c", "quantum chromodynamics lattice", "hep-lat", &["hep-lat"]),
        ];

        let threshold = 0.1;
        for pair in build_similarities(&papers, threshold) {
            assert!(pair.score >= threshold);
        }
    }

    #[test]
    fn test_related_papers_scenario() {
        // Shared tokens "deep", "learning", "transformers"; different
        // subcategories but both under "cs", so the 0.15 tier applies.
        let papers = vec![
            paper("a", "deep learning transformers attention", "cs.AI", &["cs.AI"]),
            paper("b", "deep learning transformers vision", "cs.CV", &["cs.CV"]),
        ];

        let pairs = build_similarities(&papers, 0.1);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].paper1_id, "a");
        assert_eq!(pairs[0].paper2_id, "b");
        assert!(pairs[0].score > 0.0);

        // Jaccard 3/5 weighted 0.7, plus the 0.15 category tier weighted 0.3.
        let expected = 0.7 * (3.0 / 5.0) + 0.3 * 0.15;
        assert!((pairs[0].score - expected).abs() < 1e-9);
    }
}
