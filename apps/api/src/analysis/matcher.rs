//! Category matching: greedy longest-match scan of the token stream against
//! each taxonomy category.

use serde::{Deserialize, Serialize};

use crate::analysis::taxonomy::{Category, Taxonomy, TermPhrase};

/// Per-category match outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    /// Every occurrence counts, repeats included.
    pub hits: u32,
    /// Canonical terms seen at least once, deduplicated in first-match order.
    pub matched_terms: Vec<String>,
    /// hits / total token count; 0.0 for empty input.
    pub density: f64,
}

/// Scans the token sequence against every category, in taxonomy declaration
/// order. Multi-word terms must appear as contiguous token windows; at any
/// position the longest matching phrase wins and consumes its tokens, so
/// "machine learning" never double-counts as "machine" plus "learning".
pub fn match_categories(tokens: &[String], taxonomy: &Taxonomy) -> Vec<CategoryResult> {
    taxonomy
        .categories()
        .iter()
        .map(|category| match_category(tokens, category))
        .collect()
}

fn match_category(tokens: &[String], category: &Category) -> CategoryResult {
    let mut hits = 0u32;
    let mut matched_terms: Vec<String> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        match phrase_at(tokens, i, category) {
            Some(phrase) => {
                hits += 1;
                let canonical = &category.canonical_terms[phrase.canonical];
                if !matched_terms.iter().any(|t| t == canonical) {
                    matched_terms.push(canonical.clone());
                }
                i += phrase.tokens.len();
            }
            None => i += 1,
        }
    }

    let density = if tokens.is_empty() {
        0.0
    } else {
        f64::from(hits) / tokens.len() as f64
    };

    CategoryResult {
        category: category.name.clone(),
        hits,
        matched_terms,
        density,
    }
}

/// First phrase matching at `at`. Phrases are sorted longest-first at build
/// time, so the first hit is the longest match.
fn phrase_at<'a>(tokens: &[String], at: usize, category: &'a Category) -> Option<&'a TermPhrase> {
    category
        .phrases
        .iter()
        .find(|phrase| tokens[at..].starts_with(&phrase.tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalize::tokenize;
    use crate::analysis::taxonomy::{CategorySpec, TaxonomySpec};

    fn taxonomy(categories: Vec<CategorySpec>) -> Taxonomy {
        Taxonomy::build(TaxonomySpec { categories }, 0.02).unwrap()
    }

    fn category(name: &str, terms: &[&str], variants: &[(&str, &str)]) -> CategorySpec {
        CategorySpec {
            name: name.to_string(),
            weight: 1.0,
            saturation: None,
            terms: terms.iter().map(|t| (*t).to_string()).collect(),
            variants: variants
                .iter()
                .map(|(v, c)| ((*v).to_string(), (*c).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_example_scenario_hits_and_density() {
        let taxonomy = taxonomy(vec![category("programming", &["python", "javascript"], &[])]);
        let tokens = tokenize("Experience: 5 years Python, JavaScript development");

        let results = match_categories(&tokens, &taxonomy);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hits, 2);
        assert!((results[0].density - 2.0 / 6.0).abs() < 1e-9);
        assert_eq!(results[0].matched_terms, vec!["python", "javascript"]);
    }

    #[test]
    fn test_repeats_count_hits_but_dedupe_matched_terms() {
        let taxonomy = taxonomy(vec![category("programming", &["python"], &[])]);
        let tokens = tokenize("python python python");

        let result = &match_categories(&tokens, &taxonomy)[0];
        assert_eq!(result.hits, 3);
        assert_eq!(result.matched_terms, vec!["python"]);
        assert!((result.density - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_variant_folds_to_canonical() {
        let taxonomy = taxonomy(vec![category(
            "programming",
            &["javascript"],
            &[("js", "javascript")],
        )]);
        let tokens = tokenize("JS and more js");

        let result = &match_categories(&tokens, &taxonomy)[0];
        assert_eq!(result.hits, 2);
        assert_eq!(result.matched_terms, vec!["javascript"]);
    }

    #[test]
    fn test_multi_word_terms_need_contiguous_tokens() {
        let taxonomy = taxonomy(vec![category("data", &["machine learning"], &[])]);

        let hit = &match_categories(&tokenize("applied machine learning daily"), &taxonomy)[0];
        assert_eq!(hit.hits, 1);

        let miss = &match_categories(&tokenize("machine deep learning"), &taxonomy)[0];
        assert_eq!(miss.hits, 0);
        assert!(miss.matched_terms.is_empty());
    }

    #[test]
    fn test_longest_match_wins_and_consumes_tokens() {
        let taxonomy = taxonomy(vec![category("data", &["machine learning", "machine"], &[])]);
        let tokens = tokenize("machine learning");

        let result = &match_categories(&tokens, &taxonomy)[0];
        assert_eq!(result.hits, 1, "greedy match must not double-count");
        assert_eq!(result.matched_terms, vec!["machine learning"]);
    }

    #[test]
    fn test_variant_with_different_phrase_length() {
        let taxonomy = taxonomy(vec![category(
            "data",
            &["scikit-learn"],
            &[("scikit learn", "scikit-learn")],
        )]);

        let hyphenated = &match_categories(&tokenize("using scikit-learn"), &taxonomy)[0];
        assert_eq!(hyphenated.hits, 1);

        let spaced = &match_categories(&tokenize("using scikit learn"), &taxonomy)[0];
        assert_eq!(spaced.hits, 1);
        assert_eq!(spaced.matched_terms, vec!["scikit-learn"]);
    }

    #[test]
    fn test_results_follow_taxonomy_declaration_order() {
        let taxonomy = taxonomy(vec![
            category("marketing", &["seo"], &[]),
            category("programming", &["python"], &[]),
        ]);
        let tokens = tokenize("python seo python");

        let results = match_categories(&tokens, &taxonomy);
        assert_eq!(results[0].category, "marketing");
        assert_eq!(results[1].category, "programming");
        assert_eq!(results[1].hits, 2);
    }

    #[test]
    fn test_empty_input_has_zero_density() {
        let taxonomy = taxonomy(vec![category("programming", &["python"], &[])]);
        let result = &match_categories(&[], &taxonomy)[0];
        assert_eq!(result.hits, 0);
        assert_eq!(result.density, 0.0);
    }

    #[test]
    fn test_substring_tokens_do_not_match() {
        let taxonomy = taxonomy(vec![category("programming", &["java"], &[])]);
        let result = &match_categories(&tokenize("javascript developer"), &taxonomy)[0];
        assert_eq!(result.hits, 0, "'java' must not match inside 'javascript'");
    }

    #[test]
    fn test_adding_an_occurrence_never_lowers_hits_or_density() {
        let taxonomy = taxonomy(vec![category("programming", &["python"], &[])]);
        let base = &match_categories(&tokenize("python developer"), &taxonomy)[0];
        let more = &match_categories(&tokenize("python developer python"), &taxonomy)[0];

        assert!(more.hits >= base.hits);
        assert!(more.density >= base.density);
    }
}
