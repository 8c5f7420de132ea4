//! Score aggregation. Pure arithmetic over the matcher and validator output;
//! identical inputs always produce identical scores.

use serde::{Deserialize, Serialize};

use crate::analysis::matcher::CategoryResult;
use crate::analysis::structure::{Severity, StructureFinding};
use crate::analysis::taxonomy::Taxonomy;
use crate::analysis::ConfigError;

/// Deductions per finding severity, applied against a 100-point base.
const DEDUCTION_CRITICAL: f64 = 25.0;
const DEDUCTION_WARNING: f64 = 10.0;
const DEDUCTION_INFO: f64 = 2.5;

/// Relative weight of each analysis dimension in the overall score.
/// Must sum to 1.0 so the overall stays on the same 0-100 scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub keyword: f64,
    pub structure: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            keyword: 0.6,
            structure: 0.4,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("keyword", self.keyword), ("structure", self.structure)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightRange { name, value });
            }
        }
        let sum = self.keyword + self.structure;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

/// Per-dimension scores on the 0-100 scale, rounded to one decimal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Subscores {
    pub keyword: f64,
    pub structure: f64,
}

/// Combines both dimensions into the overall score. The overall is rounded
/// to an integer value (kept as f64 for the JSON payload), subscores to one
/// decimal.
pub fn aggregate(
    results: &[CategoryResult],
    findings: &[StructureFinding],
    taxonomy: &Taxonomy,
    weights: &ScoreWeights,
) -> (f64, Subscores) {
    let keyword = keyword_subscore(results, taxonomy);
    let structure = structure_subscore(findings);
    let overall = (weights.keyword * keyword + weights.structure * structure)
        .round()
        .clamp(0.0, 100.0);
    let subscores = Subscores {
        keyword: round1(keyword),
        structure: round1(structure),
    };
    (overall, subscores)
}

/// Weighted keyword coverage. Each category contributes its density capped at
/// the saturation ceiling, so stuffing a term past saturation buys nothing.
/// An empty result set degrades to zero rather than erroring; rejecting it
/// is the caller's job.
pub fn keyword_subscore(results: &[CategoryResult], taxonomy: &Taxonomy) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (category, result) in taxonomy.categories().iter().zip(results) {
        let ratio = result.density.min(category.saturation) / category.saturation;
        weighted += category.weight * ratio;
        total_weight += category.weight;
    }
    if total_weight == 0.0 {
        return 0.0;
    }
    (weighted / total_weight * 100.0).clamp(0.0, 100.0)
}

/// Structure starts from a perfect 100 and loses points per finding,
/// floored at zero.
pub fn structure_subscore(findings: &[StructureFinding]) -> f64 {
    let deductions: f64 = findings
        .iter()
        .map(|f| match f.severity {
            Severity::Critical => DEDUCTION_CRITICAL,
            Severity::Warning => DEDUCTION_WARNING,
            Severity::Info => DEDUCTION_INFO,
        })
        .sum();
    (100.0 - deductions).max(0.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::structure::RuleId;
    use crate::analysis::taxonomy::{CategorySpec, TaxonomySpec};
    use std::collections::BTreeMap;

    fn two_category_taxonomy() -> Taxonomy {
        let spec = TaxonomySpec {
            categories: vec![
                CategorySpec {
                    name: "alpha".to_string(),
                    weight: 0.75,
                    saturation: None,
                    terms: vec!["rust".to_string()],
                    variants: BTreeMap::new(),
                },
                CategorySpec {
                    name: "beta".to_string(),
                    weight: 0.25,
                    saturation: Some(0.1),
                    terms: vec!["go".to_string()],
                    variants: BTreeMap::new(),
                },
            ],
        };
        Taxonomy::build(spec, 0.02).expect("taxonomy builds")
    }

    fn result(category: &str, density: f64) -> CategoryResult {
        CategoryResult {
            category: category.to_string(),
            hits: 1,
            matched_terms: vec![],
            density,
        }
    }

    fn finding(severity: Severity) -> StructureFinding {
        StructureFinding {
            rule: RuleId::MissingSection,
            severity,
            description: "test".to_string(),
            line: None,
        }
    }

    #[test]
    fn test_density_at_saturation_scores_full_credit() {
        let taxonomy = two_category_taxonomy();
        let at = keyword_subscore(&[result("alpha", 0.02), result("beta", 0.1)], &taxonomy);
        let beyond = keyword_subscore(&[result("alpha", 0.5), result("beta", 0.9)], &taxonomy);
        assert!((at - 100.0).abs() < 1e-9, "at saturation: {at}");
        assert!(
            (beyond - 100.0).abs() < 1e-9,
            "beyond saturation: {beyond}"
        );
    }

    #[test]
    fn test_keyword_score_scales_linearly_below_saturation() {
        let taxonomy = two_category_taxonomy();
        let half = keyword_subscore(&[result("alpha", 0.01), result("beta", 0.05)], &taxonomy);
        assert!((half - 50.0).abs() < 1e-9, "half saturation: {half}");
    }

    #[test]
    fn test_category_weights_bias_the_subscore() {
        let taxonomy = two_category_taxonomy();
        // Only the 0.75-weight category saturated.
        let score = keyword_subscore(&[result("alpha", 0.02), result("beta", 0.0)], &taxonomy);
        assert!((score - 75.0).abs() < 1e-9, "weighted score: {score}");
    }

    #[test]
    fn test_empty_results_degrade_to_zero() {
        let taxonomy = two_category_taxonomy();
        assert_eq!(keyword_subscore(&[], &taxonomy), 0.0);
    }

    #[test]
    fn test_structure_deductions_stack() {
        let findings = vec![
            finding(Severity::Critical),
            finding(Severity::Warning),
            finding(Severity::Info),
        ];
        assert!((structure_subscore(&findings) - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_structure_score_floors_at_zero() {
        let findings: Vec<StructureFinding> =
            (0..5).map(|_| finding(Severity::Critical)).collect();
        assert_eq!(structure_subscore(&findings), 0.0);
    }

    #[test]
    fn test_clean_input_scores_perfect_100() {
        let taxonomy = two_category_taxonomy();
        let (overall, subscores) = aggregate(
            &[result("alpha", 0.02), result("beta", 0.1)],
            &[],
            &taxonomy,
            &ScoreWeights::default(),
        );
        assert_eq!(overall, 100.0);
        assert_eq!(subscores.keyword, 100.0);
        assert_eq!(subscores.structure, 100.0);
    }

    #[test]
    fn test_overall_is_integer_valued_and_subscores_one_decimal() {
        let taxonomy = two_category_taxonomy();
        // keyword = 75.0, structure = 87.5 -> overall 0.6*75 + 0.4*87.5 = 80.0
        let (overall, subscores) = aggregate(
            &[result("alpha", 0.02), result("beta", 0.0)],
            &[finding(Severity::Warning), finding(Severity::Info)],
            &taxonomy,
            &ScoreWeights::default(),
        );
        assert_eq!(overall, overall.round());
        assert_eq!(overall, 80.0);
        assert_eq!(subscores.structure, 87.5);
        assert_eq!(subscores.keyword * 10.0, (subscores.keyword * 10.0).round());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let weights = ScoreWeights {
            keyword: 0.7,
            structure: 0.4,
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::WeightSum { .. })
        ));
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let weights = ScoreWeights {
            keyword: -0.1,
            structure: 1.1,
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::WeightRange { name: "keyword", .. })
        ));
    }

    #[test]
    fn test_default_weights_pass_validation() {
        assert!(ScoreWeights::default().validate().is_ok());
    }
}
