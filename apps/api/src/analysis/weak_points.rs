//! Weak-point derivation. Folds category results and structure findings into
//! a single prioritized list of actionable issues.
//!
//! Ordering contract: critical structure findings first, then weak keyword
//! categories sorted by ascending density (worst coverage first), then the
//! remaining warnings. Info findings never surface here.

use serde::{Deserialize, Serialize};

use crate::analysis::matcher::CategoryResult;
use crate::analysis::structure::{RuleId, Severity, StructureFinding};
use crate::analysis::taxonomy::{Category, Taxonomy};

/// Canonical terms suggested per weak category.
const SUGGESTED_TERMS: usize = 3;

/// Where a weak point came from, so clients can link back to the category
/// gauge or the structure rule that raised it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeakPointSource {
    Category { name: String },
    Rule { id: RuleId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeakPoint {
    pub title: String,
    pub detail: String,
    pub severity: Severity,
    pub source: WeakPointSource,
}

pub fn derive_weak_points(
    results: &[CategoryResult],
    findings: &[StructureFinding],
    taxonomy: &Taxonomy,
    weak_density_threshold: f64,
) -> Vec<WeakPoint> {
    let mut weak_points = Vec::new();

    for finding in findings.iter().filter(|f| f.severity == Severity::Critical) {
        weak_points.push(from_finding(finding));
    }

    let mut weak_categories: Vec<(&Category, &CategoryResult)> = taxonomy
        .categories()
        .iter()
        .zip(results)
        .filter(|(_, result)| result.density < weak_density_threshold)
        .collect();
    // Stable sort keeps declaration order for equal densities.
    weak_categories.sort_by(|(_, a), (_, b)| {
        a.density
            .partial_cmp(&b.density)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (category, result) in weak_categories {
        weak_points.push(from_category(category, result));
    }

    for finding in findings.iter().filter(|f| f.severity == Severity::Warning) {
        weak_points.push(from_finding(finding));
    }

    weak_points
}

fn from_finding(finding: &StructureFinding) -> WeakPoint {
    WeakPoint {
        title: rule_title(finding.rule).to_string(),
        detail: finding.description.clone(),
        severity: finding.severity,
        source: WeakPointSource::Rule { id: finding.rule },
    }
}

fn from_category(category: &Category, result: &CategoryResult) -> WeakPoint {
    let missing: Vec<&str> = category
        .canonical_terms
        .iter()
        .filter(|term| !result.matched_terms.contains(term))
        .take(SUGGESTED_TERMS)
        .map(String::as_str)
        .collect();

    let detail = if missing.is_empty() {
        format!(
            "'{}' coverage is thin. Work the terms you already use into more of the resume.",
            category.name
        )
    } else {
        format!(
            "Little or no '{}' coverage. Consider working in terms like: {}.",
            category.name,
            missing.join(", ")
        )
    };

    WeakPoint {
        title: format!("Low keyword coverage: {}", category.name),
        detail,
        severity: Severity::Warning,
        source: WeakPointSource::Category {
            name: category.name.clone(),
        },
    }
}

fn rule_title(rule: RuleId) -> &'static str {
    match rule {
        RuleId::MissingSection => "Missing resume section",
        RuleId::TabularLayout => "Table or column layout",
        RuleId::NonStandardCharacters => "Non-standard characters",
        RuleId::ContactInfo => "Contact information",
        RuleId::ExcessiveCaps => "Excessive capitalization",
        RuleId::OverlongLines => "Overlong lines",
    }
}
