//! Keyword taxonomy: skill categories with canonical terms, variant
//! spellings, per-category weights, and density saturation thresholds.
//!
//! Ships with a built-in table; TAXONOMY_PATH swaps in a JSON file wholesale.
//! Everything is compiled and validated once at startup, so a malformed table
//! can never reach the analysis path.

use std::collections::{BTreeMap, HashSet};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::analysis::normalize::tokenize;
use crate::analysis::ConfigError;

// ────────────────────────────────────────────────────────────────────────────
// Declarative spec (what the JSON file or the built-in table describes)
// ────────────────────────────────────────────────────────────────────────────

/// On-disk taxonomy shape. `Taxonomy::build` compiles and validates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomySpec {
    pub categories: Vec<CategorySpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub weight: f64,
    /// Density at which this category stops earning keyword score. Falls
    /// back to the engine-wide default when absent.
    #[serde(default)]
    pub saturation: Option<f64>,
    pub terms: Vec<String>,
    /// Variant spelling -> canonical term; the target must name an entry in
    /// `terms`. BTreeMap keeps compilation order stable.
    #[serde(default)]
    pub variants: BTreeMap<String, String>,
}

/// Built-in category table: (name, weight, terms, variant -> canonical).
const DEFAULT_CATEGORIES: &[(&str, f64, &[&str], &[(&str, &str)])] = &[
    (
        "programming",
        0.30,
        &[
            "python",
            "java",
            "javascript",
            "typescript",
            "sql",
            "html",
            "css",
            "react",
            "angular",
            "node",
        ],
        &[
            ("js", "javascript"),
            ("ts", "typescript"),
            ("py", "python"),
            ("reactjs", "react"),
            ("nodejs", "node"),
        ],
    ),
    (
        "data_science",
        0.20,
        &[
            "machine learning",
            "data analysis",
            "statistics",
            "pandas",
            "numpy",
            "tensorflow",
            "pytorch",
            "scikit-learn",
        ],
        &[
            ("ml", "machine learning"),
            ("sklearn", "scikit-learn"),
            ("scikit learn", "scikit-learn"),
        ],
    ),
    (
        "business",
        0.20,
        &[
            "project management",
            "agile",
            "scrum",
            "leadership",
            "strategic planning",
            "stakeholder management",
            "budgeting",
        ],
        &[
            ("program management", "project management"),
            ("scrum master", "scrum"),
        ],
    ),
    (
        "design",
        0.15,
        &[
            "photoshop",
            "illustrator",
            "figma",
            "sketch",
            "graphic design",
            "web design",
            "user experience",
            "wireframing",
        ],
        &[
            ("ux", "user experience"),
            ("adobe photoshop", "photoshop"),
            ("adobe illustrator", "illustrator"),
        ],
    ),
    (
        "marketing",
        0.15,
        &[
            "seo",
            "sem",
            "google analytics",
            "social media",
            "content marketing",
            "email marketing",
            "copywriting",
            "branding",
        ],
        &[
            ("search engine optimization", "seo"),
            ("search engine marketing", "sem"),
        ],
    ),
];

/// The taxonomy used when no TAXONOMY_PATH override is configured.
pub fn default_spec() -> TaxonomySpec {
    TaxonomySpec {
        categories: DEFAULT_CATEGORIES
            .iter()
            .map(|(name, weight, terms, variants)| CategorySpec {
                name: (*name).to_string(),
                weight: *weight,
                saturation: None,
                terms: terms.iter().map(|t| (*t).to_string()).collect(),
                variants: variants
                    .iter()
                    .map(|(v, c)| ((*v).to_string(), (*c).to_string()))
                    .collect(),
            })
            .collect(),
    }
}

/// Loads a taxonomy spec from a JSON file.
pub fn load_spec(path: &str) -> anyhow::Result<TaxonomySpec> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read taxonomy file '{path}'"))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse taxonomy file '{path}'"))
}

// ────────────────────────────────────────────────────────────────────────────
// Compiled form (what the matcher scans against)
// ────────────────────────────────────────────────────────────────────────────

/// A surface form compiled to the token sequence the matcher scans for.
#[derive(Debug, Clone)]
pub struct TermPhrase {
    pub tokens: Vec<String>,
    /// Index into the owning category's `canonical_terms`.
    pub canonical: usize,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub weight: f64,
    pub saturation: f64,
    /// Canonical terms in declaration order, in normalized (token-joined) form.
    pub canonical_terms: Vec<String>,
    /// All surface forms (canonical + variants), longest phrase first so a
    /// greedy scan takes the longest match at any position.
    pub phrases: Vec<TermPhrase>,
}

/// The compiled taxonomy. Read-only after startup; concurrent analyses share
/// it without locking.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<Category>,
}

impl Taxonomy {
    /// Compiles and validates a spec. Any defect here is a startup error;
    /// the analysis path assumes a well-formed taxonomy.
    pub fn build(spec: TaxonomySpec, default_saturation: f64) -> Result<Self, ConfigError> {
        if spec.categories.is_empty() {
            return Err(ConfigError::EmptyTaxonomy);
        }

        let mut seen_names: HashSet<String> = HashSet::new();
        let mut categories = Vec::with_capacity(spec.categories.len());

        for cat in spec.categories {
            let name = cat.name.trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::Category {
                    category: cat.name,
                    reason: "category name is empty".to_string(),
                });
            }
            if !seen_names.insert(name.clone()) {
                return Err(ConfigError::Category {
                    category: name,
                    reason: "duplicate category name".to_string(),
                });
            }
            if !(cat.weight.is_finite() && cat.weight > 0.0) {
                return Err(ConfigError::Category {
                    category: name,
                    reason: format!("weight must be a positive number, got {}", cat.weight),
                });
            }
            let saturation = cat.saturation.unwrap_or(default_saturation);
            if !(saturation.is_finite() && saturation > 0.0) {
                return Err(ConfigError::Category {
                    category: name,
                    reason: format!("saturation must be a positive density, got {saturation}"),
                });
            }
            if cat.terms.is_empty() {
                return Err(ConfigError::Category {
                    category: name,
                    reason: "category has no terms".to_string(),
                });
            }

            let mut canonical_terms = Vec::with_capacity(cat.terms.len());
            let mut phrases: Vec<TermPhrase> = Vec::new();
            let mut seen_phrases: HashSet<Vec<String>> = HashSet::new();

            for term in &cat.terms {
                let tokens = tokenize(term);
                if tokens.is_empty() {
                    return Err(ConfigError::Category {
                        category: name,
                        reason: format!("term '{term}' normalizes to nothing"),
                    });
                }
                if !seen_phrases.insert(tokens.clone()) {
                    return Err(ConfigError::Category {
                        category: name,
                        reason: format!("term '{term}' duplicates another surface form"),
                    });
                }
                canonical_terms.push(tokens.join(" "));
                phrases.push(TermPhrase {
                    tokens,
                    canonical: canonical_terms.len() - 1,
                });
            }

            for (variant, target) in &cat.variants {
                let target_key = tokenize(target).join(" ");
                let canonical = canonical_terms
                    .iter()
                    .position(|t| *t == target_key)
                    .ok_or_else(|| ConfigError::Category {
                        category: name.clone(),
                        reason: format!("variant '{variant}' targets unknown term '{target}'"),
                    })?;
                let tokens = tokenize(variant);
                if tokens.is_empty() {
                    return Err(ConfigError::Category {
                        category: name,
                        reason: format!("variant '{variant}' normalizes to nothing"),
                    });
                }
                if !seen_phrases.insert(tokens.clone()) {
                    return Err(ConfigError::Category {
                        category: name,
                        reason: format!("variant '{variant}' duplicates another surface form"),
                    });
                }
                phrases.push(TermPhrase { tokens, canonical });
            }

            // Longest first; lexicographic tie-break keeps the order stable.
            phrases.sort_by(|a, b| {
                b.tokens
                    .len()
                    .cmp(&a.tokens.len())
                    .then_with(|| a.tokens.cmp(&b.tokens))
            });

            categories.push(Category {
                name,
                weight: cat.weight,
                saturation,
                canonical_terms,
                phrases,
            });
        }

        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
