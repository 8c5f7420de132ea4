//! Resume analysis domain: taxonomy compilation, normalization, keyword
//! matching, structure validation, scoring and weak-point reporting.
//!
//! The engine is assembled once at startup from validated configuration.
//! After construction every analysis run is total and deterministic: the
//! same input always yields the same result, and no failure modes remain
//! past the input boundary.

pub mod aggregate;
pub mod handlers;
pub mod insights;
pub mod matcher;
pub mod normalize;
pub mod prompts;
pub mod structure;
pub mod taxonomy;
pub mod weak_points;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::aggregate::{ScoreWeights, Subscores};
use crate::analysis::matcher::CategoryResult;
use crate::analysis::normalize::ResumeText;
use crate::analysis::structure::{StructureFinding, StructureValidator};
use crate::analysis::taxonomy::Taxonomy;
use crate::analysis::weak_points::WeakPoint;

/// Startup-time configuration faults. Fatal: the engine refuses to build
/// rather than run with skewed scoring.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("score weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },

    #[error("score weight '{name}' must be within [0, 1], got {value}")]
    WeightRange { name: &'static str, value: f64 },

    #[error("'{name}' must be positive, got {value}")]
    Threshold { name: &'static str, value: f64 },

    #[error("taxonomy has no categories")]
    EmptyTaxonomy,

    #[error("category '{category}': {reason}")]
    Category { category: String, reason: String },
}

/// Tunables for one engine instance. Field defaults match the documented
/// scoring model; overrides come from the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub weights: ScoreWeights,
    /// Saturation ceiling applied to categories that do not set their own.
    pub default_saturation: f64,
    /// Densities strictly below this mark a category as a weak point.
    pub weak_density_threshold: f64,
    pub max_input_bytes: usize,
    /// Leading line segments searched for contact details.
    pub contact_zone_lines: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            default_saturation: 0.02,
            weak_density_threshold: 0.01,
            max_input_bytes: 10 * 1024 * 1024,
            contact_zone_lines: 10,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if !self.default_saturation.is_finite() || self.default_saturation <= 0.0 {
            return Err(ConfigError::Threshold {
                name: "default_saturation",
                value: self.default_saturation,
            });
        }
        if !self.weak_density_threshold.is_finite() || self.weak_density_threshold < 0.0 {
            return Err(ConfigError::Threshold {
                name: "weak_density_threshold",
                value: self.weak_density_threshold,
            });
        }
        if self.max_input_bytes == 0 {
            return Err(ConfigError::Threshold {
                name: "max_input_bytes",
                value: 0.0,
            });
        }
        if self.contact_zone_lines == 0 {
            return Err(ConfigError::Threshold {
                name: "contact_zone_lines",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Rejections raised at the input boundary, before any analysis runs.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("resume text is empty")]
    Empty,

    #[error("resume is {size} bytes, over the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("input does not look like resume text")]
    NotText,
}

/// Gatekeeper for raw resume text. Everything that passes here is analyzable.
pub fn validate_resume_text(text: &str, max_bytes: usize) -> Result<(), InputError> {
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }
    if text.len() > max_bytes {
        return Err(InputError::TooLarge {
            size: text.len(),
            max: max_bytes,
        });
    }
    if text.contains('\0') || !text.chars().any(char::is_alphabetic) {
        return Err(InputError::NotText);
    }
    Ok(())
}

/// Complete output of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Weighted combination of the subscores, rounded to an integer value.
    pub overall_score: f64,
    pub subscores: Subscores,
    pub category_results: Vec<CategoryResult>,
    pub structure_findings: Vec<StructureFinding>,
    pub weak_points: Vec<WeakPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGauge {
    pub hits: u32,
    pub density: f64,
}

/// Chart-friendly projection of an [`AnalysisResult`] for frontend gauges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPayload {
    pub overall_score: f64,
    pub subscores: Subscores,
    // BTreeMap keeps key order stable across runs.
    pub categories: BTreeMap<String, CategoryGauge>,
    pub findings: Vec<StructureFinding>,
    pub weak_points: Vec<WeakPoint>,
}

impl AnalysisResult {
    pub fn chart_payload(&self) -> ChartPayload {
        let categories = self
            .category_results
            .iter()
            .map(|r| {
                (
                    r.category.clone(),
                    CategoryGauge {
                        hits: r.hits,
                        density: r.density,
                    },
                )
            })
            .collect();
        ChartPayload {
            overall_score: self.overall_score,
            subscores: self.subscores,
            categories,
            findings: self.structure_findings.clone(),
            weak_points: self.weak_points.clone(),
        }
    }
}

/// Orchestrates the full pipeline: normalize, match, validate, score, report.
pub struct AnalysisEngine {
    taxonomy: Taxonomy,
    validator: StructureValidator,
    config: EngineConfig,
}

impl AnalysisEngine {
    /// Builds an engine or refuses with the first configuration fault.
    pub fn new(taxonomy: Taxonomy, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let validator = StructureValidator::new(config.contact_zone_lines);
        Ok(Self {
            taxonomy,
            validator,
            config,
        })
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn max_input_bytes(&self) -> usize {
        self.config.max_input_bytes
    }

    /// Runs the full analysis. Total over any [`ResumeText`]; degenerate
    /// input degrades to low scores instead of erroring.
    pub fn analyze(&self, resume: &ResumeText) -> AnalysisResult {
        let category_results = matcher::match_categories(resume.tokens(), &self.taxonomy);
        let structure_findings = self.validator.validate(resume.lines(), resume.raw());
        let (overall_score, subscores) = aggregate::aggregate(
            &category_results,
            &structure_findings,
            &self.taxonomy,
            &self.config.weights,
        );
        let weak_points = weak_points::derive_weak_points(
            &category_results,
            &structure_findings,
            &self.taxonomy,
            self.config.weak_density_threshold,
        );
        AnalysisResult {
            overall_score,
            subscores,
            category_results,
            structure_findings,
            weak_points,
        }
    }
}
