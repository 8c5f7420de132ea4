//! Insight generation over a finished analysis.
//!
//! Two backends behind one trait: a deterministic template backend that ships
//! by default, and an optional LLM backend for richer prose. Both consume the
//! same [`AnalysisResult`] and emit the same [`Insights`] shape, so the HTTP
//! surface never knows which one is wired in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::matcher::CategoryResult;
use crate::analysis::prompts::{INSIGHT_PROMPT_TEMPLATE, INSIGHT_SYSTEM};
use crate::analysis::structure::Severity;
use crate::analysis::weak_points::{WeakPoint, WeakPointSource};
use crate::analysis::AnalysisResult;
use crate::errors::AppError;
use crate::llm_client::LlmClient;

/// Subscores at or above this read as a strength.
const STRONG_SUBSCORE: f64 = 80.0;
/// Subscores below this get a recommendation.
const WEAK_SUBSCORE: f64 = 70.0;
/// Subscores below this escalate the recommendation to critical.
const CRITICAL_SUBSCORE: f64 = 50.0;

/// Matched categories need this many distinct terms to count as depth.
const DEPTH_TERMS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across both backends)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub area: String,
    pub severity: Severity,
    pub issue: String,
    pub impact: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insights {
    pub strengths: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub optimization_tips: Vec<String>,
    /// Which backend produced this. Filled in server-side, never by the LLM.
    #[serde(default)]
    pub backend: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Turns a finished analysis into candidate-facing guidance.
///
/// Swappable at startup: the template backend is the deterministic default,
/// the LLM backend trades determinism for richer wording.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, analysis: &AnalysisResult) -> Result<Insights, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// TemplateInsightGenerator (default backend)
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic backend: fixed phrasing driven entirely by the scores.
pub struct TemplateInsightGenerator;

#[async_trait]
impl InsightGenerator for TemplateInsightGenerator {
    async fn generate(&self, analysis: &AnalysisResult) -> Result<Insights, AppError> {
        Ok(build_template_insights(analysis))
    }
}

pub fn build_template_insights(analysis: &AnalysisResult) -> Insights {
    Insights {
        strengths: build_strengths(analysis),
        recommendations: build_recommendations(analysis),
        optimization_tips: build_tips(analysis),
        backend: "template".to_string(),
    }
}

fn build_strengths(analysis: &AnalysisResult) -> Vec<String> {
    let mut strengths = Vec::new();
    if analysis.subscores.keyword >= STRONG_SUBSCORE {
        strengths.push("Keyword coverage is strong across the scored categories.".to_string());
    }
    if analysis.subscores.structure >= STRONG_SUBSCORE {
        strengths
            .push("The layout is clean and should survive ATS text extraction intact.".to_string());
    }
    for result in &analysis.category_results {
        if result.matched_terms.len() >= DEPTH_TERMS {
            strengths.push(format!(
                "Good depth in '{}': {}.",
                result.category,
                result.matched_terms.join(", ")
            ));
        }
    }
    if strengths.is_empty() {
        strengths
            .push("The resume parses as plain text, which is the right starting point.".to_string());
    }
    strengths
}

fn build_recommendations(analysis: &AnalysisResult) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if analysis.subscores.keyword < WEAK_SUBSCORE {
        recommendations.push(Recommendation {
            area: "Keywords & Skills".to_string(),
            severity: severity_for(analysis.subscores.keyword),
            issue: category_issue(&analysis.weak_points),
            impact: "Low keyword density pushes the resume down ATS rankings before a human \
                     ever sees it."
                .to_string(),
            suggestion: "Mirror the target job description: name concrete tools and skills \
                         instead of general claims."
                .to_string(),
        });
    }

    if analysis.subscores.structure < WEAK_SUBSCORE {
        recommendations.push(Recommendation {
            area: "Structure & Formatting".to_string(),
            severity: severity_for(analysis.subscores.structure),
            issue: structure_issue(&analysis.weak_points),
            impact: "Parsing problems can drop whole sections from the extracted text."
                .to_string(),
            suggestion: "Use a single-column layout with standard section headers and contact \
                         details at the top."
                .to_string(),
        });
    }

    recommendations
}

fn build_tips(analysis: &AnalysisResult) -> Vec<String> {
    let mut tips = vec![
        "Tailor the resume to each posting; ATS ranking is relative to the job description."
            .to_string(),
        "Spell out an acronym once alongside its short form so both spellings can match."
            .to_string(),
        "Export as a text-based PDF, never a scan or an image.".to_string(),
    ];
    if analysis.subscores.keyword < STRONG_SUBSCORE {
        tips.push(
            "Weave missing terms into real achievements instead of listing them bare.".to_string(),
        );
    }
    if analysis.subscores.structure < STRONG_SUBSCORE {
        tips.push(
            "Keep one column, standard headers, and contact details in the first few lines."
                .to_string(),
        );
    }
    tips
}

fn severity_for(subscore: f64) -> Severity {
    if subscore < CRITICAL_SUBSCORE {
        Severity::Critical
    } else {
        Severity::Warning
    }
}

fn category_issue(weak_points: &[WeakPoint]) -> String {
    let names: Vec<&str> = weak_points
        .iter()
        .filter_map(|w| match &w.source {
            WeakPointSource::Category { name } => Some(name.as_str()),
            WeakPointSource::Rule { .. } => None,
        })
        .take(3)
        .collect();
    if names.is_empty() {
        "Keyword coverage is below the bar across the scored categories.".to_string()
    } else {
        format!("Weak coverage in: {}.", names.join(", "))
    }
}

fn structure_issue(weak_points: &[WeakPoint]) -> String {
    weak_points
        .iter()
        .find_map(|w| match &w.source {
            WeakPointSource::Rule { .. } => Some(w.detail.clone()),
            WeakPointSource::Category { .. } => None,
        })
        .unwrap_or_else(|| "Several formatting choices hurt machine readability.".to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// LlmInsightGenerator (optional backend)
// ────────────────────────────────────────────────────────────────────────────

/// LLM-backed generator. Serializes the analysis into the prompt and expects
/// the [`Insights`] JSON shape back.
pub struct LlmInsightGenerator {
    llm: LlmClient,
}

impl LlmInsightGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

/// Slice of the analysis worth the prompt tokens. Raw findings are omitted;
/// their substance already reaches the model through the weak points.
#[derive(Serialize)]
struct PromptPayload<'a> {
    overall_score: f64,
    keyword_subscore: f64,
    structure_subscore: f64,
    categories: &'a [CategoryResult],
    weak_points: &'a [WeakPoint],
}

fn prompt_payload(analysis: &AnalysisResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&PromptPayload {
        overall_score: analysis.overall_score,
        keyword_subscore: analysis.subscores.keyword,
        structure_subscore: analysis.subscores.structure,
        categories: &analysis.category_results,
        weak_points: &analysis.weak_points,
    })
}

#[async_trait]
impl InsightGenerator for LlmInsightGenerator {
    async fn generate(&self, analysis: &AnalysisResult) -> Result<Insights, AppError> {
        let payload = prompt_payload(analysis).map_err(|e| AppError::Internal(e.into()))?;
        let prompt = INSIGHT_PROMPT_TEMPLATE.replace("{analysis_json}", &payload);

        let mut insights: Insights = self
            .llm
            .call_json(&prompt, INSIGHT_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Insight generation failed: {e}")))?;
        insights.backend = "llm".to_string();

        debug!(
            "LLM insights generated: {} strengths, {} recommendations",
            insights.strengths.len(),
            insights.recommendations.len()
        );
        Ok(insights)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate::Subscores;
    use crate::analysis::structure::RuleId;
    use std::sync::Arc;

    fn analysis(keyword: f64, structure: f64) -> AnalysisResult {
        AnalysisResult {
            overall_score: (0.6 * keyword + 0.4 * structure).round(),
            subscores: Subscores { keyword, structure },
            category_results: vec![],
            structure_findings: vec![],
            weak_points: vec![],
        }
    }

    fn weak_point(source: WeakPointSource, detail: &str) -> WeakPoint {
        WeakPoint {
            title: "title".to_string(),
            detail: detail.to_string(),
            severity: Severity::Warning,
            source,
        }
    }

    #[test]
    fn test_template_insights_are_deterministic() {
        let analysis = analysis(55.0, 62.5);
        let first = serde_json::to_string(&build_template_insights(&analysis)).unwrap();
        let second = serde_json::to_string(&build_template_insights(&analysis)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_severity_escalates_below_fifty() {
        let insights = build_template_insights(&analysis(40.0, 60.0));
        assert_eq!(insights.recommendations.len(), 2);
        assert_eq!(insights.recommendations[0].area, "Keywords & Skills");
        assert_eq!(insights.recommendations[0].severity, Severity::Critical);
        assert_eq!(insights.recommendations[1].area, "Structure & Formatting");
        assert_eq!(insights.recommendations[1].severity, Severity::Warning);
    }

    #[test]
    fn test_high_scores_need_no_recommendations() {
        let insights = build_template_insights(&analysis(92.0, 88.0));
        assert!(insights.recommendations.is_empty());
        assert!(insights.strengths.len() >= 2);
        assert_eq!(insights.backend, "template");
        assert!(insights.optimization_tips.len() >= 3);
    }

    #[test]
    fn test_recommendation_issues_cite_weak_points() {
        let mut analysis = analysis(30.0, 45.0);
        analysis.weak_points = vec![
            weak_point(
                WeakPointSource::Rule {
                    id: RuleId::TabularLayout,
                },
                "2 lines use tabs or column-style spacing.",
            ),
            weak_point(
                WeakPointSource::Category {
                    name: "design".to_string(),
                },
                "Little or no 'design' coverage.",
            ),
        ];

        let insights = build_template_insights(&analysis);
        assert!(insights.recommendations[0].issue.contains("design"));
        assert!(insights.recommendations[1].issue.contains("tabs"));
    }

    #[test]
    fn test_category_depth_becomes_a_strength() {
        let mut analysis = analysis(85.0, 85.0);
        analysis.category_results = vec![CategoryResult {
            category: "programming".to_string(),
            hits: 6,
            matched_terms: vec![
                "python".to_string(),
                "sql".to_string(),
                "react".to_string(),
            ],
            density: 0.04,
        }];

        let insights = build_template_insights(&analysis);
        assert!(insights
            .strengths
            .iter()
            .any(|s| s.contains("programming") && s.contains("react")));
    }

    #[test]
    fn test_prompt_payload_carries_scores_and_weak_points() {
        let mut analysis = analysis(55.0, 70.0);
        analysis.weak_points = vec![weak_point(
            WeakPointSource::Category {
                name: "marketing".to_string(),
            },
            "Little or no 'marketing' coverage.",
        )];

        let payload = prompt_payload(&analysis).expect("payload serializes");
        assert!(payload.contains("\"keyword_subscore\": 55.0"));
        assert!(payload.contains("marketing"));
    }

    #[tokio::test]
    async fn test_template_backend_works_as_trait_object() {
        let generator: Arc<dyn InsightGenerator> = Arc::new(TemplateInsightGenerator);
        let insights = generator
            .generate(&analysis(75.0, 75.0))
            .await
            .expect("template backend never fails");
        assert_eq!(insights.backend, "template");
    }
}
