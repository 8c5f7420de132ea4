//! HTTP handlers for the analysis API.
//!
//! Thin layer: validate the input, run the engine, shape the response.
//! All scoring logic lives in the sibling modules.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::insights::Insights;
use crate::analysis::normalize::ResumeText;
use crate::analysis::{validate_resume_text, AnalysisResult, ChartPayload};
use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: AnalysisResult,
    pub chart: ChartPayload,
}

/// POST /api/v1/analysis
/// Scores raw resume text against the compiled taxonomy.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    validate_resume_text(&request.resume_text, state.engine.max_input_bytes())?;
    let resume = ResumeText::new(request.resume_text);
    let analysis = state.engine.analyze(&resume);

    info!(
        "Analyzed resume: overall={}, keyword={}, structure={}",
        analysis.overall_score, analysis.subscores.keyword, analysis.subscores.structure
    );

    Ok(Json(AnalyzeResponse {
        chart: analysis.chart_payload(),
        analysis,
    }))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub analysis: AnalysisResult,
    pub chart: ChartPayload,
    pub extracted_chars: usize,
}

/// POST /api/v1/analysis/upload
/// Multipart upload; expects the resume under the `file` field.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            // file_name must be taken before bytes() consumes the field.
            let filename = field.file_name().unwrap_or("resume.txt").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            upload = Some((filename, data));
        }
    }

    let (filename, data) = upload
        .ok_or_else(|| AppError::Validation("Multipart field 'file' is required".to_string()))?;

    info!("Upload received: '{}' ({} bytes)", filename, data.len());

    let max = state.engine.max_input_bytes();
    let text = tokio::task::spawn_blocking(move || extract_text(&filename, &data, max))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    validate_resume_text(&text, max)?;
    let resume = ResumeText::new(text);
    let analysis = state.engine.analyze(&resume);
    let extracted_chars = resume.raw().chars().count();

    Ok(Json(UploadResponse {
        chart: analysis.chart_payload(),
        analysis,
        extracted_chars,
    }))
}

#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub analysis: AnalysisResult,
    pub insights: Insights,
}

/// POST /api/v1/analysis/insights
/// Runs the analysis, then the configured insight backend over it.
pub async fn handle_insights(
    State(state): State<AppState>,
    Json(request): Json<InsightsRequest>,
) -> Result<Json<InsightsResponse>, AppError> {
    validate_resume_text(&request.resume_text, state.engine.max_input_bytes())?;
    let resume = ResumeText::new(request.resume_text);
    let analysis = state.engine.analyze(&resume);
    let insights = state.insights.generate(&analysis).await?;

    info!(
        "Generated insights via '{}' backend: {} recommendations",
        insights.backend,
        insights.recommendations.len()
    );

    Ok(Json(InsightsResponse { analysis, insights }))
}

#[derive(Debug, Serialize)]
pub struct CategoryOverview {
    pub name: String,
    pub weight: f64,
    pub saturation: f64,
    pub terms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TaxonomyOverview {
    pub categories: Vec<CategoryOverview>,
}

/// GET /api/v1/taxonomy
/// Exposes the active taxonomy so clients can show what gets scored.
pub async fn handle_taxonomy(State(state): State<AppState>) -> Json<TaxonomyOverview> {
    let categories = state
        .engine
        .taxonomy()
        .categories()
        .iter()
        .map(|c| CategoryOverview {
            name: c.name.clone(),
            weight: c.weight,
            saturation: c.saturation,
            terms: c.canonical_terms.clone(),
        })
        .collect();
    Json(TaxonomyOverview { categories })
}
