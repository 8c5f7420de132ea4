mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::analysis::aggregate::ScoreWeights;
use crate::analysis::insights::{InsightGenerator, LlmInsightGenerator, TemplateInsightGenerator};
use crate::analysis::taxonomy::{default_spec, load_spec, Taxonomy};
use crate::analysis::{AnalysisEngine, EngineConfig};
use crate::config::{Config, InsightBackend};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on invalid env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATSLens API v{}", env!("CARGO_PKG_VERSION"));

    // Compile the analysis engine (taxonomy + scoring thresholds)
    let engine = Arc::new(build_engine(&config)?);
    info!(
        "Analysis engine ready: {} categories",
        engine.taxonomy().categories().len()
    );

    // Initialize insight backend
    let insights = build_insight_generator(&config)?;

    // Build app state
    let state = AppState {
        engine,
        insights,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Compiles the taxonomy and scoring configuration into an engine.
/// Any fault here aborts startup; the engine never runs half-configured.
fn build_engine(config: &Config) -> Result<AnalysisEngine> {
    let spec = match &config.taxonomy_path {
        Some(path) => {
            info!("Loading taxonomy from {path}");
            load_spec(path)?
        }
        None => default_spec(),
    };

    let engine_config = EngineConfig {
        weights: ScoreWeights {
            keyword: config.keyword_weight,
            structure: config.structure_weight,
        },
        default_saturation: config.saturation_density,
        weak_density_threshold: config.weak_density,
        max_input_bytes: config.max_upload_bytes,
        contact_zone_lines: config.contact_zone_lines,
    };

    let taxonomy = Taxonomy::build(spec, engine_config.default_saturation)
        .context("Invalid taxonomy configuration")?;
    AnalysisEngine::new(taxonomy, engine_config).context("Invalid engine configuration")
}

/// Picks the insight backend configured via INSIGHT_BACKEND.
fn build_insight_generator(config: &Config) -> Result<Arc<dyn InsightGenerator>> {
    match config.insight_backend {
        InsightBackend::Template => {
            info!("Insight backend: template");
            Ok(Arc::new(TemplateInsightGenerator))
        }
        InsightBackend::Llm => {
            let api_key = config
                .groq_api_key
                .clone()
                .context("GROQ_API_KEY is required when INSIGHT_BACKEND=llm")?;
            info!("Insight backend: llm (model: {})", llm_client::MODEL);
            Ok(Arc::new(LlmInsightGenerator::new(LlmClient::new(api_key))))
        }
    }
}
