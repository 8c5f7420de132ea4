use std::sync::Arc;

use crate::analysis::insights::InsightGenerator;
use crate::analysis::AnalysisEngine;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Compiled analysis engine. Read-only after startup, so clones are cheap
    /// and every request sees the same taxonomy and thresholds.
    pub engine: Arc<AnalysisEngine>,
    /// Pluggable insight backend. Default: TemplateInsightGenerator. Swap via
    /// INSIGHT_BACKEND env.
    pub insights: Arc<dyn InsightGenerator>,
    pub config: Config,
}
