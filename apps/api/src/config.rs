use anyhow::{bail, Context, Result};

/// Which insight backend to wire in at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightBackend {
    Template,
    Llm,
}

/// Application configuration loaded from environment variables.
/// Every value has a default except `GROQ_API_KEY`, which is required only
/// when the LLM insight backend is selected.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub insight_backend: InsightBackend,
    pub groq_api_key: Option<String>,
    /// Path to a taxonomy JSON file. Unset means the built-in taxonomy.
    pub taxonomy_path: Option<String>,
    pub keyword_weight: f64,
    pub structure_weight: f64,
    pub saturation_density: f64,
    pub weak_density: f64,
    pub max_upload_bytes: usize,
    pub contact_zone_lines: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let insight_backend = match std::env::var("INSIGHT_BACKEND")
            .unwrap_or_else(|_| "template".to_string())
            .to_lowercase()
            .as_str()
        {
            "template" => InsightBackend::Template,
            "llm" => InsightBackend::Llm,
            other => bail!("INSIGHT_BACKEND must be 'template' or 'llm', got '{other}'"),
        };

        let groq_api_key = std::env::var("GROQ_API_KEY").ok();
        if insight_backend == InsightBackend::Llm && groq_api_key.is_none() {
            bail!("GROQ_API_KEY is required when INSIGHT_BACKEND=llm");
        }

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            insight_backend,
            groq_api_key,
            taxonomy_path: std::env::var("TAXONOMY_PATH").ok(),
            keyword_weight: parse_env("ATS_KEYWORD_WEIGHT", 0.6)?,
            structure_weight: parse_env("ATS_STRUCTURE_WEIGHT", 0.4)?,
            saturation_density: parse_env("ATS_SATURATION_DENSITY", 0.02)?,
            weak_density: parse_env("ATS_WEAK_DENSITY", 0.01)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            contact_zone_lines: parse_env("CONTACT_ZONE_LINES", 10)?,
        })
    }
}

/// Parses an optional environment variable. Unset falls back to the default;
/// set-but-invalid is a startup error, never a silent fallback.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .ok()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
