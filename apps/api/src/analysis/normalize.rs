//! Text normalization: the single tokenizer and line segmenter shared by
//! every downstream pass.
//!
//! Tokens are lowercased and split on non-alphanumeric boundaries; a hyphen
//! survives only between two alphanumeric characters, so "full-stack" stays
//! one token while stray dashes split. Line segments are the trimmed,
//! non-empty lines of the raw text with interior spacing intact (the layout
//! rules read tabs and space runs from them).

/// Derived views of a raw resume: normalized token sequence plus line segments.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub tokens: Vec<String>,
    pub lines: Vec<String>,
}

/// Normalizes raw text into tokens and line segments. Total: degenerate
/// input (empty, or nothing but punctuation) yields empty sequences.
pub fn normalize(raw: &str) -> NormalizedText {
    NormalizedText {
        tokens: tokenize(raw),
        lines: segment_lines(raw),
    }
}

/// Lowercased tokens split on non-alphanumeric boundaries. Unicode-aware;
/// digits count as token characters, matching how densities are defined.
pub fn tokenize(raw: &str) -> Vec<String> {
    let lower = raw.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();

    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            current.push(c);
        } else if c == '-'
            && !current.is_empty()
            && chars.get(i + 1).map(|n| n.is_alphanumeric()).unwrap_or(false)
        {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Trimmed, non-empty line segments in document order.
pub fn segment_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// An immutable resume ready for analysis: the raw text plus its derived
/// normalized views, computed once and passed by reference into the engine.
#[derive(Debug, Clone)]
pub struct ResumeText {
    raw: String,
    normalized: NormalizedText,
}

impl ResumeText {
    pub fn new(raw: String) -> Self {
        let normalized = normalize(&raw);
        Self { raw, normalized }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.normalized.tokens
    }

    pub fn lines(&self) -> &[String] {
        &self.normalized.lines
    }
}
