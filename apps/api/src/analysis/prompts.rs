// All LLM prompt constants for the analysis module.
// Wording changes happen here, never at call sites.

/// System prompt for insight generation. Enforces JSON-only output.
pub const INSIGHT_SYSTEM: &str =
    "You are an ATS (Applicant Tracking System) optimization expert reviewing \
    an automated resume analysis. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Insight prompt template. Replace `{analysis_json}` before sending.
pub const INSIGHT_PROMPT_TEMPLATE: &str = r#"Here is the automated ATS analysis of a resume:

{analysis_json}

Write insights for the candidate based on the analysis above.

Return a JSON object with this EXACT schema (no extra fields):
{
  "strengths": ["2 to 4 things the resume already does well, grounded in the scores"],
  "recommendations": [
    {
      "area": "Keywords & Skills or Structure & Formatting",
      "severity": "critical, warning, or info",
      "issue": "what is wrong, citing the weak points above",
      "impact": "why it costs the candidate",
      "suggestion": "the concrete fix"
    }
  ],
  "optimization_tips": ["3 to 5 concrete next actions"]
}

Include one recommendation per problem area and skip areas that scored well.
Keep every string under 200 characters."#;
