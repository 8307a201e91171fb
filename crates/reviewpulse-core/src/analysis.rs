// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt and response contract shared by every analysis backend.
//!
//! Backends differ only in transport. They all send the system prompt and
//! review block built here and hand the raw model text back to
//! [`parse_analysis`].

use std::fmt::Write as _;

use crate::catalog::normalize_language;
use crate::error::ReviewPulseError;
use crate::types::{AnalysisResult, Review};

/// A fully rendered analysis request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPrompt {
    /// Instruction contract, written for the resolved language.
    pub system: String,
    /// One line per review.
    pub user: String,
    /// Normalized language code stamped onto the result.
    pub language: &'static str,
}

/// Builds the prompt for `reviews`, substituting English for unknown codes.
pub fn build_prompt(reviews: &[Review], language: &str) -> AnalysisPrompt {
    let (code, name) = normalize_language(language);
    AnalysisPrompt {
        system: system_prompt(name),
        user: format_reviews(reviews),
        language: code,
    }
}

fn system_prompt(language_name: &str) -> String {
    format!(
        r#"You are a product review analyst. Respond ENTIRELY in {language_name}.

Analyze the customer reviews provided and return a JSON object with exactly this structure:
{{
  "summary": "A 2-3 sentence overall summary of customer opinions",
  "pros": ["pro 1", "pro 2", ...],
  "cons": ["con 1", "con 2", ...],
  "sentiment": {{"positive": <count>, "neutral": <count>, "negative": <count>}},
  "keywords": ["keyword1", "keyword2", ...]
}}

Rules:
- List 3-8 pros and 3-8 cons, derived from actual review content.
- sentiment counts must add up to the total number of reviews.
- keywords: top 5-10 most frequently mentioned product aspects.
- Respond ONLY with valid JSON. No markdown, no explanation."#
    )
}

/// Renders reviews as `Review {n} (Rating: {r}/5): {text}` lines, 1-based.
pub fn format_reviews(reviews: &[Review]) -> String {
    let mut block = String::new();
    for (i, review) in reviews.iter().enumerate() {
        let _ = writeln!(
            block,
            "Review {} (Rating: {:.1}/5): {}",
            i + 1,
            review.rating,
            review.text
        );
    }
    block
}

/// Removes a surrounding markdown code fence, if the model added one.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parses model output into an [`AnalysisResult`] stamped with `language`.
///
/// An empty body and an unparseable body are both provider failures.
pub fn parse_analysis(raw: &str, language: &str) -> Result<AnalysisResult, ReviewPulseError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ReviewPulseError::Provider {
            message: "analysis backend returned an empty response".into(),
            source: None,
        });
    }

    let mut result: AnalysisResult =
        serde_json::from_str(body).map_err(|e| ReviewPulseError::Provider {
            message: format!("failed to parse AI response: {e}"),
            source: Some(Box::new(e)),
        })?;
    result.language = language.to_string();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(text: &str, rating: f64) -> Review {
        Review {
            text: text.into(),
            rating,
            date: "2025-03-01".into(),
        }
    }

    const SAMPLE: &str = r#"{"summary":"Solid.","pros":["a","b","c"],"cons":["x","y","z"],"sentiment":{"positive":2,"neutral":0,"negative":1},"keywords":["k1","k2","k3","k4","k5"]}"#;

    #[test]
    fn reviews_are_numbered_with_ratings() {
        let block = format_reviews(&[review("Great sound", 5.0), review("Broke fast", 1.5)]);
        assert_eq!(
            block,
            "Review 1 (Rating: 5.0/5): Great sound\nReview 2 (Rating: 1.5/5): Broke fast\n"
        );
    }

    #[test]
    fn prompt_uses_language_name() {
        let prompt = build_prompt(&[review("ok", 3.0)], "vi");
        assert!(prompt.system.contains("Respond ENTIRELY in Vietnamese"));
        assert_eq!(prompt.language, "vi");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let prompt = build_prompt(&[], "klingon");
        assert!(prompt.system.contains("Respond ENTIRELY in English"));
        assert_eq!(prompt.language, "en");
    }

    #[test]
    fn strips_json_fence() {
        let fenced = format!("```json\n{SAMPLE}\n```");
        assert_eq!(strip_code_fence(&fenced), SAMPLE);
        let bare_fence = format!("```\n{SAMPLE}\n```");
        assert_eq!(strip_code_fence(&bare_fence), SAMPLE);
        assert_eq!(strip_code_fence(SAMPLE), SAMPLE);
    }

    #[test]
    fn parse_stamps_language() {
        let result = parse_analysis(&format!("```json\n{SAMPLE}\n```"), "ja").unwrap();
        assert_eq!(result.language, "ja");
        assert_eq!(result.sentiment.total(), 3);
        assert_eq!(result.keywords.len(), 5);
    }

    #[test]
    fn parse_rejects_empty_and_prose() {
        assert!(matches!(
            parse_analysis("   ", "en"),
            Err(ReviewPulseError::Provider { .. })
        ));
        let err = parse_analysis("Here is your analysis!", "en").unwrap_err();
        assert!(err.to_string().contains("failed to parse AI response"));
    }
}
