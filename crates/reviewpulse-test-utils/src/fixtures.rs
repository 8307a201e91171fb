// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned inputs shared across test suites.

use reviewpulse_config::ReviewPulseConfig;
use reviewpulse_core::{AnalysisResult, Review, ScrapeResult, Sentiment};

/// `n` reviews with ratings cycling through 1..=5.
pub fn sample_reviews(n: usize) -> Vec<Review> {
    (0..n)
        .map(|i| Review {
            text: format!("review number {}", i + 1),
            rating: (i % 5 + 1) as f64,
            date: "2025-06-01".into(),
        })
        .collect()
}

/// A well-formed analysis in `language`.
pub fn sample_analysis(language: &str) -> AnalysisResult {
    AnalysisResult {
        summary: "Customers like the build quality but not the battery.".into(),
        pros: vec!["sturdy".into(), "good value".into(), "fast shipping".into()],
        cons: vec!["battery".into(), "manual".into(), "noise".into()],
        sentiment: Sentiment {
            positive: 2,
            neutral: 1,
            negative: 1,
        },
        keywords: ["battery", "build", "price", "shipping", "noise"]
            .into_iter()
            .map(String::from)
            .collect(),
        language: language.into(),
    }
}

/// A successful worker result for `token`.
pub fn scrape_success(token: &str, reviews: usize) -> ScrapeResult {
    ScrapeResult {
        token: token.into(),
        reviews: sample_reviews(reviews),
        error: None,
    }
}

/// A failed worker result for `token`.
pub fn scrape_failure(token: &str, error: &str) -> ScrapeResult {
    ScrapeResult {
        token: token.into(),
        reviews: Vec::new(),
        error: Some(error.into()),
    }
}

/// Defaults with a fast stream poll interval.
pub fn test_config() -> ReviewPulseConfig {
    let mut config = ReviewPulseConfig::default();
    config.session.stream_poll_interval_ms = 100;
    config
}
