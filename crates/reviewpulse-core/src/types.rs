// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the gateway, the workflow, and the adapters.
//!
//! Every type here crosses a process boundary (the shared store or the
//! queue), so field names are part of the wire contract with the external
//! scraper worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Broker,
    Provider,
}

/// Lifecycle state of a session.
///
/// `pending -> scraping -> analyzing -> complete`, with `error` reachable
/// from every non-terminal state. `complete` and `error` are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Scraping,
    Analyzing,
    Complete,
    Error,
}

impl SessionStatus {
    /// Returns true for states with no outgoing transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Complete | SessionStatus::Error)
    }

    /// Returns true if `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (self, next) {
            (Pending, Scraping) => true,
            (Scraping, Analyzing) => true,
            (Analyzing, Complete) => true,
            (Pending | Scraping | Analyzing, Error) => true,
            _ => false,
        }
    }
}

/// Metadata record for one workflow, keyed by its token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub url: String,
    pub platform: String,
    pub status: SessionStatus,
    pub output_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single scraped customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub text: String,
    pub rating: f64,
    #[serde(default)]
    pub date: String,
}

/// Sentiment counts across the analysed reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default)]
    pub positive: u32,
    #[serde(default)]
    pub neutral: u32,
    #[serde(default)]
    pub negative: u32,
}

impl Sentiment {
    /// Sum of all three buckets; expected to equal the review count.
    pub fn total(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }
}

/// AI-generated summary of a product's reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub language: String,
}

/// Dispatch message published on the job channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeJob {
    pub token: String,
    pub url: String,
    pub platform: String,
}

/// Completion message consumed from the result channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reviews: Vec<Review>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResult {
    /// Decodes a raw message body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// The worker-reported error, if any. Empty strings count as absent.
    pub fn scrape_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Review>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Review>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Analyzing).unwrap();
        assert_eq!(json, "\"analyzing\"");
        assert_eq!(SessionStatus::Complete.to_string(), "complete");
        assert_eq!(
            SessionStatus::from_str("scraping").unwrap(),
            SessionStatus::Scraping
        );
    }

    #[test]
    fn terminal_states_have_no_successor() {
        use SessionStatus::*;
        for from in [Complete, Error] {
            for to in [Pending, Scraping, Analyzing, Complete, Error] {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn forward_path_is_allowed() {
        use SessionStatus::*;
        assert!(Pending.can_transition_to(Scraping));
        assert!(Scraping.can_transition_to(Analyzing));
        assert!(Analyzing.can_transition_to(Complete));
        assert!(Scraping.can_transition_to(Error));
        assert!(Analyzing.can_transition_to(Error));
    }

    #[test]
    fn stages_cannot_be_skipped_or_reversed() {
        use SessionStatus::*;
        assert!(!Pending.can_transition_to(Analyzing));
        assert!(!Pending.can_transition_to(Complete));
        assert!(!Scraping.can_transition_to(Complete));
        assert!(!Analyzing.can_transition_to(Scraping));
        assert!(!Scraping.can_transition_to(Pending));
    }

    #[test]
    fn scrape_result_decodes_worker_payload() {
        let body = br#"{"token":"t1","reviews":[{"text":"great","rating":5.0,"date":"2025-01-02"}],"error":""}"#;
        let result = ScrapeResult::from_slice(body).unwrap();
        assert_eq!(result.token, "t1");
        assert_eq!(result.reviews.len(), 1);
        assert!(result.scrape_error().is_none());
    }

    #[test]
    fn scrape_result_accepts_null_reviews_and_error() {
        let body = br#"{"token":"t2","reviews":null,"error":"blocked by captcha"}"#;
        let result = ScrapeResult::from_slice(body).unwrap();
        assert!(result.reviews.is_empty());
        assert_eq!(result.scrape_error(), Some("blocked by captcha"));
    }

    #[test]
    fn scrape_result_rejects_garbage() {
        assert!(ScrapeResult::from_slice(b"not json").is_err());
        assert!(ScrapeResult::from_slice(br#"{"reviews":[]}"#).is_err());
    }

    #[test]
    fn session_omits_empty_error_message() {
        let session = Session {
            token: "abc".into(),
            url: String::new(),
            platform: String::new(),
            status: SessionStatus::Pending,
            output_language: "en".into(),
            error_message: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("error_message").is_none());
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn sentiment_total() {
        let s = Sentiment {
            positive: 3,
            neutral: 1,
            negative: 1,
        };
        assert_eq!(s.total(), 5);
    }
}
