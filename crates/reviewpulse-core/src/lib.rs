// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the ReviewPulse gateway.
//!
//! This crate provides the trait definitions for the external collaborators
//! (shared store, durable queue, analysis backends), the error taxonomy, and
//! the domain types that travel between the gateway and the scraper worker.

pub mod analysis;
pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ReviewPulseError;
pub use types::{
    AdapterType, AnalysisResult, HealthStatus, Review, ScrapeJob, ScrapeResult, Sentiment,
    Session, SessionStatus,
};

pub use traits::{AnalysisProvider, Delivery, MessageBroker, PluginAdapter, StateStore};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn error_variants_construct() {
        let _config = ReviewPulseError::Config("test".into());
        let _validation = ReviewPulseError::Validation("test".into());
        let not_found = ReviewPulseError::NotFound {
            token: "abc".into(),
        };
        let storage = ReviewPulseError::storage("get failed", std::io::Error::other("down"));
        let queue = ReviewPulseError::queue("publish failed", std::io::Error::other("down"));
        let _provider = ReviewPulseError::Provider {
            message: "test".into(),
            source: None,
        };
        let _transition = ReviewPulseError::InvalidTransition {
            from: SessionStatus::Complete,
            to: SessionStatus::Scraping,
        };
        let _internal = ReviewPulseError::Internal("test".into());

        assert!(not_found.is_not_found());
        assert!(storage.is_upstream());
        assert!(queue.is_upstream());
        assert!(!not_found.is_upstream());
    }

    #[test]
    fn transition_error_names_states() {
        let err = ReviewPulseError::InvalidTransition {
            from: SessionStatus::Error,
            to: SessionStatus::Complete,
        };
        assert_eq!(err.to_string(), "invalid session transition: error -> complete");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_state_store<T: StateStore>() {}
        fn _assert_message_broker<T: MessageBroker>() {}
        fn _assert_analysis_provider<T: AnalysisProvider>() {}
    }

    const ALLOWED_PATHS: &[&[SessionStatus]] = &[
        &[
            SessionStatus::Pending,
            SessionStatus::Scraping,
            SessionStatus::Analyzing,
            SessionStatus::Complete,
        ],
        &[
            SessionStatus::Pending,
            SessionStatus::Scraping,
            SessionStatus::Error,
        ],
        &[
            SessionStatus::Pending,
            SessionStatus::Scraping,
            SessionStatus::Analyzing,
            SessionStatus::Error,
        ],
    ];

    fn is_subsequence(seq: &[SessionStatus], of: &[SessionStatus]) -> bool {
        let mut it = of.iter();
        seq.iter().all(|s| it.any(|o| o == s))
    }

    fn any_status() -> impl Strategy<Value = SessionStatus> {
        prop_oneof![
            Just(SessionStatus::Pending),
            Just(SessionStatus::Scraping),
            Just(SessionStatus::Analyzing),
            Just(SessionStatus::Complete),
            Just(SessionStatus::Error),
        ]
    }

    proptest! {
        /// Whatever transitions are attempted, the accepted ones always trace a legal path.
        #[test]
        fn accepted_transitions_follow_a_legal_path(attempts in proptest::collection::vec(any_status(), 0..12)) {
            let mut current = SessionStatus::Pending;
            let mut observed = vec![current];
            for next in attempts {
                if current.can_transition_to(next) {
                    current = next;
                    observed.push(current);
                }
            }
            prop_assert!(ALLOWED_PATHS.iter().any(|path| is_subsequence(&observed, path)),
                "illegal path: {:?}", observed);
        }
    }
}
