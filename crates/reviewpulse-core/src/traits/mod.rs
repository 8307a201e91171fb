// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod broker;
pub mod provider;
pub mod store;

pub use adapter::PluginAdapter;
pub use broker::{Delivery, MessageBroker, RESULT_BUFFER};
pub use provider::AnalysisProvider;
pub use store::StateStore;
