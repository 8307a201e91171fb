// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Lookup order: `./reviewpulse.toml` > `~/.config/reviewpulse/reviewpulse.toml`
//! > `/etc/reviewpulse/reviewpulse.toml`, with `REVIEWPULSE_` environment
//! variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ReviewPulseConfig;

/// Config file name searched for in each directory of the hierarchy.
pub const CONFIG_FILE: &str = "reviewpulse.toml";

const SYSTEM_CONFIG: &str = "/etc/reviewpulse/reviewpulse.toml";

/// Sections addressable through `REVIEWPULSE_<SECTION>_<KEY>` variables.
///
/// `rate_limit` must precede any shorter section sharing its prefix.
const ENV_SECTIONS: &[&str] = &[
    "rate_limit",
    "server",
    "session",
    "redis",
    "rabbitmq",
    "analysis",
    "anthropic",
    "openai",
];

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<ReviewPulseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only, on top of compiled defaults.
pub fn load_config_from_str(toml_content: &str) -> Result<ReviewPulseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReviewPulseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ReviewPulseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReviewPulseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The merged provider stack, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ReviewPulseConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(env_provider())
}

/// Candidate config files, most specific first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    paths.extend(user_config_path());
    paths.push(PathBuf::from(SYSTEM_CONFIG));
    paths
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reviewpulse").join(CONFIG_FILE))
}

/// Environment provider with explicit section mapping.
///
/// `REVIEWPULSE_RATE_LIMIT_MAX_REQUESTS` maps to `rate_limit.max_requests`,
/// never `rate.limit.max.requests`.
pub fn env_provider() -> Env {
    Env::prefixed("REVIEWPULSE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped variable name to a dotted config path.
///
/// Figment hands keys over in their original case, so matching is done on
/// the lowercased name.
pub fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
