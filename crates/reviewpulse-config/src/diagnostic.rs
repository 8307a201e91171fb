// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean?" suggestions.

#![allow(unused_assignments)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// One configuration problem, ready for miette to render.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section declares.
    #[error("unknown key `{key}` in configuration")]
    #[diagnostic(
        code(reviewpulse::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a recognized key here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(reviewpulse::config::invalid_type), help("use a value of type {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A value that parses but cannot be used.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(reviewpulse::config::validation))]
    Validation { message: String },

    #[error("could not load configuration: {0}")]
    #[diagnostic(code(reviewpulse::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    let mut help = String::new();
    if let Some(candidate) = suggestion {
        help.push_str(&format!("did you mean `{candidate}`? "));
    }
    help.push_str("allowed here: ");
    help.push_str(valid_keys);
    help
}

/// Splits a `figment::Error` chain into one [`ConfigError`] per problem.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();
    for problem in err {
        let converted = match &problem.kind {
            Kind::UnknownField(field, allowed) => {
                let (span, src) = locate_key(&problem, field, sources).unzip();
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, allowed),
                    valid_keys: allowed.join(", "),
                    span,
                    src,
                }
            }
            Kind::InvalidType(found, wanted) => ConfigError::InvalidType {
                key: problem.path.join("."),
                detail: format!("got {found}, want {wanted}"),
                expected: wanted.to_string(),
            },
            _ => ConfigError::Other(problem.to_string()),
        };
        errors.push(converted);
    }
    errors
}

/// Finds where `field` sits in whichever loaded TOML file produced `problem`.
fn locate_key(
    problem: &figment::error::Error,
    field: &str,
    sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let origin = match problem.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(path) => path.display().to_string(),
        _ => "<inline>".to_string(),
    };
    let (name, content) = sources.iter().find(|(name, _)| *name == origin)?;
    let offset = find_key_offset(content, &problem.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `field` inside the `[path[0]]` table, or from the top.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let table_start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut pos = table_start;
    for line in content[table_start..].split_inclusive('\n') {
        let body = line.trim_start();
        let assigns_field = body
            .strip_prefix(field)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if assigns_field {
            return Some(pos + line.len() - body.len());
        }
        pos += line.len();
    }
    None
}

/// Best valid key above the similarity threshold, if any.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints every error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("config: {error}"),
        }
    }
}
