//! Error types for plugin resolution.
//!
//! Every failure carries a machine-readable [`ErrorCode`], a rendered
//! message, and the descriptor as it stood at failure time — including the
//! full search list and attempt history — so the host can present an
//! actionable "searched here and here, found X, but it failed because Y"
//! diagnostic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::PluginDescriptor;

/// Classification of a resolution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Reference shape rejected before any resolution began.
    InvalidArguments,
    /// No usable name could be derived from the reference.
    NoName,
    /// The reference carried an `init` that is not invocable.
    NoInitFunction,
    /// Every scope and candidate was exhausted without a match.
    NotFound,
    /// A candidate was found but its source failed to parse.
    SyntaxError,
    /// A candidate was found but a dependency load inside it failed.
    RequireFailed,
    /// A candidate was found but threw while executing.
    LoadFailed,
    /// A candidate resolved to something with no usable initializer.
    InvalidDefinition,
    /// Caller options were rejected by the defaults validation hook.
    InvalidOption,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArguments => "invalid_arguments",
            ErrorCode::NoName => "no_name",
            ErrorCode::NoInitFunction => "no_init_function",
            ErrorCode::NotFound => "not_found",
            ErrorCode::SyntaxError => "syntax_error",
            ErrorCode::RequireFailed => "require_failed",
            ErrorCode::LoadFailed => "load_failed",
            ErrorCode::InvalidDefinition => "invalid_definition",
            ErrorCode::InvalidOption => "invalid_option",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified resolution failure.
///
/// Raised synchronously to the immediate caller; nothing is retried.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ResolveError {
    pub code: ErrorCode,
    pub message: String,
    /// The descriptor as it stood when resolution failed.
    pub details: Box<PluginDescriptor>,
}

impl ResolveError {
    /// Build an error for `code`, rendering its message from the
    /// descriptor's state.
    pub fn new(code: ErrorCode, details: PluginDescriptor) -> Self {
        let message = render_message(code, &details);
        Self {
            code,
            message,
            details: Box::new(details),
        }
    }
}

/// Convenience alias for resolution results.
pub type ResolveResult<T> = Result<T, ResolveError>;

fn found_name(details: &PluginDescriptor) -> &str {
    details
        .found
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or("<unknown>")
}

fn err_msg(details: &PluginDescriptor) -> &str {
    details.err_msg.as_deref().unwrap_or("<unknown>")
}

/// Per-scope summary of the attempt history for the not-found report.
fn searched_report(details: &PluginDescriptor) -> String {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for attempt in &details.history {
        match groups.last_mut() {
            Some((scope, names)) if *scope == attempt.scope_id => {
                names.push(attempt.candidate.name.clone());
            }
            _ => groups.push((attempt.scope_id.clone(), vec![attempt.candidate.name.clone()])),
        }
    }
    if groups.is_empty() {
        return details
            .search
            .iter()
            .map(|c| c.name.clone())
            .collect::<Vec<_>>()
            .join(", ");
    }
    groups
        .into_iter()
        .map(|(scope, names)| format!("{scope}: [{}]", names.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_message(code: ErrorCode, details: &PluginDescriptor) -> String {
    let name = &details.full;
    match code {
        ErrorCode::InvalidArguments => {
            format!("Invalid plugin reference: {}", err_msg(details))
        }
        ErrorCode::NoName => "No name could be derived for the plugin reference.".to_string(),
        ErrorCode::NoInitFunction => {
            format!("The init property is not invocable for plugin {name}.")
        }
        ErrorCode::NotFound => {
            format!(
                "Could not load plugin {name}; searched: {}.",
                searched_report(details)
            )
        }
        ErrorCode::SyntaxError => format!(
            "Could not load plugin {name} defined in {} due to syntax error: {}.",
            found_name(details),
            err_msg(details)
        ),
        ErrorCode::RequireFailed => format!(
            "Could not load plugin {name} defined in {} as a dependency load inside the plugin failed: {}.",
            found_name(details),
            err_msg(details)
        ),
        ErrorCode::LoadFailed => format!(
            "Could not load plugin {name} defined in {} due to error: {}.",
            found_name(details),
            err_msg(details)
        ),
        ErrorCode::InvalidDefinition => format!(
            "Plugin {name} defined in {} does not expose a usable initializer.",
            found_name(details)
        ),
        ErrorCode::InvalidOption => format!(
            "Invalid options for plugin {name}: {}.",
            err_msg(details)
        ),
    }
}
