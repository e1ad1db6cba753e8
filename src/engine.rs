//! The resolution engine: ordered candidate search across the scope chain.
//!
//! Candidates are tried in precedence order within each scope, ascending
//! from the starting scope through its ancestors. The search short-circuits
//! on the first success — or on the first *fatal* failure: a candidate that
//! exists but is broken (syntax error, failed dependency load, runtime
//! exception) must stop the search, because continuing would mask the
//! broken unit behind a misleading "not found".

use std::sync::Arc;

use crate::candidates::{Candidate, CandidateKind};
use crate::descriptor::{PluginDescriptor, SearchAttempt};
use crate::error::{ErrorCode, ResolveError, ResolveResult};
use crate::init::Initializer;
use crate::scope::{LoadFailure, LoadOutcome, Scope, ScopeChain};

/// Result of walking the candidate list against a single scope.
enum ScopeSearch {
    Success {
        outcome: LoadOutcome,
        matched: Candidate,
    },
    Fatal {
        failure: LoadFailure,
        matched: Candidate,
    },
    Exhausted,
}

fn diagnostic_path(scope: &dyn Scope, candidate: &str) -> String {
    let base = scope.base_path();
    if base.is_empty() {
        candidate.to_string()
    } else if base.ends_with('/') {
        format!("{base}{candidate}")
    } else {
        format!("{base}/{candidate}")
    }
}

/// Try every candidate against one scope, in list order.
///
/// Builtin candidates are only ever attempted at the first scope — they
/// belong to the hosting framework, not its embedders — and relative
/// candidates are skipped at the first scope, where they would resolve
/// against the host framework itself rather than the original caller.
/// Every attempt is appended to the shared history, whatever its outcome.
fn search_scope(
    scope: &Arc<dyn Scope>,
    candidates: &[Candidate],
    allow_builtins: bool,
    first_scope: bool,
    history: &mut Vec<SearchAttempt>,
) -> ScopeSearch {
    for candidate in candidates {
        match candidate.kind {
            CandidateKind::Builtin => {
                if !allow_builtins || !first_scope {
                    continue;
                }
            }
            CandidateKind::Normal => {
                if first_scope && candidate.is_relative() {
                    continue;
                }
            }
        }

        let resolved_path = diagnostic_path(scope.as_ref(), &candidate.name);
        let mut attempted = candidate.clone();
        attempted.resolved_path = Some(resolved_path.clone());

        tracing::trace!(
            scope = scope.id(),
            candidate = %candidate.name,
            "attempting plugin load"
        );

        let result = scope.attempt_load(&candidate.name);
        history.push(SearchAttempt {
            scope_id: scope.id().to_string(),
            candidate: attempted.clone(),
            resolved_path,
        });

        match result {
            Ok(outcome) => {
                tracing::debug!(
                    scope = scope.id(),
                    candidate = %candidate.name,
                    "plugin candidate loaded"
                );
                return ScopeSearch::Success {
                    outcome,
                    matched: attempted,
                };
            }
            Err(LoadFailure::NotFound { ref missing, .. }) if missing == &candidate.name => {
                // the candidate itself is absent; keep searching
            }
            Err(failure) => {
                tracing::debug!(
                    scope = scope.id(),
                    candidate = %candidate.name,
                    error = %failure,
                    "plugin candidate found but failed to load"
                );
                return ScopeSearch::Fatal {
                    failure,
                    matched: attempted,
                };
            }
        }
    }

    ScopeSearch::Exhausted
}

/// Unwrap one conventional default-export level.
fn unwrap_outcome(outcome: LoadOutcome) -> Option<Initializer> {
    match outcome {
        LoadOutcome::Init(init) => Some(init),
        LoadOutcome::DefaultExport(inner) => match *inner {
            LoadOutcome::Init(init) => Some(init),
            // only one level is unwrapped
            LoadOutcome::DefaultExport(_) => None,
        },
    }
}

fn classify(failure: &LoadFailure) -> ErrorCode {
    match failure {
        LoadFailure::NotFound { .. } => ErrorCode::RequireFailed,
        LoadFailure::Syntax { .. } => ErrorCode::SyntaxError,
        LoadFailure::Failed { .. } => ErrorCode::LoadFailed,
    }
}

/// Drive the candidate search across the ascending scope chain, mutating
/// `desc` with the outcome.
///
/// On success `desc.init`, `desc.found`, and `desc.resolved_path` are set,
/// and the unit's self-declared name (if any) replaces the caller-given
/// one. On failure a classified error carrying the full attempt history is
/// returned.
pub(crate) fn resolve_descriptor(
    desc: &mut PluginDescriptor,
    start: Arc<dyn Scope>,
) -> ResolveResult<()> {
    let mut level = 0usize;

    for scope in ScopeChain::ascend(start) {
        let first_scope = level == 0;
        let allow_builtins = first_scope;

        match search_scope(
            &scope,
            &desc.search,
            allow_builtins,
            first_scope,
            &mut desc.history,
        ) {
            ScopeSearch::Success { outcome, matched } => {
                let init = match unwrap_outcome(outcome) {
                    Some(init) => init,
                    None => {
                        desc.found = Some(matched);
                        desc.err_msg =
                            Some("loaded unit does not expose an initializer".to_string());
                        return Err(ResolveError::new(
                            ErrorCode::InvalidDefinition,
                            desc.clone(),
                        ));
                    }
                };

                // the unit's self-declared identity wins over path-derived
                // guesses
                if let Some(declared) = init.declared_name() {
                    desc.name = declared.to_string();
                    desc.extract_tag();
                    desc.update_full();
                }

                desc.resolved_path = matched.resolved_path.clone();
                desc.found = Some(matched);
                desc.init = Some(init);
                return Ok(());
            }
            ScopeSearch::Fatal { failure, matched } => {
                desc.found = Some(matched);
                desc.err_msg = Some(failure.message().to_string());
                return Err(ResolveError::new(classify(&failure), desc.clone()));
            }
            ScopeSearch::Exhausted => {
                level += 1;
            }
        }
    }

    tracing::debug!(
        plugin = %desc.full,
        attempts = desc.history.len(),
        "plugin not found in any scope"
    );
    Err(ResolveError::new(ErrorCode::NotFound, desc.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::build_search_list;
    use crate::scope::StaticScope;
    use serde_json::json;

    fn candidates(name: &str) -> Vec<Candidate> {
        build_search_list(
            name,
            &["builtin/".to_string()],
            &["plugin-".to_string()],
            &[],
            false,
        )
    }

    fn descriptor(name: &str) -> PluginDescriptor {
        let mut desc = PluginDescriptor::bare(name);
        desc.search = candidates(name);
        desc
    }

    fn init_named(name: &'static str) -> Initializer {
        Initializer::named(name, move |_| json!(name))
    }

    #[test]
    fn test_success_records_found_and_history() {
        let scope: Arc<dyn Scope> = Arc::new(
            StaticScope::new("app")
                .with_base_path("/srv/app")
                .unit("p0", LoadOutcome::Init(init_named("p0"))),
        );
        let mut desc = descriptor("p0");
        resolve_descriptor(&mut desc, scope).unwrap();

        assert!(desc.init.is_some());
        let found = desc.found.unwrap();
        assert_eq!(found.name, "p0");
        assert_eq!(desc.resolved_path.as_deref(), Some("/srv/app/p0"));
        // builtin/p0, builtin/plugin-p0, plugin-p0, p0 — relative ones skipped
        assert_eq!(desc.history.len(), 4);
        assert!(desc.history.iter().all(|a| a.scope_id == "app"));
    }

    #[test]
    fn test_declared_name_overrides_caller_name() {
        let scope: Arc<dyn Scope> = Arc::new(
            StaticScope::new("app").unit("p0", LoadOutcome::Init(init_named("renamed"))),
        );
        let mut desc = descriptor("p0");
        resolve_descriptor(&mut desc, scope).unwrap();
        assert_eq!(desc.name, "renamed");
        assert_eq!(desc.full, "renamed");
    }

    #[test]
    fn test_ascends_to_parent_scope() {
        let parent: Arc<dyn Scope> = Arc::new(
            StaticScope::new("host").unit("p0", LoadOutcome::Init(init_named("p0"))),
        );
        let child: Arc<dyn Scope> = Arc::new(StaticScope::new("app").with_parent(parent));

        let mut desc = descriptor("p0");
        resolve_descriptor(&mut desc, child).unwrap();
        assert!(desc.init.is_some());
        assert_eq!(desc.history.last().unwrap().scope_id, "host");
    }

    #[test]
    fn test_builtins_only_tried_at_first_scope() {
        // the parent scope would match the builtin spelling, but builtins
        // must never be attempted beyond the first scope
        let parent: Arc<dyn Scope> = Arc::new(
            StaticScope::new("host").unit("builtin/p0", LoadOutcome::Init(init_named("p0"))),
        );
        let child: Arc<dyn Scope> = Arc::new(StaticScope::new("app").with_parent(parent));

        let mut desc = descriptor("p0");
        let err = resolve_descriptor(&mut desc, child).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err
            .details
            .history
            .iter()
            .all(|a| a.scope_id == "app" || !a.candidate.name.starts_with("builtin/")));
    }

    #[test]
    fn test_relative_candidates_skipped_at_first_scope() {
        let start: Arc<dyn Scope> = Arc::new(
            StaticScope::new("app").unit("./p0", LoadOutcome::Init(init_named("p0"))),
        );
        let mut desc = PluginDescriptor::bare("p0");
        desc.search = build_search_list("p0", &[], &[], &[], false);
        let err = resolve_descriptor(&mut desc, start).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_relative_candidates_attempted_at_ancestor_scopes() {
        let parent: Arc<dyn Scope> = Arc::new(
            StaticScope::new("caller").unit("./p0", LoadOutcome::Init(init_named("p0"))),
        );
        let start: Arc<dyn Scope> = Arc::new(StaticScope::new("app").with_parent(parent));
        let mut desc = PluginDescriptor::bare("p0");
        desc.search = build_search_list("p0", &[], &[], &[], false);
        resolve_descriptor(&mut desc, start).unwrap();
        assert_eq!(desc.found.unwrap().name, "./p0");
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let scope: Arc<dyn Scope> = Arc::new(
            StaticScope::new("app")
                .failure(
                    "plugin-p0",
                    LoadFailure::Syntax {
                        message: "unexpected identifier".into(),
                    },
                )
                // a later candidate would match, but the search must stop
                .unit("p0", LoadOutcome::Init(init_named("p0"))),
        );
        let mut desc = descriptor("p0");
        let err = resolve_descriptor(&mut desc, scope).unwrap_err();
        assert_eq!(err.code, ErrorCode::SyntaxError);
        assert_eq!(err.details.found.as_ref().unwrap().name, "plugin-p0");
        assert!(err.details.init.is_none());
    }

    #[test]
    fn test_missing_dependency_is_require_failed() {
        let scope: Arc<dyn Scope> = Arc::new(StaticScope::new("app").failure(
            "plugin-p0",
            LoadFailure::not_found("notamodule"),
        ));
        let mut desc = descriptor("p0");
        let err = resolve_descriptor(&mut desc, scope).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequireFailed);
        assert_eq!(err.details.found.as_ref().unwrap().name, "plugin-p0");
    }

    #[test]
    fn test_missing_candidate_itself_continues_search() {
        let scope: Arc<dyn Scope> = Arc::new(
            StaticScope::new("app")
                .failure("plugin-p0", LoadFailure::not_found("plugin-p0"))
                .unit("p0", LoadOutcome::Init(init_named("p0"))),
        );
        let mut desc = descriptor("p0");
        resolve_descriptor(&mut desc, scope).unwrap();
        assert_eq!(desc.found.unwrap().name, "p0");
    }

    #[test]
    fn test_load_exception_is_load_failed() {
        let scope: Arc<dyn Scope> = Arc::new(StaticScope::new("app").failure(
            "p0",
            LoadFailure::Failed {
                message: "a is not defined".into(),
            },
        ));
        let mut desc = descriptor("p0");
        let err = resolve_descriptor(&mut desc, scope).unwrap_err();
        assert_eq!(err.code, ErrorCode::LoadFailed);
        assert!(err.message.contains("a is not defined"));
    }

    #[test]
    fn test_not_found_history_spans_all_scopes() {
        let parent: Arc<dyn Scope> = Arc::new(StaticScope::new("host"));
        let child: Arc<dyn Scope> = Arc::new(StaticScope::new("app").with_parent(parent));

        let mut desc = descriptor("absent");
        let err = resolve_descriptor(&mut desc, child).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        // first scope: 2 builtins + plugin-absent + absent (relatives skipped)
        // parent scope: plugin-absent, absent, ./absent, ./plugin-absent
        assert_eq!(err.details.history.len(), 8);
        assert!(err.details.init.is_none());
    }

    #[test]
    fn test_default_export_unwrapped_one_level() {
        let scope: Arc<dyn Scope> = Arc::new(StaticScope::new("app").unit(
            "p0",
            LoadOutcome::DefaultExport(Box::new(LoadOutcome::Init(init_named("p0")))),
        ));
        let mut desc = descriptor("p0");
        resolve_descriptor(&mut desc, scope).unwrap();
        assert!(desc.init.is_some());
    }

    #[test]
    fn test_doubly_nested_export_is_invalid_definition() {
        let scope: Arc<dyn Scope> = Arc::new(StaticScope::new("app").unit(
            "p0",
            LoadOutcome::DefaultExport(Box::new(LoadOutcome::DefaultExport(Box::new(
                LoadOutcome::Init(init_named("p0")),
            )))),
        ));
        let mut desc = descriptor("p0");
        let err = resolve_descriptor(&mut desc, scope).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDefinition);
    }

    #[test]
    fn test_history_is_append_only_across_scopes() {
        let parent: Arc<dyn Scope> = Arc::new(
            StaticScope::new("host").unit("p0", LoadOutcome::Init(init_named("p0"))),
        );
        let child: Arc<dyn Scope> = Arc::new(StaticScope::new("app").with_parent(parent));

        let mut desc = descriptor("p0");
        resolve_descriptor(&mut desc, child).unwrap();

        let scopes: Vec<&str> = desc.history.iter().map(|a| a.scope_id.as_str()).collect();
        let split = scopes.iter().position(|s| *s == "host").unwrap();
        assert!(scopes[..split].iter().all(|s| *s == "app"));
        assert!(scopes[split..].iter().all(|s| *s == "host"));
    }
}
