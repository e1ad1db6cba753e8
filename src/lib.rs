//! # plugin-resolver — plugin reference resolution for extensible hosts
//!
//! `plugin_resolver` turns a logical plugin reference — a name, an inline
//! initializer, or a partial descriptor — into a fully specified, loaded
//! plugin: an executable initializer plus merged configuration. It is the
//! resolution layer of a host framework that supports third-party
//! extensions:
//!
//! - **Candidate generation**: a single name expands into an ordered list
//!   of builtin-prefixed, alias-prefixed, bare, relative, and case-variant
//!   spellings. First successful load wins.
//! - **Ascending scope search**: candidates are tried against the host's
//!   loading scope and each of its ancestors, with builtins confined to the
//!   host's own scope.
//! - **Failure classification**: "plugin truly does not exist" is kept
//!   apart from "plugin exists but is broken" — syntax errors, failed
//!   dependency loads, and load-time exceptions stop the search instead of
//!   being masked by a misleading not-found.
//! - **Options and defaults**: caller options are normalized to an object
//!   and recursively merged over the plugin's declared defaults; schema-like
//!   defaults go through a validation hook instead.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use plugin_resolver::{
//!     Initializer, LoadOutcome, PluginResolver, ResolverConfig, StaticScope,
//! };
//!
//! let scope = Arc::new(
//!     StaticScope::new("app").unit(
//!         "plugin-echo",
//!         LoadOutcome::Init(Initializer::named("echo", |opts| {
//!             serde_json::Value::Object(opts.clone())
//!         })),
//!     ),
//! );
//!
//! let resolver = PluginResolver::new(ResolverConfig::default(), scope);
//! let plugin = resolver.resolve("echo").unwrap();
//! assert_eq!(plugin.name, "echo");
//! assert!(plugin.init.is_some());
//! ```
//!
//! The host supplies the load primitive by implementing [`Scope`]; the
//! engine itself never touches the filesystem. Loading runs synchronously —
//! a load attempt may execute arbitrary third-party code and blocks the
//! caller until it returns.

pub mod candidates;
pub mod config;
pub mod descriptor;
mod engine;
pub mod error;
pub mod init;
pub mod name;
pub mod options;
pub mod resolver;
pub mod scope;

pub use crate::candidates::{build_search_list, Candidate, CandidateKind};
pub use crate::config::ResolverConfig;
pub use crate::descriptor::{
    build_descriptor, finalize, Callback, PartialDescriptor, PluginDescriptor, PluginReference,
    SearchAttempt,
};
pub use crate::error::{ErrorCode, ResolveError, ResolveResult};
pub use crate::init::{Defaults, InitFn, Initializer, OptionsValidator};
pub use crate::options::{deep_merge, merge_over, normalize_options};
pub use crate::resolver::PluginResolver;
pub use crate::scope::{CachedScope, LoadFailure, LoadOutcome, Scope, ScopeChain, StaticScope};
