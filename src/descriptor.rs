//! Plugin references and the canonical plugin descriptor.
//!
//! A caller hands the resolver a [`PluginReference`] — a name, an
//! initializer, or a partially filled descriptor. [`build_descriptor`]
//! normalizes it into a [`PluginDescriptor`], the central record of a
//! plugin's identity, configuration, and (after resolution) its loaded
//! initializer. [`finalize`] merges caller options over declared defaults
//! once the initializer is known.

use std::fmt;
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::candidates::Candidate;
use crate::config::ResolverConfig;
use crate::error::{ErrorCode, ResolveError, ResolveResult};
use crate::init::{Defaults, Initializer};
use crate::name;
use crate::options::{deep_merge, merge_over, normalize_options};

/// Optional second-phase hook, stored on the descriptor and passed through
/// to the host uninvoked.
pub type Callback = Arc<dyn Fn(&PluginDescriptor) + Send + Sync>;

/// A logical plugin reference, resolved once at the boundary.
#[derive(Clone)]
pub enum PluginReference {
    /// A name to resolve against the scope chain.
    Name(String),
    /// An initializer supplied directly; no search happens.
    Init(Initializer),
    /// A partially pre-filled descriptor.
    Descriptor(PartialDescriptor),
}

impl From<&str> for PluginReference {
    fn from(name: &str) -> Self {
        PluginReference::Name(name.to_string())
    }
}

impl From<String> for PluginReference {
    fn from(name: String) -> Self {
        PluginReference::Name(name)
    }
}

impl From<Initializer> for PluginReference {
    fn from(init: Initializer) -> Self {
        PluginReference::Init(init)
    }
}

impl From<PartialDescriptor> for PluginReference {
    fn from(partial: PartialDescriptor) -> Self {
        PluginReference::Descriptor(partial)
    }
}

/// Caller-supplied subset of descriptor fields.
#[derive(Default, Clone)]
pub struct PartialDescriptor {
    pub name: Option<String>,
    pub tag: Option<String>,
    pub init: Option<Initializer>,
    pub options: Option<Value>,
    pub defaults: Option<Defaults>,
    pub callback: Option<Callback>,
}

/// One load attempt recorded in the audit history.
#[derive(Debug, Clone, Serialize)]
pub struct SearchAttempt {
    pub scope_id: String,
    pub candidate: Candidate,
    /// Diagnostic location: the scope's base path joined with the
    /// candidate name.
    pub resolved_path: String,
}

/// The canonical record of a plugin's identity, configuration, and
/// resolved initializer.
///
/// Created fresh per resolution call, mutated in place during resolution,
/// and returned to the caller as the final artifact. The engine never
/// caches or reuses one.
#[derive(Clone)]
pub struct PluginDescriptor {
    /// Canonical base name, tag suffix stripped.
    pub name: String,
    /// Optional disambiguator from `name$tag` syntax.
    pub tag: Option<String>,
    /// `name` plus `$tag` when a tag is present; the identity key.
    pub full: String,
    /// The resolved initializer; present exactly when resolution succeeded.
    pub init: Option<Initializer>,
    /// Caller-supplied configuration, always an object.
    pub options: Map<String, Value>,
    /// Declared default/validation shape.
    pub defaults: Option<Defaults>,
    /// Second-phase hook, passed through unchanged.
    pub callback: Option<Callback>,
    /// Candidates considered, in precedence order.
    pub search: Vec<Candidate>,
    /// Append-only audit trail of every load attempt made.
    pub history: Vec<SearchAttempt>,
    /// The candidate that produced the initializer, or the one whose load
    /// attempt broke the search.
    pub found: Option<Candidate>,
    /// Message of the classified failure, if any.
    pub err_msg: Option<String>,
    /// Diagnostic path of the winning load attempt.
    pub resolved_path: Option<String>,
}

impl PluginDescriptor {
    /// Minimal descriptor for a known name; used for early failures.
    pub fn bare(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            full: name.clone(),
            name,
            tag: None,
            init: None,
            options: Map::new(),
            defaults: None,
            callback: None,
            search: Vec::new(),
            history: Vec::new(),
            found: None,
            err_msg: None,
            resolved_path: None,
        }
    }

    /// Recompute `full` from `name` and `tag`.
    pub(crate) fn update_full(&mut self) {
        self.full = match &self.tag {
            Some(tag) => format!("{}${}", self.name, tag),
            None => self.name.clone(),
        };
    }

    /// Strip a `$tag` suffix out of `name` into the `tag` field.
    pub(crate) fn extract_tag(&mut self) {
        let (base, tag) = name::split_tag(&self.name);
        if let Some(tag) = tag {
            self.tag = Some(tag.to_string());
            self.name = base.to_string();
        }
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("full", &self.full)
            .field("init", &self.init.is_some())
            .field("options", &self.options)
            .field("defaults", &self.defaults)
            .field("search", &self.search)
            .field("history", &self.history)
            .field("found", &self.found)
            .field("err_msg", &self.err_msg)
            .field("resolved_path", &self.resolved_path)
            .finish()
    }
}

/// Short random identifier for anonymous initializers; distinct per call.
fn anonymous_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Normalize a caller reference into a descriptor, pre-resolution.
pub fn build_descriptor(
    reference: PluginReference,
    options: Option<Value>,
    callback: Option<Callback>,
    config: &ResolverConfig,
) -> ResolveResult<PluginDescriptor> {
    let caller_options = normalize_options(options);

    let mut desc = match reference {
        PluginReference::Name(raw) => {
            if raw.trim().is_empty() {
                let mut details = PluginDescriptor::bare(raw);
                details.err_msg = Some("plugin name is empty".to_string());
                return Err(ResolveError::new(ErrorCode::InvalidArguments, details));
            }
            let mut desc = PluginDescriptor::bare(raw);
            desc.options = caller_options;
            desc
        }
        PluginReference::Init(init) => {
            let name = match init.declared_name() {
                Some(declared) => declared.to_string(),
                None => format!("{}{}", config.anonymous_prefix(), anonymous_id()),
            };
            let mut desc = PluginDescriptor::bare(name);
            desc.init = Some(init);
            desc.options = caller_options;
            desc
        }
        PluginReference::Descriptor(partial) => {
            let name = partial
                .name
                .clone()
                .or_else(|| {
                    partial
                        .init
                        .as_ref()
                        .and_then(|i| i.declared_name().map(str::to_string))
                })
                .unwrap_or_default();
            if name.is_empty() {
                return Err(ResolveError::new(
                    ErrorCode::NoName,
                    PluginDescriptor::bare(name),
                ));
            }

            let mut desc = PluginDescriptor::bare(name);
            desc.tag = partial.tag;
            desc.init = partial.init;
            desc.defaults = partial.defaults;
            desc.callback = partial.callback;
            // caller options win over descriptor-carried options
            desc.options = normalize_options(partial.options);
            deep_merge(&mut desc.options, &caller_options);
            desc
        }
    };

    if callback.is_some() {
        desc.callback = callback;
    }

    desc.extract_tag();
    if desc.name.is_empty() {
        return Err(ResolveError::new(ErrorCode::NoName, desc));
    }
    desc.update_full();

    Ok(desc)
}

/// Merge caller options over declared defaults, post-resolution.
///
/// Defaults attached to the resolved initializer win over defaults declared
/// on the descriptor when either is schema-like; plain mappings from both
/// sources are deep-merged (descriptor-declared values win). Schema-like
/// defaults bypass merging: a validator hook is applied to the options, an
/// external schema handle passes them through untouched.
pub fn finalize(desc: &mut PluginDescriptor, merge_defaults: bool) -> ResolveResult<()> {
    let init_defaults = desc.init.as_ref().and_then(|i| i.defaults().cloned());
    let declared = desc.defaults.take();

    let effective = match (init_defaults, declared) {
        (Some(from_init), _) if from_init.is_schema_like() => Some(from_init),
        (_, Some(from_desc)) if from_desc.is_schema_like() => Some(from_desc),
        (Some(Defaults::Map(from_init)), Some(Defaults::Map(from_desc))) => {
            Some(Defaults::Map(merge_over(&from_init, &from_desc)))
        }
        (Some(from_init), None) => Some(from_init),
        (None, from_desc) => from_desc,
        (Some(from_init), Some(_)) => Some(from_init),
    };
    desc.defaults = effective;

    if !merge_defaults {
        return Ok(());
    }

    match &desc.defaults {
        Some(Defaults::Map(defaults)) => {
            desc.options = merge_over(defaults, &desc.options);
        }
        Some(Defaults::Validator(validator)) => match validator.validate(&desc.options) {
            Ok(validated) => desc.options = validated,
            Err(reason) => {
                desc.err_msg = Some(reason);
                return Err(ResolveError::new(ErrorCode::InvalidOption, desc.clone()));
            }
        },
        Some(Defaults::Schema(_)) | None => {}
    }

    Ok(())
}
