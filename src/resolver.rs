//! Public entry point.

use std::sync::Arc;

use serde_json::Value;

use crate::candidates::build_search_list;
use crate::config::ResolverConfig;
use crate::descriptor::{build_descriptor, finalize, Callback, PluginDescriptor, PluginReference};
use crate::engine::resolve_descriptor;
use crate::error::ResolveResult;
use crate::scope::Scope;

/// Resolves logical plugin references into loaded, configured plugins.
///
/// Configured once by the host with its naming conventions and starting
/// [`Scope`]; each [`resolve`](PluginResolver::resolve) call owns its own
/// descriptor, history, and scope ascent, so concurrent calls are safe as
/// long as the underlying load primitive tolerates concurrent reads.
pub struct PluginResolver {
    config: ResolverConfig,
    start: Arc<dyn Scope>,
}

impl PluginResolver {
    pub fn new(config: ResolverConfig, start: Arc<dyn Scope>) -> Self {
        Self { config, start }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a plugin reference with no caller options.
    pub fn resolve(&self, reference: impl Into<PluginReference>) -> ResolveResult<PluginDescriptor> {
        self.resolve_with(reference, None, None)
    }

    /// Resolve a plugin reference, merging `options` over the plugin's
    /// declared defaults and attaching an optional second-phase `callback`.
    ///
    /// Returns the fully populated descriptor — `init` is always present
    /// and invocable on success — or a classified error carrying the
    /// descriptor state and complete attempt history.
    pub fn resolve_with(
        &self,
        reference: impl Into<PluginReference>,
        options: Option<Value>,
        callback: Option<Callback>,
    ) -> ResolveResult<PluginDescriptor> {
        let mut desc = self.prepare(reference.into(), options, callback)?;

        if desc.init.is_none() {
            resolve_descriptor(&mut desc, self.start.clone())?;
        }

        finalize(&mut desc, self.config.merge_defaults)?;

        tracing::debug!(
            plugin = %desc.full,
            attempts = desc.history.len(),
            resolved_path = desc.resolved_path.as_deref().unwrap_or("<direct>"),
            "plugin resolved"
        );
        Ok(desc)
    }

    /// Build the descriptor and its candidate list without attempting any
    /// load, for pre-validation use cases.
    pub fn describe(
        &self,
        reference: impl Into<PluginReference>,
        options: Option<Value>,
    ) -> ResolveResult<PluginDescriptor> {
        self.prepare(reference.into(), options, None)
    }

    fn prepare(
        &self,
        reference: PluginReference,
        options: Option<Value>,
        callback: Option<Callback>,
    ) -> ResolveResult<PluginDescriptor> {
        let mut desc = build_descriptor(reference, options, callback, &self.config)?;
        desc.search = build_search_list(
            &desc.name,
            &self.config.builtin,
            &self.config.prefix,
            &self.config.reserved,
            self.config.case_variants,
        );
        Ok(desc)
    }
}
