//! Resolver configuration.

/// Host-supplied configuration for a [`PluginResolver`](crate::PluginResolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Alias prefixes tried before the bare name; the first entry also seeds
    /// synthesized names for anonymous initializers.
    pub prefix: Vec<String>,
    /// Builtin prefixes, only tried at the host framework's own scope.
    pub builtin: Vec<String>,
    /// Platform-reserved names whose bare spelling must not be shadowed.
    pub reserved: Vec<String>,
    /// Merge caller options over declared defaults after resolution.
    pub merge_defaults: bool,
    /// Append kebab↔camel case-style variants to the candidate list.
    pub case_variants: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefix: vec!["plugin-".to_string()],
            builtin: Vec::new(),
            reserved: Vec::new(),
            merge_defaults: true,
            case_variants: true,
        }
    }
}

impl ResolverConfig {
    /// The prefix used when synthesizing a name for an anonymous initializer.
    pub fn anonymous_prefix(&self) -> &str {
        self.prefix.first().map(String::as_str).unwrap_or("plugin-")
    }
}
