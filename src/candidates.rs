//! Candidate name generation.
//!
//! A single logical plugin name expands into an ordered list of concrete
//! names to try against the loader: builtin-prefixed spellings first, then
//! alias-prefixed spellings, the bare name, relative spellings, and finally
//! case-style variants of all of the above. Earlier entries take precedence;
//! the first successful load wins.

use serde::{Deserialize, Serialize};

use crate::name;

/// Whether a candidate names a framework builtin or an ordinary unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// Shipped with the hosting framework; only tried at the host's own
    /// scope.
    Builtin,
    /// Any other unit.
    Normal,
}

/// One fully-qualified name tried during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub name: String,
    /// Filled in once a load attempt touches this candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<String>,
}

impl Candidate {
    fn new(kind: CandidateKind, name: String) -> Self {
        Self {
            kind,
            name,
            resolved_path: None,
        }
    }

    pub fn is_relative(&self) -> bool {
        name::is_relative(&self.name)
    }
}

/// Build the ordered candidate list for `base`.
///
/// `builtin_prefixes` mark framework-internal search roots, `alias_prefixes`
/// are the conventional package-name prefixes (checked before the bare name
/// so a prefixed package wins over an unrelated same-named one), and
/// `reserved` names are platform names that must not be shadowed, so the
/// bare spelling is suppressed for them. With `case_variants` enabled, the
/// alternate case-style spelling of every candidate is appended at lowest
/// precedence.
pub fn build_search_list(
    base: &str,
    builtin_prefixes: &[String],
    alias_prefixes: &[String],
    reserved: &[String],
    case_variants: bool,
) -> Vec<Candidate> {
    let relative = name::is_relative(base);
    let mut list = Vec::new();

    if !relative {
        for builtin in builtin_prefixes {
            list.push(Candidate::new(CandidateKind::Builtin, format!("{builtin}{base}")));
        }
        for builtin in builtin_prefixes {
            for alias in alias_prefixes {
                list.push(Candidate::new(
                    CandidateKind::Builtin,
                    format!("{builtin}{alias}{base}"),
                ));
            }
        }

        for alias in alias_prefixes {
            list.push(Candidate::new(CandidateKind::Normal, format!("{alias}{base}")));
        }
    }

    if !reserved.iter().any(|r| r == base) {
        list.push(Candidate::new(CandidateKind::Normal, base.to_string()));
    }

    if !relative {
        list.push(Candidate::new(CandidateKind::Normal, format!("./{base}")));
        for alias in alias_prefixes {
            list.push(Candidate::new(CandidateKind::Normal, format!("./{alias}{base}")));
        }
    }

    if case_variants {
        let primaries = list.len();
        for i in 0..primaries {
            let kind = list[i].kind;
            for variant in name::case_variants(&list[i].name) {
                list.push(Candidate::new(kind, variant));
            }
        }
    }

    // variant expansion can collide with a primary spelling; keep the
    // earliest occurrence so precedence is undisturbed
    let mut seen = std::collections::HashSet::new();
    list.retain(|c| seen.insert(c.name.clone()));

    list
}
