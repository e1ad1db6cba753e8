//! Plugin name handling: tag extraction and case-style variants.
//!
//! Plugin names can carry a tag suffix (`name$tag`) so the same underlying
//! plugin can be instantiated multiple times under distinct identities.
//! Case-style variants widen the candidate search so `fooBar` also finds a
//! unit published as `foo-bar` and vice versa.

/// True when a name is a relative or absolute path rather than a bare
/// package-style name.
pub fn is_relative(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('/')
}

/// Split a `name$tag` name into its base name and tag.
///
/// The split happens at the last `$`; both halves must be non-empty,
/// otherwise the whole input is the name and there is no tag.
pub fn split_tag(name: &str) -> (&str, Option<&str>) {
    match name.rfind('$') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => {
            (&name[..pos], Some(&name[pos + 1..]))
        }
        _ => (name, None),
    }
}

/// Produce the alternate case-style spellings of `name`.
///
/// A camelCase name yields its kebab-case spelling and a kebab-case name
/// yields its PascalCase spelling. Relative-path-like names are never
/// transformed. Returns an empty list when no transformable pattern exists.
pub fn case_variants(name: &str) -> Vec<String> {
    if is_relative(name) {
        return Vec::new();
    }

    let mut variants = Vec::new();
    if let Some(kebab) = to_kebab(name) {
        variants.push(kebab);
    }
    if let Some(pascal) = to_pascal(name) {
        variants.push(pascal);
    }
    variants.retain(|v| v != name);
    variants.dedup();
    variants
}

/// kebab-case spelling of a camelCase name, or `None` when the name has no
/// lowercase-to-uppercase transition.
fn to_kebab(name: &str) -> Option<String> {
    let mut has_transition = false;
    let mut prev_lower = false;
    let mut out = String::with_capacity(name.len() + 4);

    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                has_transition = true;
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_lowercase();
            out.push(ch);
        }
    }

    has_transition.then_some(out)
}

/// PascalCase spelling of a kebab-case name, or `None` when the name has no
/// `lower-lower` hyphen pattern.
fn to_pascal(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let hyphenated = bytes.windows(3).any(|w| {
        w[1] == b'-' && (w[0] as char).is_lowercase() && (w[2] as char).is_lowercase()
    });
    if !hyphenated {
        return None;
    }

    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for ch in name.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    Some(out)
}
