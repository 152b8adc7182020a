//! IRI-related helpers: syntax validation and prefix compaction/expansion.

use indexmap::IndexMap;

use crate::error::{GraphError, Result};

/// Reserved pseudo-IRI used as the edge label for class membership.
pub const TYPE_IRI: &str = "@type";

/// Literal prefix every blank-node IRI begins with.
pub const BLANK_NODE_PREFIX: &str = "_:b";

/// Returns `true` if `iri` is a blank-node identifier.
pub fn is_blank_node_iri(iri: &str) -> bool {
    iri.starts_with(BLANK_NODE_PREFIX)
}

/// Validates an IRI (or the reserved `@type` token) per the rules in
/// ยง4.1: at least one `:` after position 0, an authority that survives an
/// optional leading `//`, and is neither empty nor starting with `/` or
/// `:`.
pub fn validate_iri(iri: &str) -> Result<()> {
    if iri == TYPE_IRI {
        return Ok(());
    }
    let colon = match iri.find(':').filter(|&pos| pos > 0) {
        Some(pos) => pos,
        None => return Err(GraphError::InvalidIri(iri.to_string())),
    };
    let rest = &iri[colon + 1..];
    let authority = rest.strip_prefix("//").unwrap_or(rest);
    if authority.is_empty() || authority.starts_with('/') || authority.starts_with(':') {
        return Err(GraphError::InvalidIri(iri.to_string()));
    }
    Ok(())
}

/// Validates a prefix against `/^[A-Za-z][A-Za-z0-9]*$/`.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(GraphError::InvalidPrefix(prefix.to_string())),
    }
    if chars.clone().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(GraphError::InvalidPrefix(prefix.to_string()))
    }
}

/// Splits `s` at its first `:`, returning `(before, after)`.
fn split_at_colon(s: &str) -> Option<(&str, &str)> {
    s.find(':').map(|pos| (&s[..pos], &s[pos + 1..]))
}

/// Prefix⇆full-IRI mapping, with syntax validation and compaction.
///
/// Prefixes are stored in an [`IndexMap`] so that compaction always
/// iterates bindings in the order they were inserted: a prefix added
/// later never shadows an earlier one for a given IRI (see DESIGN.md).
#[derive(Debug, Default, Clone)]
pub struct IriRegistry {
    prefixes: IndexMap<String, String>,
}

impl IriRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `prefix` to `iri`.
    ///
    /// Fails with [`GraphError::InvalidPrefix`] on syntax violation,
    /// [`GraphError::InvalidIri`] if `iri` fails validation,
    /// [`GraphError::DuplicatePrefix`] if the prefix is already bound, or
    /// [`GraphError::DuplicatePrefixIri`] (case-insensitive) if another
    /// prefix already maps to the same IRI.
    pub fn set_prefix(&mut self, prefix: &str, iri: &str) -> Result<()> {
        validate_prefix(prefix)?;
        validate_iri(iri)?;
        if self.prefixes.contains_key(prefix) {
            return Err(GraphError::DuplicatePrefix(prefix.to_string()));
        }
        if self
            .prefixes
            .values()
            .any(|bound| bound.eq_ignore_ascii_case(iri))
        {
            return Err(GraphError::DuplicatePrefixIri(iri.to_string()));
        }
        self.prefixes.insert(prefix.to_string(), iri.to_string());
        log::debug!("bound prefix {prefix:?} to {iri:?}");
        Ok(())
    }

    /// Removes a prefix binding. Idempotent: removing an unbound prefix
    /// is not an error.
    pub fn remove_prefix(&mut self, prefix: &str) {
        self.prefixes.shift_remove(prefix);
    }

    /// Returns the base IRI bound to `prefix`, if any.
    pub fn base(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Iterates `(prefix, base)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expands a compact IRI (`prefix:local`) to its full form. IRIs with
    /// an unknown prefix (or no `:` at all) pass through unchanged.
    ///
    /// If `validate` is set, the expanded result is run through
    /// [`validate_iri`].
    pub fn expand(&self, iri: &str, validate: bool) -> Result<String> {
        let expanded = match split_at_colon(iri) {
            Some((prefix, suffix)) if self.prefixes.contains_key(prefix) => {
                format!("{}{}", self.prefixes[prefix], suffix)
            }
            _ => iri.to_string(),
        };
        if validate {
            validate_iri(&expanded)?;
        }
        Ok(expanded)
    }

    /// Compacts a full IRI using the first matching prefix, in insertion
    /// order.
    ///
    /// A prefix matches when its base is a case-sensitive prefix of `iri`
    /// and the base is not identical to the whole IRI (case-insensitively)
    /// — otherwise compaction would collapse the IRI to a bare `prefix:`
    /// with nothing after it. A single leading `/` or `:` in the
    /// remainder is stripped.
    pub fn compact(&self, iri: &str) -> String {
        for (prefix, base) in self.prefixes.iter() {
            if base.eq_ignore_ascii_case(iri) {
                continue;
            }
            if let Some(remainder) = iri.strip_prefix(base.as_str()) {
                let remainder = remainder
                    .strip_prefix('/')
                    .or_else(|| remainder.strip_prefix(':'))
                    .unwrap_or(remainder);
                return format!("{prefix}:{remainder}");
            }
        }
        iri.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_at_type_unconditionally() {
        assert!(validate_iri("@type").is_ok());
    }

    #[test]
    fn rejects_missing_colon() {
        assert!(validate_iri("not-an-iri").is_err());
    }

    #[test]
    fn rejects_empty_authority() {
        assert!(validate_iri("http://").is_err());
        assert!(validate_iri("http:").is_err());
    }

    #[test]
    fn set_prefix_rejects_bad_syntax() {
        let mut reg = IriRegistry::new();
        assert!(matches!(
            reg.set_prefix("1bad", "http://example.org/"),
            Err(GraphError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn set_prefix_rejects_duplicate_prefix_and_base() {
        let mut reg = IriRegistry::new();
        reg.set_prefix("test", "http://example.org/test/").unwrap();
        assert!(matches!(
            reg.set_prefix("test", "http://example.org/other/"),
            Err(GraphError::DuplicatePrefix(_))
        ));
        assert!(matches!(
            reg.set_prefix("test2", "HTTP://EXAMPLE.ORG/TEST/"),
            Err(GraphError::DuplicatePrefixIri(_))
        ));
    }

    #[test]
    fn expand_and_compact_round_trip() {
        let mut reg = IriRegistry::new();
        reg.set_prefix("test", "http://example.org/test/").unwrap();
        let expanded = reg.expand("test:foo", false).unwrap();
        assert_eq!(expanded, "http://example.org/test/foo");
        assert_eq!(reg.compact(&expanded), "test:foo");
    }

    #[test]
    fn compact_leaves_unrelated_iri_untouched() {
        let mut reg = IriRegistry::new();
        reg.set_prefix("test", "http://example.org/test/").unwrap();
        assert_eq!(reg.compact("http://other.org/x"), "http://other.org/x");
    }

    #[test]
    fn compact_does_not_collapse_bare_base() {
        let mut reg = IriRegistry::new();
        reg.set_prefix("test", "http://example.org/test").unwrap();
        assert_eq!(
            reg.compact("http://example.org/test"),
            "http://example.org/test"
        );
    }

    #[test]
    fn remove_prefix_is_idempotent() {
        let mut reg = IriRegistry::new();
        reg.remove_prefix("never-bound");
        reg.set_prefix("test", "http://example.org/test/").unwrap();
        reg.remove_prefix("test");
        reg.remove_prefix("test");
        assert!(reg.base("test").is_none());
    }

    #[test]
    fn earlier_prefix_is_not_shadowed_by_a_later_one() {
        let mut reg = IriRegistry::new();
        reg.set_prefix("a", "http://example.org/").unwrap();
        reg.set_prefix("b", "http://example.org/sub/").unwrap();
        assert_eq!(reg.compact("http://example.org/sub/x"), "a:sub/x");
    }
}
