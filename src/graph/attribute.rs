//! The attribute bag (C3): a per-vertex multimap of predicate to an
//! ordered list of typed/localized literal values.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{GraphError, Result};

/// The datatype slot of an [`AttributeValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// A datatype IRI, e.g. `xsd:dateTime`.
    Datatype(String),
    /// The `@json` sentinel: `value` is an opaque JSON tree.
    Json,
}

/// A single literal value recorded on a vertex, with an optional language
/// tag or datatype/`@json` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    value: Value,
    language: Option<String>,
    kind: Option<ValueKind>,
}

impl AttributeValue {
    /// Creates a new, untyped, unlocalized value.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            language: None,
            kind: None,
        }
    }

    /// The raw value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The RFC-5646 language tag, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The datatype IRI, if this value carries one (as opposed to being a
    /// plain literal, a localized string, or an `@json` value).
    pub fn datatype(&self) -> Option<&str> {
        match &self.kind {
            Some(ValueKind::Datatype(iri)) => Some(iri),
            _ => None,
        }
    }

    /// `true` if this value is an opaque `@json` literal.
    pub fn is_json(&self) -> bool {
        matches!(self.kind, Some(ValueKind::Json))
    }
}

/// An ordered multimap of predicate IRI to [`AttributeValue`] list.
///
/// Invariants (ยง3): at most one value per `(predicate, language)` pair —
/// appending another value under the same language replaces it in place;
/// values with no language may accumulate freely, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct AttributeBag {
    entries: IndexMap<String, Vec<AttributeValue>>,
}

impl AttributeBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` under `predicate`.
    ///
    /// If `language` is set, any existing value for that `(predicate,
    /// language)` pair is replaced in place (preserving its original
    /// position); otherwise the value is pushed to the end of the list.
    pub fn append(
        &mut self,
        predicate: &str,
        value: Value,
        language: Option<&str>,
        as_json: bool,
    ) -> Result<()> {
        if language.is_some() && !value.is_string() {
            return Err(GraphError::invalid_argument(
                "a localized attribute value must be a string",
            ));
        }
        let kind = if as_json {
            Some(ValueKind::Json)
        } else {
            None
        };
        let attr = AttributeValue {
            value,
            language: language.map(str::to_string),
            kind,
        };
        let slot = self.entries.entry(predicate.to_string()).or_default();
        if let Some(lang) = language {
            if let Some(existing) = slot.iter_mut().find(|v| v.language.as_deref() == Some(lang)) {
                *existing = attr;
                return Ok(());
            }
        }
        slot.push(attr);
        Ok(())
    }

    /// Sets `predicate`'s value.
    ///
    /// With a `language`, behaves exactly like [`Self::append`] (there is
    /// only ever one slot per language). Without one, replaces the whole
    /// list with a single value.
    pub fn set(
        &mut self,
        predicate: &str,
        value: Value,
        language: Option<&str>,
        as_json: bool,
    ) -> Result<()> {
        if language.is_some() {
            return self.append(predicate, value, language, as_json);
        }
        let kind = if as_json {
            Some(ValueKind::Json)
        } else {
            None
        };
        self.entries.insert(
            predicate.to_string(),
            vec![AttributeValue {
                value,
                language: None,
                kind,
            }],
        );
        Ok(())
    }

    /// Removes the whole entry for `predicate`.
    pub fn delete(&mut self, predicate: &str) {
        self.entries.shift_remove(predicate);
    }

    /// Returns the first value recorded for `predicate`, irrespective of
    /// language.
    pub fn get(&self, predicate: &str) -> Option<&AttributeValue> {
        self.entries.get(predicate).and_then(|v| v.first())
    }

    /// Returns the value recorded for `predicate` under `language`.
    pub fn get_lang(&self, predicate: &str, language: &str) -> Option<&AttributeValue> {
        self.entries
            .get(predicate)
            .and_then(|v| v.iter().find(|a| a.language.as_deref() == Some(language)))
    }

    /// Returns the whole ordered list recorded for `predicate`.
    pub fn get_all(&self, predicate: &str) -> &[AttributeValue] {
        self.entries
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Checks whether `predicate` carries `value`, optionally restricted
    /// to a single language slot.
    pub fn has(&self, predicate: &str, value: &Value, language: Option<&str>) -> bool {
        match language {
            Some(lang) => self
                .get_lang(predicate, lang)
                .is_some_and(|a| &a.value == value),
            None => self.get_all(predicate).iter().any(|a| &a.value == value),
        }
    }

    /// Iterates `(predicate, values)` pairs in the order predicates were
    /// first used.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AttributeValue])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `true` if no predicate has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
