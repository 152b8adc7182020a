//! The edge type (C5): an immutable `(label, from, to)` triple.

use super::vertex::Vertex;
use super::VertexId;
use crate::store::GraphStore;

/// Stable handle to a live edge. Indices into [`crate::store::GraphStore`]'s
/// edge arena; never reused while the edge is alive, and never exposed
/// past [`crate::store::GraphStore::remove_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) u32);

/// The owned, arena-stored representation of an edge. `label`, and the
/// endpoints' IRIs (resolved through `from`/`to`), are always expanded
/// IRIs; callers only ever see compacted forms through [`Edge`].
#[derive(Debug, Clone)]
pub(crate) struct EdgeData {
    pub(crate) label: String,
    pub(crate) from: VertexId,
    pub(crate) to: VertexId,
}

/// The canonical encoding `label_from->to` used as both the dedup key and
/// the value stored in every index set.
pub(crate) fn canonical_key(label: &str, from_iri: &str, to_iri: &str) -> String {
    format!("{label}_{from_iri}->{to_iri}")
}

/// A read-only cursor over a live edge, borrowed from a [`GraphStore`].
/// Like [`Vertex`], this is a thin `Copy` pair of `(&'g GraphStore,
/// EdgeId)`; its accessors take `self` by value.
#[derive(Clone, Copy)]
pub struct Edge<'g> {
    store: &'g GraphStore,
    id: EdgeId,
}

impl<'g> Edge<'g> {
    pub(crate) fn new(store: &'g GraphStore, id: EdgeId) -> Self {
        Self { store, id }
    }

    /// This edge's stable handle.
    pub fn id(self) -> EdgeId {
        self.id
    }

    fn data(self) -> &'g EdgeData {
        self.store.edge_data(self.id)
    }

    /// The edge's label, in compact form.
    pub fn label(self) -> String {
        self.store.prefixes().compact(&self.data().label)
    }

    /// The source vertex.
    pub fn from(self) -> Vertex<'g> {
        Vertex::new(self.store, self.data().from)
    }

    /// The target vertex.
    pub fn to(self) -> Vertex<'g> {
        Vertex::new(self.store, self.data().to)
    }
}

impl std::fmt::Debug for Edge<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Edge")
            .field("label", &self.label())
            .field("from", &self.from().iri())
            .field("to", &self.to().iri())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_matches_the_documented_encoding() {
        assert_eq!(
            canonical_key("rel", "http://example.org/a", "http://example.org/b"),
            "rel_http://example.org/a->http://example.org/b"
        );
    }
}
