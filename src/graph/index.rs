//! The index set (C6): five keyed sets mapping logical queries to edge
//! identities, kept atomically in sync on every edge insert/remove.

use indexmap::{IndexMap, IndexSet};

use super::edge::EdgeId;
use super::VertexId;

/// Five indices over the live edges of a graph, keyed the way ยง3
/// describes:
///
/// | Key | Members |
/// |---|---|
/// | `by_label[label]` | all edges with that label |
/// | `out_all[v]` | all outgoing edges from `v` |
/// | `out_by_label[(v, label)]` | outgoing from `v`, filtered by label |
/// | `in_all[v]` | all incoming edges to `v` |
/// | `in_by_label[(v, label)]` | incoming to `v`, filtered by label |
///
/// Every set preserves insertion order, so traversal order matches the
/// order edges were created in.
#[derive(Debug, Default)]
pub(crate) struct IndexSetCollection {
    by_label: IndexMap<String, IndexSet<EdgeId>>,
    out_all: IndexMap<VertexId, IndexSet<EdgeId>>,
    out_by_label: IndexMap<(VertexId, String), IndexSet<EdgeId>>,
    in_all: IndexMap<VertexId, IndexSet<EdgeId>>,
    in_by_label: IndexMap<(VertexId, String), IndexSet<EdgeId>>,
}

impl IndexSetCollection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a new edge in all five sets.
    pub(crate) fn insert(&mut self, id: EdgeId, label: &str, from: VertexId, to: VertexId) {
        self.by_label
            .entry(label.to_string())
            .or_default()
            .insert(id);
        self.out_all.entry(from).or_default().insert(id);
        self.out_by_label
            .entry((from, label.to_string()))
            .or_default()
            .insert(id);
        self.in_all.entry(to).or_default().insert(id);
        self.in_by_label
            .entry((to, label.to_string()))
            .or_default()
            .insert(id);
    }

    /// Removes an edge from all five sets.
    pub(crate) fn remove(&mut self, id: EdgeId, label: &str, from: VertexId, to: VertexId) {
        if let Some(set) = self.by_label.get_mut(label) {
            set.shift_remove(&id);
        }
        if let Some(set) = self.out_all.get_mut(&from) {
            set.shift_remove(&id);
        }
        if let Some(set) = self.out_by_label.get_mut(&(from, label.to_string())) {
            set.shift_remove(&id);
        }
        if let Some(set) = self.in_all.get_mut(&to) {
            set.shift_remove(&id);
        }
        if let Some(set) = self.in_by_label.get_mut(&(to, label.to_string())) {
            set.shift_remove(&id);
        }
    }

    pub(crate) fn by_label(&self, label: &str) -> impl Iterator<Item = EdgeId> + '_ {
        self.by_label
            .get(label)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub(crate) fn all_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.by_label.values().flat_map(|set| set.iter().copied())
    }

    pub(crate) fn outgoing(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_all
            .get(&vertex)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub(crate) fn outgoing_by_label(
        &self,
        vertex: VertexId,
        label: &str,
    ) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_by_label
            .get(&(vertex, label.to_string()))
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub(crate) fn incoming(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.in_all
            .get(&vertex)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub(crate) fn incoming_by_label(
        &self,
        vertex: VertexId,
        label: &str,
    ) -> impl Iterator<Item = EdgeId> + '_ {
        self.in_by_label
            .get(&(vertex, label.to_string()))
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub(crate) fn outgoing_count(&self, vertex: VertexId) -> usize {
        self.out_all.get(&vertex).map_or(0, IndexSet::len)
    }

    pub(crate) fn incoming_count(&self, vertex: VertexId) -> usize {
        self.in_all.get(&vertex).map_or(0, IndexSet::len)
    }

    /// Purges every trace of `vertex` from all five sets: its own
    /// `out_all`/`in_all`/`*_by_label` entries, plus any stray
    /// `(vertex, label)` keys left behind once the last edge through
    /// them is gone.
    pub(crate) fn purge_vertex(&mut self, vertex: VertexId) {
        self.out_all.shift_remove(&vertex);
        self.in_all.shift_remove(&vertex);
        self.out_by_label.retain(|(v, _), _| *v != vertex);
        self.in_by_label.retain(|(v, _), _| *v != vertex);
    }

    /// Renders the five sets into the canonical key scheme documented in
    /// ยง3 of SPEC_FULL.md, for [`crate::store::GraphStore::snapshot`].
    pub(crate) fn snapshot_keys(&self) -> std::collections::BTreeMap<String, Vec<EdgeId>> {
        let mut out = std::collections::BTreeMap::new();
        for (label, set) in &self.by_label {
            out.insert(format!("[e]::{label}"), set.iter().copied().collect());
        }
        for (vertex, set) in &self.out_all {
            out.insert(
                format!("[v]::{}_[out]", vertex.0),
                set.iter().copied().collect(),
            );
        }
        for ((vertex, label), set) in &self.out_by_label {
            out.insert(
                format!("[v]::{}_[out]_[e]::{label}", vertex.0),
                set.iter().copied().collect(),
            );
        }
        for (vertex, set) in &self.in_all {
            out.insert(
                format!("[v]::{}_[in]", vertex.0),
                set.iter().copied().collect(),
            );
        }
        for ((vertex, label), set) in &self.in_by_label {
            out.insert(
                format!("[v]::{}_[in]_[e]::{label}", vertex.0),
                set.iter().copied().collect(),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid(n: u32) -> VertexId {
        VertexId(n)
    }

    fn eid(n: u32) -> EdgeId {
        EdgeId(n)
    }

    #[test]
    fn insert_populates_all_five_sets() {
        let mut idx = IndexSetCollection::new();
        idx.insert(eid(0), "rel", vid(0), vid(1));
        assert_eq!(idx.by_label("rel").collect::<Vec<_>>(), vec![eid(0)]);
        assert_eq!(idx.outgoing(vid(0)).collect::<Vec<_>>(), vec![eid(0)]);
        assert_eq!(
            idx.outgoing_by_label(vid(0), "rel").collect::<Vec<_>>(),
            vec![eid(0)]
        );
        assert_eq!(idx.incoming(vid(1)).collect::<Vec<_>>(), vec![eid(0)]);
        assert_eq!(
            idx.incoming_by_label(vid(1), "rel").collect::<Vec<_>>(),
            vec![eid(0)]
        );
    }

    #[test]
    fn remove_clears_all_five_sets() {
        let mut idx = IndexSetCollection::new();
        idx.insert(eid(0), "rel", vid(0), vid(1));
        idx.remove(eid(0), "rel", vid(0), vid(1));
        assert!(idx.by_label("rel").next().is_none());
        assert!(idx.outgoing(vid(0)).next().is_none());
        assert!(idx.outgoing_by_label(vid(0), "rel").next().is_none());
        assert!(idx.incoming(vid(1)).next().is_none());
        assert!(idx.incoming_by_label(vid(1), "rel").next().is_none());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut idx = IndexSetCollection::new();
        idx.insert(eid(0), "rel", vid(0), vid(1));
        idx.insert(eid(1), "rel", vid(0), vid(2));
        assert_eq!(
            idx.outgoing(vid(0)).collect::<Vec<_>>(),
            vec![eid(0), eid(1)]
        );
    }
}
