//! The graph store (C7): owns every vertex and edge, and exposes the
//! public CRUD/traversal/load/export surface everything else is built on.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

use crate::context::ContextStore;
use crate::error::{GraphError, Result};
use crate::graph::edge::{canonical_key, EdgeData};
use crate::graph::index::IndexSetCollection;
use crate::graph::vertex::VertexData;
use crate::graph::{AttributeValue, Edge, EdgeId, Vertex, VertexId};
use crate::iri::{is_blank_node_iri, IriRegistry, BLANK_NODE_PREFIX, TYPE_IRI};
use crate::options::{ExportOptions, GraphStoreOptions, LoadOptions, ParseOptions, VertexFilter};
use crate::processor::JsonLdProcessor;
use crate::remote::LoadRemoteDocument;

/// The graph store. Owns all vertex and edge storage; every [`Vertex`] and
/// [`Edge`] handed out elsewhere in this crate borrows from one of these.
pub struct GraphStore {
    vertices: Vec<Option<VertexData>>,
    edges: Vec<Option<EdgeData>>,
    vertex_by_iri: IndexMap<String, VertexId>,
    edge_by_key: IndexMap<String, EdgeId>,
    index: IndexSetCollection,
    prefixes: IriRegistry,
    contexts: ContextStore,
    blank_register: IndexSet<VertexId>,
    typeless_register: IndexSet<VertexId>,
    options: GraphStoreOptions,
    blank_counter: u64,
    vertex_count: usize,
    edge_count: usize,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Creates an empty store with default options.
    pub fn new() -> Self {
        Self::with_options(GraphStoreOptions::default())
    }

    /// Creates an empty store configured with `options`.
    pub fn with_options(options: GraphStoreOptions) -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            vertex_by_iri: IndexMap::new(),
            edge_by_key: IndexMap::new(),
            index: IndexSetCollection::new(),
            prefixes: IriRegistry::new(),
            contexts: ContextStore::new(),
            blank_register: IndexSet::new(),
            typeless_register: IndexSet::new(),
            options,
            blank_counter: 0,
            vertex_count: 0,
            edge_count: 0,
        }
    }

    /// Number of live vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// The prefix registry.
    pub fn prefixes(&self) -> &IriRegistry {
        &self.prefixes
    }

    /// Binds a prefix. See [`IriRegistry::set_prefix`].
    pub fn set_prefix(&mut self, prefix: &str, iri: &str) -> Result<()> {
        self.prefixes.set_prefix(prefix, iri)
    }

    /// Unbinds a prefix. See [`IriRegistry::remove_prefix`].
    pub fn remove_prefix(&mut self, prefix: &str) {
        self.prefixes.remove_prefix(prefix)
    }

    /// Registers a named context document.
    pub fn add_context(&mut self, url: &str, document: Value) -> Result<()> {
        self.contexts.add_context(url, document)
    }

    /// Looks up a registered context document.
    pub fn lookup_context(&self, url: &str) -> Option<&Value> {
        self.contexts.lookup(url)
    }

    /// Resolves `url` to a context document, falling back to `loader` when
    /// remote contexts are enabled.
    pub async fn get_context<L: LoadRemoteDocument>(&self, url: &str, loader: &L) -> Result<Value> {
        self.contexts
            .get_context(url, self.options.remote_contexts_enabled, loader)
            .await
    }

    // -- identity resolution -------------------------------------------

    fn resolve_existing(&self, id: &str) -> Result<VertexId> {
        if id.trim().is_empty() {
            return Err(GraphError::invalid_argument("vertex id must not be empty"));
        }
        let expanded = self.prefixes.expand(id, false)?;
        self.vertex_by_iri
            .get(&expanded)
            .copied()
            .ok_or(GraphError::VertexNotFound(expanded))
    }

    pub(crate) fn vertex_data(&self, id: VertexId) -> &VertexData {
        self.vertices[id.0 as usize]
            .as_ref()
            .expect("VertexId borrowed from a live Vertex<'_> is always valid")
    }

    fn vertex_data_mut(&mut self, id: VertexId) -> Result<&mut VertexData> {
        self.vertices
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| GraphError::VertexNotFound(format!("#{}", id.0)))
    }

    pub(crate) fn edge_data(&self, id: EdgeId) -> &EdgeData {
        self.edges[id.0 as usize]
            .as_ref()
            .expect("EdgeId borrowed from a live Edge<'_> is always valid")
    }

    fn has_edge_ids(&self, label_expanded: &str, from: VertexId, to: VertexId) -> bool {
        let key = canonical_key(
            label_expanded,
            &self.vertex_data(from).iri,
            &self.vertex_data(to).iri,
        );
        self.edge_by_key.contains_key(&key)
    }

    // -- vertex creation / lookup / removal -----------------------------

    /// Allocates a vertex at `iri_expanded`, running the vertex-factory
    /// veto hook (if any) over `type_ids_for_factory` first. Callers are
    /// responsible for checking `iri_expanded` is not already in use.
    fn allocate_vertex(&mut self, iri_expanded: String, type_ids_for_factory: &[String]) -> Result<VertexId> {
        if let Some(factory) = &self.options.vertex_factory {
            if !factory(&iri_expanded, type_ids_for_factory) {
                return Err(GraphError::invalid_argument(format!(
                    "vertex factory refused to create {iri_expanded:?}"
                )));
            }
        }
        let id = VertexId(self.vertices.len() as u32);
        if is_blank_node_iri(&iri_expanded) {
            self.blank_register.insert(id);
        }
        self.vertex_by_iri.insert(iri_expanded.clone(), id);
        self.vertices.push(Some(VertexData::new(iri_expanded)));
        self.vertex_count += 1;
        Ok(id)
    }

    /// Resolves `expanded` to an existing vertex, or creates a fresh
    /// (initially typeless) one.
    pub(crate) fn resolve_or_create_vertex(&mut self, expanded: &str) -> Result<VertexId> {
        if let Some(&id) = self.vertex_by_iri.get(expanded) {
            return Ok(id);
        }
        let id = self.allocate_vertex(expanded.to_string(), &[])?;
        self.typeless_register.insert(id);
        Ok(id)
    }

    /// Generates a fresh, unused blank-node IRI.
    pub(crate) fn fresh_blank_iri(&mut self) -> String {
        loop {
            self.blank_counter += 1;
            let candidate = format!("{BLANK_NODE_PREFIX}-{:x}", self.blank_counter);
            if !self.vertex_by_iri.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Creates a vertex at `id`, with `type_ids` applied as `@type` edges
    /// (creating the type vertices if they don't already exist).
    ///
    /// Fails with [`GraphError::DuplicateVertex`] if `id` is already in
    /// use, or [`GraphError::InvalidArgument`] if the vertex factory (when
    /// configured) vetoes creation.
    pub fn create_vertex(&mut self, id: &str, type_ids: &[&str]) -> Result<VertexId> {
        if id.trim().is_empty() {
            return Err(GraphError::invalid_argument("vertex id must not be empty"));
        }
        let expanded = self.prefixes.expand(id, true)?;
        if self.vertex_by_iri.contains_key(&expanded) {
            return Err(GraphError::DuplicateVertex(expanded));
        }
        let type_ids_expanded = type_ids
            .iter()
            .map(|t| self.prefixes.expand(t, true))
            .collect::<Result<Vec<_>>>()?;
        let vid = self.allocate_vertex(expanded, &type_ids_expanded)?;
        if type_ids_expanded.is_empty() {
            self.typeless_register.insert(vid);
        } else {
            self.set_type_by_id(vid, &type_ids_expanded)?;
        }
        log::trace!("created vertex {}", self.vertex_data(vid).iri);
        if let Some(observer) = &self.options.observer {
            observer.vertex_created(Vertex::new(self, vid));
        }
        Ok(vid)
    }

    /// Looks up a vertex by id (compact or expanded IRI).
    pub fn get_vertex(&self, id: &str) -> Option<Vertex<'_>> {
        self.resolve_existing(id).ok().map(|vid| Vertex::new(self, vid))
    }

    /// `true` if a vertex exists for `id`.
    pub fn has_vertex(&self, id: &str) -> bool {
        self.resolve_existing(id).is_ok()
    }

    /// Removes a vertex and every edge incident to it.
    pub fn remove_vertex(&mut self, id: &str) -> Result<()> {
        let vid = self.resolve_existing(id)?;
        self.remove_vertex_by_id(vid)
    }

    pub(crate) fn remove_vertex_by_id(&mut self, vid: VertexId) -> Result<()> {
        let incident: Vec<EdgeId> = self
            .index
            .outgoing(vid)
            .chain(self.index.incoming(vid))
            .collect();
        for eid in incident {
            self.remove_edge(eid)?;
        }
        self.index.purge_vertex(vid);
        let removed = self.vertices.get_mut(vid.0 as usize).and_then(Option::take);
        if let Some(data) = removed {
            self.vertex_by_iri.shift_remove(&data.iri);
            self.blank_register.shift_remove(&vid);
            self.typeless_register.shift_remove(&vid);
            self.vertex_count -= 1;
            log::trace!("removed vertex {}", data.iri);
            if let Some(observer) = &self.options.observer {
                observer.vertex_removed(&data.iri);
            }
        }
        Ok(())
    }

    /// All live vertices, in arena (creation) order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex<'_>> + '_ {
        self.vertices.iter().enumerate().filter_map(move |(i, v)| {
            v.as_ref().map(|_| Vertex::new(self, VertexId(i as u32)))
        })
    }

    /// Vertices currently registered as blank-node identities.
    pub fn blank_vertices(&self) -> impl Iterator<Item = Vertex<'_>> + '_ {
        self.blank_register.iter().map(move |&id| Vertex::new(self, id))
    }

    /// Vertices currently carrying zero `@type` edges.
    pub(crate) fn typeless_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.typeless_register.iter().copied()
    }

    /// Vertices currently registered as blank-node identities, as raw ids
    /// (used by the normalizer, which needs to mutate the store while
    /// iterating).
    pub(crate) fn blank_vertex_ids(&self) -> Vec<VertexId> {
        self.blank_register.iter().copied().collect()
    }

    pub(crate) fn blank_type_resolver(&self) -> Option<&crate::options::BlankTypeResolver> {
        self.options.blank_type_resolver.as_deref()
    }

    pub(crate) fn blank_iri_resolver(&self) -> Option<&crate::options::BlankIriResolver> {
        self.options.blank_iri_resolver.as_deref()
    }

    pub(crate) fn type_conflict_resolver(&self) -> Option<&crate::options::TypeConflictResolver> {
        self.options.type_conflict_resolver.as_deref()
    }

    pub(crate) fn drop_typeless(&mut self, vertex: VertexId) {
        self.typeless_register.shift_remove(&vertex);
    }

    pub(crate) fn vertex_id_by_expanded_iri(&self, iri: &str) -> Option<VertexId> {
        self.vertex_by_iri.get(iri).copied()
    }

    // -- type edges -------------------------------------------------------

    pub(crate) fn set_type_by_id(&mut self, vertex: VertexId, type_ids_expanded: &[String]) -> Result<()> {
        for type_iri in type_ids_expanded {
            let type_vid = self.resolve_or_create_vertex(type_iri)?;
            if vertex == type_vid {
                let iri = self.vertex_data(vertex).iri.clone();
                return Err(GraphError::CyclicEdge {
                    label: TYPE_IRI.to_string(),
                    iri,
                });
            }
            if !self.has_edge_ids(TYPE_IRI, vertex, type_vid) {
                self.create_edge_raw(TYPE_IRI, vertex, type_vid)?;
            }
        }
        self.typeless_register.shift_remove(&vertex);
        Ok(())
    }

    /// Applies `new_types` to `vertex` per the loader's conflict policy
    /// (ยง4.6 step 5): if the vertex already carries types, the configured
    /// `type_conflict_resolver` decides whether `new_types` replaces them
    /// wholesale or is dropped; with no existing types, `new_types` is
    /// applied directly. A no-op with no resolver configured and existing
    /// types present.
    pub(crate) fn apply_types(&mut self, vertex: VertexId, new_types: &[String]) -> Result<()> {
        if new_types.is_empty() {
            return Ok(());
        }
        let existing: Vec<String> = self.types_of(vertex).map(|t| t.expanded_iri().to_string()).collect();
        if existing.is_empty() {
            return self.set_type_by_id(vertex, new_types);
        }
        let resolved = match &self.options.type_conflict_resolver {
            Some(resolver) => resolver(&existing, new_types),
            None => None,
        };
        if let Some(resolved) = resolved {
            let old_type_edges: Vec<EdgeId> = self.index.outgoing_by_label(vertex, TYPE_IRI).collect();
            for eid in old_type_edges {
                self.remove_edge(eid)?;
            }
            self.set_type_by_id(vertex, &resolved)?;
        }
        Ok(())
    }

    /// Adds `@type` edges from the named vertex to each of `type_ids`,
    /// creating the type vertices if they don't exist.
    pub fn set_type(&mut self, vertex: &str, type_ids: &[&str]) -> Result<()> {
        let vid = self.resolve_existing(vertex)?;
        let expanded = type_ids
            .iter()
            .map(|t| self.prefixes.expand(t, true))
            .collect::<Result<Vec<_>>>()?;
        self.set_type_by_id(vid, &expanded)
    }

    /// Removes `@type` edges from the named vertex to each of `type_ids`.
    /// Absent edges are silently skipped.
    pub fn remove_type(&mut self, vertex: &str, type_ids: &[&str]) -> Result<()> {
        let vid = self.resolve_existing(vertex)?;
        for raw in type_ids {
            let expanded = self.prefixes.expand(raw, true)?;
            if self.vertex_by_iri.contains_key(&expanded) {
                let from_iri = self.vertex_data(vid).iri.clone();
                let key = canonical_key(TYPE_IRI, &from_iri, &expanded);
                if let Some(&eid) = self.edge_by_key.get(&key) {
                    self.remove_edge(eid)?;
                }
            }
        }
        if self.index.outgoing_by_label(vid, TYPE_IRI).next().is_none() {
            self.typeless_register.insert(vid);
        }
        Ok(())
    }

    // -- edges ------------------------------------------------------------

    fn create_edge_raw(&mut self, label_expanded: &str, from: VertexId, to: VertexId) -> Result<EdgeId> {
        let from_iri = self.vertex_data(from).iri.clone();
        let to_iri = self.vertex_data(to).iri.clone();
        if from == to {
            return Err(GraphError::CyclicEdge {
                label: label_expanded.to_string(),
                iri: from_iri,
            });
        }
        let key = canonical_key(label_expanded, &from_iri, &to_iri);
        if self.edge_by_key.contains_key(&key) {
            return Err(GraphError::DuplicateEdge {
                label: label_expanded.to_string(),
                from: from_iri,
                to: to_iri,
            });
        }
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(EdgeData {
            label: label_expanded.to_string(),
            from,
            to,
        }));
        self.edge_by_key.insert(key, id);
        self.index.insert(id, label_expanded, from, to);
        self.edge_count += 1;
        log::trace!("created edge {label_expanded} {from_iri} -> {to_iri}");
        if let Some(observer) = &self.options.observer {
            observer.edge_created(Edge::new(self, id));
        }
        Ok(id)
    }

    /// Creates an edge `(label, from, to)`. Both endpoints must already
    /// exist.
    pub fn create_edge(&mut self, label: &str, from: &str, to: &str) -> Result<EdgeId> {
        if label.trim().is_empty() || from.trim().is_empty() || to.trim().is_empty() {
            return Err(GraphError::invalid_argument(
                "edge label and endpoints must not be empty",
            ));
        }
        let label_expanded = self.prefixes.expand(label, true)?;
        let from_vid = self.resolve_existing(from)?;
        let to_vid = self.resolve_existing(to)?;
        self.create_edge_raw(&label_expanded, from_vid, to_vid)
    }

    /// Removes an edge by id. A stale or already-removed id is a no-op.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<()> {
        let removed = self.edges.get_mut(id.0 as usize).and_then(Option::take);
        if let Some(data) = removed {
            let from_iri = self.vertex_data(data.from).iri.clone();
            let to_iri = self.vertex_data(data.to).iri.clone();
            let key = canonical_key(&data.label, &from_iri, &to_iri);
            self.edge_by_key.shift_remove(&key);
            self.index.remove(id, &data.label, data.from, data.to);
            self.edge_count -= 1;
            log::trace!("removed edge {} {} -> {}", data.label, from_iri, to_iri);
            if let Some(observer) = &self.options.observer {
                observer.edge_removed(&data.label, &from_iri, &to_iri);
            }
        }
        Ok(())
    }

    /// Removes the edge `(label, from, to)` if it exists. A no-op
    /// otherwise.
    pub fn remove_edge_triple(&mut self, label: &str, from: &str, to: &str) -> Result<()> {
        if let (Ok(label), Ok(from_vid), Ok(to_vid)) = (
            self.prefixes.expand(label, false),
            self.resolve_existing(from),
            self.resolve_existing(to),
        ) {
            let key = canonical_key(&label, &self.vertex_data(from_vid).iri, &self.vertex_data(to_vid).iri);
            if let Some(&eid) = self.edge_by_key.get(&key) {
                return self.remove_edge(eid);
            }
        }
        Ok(())
    }

    /// `true` if the edge `(label, from, to)` exists.
    pub fn has_edge(&self, label: &str, from: &str, to: &str) -> bool {
        match (
            self.prefixes.expand(label, false),
            self.resolve_existing(from),
            self.resolve_existing(to),
        ) {
            (Ok(label), Ok(from_vid), Ok(to_vid)) => self.has_edge_ids(&label, from_vid, to_vid),
            _ => false,
        }
    }

    /// All edges, optionally filtered by label.
    pub fn edges(&self, label: Option<&str>) -> impl Iterator<Item = Edge<'_>> + '_ {
        let ids: Box<dyn Iterator<Item = EdgeId>> = match label {
            Some(l) => {
                let expanded = self.prefixes.expand(l, false).unwrap_or_else(|_| l.to_string());
                Box::new(self.index.by_label(&expanded).collect::<Vec<_>>().into_iter())
            }
            None => Box::new(self.index.all_edges().collect::<Vec<_>>().into_iter()),
        };
        ids.map(move |id| Edge::new(self, id))
    }

    /// Outgoing edges of `vertex`, optionally filtered by label.
    pub fn outgoing_edges(&self, vertex: &str, label: Option<&str>) -> Result<impl Iterator<Item = Edge<'_>> + '_> {
        let vid = self.resolve_existing(vertex)?;
        Ok(self
            .outgoing_edge_ids(vid, label)
            .collect::<Vec<_>>()
            .into_iter()
            .map(move |id| Edge::new(self, id)))
    }

    /// Incoming edges of `vertex`, optionally filtered by label.
    pub fn incoming_edges(&self, vertex: &str, label: Option<&str>) -> Result<impl Iterator<Item = Edge<'_>> + '_> {
        let vid = self.resolve_existing(vertex)?;
        Ok(self
            .incoming_edge_ids(vid, label)
            .collect::<Vec<_>>()
            .into_iter()
            .map(move |id| Edge::new(self, id)))
    }

    /// Distinct source vertices of every edge labeled `label`, in
    /// first-seen order.
    pub fn incoming_vertices(&self, label: &str) -> impl Iterator<Item = Vertex<'_>> + '_ {
        let expanded = self.prefixes.expand(label, false).unwrap_or_else(|_| label.to_string());
        let mut seen = IndexSet::new();
        for eid in self.index.by_label(&expanded) {
            seen.insert(self.edge_data(eid).from);
        }
        seen.into_iter().map(move |vid| Vertex::new(self, vid))
    }

    /// Distinct target vertices of every edge labeled `label`, in
    /// first-seen order.
    pub fn outgoing_vertices(&self, label: &str) -> impl Iterator<Item = Vertex<'_>> + '_ {
        let expanded = self.prefixes.expand(label, false).unwrap_or_else(|_| label.to_string());
        let mut seen = IndexSet::new();
        for eid in self.index.by_label(&expanded) {
            seen.insert(self.edge_data(eid).to);
        }
        seen.into_iter().map(move |vid| Vertex::new(self, vid))
    }

    pub(crate) fn outgoing_edge_ids<'s>(
        &'s self,
        vertex: VertexId,
        label: Option<&str>,
    ) -> impl Iterator<Item = EdgeId> + 's {
        match label {
            Some(l) => {
                let expanded = self.prefixes.expand(l, false).unwrap_or_else(|_| l.to_string());
                Box::new(self.index.outgoing_by_label(vertex, &expanded)) as Box<dyn Iterator<Item = EdgeId> + 's>
            }
            None => Box::new(self.index.outgoing(vertex)) as Box<dyn Iterator<Item = EdgeId> + 's>,
        }
    }

    pub(crate) fn incoming_edge_ids<'s>(
        &'s self,
        vertex: VertexId,
        label: Option<&str>,
    ) -> impl Iterator<Item = EdgeId> + 's {
        match label {
            Some(l) => {
                let expanded = self.prefixes.expand(l, false).unwrap_or_else(|_| l.to_string());
                Box::new(self.index.incoming_by_label(vertex, &expanded)) as Box<dyn Iterator<Item = EdgeId> + 's>
            }
            None => Box::new(self.index.incoming(vertex)) as Box<dyn Iterator<Item = EdgeId> + 's>,
        }
    }

    pub(crate) fn outgoing_count(&self, vertex: VertexId) -> usize {
        self.index.outgoing_count(vertex)
    }

    pub(crate) fn incoming_count(&self, vertex: VertexId) -> usize {
        self.index.incoming_count(vertex)
    }

    pub(crate) fn has_outgoing(&self, vertex: VertexId, label: Option<&str>, other: Option<&str>) -> bool {
        let other_vid = match other {
            Some(o) => match self.resolve_existing(o) {
                Ok(v) => Some(v),
                Err(_) => return false,
            },
            None => None,
        };
        self.outgoing_edge_ids(vertex, label)
            .any(|eid| other_vid.map_or(true, |ov| self.edge_data(eid).to == ov))
    }

    pub(crate) fn has_incoming(&self, vertex: VertexId, label: Option<&str>, other: Option<&str>) -> bool {
        let other_vid = match other {
            Some(o) => match self.resolve_existing(o) {
                Ok(v) => Some(v),
                Err(_) => return false,
            },
            None => None,
        };
        self.incoming_edge_ids(vertex, label)
            .any(|eid| other_vid.map_or(true, |ov| self.edge_data(eid).from == ov))
    }

    pub(crate) fn types_of(&self, vertex: VertexId) -> impl Iterator<Item = Vertex<'_>> + '_ {
        self.outgoing_edge_ids(vertex, Some(TYPE_IRI))
            .map(move |eid| Vertex::new(self, self.edge_data(eid).to))
    }

    pub(crate) fn instances_of(&self, vertex: VertexId) -> impl Iterator<Item = Vertex<'_>> + '_ {
        self.incoming_edge_ids(vertex, Some(TYPE_IRI))
            .map(move |eid| Vertex::new(self, self.edge_data(eid).from))
    }

    pub(crate) fn is_type(&self, vertex: VertexId, id: &str) -> Result<bool> {
        let expanded = self.prefixes.expand(id, true)?;
        let type_vid = match self.vertex_by_iri.get(&expanded) {
            Some(&v) => v,
            None => return Ok(false),
        };
        Ok(self
            .outgoing_edge_ids(vertex, Some(TYPE_IRI))
            .any(|eid| self.edge_data(eid).to == type_vid))
    }

    // -- outgoing/incoming set operations (vertex-level mutation) --------

    /// Creates (or reuses) an outgoing edge `(label, vertex, other)`.
    pub fn set_outgoing(&mut self, vertex: &str, label: &str, other: &str, create_if_missing: bool) -> Result<EdgeId> {
        let vid = self.resolve_existing(vertex)?;
        let label_expanded = self.prefixes.expand(label, true)?;
        let other_vid = if create_if_missing {
            let expanded = self.prefixes.expand(other, true)?;
            self.resolve_or_create_vertex(&expanded)?
        } else {
            self.resolve_existing(other)?
        };
        self.create_edge_raw(&label_expanded, vid, other_vid)
    }

    /// Creates (or reuses) an incoming edge `(label, other, vertex)`.
    pub fn set_incoming(&mut self, vertex: &str, label: &str, other: &str, create_if_missing: bool) -> Result<EdgeId> {
        let vid = self.resolve_existing(vertex)?;
        let label_expanded = self.prefixes.expand(label, true)?;
        let other_vid = if create_if_missing {
            let expanded = self.prefixes.expand(other, true)?;
            self.resolve_or_create_vertex(&expanded)?
        } else {
            self.resolve_existing(other)?
        };
        self.create_edge_raw(&label_expanded, other_vid, vid)
    }

    /// Removes outgoing edges from `vertex` matching `label`/`filter`.
    /// Returns the number removed.
    pub fn remove_outgoing(&mut self, vertex: &str, label: Option<&str>, filter: Option<VertexFilter<'_>>) -> Result<usize> {
        let vid = self.resolve_existing(vertex)?;
        let candidates: Vec<EdgeId> = self.outgoing_edge_ids(vid, label).collect();
        let mut removed = 0;
        for eid in candidates {
            let to = self.edge_data(eid).to;
            if Self::filter_matches(&filter, self, to) {
                self.remove_edge(eid)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Removes incoming edges to `vertex` matching `label`/`filter`.
    /// Returns the number removed.
    pub fn remove_incoming(&mut self, vertex: &str, label: Option<&str>, filter: Option<VertexFilter<'_>>) -> Result<usize> {
        let vid = self.resolve_existing(vertex)?;
        let candidates: Vec<EdgeId> = self.incoming_edge_ids(vid, label).collect();
        let mut removed = 0;
        for eid in candidates {
            let from = self.edge_data(eid).from;
            if Self::filter_matches(&filter, self, from) {
                self.remove_edge(eid)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn filter_matches(filter: &Option<VertexFilter<'_>>, store: &GraphStore, candidate: VertexId) -> bool {
        match filter {
            None => true,
            Some(VertexFilter::Iri(iri)) => {
                let expanded = store.prefixes.expand(iri, false).unwrap_or_else(|_| iri.to_string());
                store.vertex_data(candidate).iri == expanded
            }
            Some(VertexFilter::Predicate(pred)) => pred(Vertex::new(store, candidate)),
        }
    }

    // -- attributes --------------------------------------------------------

    /// Appends an attribute value on `vertex`. See
    /// [`crate::graph::AttributeBag::append`].
    pub fn attr_append(&mut self, vertex: &str, predicate: &str, value: Value, language: Option<&str>, as_json: bool) -> Result<()> {
        let vid = self.resolve_existing(vertex)?;
        self.vertex_data_mut(vid)?.attributes.append(predicate, value, language, as_json)
    }

    /// Sets an attribute value on `vertex`. See
    /// [`crate::graph::AttributeBag::set`].
    pub fn attr_set(&mut self, vertex: &str, predicate: &str, value: Value, language: Option<&str>, as_json: bool) -> Result<()> {
        let vid = self.resolve_existing(vertex)?;
        self.vertex_data_mut(vid)?.attributes.set(predicate, value, language, as_json)
    }

    /// Deletes an attribute entry on `vertex`.
    pub fn attr_delete(&mut self, vertex: &str, predicate: &str) -> Result<()> {
        let vid = self.resolve_existing(vertex)?;
        self.vertex_data_mut(vid)?.attributes.delete(predicate);
        Ok(())
    }

    // -- rename --------------------------------------------------------------

    /// Renames `target` to `new_id`, rewiring every incident edge onto a
    /// fresh vertex and removing the old one. See ยง4.7 of SPEC_FULL.md.
    pub fn rename_vertex(&mut self, target: &str, new_id: &str) -> Result<VertexId> {
        if new_id.trim().is_empty() {
            return Err(GraphError::invalid_argument("new vertex id must not be empty"));
        }
        let old_vid = self.resolve_existing(target)?;
        let new_expanded = self.prefixes.expand(new_id, true)?;
        let old_expanded = self.vertex_data(old_vid).iri.clone();
        if new_expanded == old_expanded {
            return Ok(old_vid);
        }
        if self.vertex_by_iri.contains_key(&new_expanded) {
            return Err(GraphError::DuplicateVertex(new_expanded));
        }

        let new_vid = self.allocate_vertex(new_expanded.clone(), &[])?;

        let attrs: Vec<(String, AttributeValue)> = self
            .vertex_data(old_vid)
            .attributes
            .iter()
            .flat_map(|(predicate, values)| values.iter().map(move |v| (predicate.to_string(), v.clone())))
            .collect();
        for (predicate, value) in attrs {
            self.vertex_data_mut(new_vid)?.attributes.append(
                &predicate,
                value.value().clone(),
                value.language(),
                value.is_json(),
            )?;
        }

        let outgoing: Vec<(String, VertexId)> = self
            .index
            .outgoing(old_vid)
            .map(|eid| {
                let data = self.edge_data(eid);
                (data.label.clone(), data.to)
            })
            .collect();
        for (label, to) in outgoing {
            self.create_edge_raw(&label, new_vid, to)?;
        }

        let incoming: Vec<(String, VertexId)> = self
            .index
            .incoming(old_vid)
            .map(|eid| {
                let data = self.edge_data(eid);
                (data.label.clone(), data.from)
            })
            .collect();
        for (label, from) in incoming {
            self.create_edge_raw(&label, from, new_vid)?;
        }

        self.remove_vertex_by_id(old_vid)?;
        log::debug!("renamed vertex {old_expanded} to {new_expanded}");
        Ok(new_vid)
    }

    // -- load / parse / export ------------------------------------------

    /// Loads already-expanded JSON-LD entities into the graph.
    pub fn load(&mut self, input: Value, options: LoadOptions) -> Result<()> {
        crate::loader::load_into(self, input, &options)?;
        if options.normalize {
            crate::normalize::normalize(self, options.unique)?;
        }
        Ok(())
    }

    /// Expands `input` via the injected processor, then loads it.
    pub async fn parse<P, L>(&mut self, input: Value, processor: &P, loader: &L, options: ParseOptions) -> Result<()>
    where
        L: LoadRemoteDocument,
        P: JsonLdProcessor<L>,
    {
        crate::parser::parse_into(self, input, processor, loader, options).await
    }

    /// Exports the whole graph as expanded JSON-LD.
    pub fn to_expanded(&self) -> Value {
        crate::export::to_expanded(self)
    }

    /// Exports the graph's root vertices (no incoming edges), compacted
    /// or framed per `options`.
    pub async fn to_json<P, L>(&self, contexts: &Value, options: &ExportOptions, processor: &P, loader: &L) -> Result<Value>
    where
        L: LoadRemoteDocument,
        P: JsonLdProcessor<L>,
    {
        crate::export::to_json(self, contexts, options, processor, loader).await
    }

    /// A deterministic, serializable snapshot of the whole graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                v.as_ref().map(|data| {
                    let vid = VertexId(i as u32);
                    VertexSnapshot {
                        id: i as u32,
                        iri: data.iri.clone(),
                        types: self.types_of(vid).map(|t| t.expanded_iri().to_string()).collect(),
                        attributes: data
                            .attributes
                            .iter()
                            .flat_map(|(predicate, values)| {
                                values.iter().map(move |v| AttributeSnapshot {
                                    predicate: predicate.to_string(),
                                    value: v.value().clone(),
                                    language: v.language().map(str::to_string),
                                    datatype: v.datatype().map(str::to_string),
                                    is_json: v.is_json(),
                                })
                            })
                            .collect(),
                    }
                })
            })
            .collect();
        let edges = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                e.as_ref().map(|data| EdgeSnapshot {
                    id: i as u32,
                    label: data.label.clone(),
                    from: data.from.0,
                    to: data.to.0,
                })
            })
            .collect();
        let indices = self
            .index
            .snapshot_keys()
            .into_iter()
            .map(|(key, ids)| (key, ids.into_iter().map(|id| id.0).collect()))
            .collect::<BTreeMap<_, _>>();
        GraphSnapshot {
            vertices,
            edges,
            indices,
        }
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("vertex_count", &self.vertex_count)
            .field("edge_count", &self.edge_count)
            .finish()
    }
}

/// One vertex's worth of data in a [`GraphSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct VertexSnapshot {
    /// The arena index this vertex occupies.
    pub id: u32,
    /// The vertex's expanded IRI.
    pub iri: String,
    /// Expanded IRIs of every `@type` this vertex carries.
    pub types: Vec<String>,
    /// Flattened `(predicate, value)` attribute entries.
    pub attributes: Vec<AttributeSnapshot>,
}

/// One literal value in a [`VertexSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSnapshot {
    /// The attribute's predicate IRI.
    pub predicate: String,
    /// The literal value.
    pub value: Value,
    /// The RFC-5646 language tag, if any.
    pub language: Option<String>,
    /// The datatype IRI, if any.
    pub datatype: Option<String>,
    /// `true` if this value is an opaque `@json` literal.
    pub is_json: bool,
}

/// One edge's worth of data in a [`GraphSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct EdgeSnapshot {
    /// The arena index this edge occupies.
    pub id: u32,
    /// The edge's expanded label.
    pub label: String,
    /// The source vertex's arena index.
    pub from: u32,
    /// The target vertex's arena index.
    pub to: u32,
}

/// A deterministic, serializable snapshot of a whole [`GraphStore`]. See
/// ยง6 of SPEC_FULL.md.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    /// Every live vertex, in arena order.
    pub vertices: Vec<VertexSnapshot>,
    /// Every live edge, in arena order.
    pub edges: Vec<EdgeSnapshot>,
    /// The five index sets, rendered as the canonical key scheme from ยง3.
    pub indices: BTreeMap<String, Vec<u32>>,
}
