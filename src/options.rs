//! Configuration records and caller-injectable hooks: load options, export
//! options, the three normalizer resolvers, the vertex-creation veto, and
//! the optional observer.

use std::sync::Arc;

use serde_json::Value;

use crate::graph::{Edge, Vertex};

/// Resolver invoked by the normalizer's blank-types pass.
pub type BlankTypeResolver = dyn for<'a> Fn(Vertex<'a>) -> Option<Vec<String>> + Send + Sync;

/// Resolver invoked by the normalizer's blank-IRIs pass.
pub type BlankIriResolver = dyn for<'a> Fn(Vertex<'a>) -> Option<String> + Send + Sync;

/// Resolver invoked wherever two type sets collide: at load time when a
/// vertex already has types and new ones arrive, and during blank-IRI
/// merge when both sides carry types.
pub type TypeConflictResolver = dyn Fn(&[String], &[String]) -> Option<Vec<String>> + Send + Sync;

/// Caller-supplied pre-creation hook for vertices. Returning `false`
/// vetoes creation, surfaced as [`crate::error::GraphError::InvalidArgument`].
///
/// This is the Rust rendition of the source design's vertex *factory*
/// (`(iri, types, graph) -> Vertex | falsy`): subclassing the vertex
/// representation doesn't translate to an arena-indexed model, so the
/// factory is narrowed to the one observable effect it can still have —
/// vetoing creation (see DESIGN.md, "vertex factory").
pub type VertexFactory = dyn Fn(&str, &[String]) -> bool + Send + Sync;

/// An identity validator or translator, applied to non-blank `@id`s (and,
/// for the translator, to type IRIs) during load.
pub type IdentityHook = dyn Fn(&str) -> String + Send + Sync;
/// A validator: returns `true` to accept the identity.
pub type IdentityValidator = dyn Fn(&str) -> bool + Send + Sync;

/// Lightweight, opt-in observer over vertex/edge lifecycle events.
///
/// Not required by any operation in the source design; kept as the seam
/// an earlier iteration's pub-sub facade left behind (DESIGN NOTES,
/// "Events/observers"). Every method has a no-op default so implementers
/// only override what they need.
pub trait GraphObserver: Send + Sync {
    /// Called after a vertex is created.
    fn vertex_created(&self, _vertex: Vertex<'_>) {}
    /// Called after a vertex (named by its expanded IRI) is removed.
    fn vertex_removed(&self, _expanded_iri: &str) {}
    /// Called after an edge is created.
    fn edge_created(&self, _edge: Edge<'_>) {}
    /// Called after an edge is removed.
    fn edge_removed(&self, _label: &str, _from_iri: &str, _to_iri: &str) {}
}

/// Store-wide configuration: whether remote contexts may be fetched, and
/// the caller-injectable hooks described above.
#[derive(Clone, Default)]
pub struct GraphStoreOptions {
    pub(crate) remote_contexts_enabled: bool,
    pub(crate) vertex_factory: Option<Arc<VertexFactory>>,
    pub(crate) blank_type_resolver: Option<Arc<BlankTypeResolver>>,
    pub(crate) blank_iri_resolver: Option<Arc<BlankIriResolver>>,
    pub(crate) type_conflict_resolver: Option<Arc<TypeConflictResolver>>,
    pub(crate) observer: Option<Arc<dyn GraphObserver>>,
}

impl GraphStoreOptions {
    /// Default options: no remote contexts, no resolvers, no observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables falling back to the remote document loader when a context
    /// URL is not registered locally.
    pub fn with_remote_contexts_enabled(mut self, enabled: bool) -> Self {
        self.remote_contexts_enabled = enabled;
        self
    }

    /// Sets the vertex-creation veto hook.
    pub fn with_vertex_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str, &[String]) -> bool + Send + Sync + 'static,
    {
        self.vertex_factory = Some(Arc::new(factory));
        self
    }

    /// Sets the blank-types resolver used by the normalizer.
    pub fn with_blank_type_resolver<F>(mut self, resolver: F) -> Self
    where
        F: for<'a> Fn(Vertex<'a>) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.blank_type_resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the blank-IRIs resolver used by the normalizer.
    pub fn with_blank_iri_resolver<F>(mut self, resolver: F) -> Self
    where
        F: for<'a> Fn(Vertex<'a>) -> Option<String> + Send + Sync + 'static,
    {
        self.blank_iri_resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the resolver invoked on type-set collisions.
    pub fn with_type_conflict_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&[String], &[String]) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.type_conflict_resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the lifecycle observer.
    pub fn with_observer(mut self, observer: impl GraphObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }
}

impl std::fmt::Debug for GraphStoreOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStoreOptions")
            .field("remote_contexts_enabled", &self.remote_contexts_enabled)
            .field("vertex_factory", &self.vertex_factory.is_some())
            .field("blank_type_resolver", &self.blank_type_resolver.is_some())
            .field("blank_iri_resolver", &self.blank_iri_resolver.is_some())
            .field(
                "type_conflict_resolver",
                &self.type_conflict_resolver.is_some(),
            )
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Options accepted by [`crate::store::GraphStore::load`].
#[derive(Clone, Default)]
pub struct LoadOptions {
    pub(crate) base: Option<String>,
    pub(crate) merge: bool,
    pub(crate) normalize: bool,
    pub(crate) unique: bool,
    pub(crate) identity_translator: Option<Arc<IdentityHook>>,
    pub(crate) identity_validator: Option<Arc<IdentityValidator>>,
}

impl LoadOptions {
    /// Default options: append semantics, no normalization, no `unique`
    /// enforcement, no identity hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base IRI used to resolve relative identities.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Switches literal loading from append to set (replace) semantics.
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    /// Runs the normalizer after loading.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Enforces that no entity identity is defined more than once within
    /// a single load call.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Sets the identity translator (applied to non-blank `@id`s and
    /// type IRIs).
    pub fn with_identity_translator<F>(mut self, translator: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.identity_translator = Some(Arc::new(translator));
        self
    }

    /// Sets the identity validator (applied to non-blank `@id`s).
    pub fn with_identity_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.identity_validator = Some(Arc::new(validator));
        self
    }
}

impl std::fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadOptions")
            .field("base", &self.base)
            .field("merge", &self.merge)
            .field("normalize", &self.normalize)
            .field("unique", &self.unique)
            .finish()
    }
}

/// Options accepted by [`crate::store::GraphStore::parse`]: everything
/// [`LoadOptions`] has, plus the pieces specific to driving the external
/// expansion step.
#[derive(Clone, Default)]
pub struct ParseOptions {
    pub(crate) load: LoadOptions,
    pub(crate) expand_context: Option<Value>,
}

impl ParseOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the load-time options applied once expansion has produced
    /// the expanded entities.
    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// An additional context applied before the document's own
    /// `@context`, passed through to the injected processor's `expand`.
    pub fn with_expand_context(mut self, context: Value) -> Self {
        self.expand_context = Some(context);
        self
    }
}

/// Whether an export-time rule applies unconditionally, never, or per a
/// caller-supplied predicate over the vertex in question.
#[derive(Clone)]
pub enum VertexRule {
    /// Applies to every vertex.
    Always,
    /// Applies to no vertex.
    Never,
    /// Applies to vertices the predicate accepts.
    Matching(Arc<dyn for<'a> Fn(Vertex<'a>) -> bool + Send + Sync>),
}

impl VertexRule {
    /// Builds a rule from a predicate closure.
    pub fn predicate<F>(f: F) -> Self
    where
        F: for<'a> Fn(Vertex<'a>) -> bool + Send + Sync + 'static,
    {
        VertexRule::Matching(Arc::new(f))
    }

    pub(crate) fn matches(&self, vertex: Vertex<'_>) -> bool {
        match self {
            VertexRule::Always => true,
            VertexRule::Never => false,
            VertexRule::Matching(f) => f(vertex),
        }
    }
}

impl From<bool> for VertexRule {
    fn from(always: bool) -> Self {
        if always {
            VertexRule::Always
        } else {
            VertexRule::Never
        }
    }
}

/// Whether an attribute-exclusion rule matches a predicate IRI by exact
/// string prefix or by caller-supplied predicate.
#[derive(Clone)]
pub enum AttributeRule {
    /// Never excludes anything.
    Never,
    /// Excludes predicates starting with this prefix.
    Prefix(String),
    /// Excludes predicates the closure accepts.
    Matching(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl AttributeRule {
    pub(crate) fn matches(&self, predicate: &str) -> bool {
        match self {
            AttributeRule::Never => false,
            AttributeRule::Prefix(prefix) => predicate.starts_with(prefix.as_str()),
            AttributeRule::Matching(f) => f(predicate),
        }
    }
}

impl Default for AttributeRule {
    fn default() -> Self {
        AttributeRule::Never
    }
}

/// Options accepted by [`crate::store::GraphStore::to_json`] /
/// [`crate::export`].
#[derive(Clone, Default)]
pub struct ExportOptions {
    pub(crate) anonymous_references: Option<VertexRule>,
    pub(crate) anonymous_types: Option<VertexRule>,
    pub(crate) compact_locale: Option<String>,
    pub(crate) compact_references: Option<VertexRule>,
    pub(crate) exclude_references: Option<VertexRule>,
    pub(crate) exclude_attributes: AttributeRule,
    pub(crate) no_references: bool,
    pub(crate) identity_translator: Option<Arc<IdentityHook>>,
    pub(crate) transform: Option<Arc<dyn Fn(&mut Value) + Send + Sync>>,
    pub(crate) frame: Option<Value>,
    pub(crate) strip_context: bool,
}

impl ExportOptions {
    /// Default options: no rules applied, full export, `@context` kept.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops `@id` on embedded targets matching `rule`.
    pub fn with_anonymous_references(mut self, rule: impl Into<VertexRule>) -> Self {
        self.anonymous_references = Some(rule.into());
        self
    }

    /// Omits `@type` on vertices matching `rule`.
    pub fn with_anonymous_types(mut self, rule: impl Into<VertexRule>) -> Self {
        self.anonymous_types = Some(rule.into());
        self
    }

    /// When a localized attribute has exactly one value matching `tag`,
    /// emit the bare literal instead of a value object.
    pub fn with_compact_locale(mut self, tag: impl Into<String>) -> Self {
        self.compact_locale = Some(tag.into());
        self
    }

    /// Emits `{"@id": target}` instead of embedding, for vertices
    /// matching `rule`.
    pub fn with_compact_references(mut self, rule: impl Into<VertexRule>) -> Self {
        self.compact_references = Some(rule.into());
        self
    }

    /// Skips outgoing edges entirely for vertices matching `rule`.
    pub fn with_exclude_references(mut self, rule: impl Into<VertexRule>) -> Self {
        self.exclude_references = Some(rule.into());
        self
    }

    /// Skips attributes whose predicate matches `rule`.
    pub fn with_exclude_attributes(mut self, rule: AttributeRule) -> Self {
        self.exclude_attributes = rule;
        self
    }

    /// Skips all outgoing edges, everywhere.
    pub fn with_no_references(mut self, no_references: bool) -> Self {
        self.no_references = no_references;
        self
    }

    /// Rewrites `@id` and `@type` values on emit.
    pub fn with_identity_translator<F>(mut self, translator: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.identity_translator = Some(Arc::new(translator));
        self
    }

    /// Post-hoc mutation of the per-vertex JSON object.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&mut Value) + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Frames the export using `frame` instead of compacting it.
    pub fn with_frame(mut self, frame: Value) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Strips `@context` from the final output.
    pub fn with_strip_context(mut self, strip: bool) -> Self {
        self.strip_context = strip;
        self
    }
}

impl std::fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportOptions")
            .field("compact_locale", &self.compact_locale)
            .field("no_references", &self.no_references)
            .field("strip_context", &self.strip_context)
            .field("has_frame", &self.frame.is_some())
            .finish()
    }
}

/// Selects edges to remove (or check) by the identity of the "other"
/// endpoint, matching either an exact IRI or a caller-supplied predicate.
#[derive(Clone, Copy)]
pub enum VertexFilter<'a> {
    /// Matches a vertex whose IRI equals this one exactly (compact or
    /// expanded — both forms are accepted).
    Iri(&'a str),
    /// Matches a vertex the predicate accepts.
    Predicate(&'a dyn Fn(Vertex<'_>) -> bool),
}
