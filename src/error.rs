//! Graph engine errors.

use std::fmt;

/// Graph engine result.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Error kind raised by the graph engine.
///
/// Every public operation that can fail reports one of these kinds. A kind
/// carries its own fields (the offending IRI, label, and so on) instead of
/// routing through a separate error-code enum, since unlike a JSON-LD
/// processor the graph engine's errors are all local to the store and
/// don't need a stable numeric/string error-code space shared with a spec.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A required argument was null, empty, or otherwise ill-formed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An IRI failed syntactic validation.
    #[error("invalid IRI: {0}")]
    InvalidIri(String),

    /// A prefix failed the `/^[A-Za-z][A-Za-z0-9]*$/` syntax rule.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),

    /// No vertex exists for the given IRI.
    #[error("vertex not found: {0}")]
    VertexNotFound(String),

    /// A vertex already exists for the given IRI.
    #[error("duplicate vertex: {0}")]
    DuplicateVertex(String),

    /// The triple `(label, from, to)` already exists.
    #[error("duplicate edge: {label} {from} -> {to}")]
    DuplicateEdge {
        /// Edge label.
        label: String,
        /// Source vertex IRI.
        from: String,
        /// Target vertex IRI.
        to: String,
    },

    /// An edge would connect a vertex to itself.
    #[error("cyclic edge: {label} {iri} -> {iri}", iri = .iri)]
    CyclicEdge {
        /// Edge label.
        label: String,
        /// The vertex IRI shared by both endpoints.
        iri: String,
    },

    /// A context document was already registered for this URL.
    #[error("duplicate context: {0}")]
    DuplicateContext(String),

    /// No context document is registered for this URL and no remote
    /// loader is configured (or enabled) to resolve it.
    #[error("context not found: {0}")]
    ContextNotFound(String),

    /// A prefix was already bound to a (possibly different) base IRI.
    #[error("duplicate prefix: {0}")]
    DuplicatePrefix(String),

    /// Another prefix is already bound to the same base IRI
    /// (case-insensitively).
    #[error("duplicate prefix IRI: {0}")]
    DuplicatePrefixIri(String),

    /// The injected JSON-LD processor or document loader failed.
    #[error("document parse error")]
    DocumentParseError(#[source] anyhow::Error),

    /// `unique` load option was violated: the same entity identity was
    /// defined more than once in a single load call.
    #[error("duplicate entity definition: {0}")]
    DuplicateEntityDefinition(String),

    /// Blank-IRI normalization merged two typed vertices with no
    /// `type_conflict_resolver` configured to reconcile them.
    #[error("blank id normalization error: {0}")]
    BlankIdNormalizationError(String),
}

impl GraphError {
    /// Builds an [`GraphError::InvalidArgument`] for a null/empty parameter.
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        GraphError::InvalidArgument(message.into())
    }
}

/// Extension trait for wrapping a fallible external call with additional
/// context, mirroring the causal-chain style used for document parse
/// errors throughout this crate.
pub(crate) trait ResultExt<T> {
    /// Wraps the error value, if any, with additional context.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| GraphError::DocumentParseError(err.into().context(context)))
    }
}
