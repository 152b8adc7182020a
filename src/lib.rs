//! An in-memory labeled directed graph engine for JSON-LD documents.
//!
//! The engine ingests already-expanded JSON-LD entities (or drives an
//! injected [`JsonLdProcessor`] to expand raw documents first),
//! materializes them as vertices, labeled edges, and per-vertex literal
//! attributes, indexes them for traversal in both directions, and can
//! serialize the graph back out as expanded, compacted, or framed
//! JSON-LD. See [`GraphStore`] for the primary entry point.
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

// Re-exported so callers implementing `LoadRemoteDocument` or
// `JsonLdProcessor` themselves can use the same `async_trait` version.
pub use async_trait;

pub use self::{
    context::ContextStore,
    error::{GraphError, Result},
    graph::{AttributeBag, AttributeValue, Edge, EdgeId, Vertex, VertexId},
    iri::IriRegistry,
    options::{
        AttributeRule, BlankIriResolver, BlankTypeResolver, ExportOptions, GraphObserver, GraphStoreOptions,
        IdentityHook, IdentityValidator, LoadOptions, ParseOptions, TypeConflictResolver, VertexFactory,
        VertexFilter, VertexRule,
    },
    processor::{CompactOptions, ExpandOptions, FrameOptions, JsonLdProcessor},
    remote::{LoadRemoteDocument, RemoteDocument},
    store::{AttributeSnapshot, EdgeSnapshot, GraphSnapshot, GraphStore, VertexSnapshot},
};

pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod export;
pub(crate) mod graph;
pub(crate) mod iri;
pub(crate) mod json;
pub(crate) mod loader;
pub(crate) mod normalize;
pub(crate) mod options;
pub(crate) mod parser;
pub(crate) mod processor;
pub(crate) mod remote;
pub(crate) mod store;
