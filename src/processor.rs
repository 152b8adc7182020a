//! The external JSON-LD processor contract.
//!
//! The graph engine never expands, compacts, or frames JSON-LD itself —
//! those algorithms are assumed available as an injected implementation of
//! [`JsonLdProcessor`], generic over a [`LoadRemoteDocument`] the same way
//! the document-loader contract in [`crate::remote`] is. This mirrors how
//! upstream JSON-LD processors are themselves parameterized over a loader;
//! here the *whole processor* is the injected collaborator.

use async_trait::async_trait;
use serde_json::Value;

use crate::remote::LoadRemoteDocument;

/// Options accepted by [`JsonLdProcessor::expand`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandOptions<'a> {
    /// Base IRI to resolve relative IRIs against.
    pub base: Option<&'a str>,
    /// An additional context to apply before the document's own
    /// `@context`.
    pub expand_context: Option<&'a Value>,
}

/// Options accepted by [`JsonLdProcessor::compact`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactOptions<'a> {
    /// Base IRI to resolve relative IRIs against.
    pub base: Option<&'a str>,
    /// An additional context to apply before `context`.
    pub expand_context: Option<&'a Value>,
    /// The nodes are already expanded; the processor must not re-expand
    /// them before compacting.
    pub skip_expansion: bool,
}

impl<'a> CompactOptions<'a> {
    /// Options for compacting already-expanded nodes, as used by
    /// [`crate::export`].
    pub fn skip_expansion() -> Self {
        Self {
            skip_expansion: true,
            ..Default::default()
        }
    }
}

/// Options accepted by [`JsonLdProcessor::frame`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameOptions<'a> {
    /// Base IRI to resolve relative IRIs against.
    pub base: Option<&'a str>,
}

/// The three JSON-LD algorithms the graph engine delegates to an external
/// implementation, parameterized over the document loader `L` used to
/// resolve remote `@context` URLs encountered while running them.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-api-20191018/#the-jsonldprocessor-interface>
/// for the algorithms this trait stands in for.
#[async_trait]
pub trait JsonLdProcessor<L: LoadRemoteDocument>: Send + Sync {
    /// Expands `input` into a flat list of node objects.
    async fn expand(
        &self,
        input: &Value,
        options: ExpandOptions<'_>,
        loader: &L,
    ) -> anyhow::Result<Vec<Value>>;

    /// Compacts `nodes` (already expanded) using `context`.
    async fn compact(
        &self,
        nodes: &Value,
        context: &Value,
        options: CompactOptions<'_>,
        loader: &L,
    ) -> anyhow::Result<Value>;

    /// Frames `nodes` (already expanded) using `frame`.
    async fn frame(&self, nodes: &Value, frame: &Value, options: FrameOptions<'_>, loader: &L) -> anyhow::Result<Value>;
}

/// Keywords recognized by the JSON-LD 1.1 syntax.
///
/// See <https://www.w3.org/TR/2019/WD-json-ld11-20191018/#syntax-tokens-and-keywords>.
pub const KEYWORDS_1_1: &[&str] = &[
    "@base",
    "@container",
    "@context",
    "@direction",
    "@graph",
    "@id",
    "@import",
    "@included",
    "@index",
    "@json",
    "@language",
    "@list",
    "@nest",
    "@none",
    "@prefix",
    "@propagate",
    "@protected",
    "@reverse",
    "@set",
    "@type",
    "@value",
    "@version",
    "@vocab",
];

/// Checks if the given string has the form of a JSON-LD keyword.
pub fn is_keyword(s: &str) -> bool {
    KEYWORDS_1_1.contains(&s)
}
