//! Document-loader contract.
//!
//! The graph engine never fetches anything itself — remote context
//! resolution is delegated to a caller-supplied loader implementing
//! [`LoadRemoteDocument`]. The same loader is threaded through to the
//! injected [`crate::processor::JsonLdProcessor`] so that `expand`,
//! `compact`, and `frame` resolve remote `@context` URLs consistently.

use async_trait::async_trait;
use serde_json::Value;

/// A type that can resolve a URL to a JSON-LD document.
///
/// NOTE: this trait uses the `async_trait` crate to make the trait method
/// an `async fn`. Specify `#[async_trait]` on the `impl` block if you
/// implement this trait for your own loader type. `async_trait` is
/// re-exported by this crate, so you can write
/// `use jsonld_graph::async_trait::async_trait`.
#[async_trait]
pub trait LoadRemoteDocument: Send + Sync {
    /// Error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads the document at `iri`.
    async fn load(&self, iri: &str) -> Result<RemoteDocument, Self::Error>;
}

/// A document returned by a [`LoadRemoteDocument`] implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    /// URL of the `Link: rel=http://www.w3.org/ns/json-ld#context` header,
    /// if the transport supplied one.
    context_url: Option<String>,
    /// The final URL of the document, after any redirects.
    document_url: String,
    /// The parsed document.
    document: Value,
}

impl RemoteDocument {
    /// Builds a new `RemoteDocument`.
    pub fn new(document_url: impl Into<String>, document: Value) -> Self {
        Self {
            context_url: None,
            document_url: document_url.into(),
            document,
        }
    }

    /// Sets the `context_url`.
    pub fn with_context_url(mut self, context_url: impl Into<String>) -> Self {
        self.context_url = Some(context_url.into());
        self
    }

    /// Returns the context URL, if any.
    pub fn context_url(&self) -> Option<&str> {
        self.context_url.as_deref()
    }

    /// Returns the final document URL.
    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    /// Returns a reference to the document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Returns the document with ownership.
    pub fn into_document(self) -> Value {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_context_url_to_none() {
        let doc = RemoteDocument::new("http://example.org/ctx", Value::Null);
        assert_eq!(doc.document_url(), "http://example.org/ctx");
        assert!(doc.context_url().is_none());
    }

    #[test]
    fn with_context_url_sets_it() {
        let doc = RemoteDocument::new("http://example.org/ctx", Value::Null)
            .with_context_url("http://example.org/ctx.jsonld");
        assert_eq!(doc.context_url(), Some("http://example.org/ctx.jsonld"));
    }
}
