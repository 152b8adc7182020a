//! Named JSON-LD context documents and context resolution.
//!
//! This is the Context store (C2): a registry of `@context` documents the
//! caller has pre-loaded, plus the resolution policy used by
//! [`crate::store::GraphStore::get_context`] and by the document loader
//! passed down to the injected [`crate::processor::JsonLdProcessor`].

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{GraphError, Result, ResultExt};
use crate::remote::LoadRemoteDocument;

/// A registry of named JSON-LD context documents.
///
/// Keys are stored lower-cased so lookups and duplicate detection are
/// case-insensitive, matching the `url (lower-cased) -> context-JSON`
/// mapping described in the source design.
#[derive(Debug, Default, Clone)]
pub struct ContextStore {
    contexts: IndexMap<String, Value>,
}

impl ContextStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a context document under `url`.
    ///
    /// Fails with [`GraphError::DuplicateContext`] if a (case-insensitive)
    /// match is already registered.
    pub fn add_context(&mut self, url: &str, document: Value) -> Result<()> {
        if url.is_empty() {
            return Err(GraphError::invalid_argument("context url must not be empty"));
        }
        let key = url.to_lowercase();
        if self.contexts.contains_key(&key) {
            return Err(GraphError::DuplicateContext(url.to_string()));
        }
        self.contexts.insert(key, document);
        log::debug!("registered context document for {url:?}");
        Ok(())
    }

    /// Returns the context registered at `url`, if any (case-insensitive).
    pub fn lookup(&self, url: &str) -> Option<&Value> {
        self.contexts.get(&url.to_lowercase())
    }

    /// Resolves `url` to a context document.
    ///
    /// Resolution order: (1) the registry, (2) when `remote_contexts_enabled`
    /// is set, the injected remote loader, (3) otherwise
    /// [`GraphError::ContextNotFound`].
    pub async fn get_context<L: LoadRemoteDocument>(
        &self,
        url: &str,
        remote_contexts_enabled: bool,
        loader: &L,
    ) -> Result<Value> {
        if let Some(doc) = self.lookup(url) {
            log::trace!("resolved context {url:?} from the local registry");
            return Ok(doc.clone());
        }
        if remote_contexts_enabled {
            log::debug!("falling back to the remote loader for context {url:?}");
            return loader
                .load(url)
                .await
                .context(format!("remote loader failed to resolve context {url:?}"))
                .map(|remote| remote.into_document());
        }
        log::warn!("context {url:?} is not registered and remote contexts are disabled");
        Err(GraphError::ContextNotFound(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteDocument;
    use async_trait::async_trait;
    use serde_json::json;

    struct FakeLoader;

    #[async_trait]
    impl LoadRemoteDocument for FakeLoader {
        type Error = std::convert::Infallible;

        async fn load(&self, iri: &str) -> std::result::Result<RemoteDocument, Self::Error> {
            Ok(RemoteDocument::new(iri, json!({"@context": {}})))
        }
    }

    struct RefusingLoader;

    #[async_trait]
    impl LoadRemoteDocument for RefusingLoader {
        type Error = anyhow::Error;

        async fn load(&self, iri: &str) -> std::result::Result<RemoteDocument, Self::Error> {
            Err(anyhow::anyhow!("refused to load {iri}"))
        }
    }

    #[test]
    fn add_context_rejects_case_insensitive_duplicates() {
        let mut store = ContextStore::new();
        store
            .add_context("http://example.org/hr", json!({}))
            .unwrap();
        assert!(matches!(
            store.add_context("HTTP://EXAMPLE.ORG/HR", json!({})),
            Err(GraphError::DuplicateContext(_))
        ));
    }

    #[tokio::test]
    async fn get_context_prefers_the_registry() {
        let mut store = ContextStore::new();
        store
            .add_context("http://example.org/hr", json!({"@vocab": "x"}))
            .unwrap();
        let resolved = store
            .get_context("http://example.org/hr", true, &FakeLoader)
            .await
            .unwrap();
        assert_eq!(resolved, json!({"@vocab": "x"}));
    }

    #[tokio::test]
    async fn get_context_falls_back_to_remote_loader() {
        let store = ContextStore::new();
        let resolved = store
            .get_context("http://example.org/remote", true, &FakeLoader)
            .await
            .unwrap();
        assert_eq!(resolved, json!({"@context": {}}));
    }

    #[tokio::test]
    async fn get_context_fails_when_remote_contexts_disabled() {
        let store = ContextStore::new();
        let err = store
            .get_context("http://example.org/remote", false, &FakeLoader)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::ContextNotFound(_)));
    }

    #[tokio::test]
    async fn get_context_wraps_loader_failure() {
        let store = ContextStore::new();
        let err = store
            .get_context("http://example.org/remote", true, &RefusingLoader)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::DocumentParseError(_)));
    }
}
