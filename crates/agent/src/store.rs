//! Object-store and knowledge-index collaborator seams.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object `{0}` was not found")]
    NotFound(String),
    #[error("object store backend failure: {0}")]
    Backend(String),
}

/// `get blob by key` against whatever bucket-like backend is configured.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<String, ObjectStoreError>;
}

/// Filesystem-backed store resolving keys under a fixed root directory.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        let relative = Path::new(key);
        let escapes_root = relative.components().any(|component| {
            matches!(component, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if key.is_empty() || escapes_root {
            return Err(ObjectStoreError::NotFound(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get(&self, key: &str) -> Result<String, ObjectStoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(ObjectStoreError::NotFound(key.to_string()))
            }
            Err(error) => Err(ObjectStoreError::Backend(error.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("knowledge index backend failure: {0}")]
    Backend(String),
}

/// One ranked passage returned by the search collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    pub source: String,
    pub excerpt: String,
}

/// `query(text) -> ranked results` against the managed search index. Used to
/// enrich generic-task prompts with retrieved context.
#[async_trait]
pub trait KnowledgeIndex: Send + Sync {
    async fn query(&self, text: &str) -> Result<Vec<Passage>, IndexError>;
}

/// Default index for deployments without a search collaborator: always
/// returns no context, which the prompt builder renders as plain
/// passthrough.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopKnowledgeIndex;

#[async_trait]
impl KnowledgeIndex for NoopKnowledgeIndex {
    async fn query(&self, _text: &str) -> Result<Vec<Passage>, IndexError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        KnowledgeIndex, LocalObjectStore, NoopKnowledgeIndex, ObjectStore, ObjectStoreError,
    };

    #[tokio::test]
    async fn local_store_reads_object_under_root() {
        let dir = std::env::temp_dir().join(format!("salesdesk-store-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.expect("create temp root");
        tokio::fs::write(dir.join("q3-sales.json"), r#"{"revenue": 120}"#)
            .await
            .expect("write fixture");

        let store = LocalObjectStore::new(&dir);
        let content = store.get("q3-sales.json").await.expect("object should exist");
        assert!(content.contains("revenue"));

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn missing_object_is_typed_not_found() {
        let store = LocalObjectStore::new(std::env::temp_dir());
        let result = store.get("does-not-exist-anywhere.json").await;
        assert!(matches!(result, Err(ObjectStoreError::NotFound(ref key))
            if key == "does-not-exist-anywhere.json"));
    }

    #[tokio::test]
    async fn parent_traversal_keys_are_rejected() {
        let store = LocalObjectStore::new("/srv/salesdesk/objects");
        let result = store.get("../../etc/passwd").await;
        assert!(matches!(result, Err(ObjectStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn noop_index_returns_no_passages() {
        let passages = NoopKnowledgeIndex.query("quarterly sales").await.expect("query");
        assert!(passages.is_empty());
    }
}
