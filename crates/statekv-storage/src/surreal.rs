//! Persistent engine backed by `SurrealKV`.
//!
//! Each logical store gets its own `SurrealKV` tree at
//! `{root}/{identifier}`. `SurrealKV` has no at-rest encryption, so the
//! factory rejects configurations that carry an encryption key instead of
//! silently storing plaintext.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::EngineOptions;
use crate::engine::{EngineFactory, StorageEngine};
use crate::error::{StorageError, StorageResult};

fn map_kv_err(e: &surrealkv::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

/// Prefix byte on every stored key. `SurrealKV` rejects empty keys, and
/// `""` is a valid item name.
const KEY_PREFIX: u8 = b'i';

/// Encode an item name as a `SurrealKV` key: `KEY_PREFIX` then the UTF-8 bytes.
fn storage_key(key: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(key.len().saturating_add(1));
    buf.push(KEY_PREFIX);
    buf.extend_from_slice(key.as_bytes());
    buf
}

/// Validate that an identifier can be used as a single directory name.
fn validate_identifier(identifier: &str) -> StorageResult<()> {
    if identifier.is_empty() {
        return Err(StorageError::InvalidConfig(
            "identifier must not be empty".into(),
        ));
    }
    if identifier == "." || identifier == ".." {
        return Err(StorageError::InvalidConfig(format!(
            "identifier '{identifier}' is not a valid store name"
        )));
    }
    if identifier.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidConfig(
            "identifier must not contain path separators or null bytes".into(),
        ));
    }
    Ok(())
}

/// One `SurrealKV` tree holding a single logical store.
pub struct SurrealKvEngine {
    tree: surrealkv::Tree,
}

impl std::fmt::Debug for SurrealKvEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealKvEngine").finish_non_exhaustive()
    }
}

impl SurrealKvEngine {
    /// Open a persistent store at the given directory path.
    ///
    /// Creates the directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the store cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let tree = surrealkv::TreeBuilder::new()
            .with_path(path.as_ref().to_path_buf())
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { tree })
    }

    /// Close the store, flushing any pending writes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the flush fails.
    pub async fn close(&self) -> StorageResult<()> {
        self.tree.close().await.map_err(|ref e| map_kv_err(e))
    }
}

#[async_trait]
impl StorageEngine for SurrealKvEngine {
    async fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(|ref e| map_kv_err(e))?;
        let raw = tx.get(&storage_key(key)).map_err(|ref e| map_kv_err(e))?;
        raw.map(|bytes| {
            String::from_utf8(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
        })
        .transpose()
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut tx = self.tree.begin().map_err(|ref e| map_kv_err(e))?;
        tx.set(&storage_key(key), value.as_bytes())
            .map_err(|ref e| map_kv_err(e))?;
        tx.commit().await.map_err(|ref e| map_kv_err(e))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let ck = storage_key(key);
        let mut tx = self.tree.begin().map_err(|ref e| map_kv_err(e))?;
        let existed = tx
            .get(&ck)
            .map_err(|ref e| map_kv_err(e))?
            .is_some();
        if existed {
            tx.delete(&ck).map_err(|ref e| map_kv_err(e))?;
            tx.commit().await.map_err(|ref e| map_kv_err(e))?;
        }
        Ok(())
    }
}

/// Opens one [`SurrealKvEngine`] per identifier under a root directory.
#[derive(Debug, Clone)]
pub struct SurrealKvEngineFactory {
    root: PathBuf,
}

impl SurrealKvEngineFactory {
    /// Create a factory storing every logical store under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory a given identifier is stored in.
    #[must_use]
    pub fn store_path(&self, identifier: &str) -> PathBuf {
        self.root.join(identifier)
    }
}

#[async_trait]
impl EngineFactory for SurrealKvEngineFactory {
    async fn create(&self, options: &EngineOptions) -> StorageResult<Arc<dyn StorageEngine>> {
        validate_identifier(&options.identifier)?;
        if options.encryption_key.is_some() {
            return Err(StorageError::InvalidConfig(
                "the SurrealKV engine does not support encryption keys".into(),
            ));
        }

        let path = self.store_path(&options.identifier);
        let engine = SurrealKvEngine::open(&path)?;
        info!(identifier = %options.identifier, path = %path.display(), "opened SurrealKV store");
        Ok(Arc::new(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_engine() -> (SurrealKvEngine, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let engine = SurrealKvEngine::open(dir.path()).unwrap();
        (engine, dir)
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("mmkv.default").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("..").is_err());
        assert!(validate_identifier("a/b").is_err());
        assert!(validate_identifier("a\0b").is_err());
    }

    #[tokio::test]
    async fn test_surreal_get_set() {
        let (engine, _dir) = make_engine();
        engine.set("key1", "hello").await.unwrap();
        let val = engine.get_string("key1").await.unwrap();
        assert_eq!(val.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_surreal_get_missing() {
        let (engine, _dir) = make_engine();
        assert!(engine.get_string("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_surreal_overwrite() {
        let (engine, _dir) = make_engine();
        engine.set("k", "v1").await.unwrap();
        engine.set("k", "v2").await.unwrap();
        assert_eq!(engine.get_string("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_surreal_delete() {
        let (engine, _dir) = make_engine();
        engine.delete("never-set").await.unwrap();
        engine.set("k", "v").await.unwrap();
        engine.delete("k").await.unwrap();
        assert!(engine.get_string("k").await.unwrap().is_none());
    }

    #[test]
    fn test_storage_key_never_empty() {
        assert_eq!(storage_key(""), vec![KEY_PREFIX]);
        assert_eq!(storage_key("ab"), vec![KEY_PREFIX, b'a', b'b']);
    }

    #[tokio::test]
    async fn test_surreal_empty_key() {
        let (engine, _dir) = make_engine();
        assert!(engine.get_string("").await.unwrap().is_none());
        engine.delete("").await.unwrap();

        engine.set("", "root").await.unwrap();
        assert_eq!(engine.get_string("").await.unwrap().as_deref(), Some("root"));
        assert!(engine.get_string("i").await.unwrap().is_none());

        engine.delete("").await.unwrap();
        assert!(engine.get_string("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_surreal_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let engine = SurrealKvEngine::open(dir.path()).unwrap();
            engine.set("", "empty-name").await.unwrap();
            engine.set("ключ", "значение").await.unwrap();
            engine.close().await.unwrap();
        }
        let engine = SurrealKvEngine::open(dir.path()).unwrap();
        assert_eq!(
            engine.get_string("").await.unwrap().as_deref(),
            Some("empty-name")
        );
        assert_eq!(
            engine.get_string("ключ").await.unwrap().as_deref(),
            Some("значение")
        );
    }

    #[tokio::test]
    async fn test_factory_rejects_encryption_key() {
        let dir = tempfile::tempdir().unwrap();
        let factory = SurrealKvEngineFactory::new(dir.path());
        let opts = EngineOptions {
            identifier: "vault".into(),
            encryption_key: Some("hunter2".into()),
        };
        let result = factory.create(&opts).await;
        assert!(matches!(result, Err(StorageError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_factory_one_directory_per_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let factory = SurrealKvEngineFactory::new(dir.path());
        let a = factory
            .create(&EngineOptions {
                identifier: "store-a".into(),
                encryption_key: None,
            })
            .await
            .unwrap();
        let b = factory
            .create(&EngineOptions {
                identifier: "store-b".into(),
                encryption_key: None,
            })
            .await
            .unwrap();

        a.set("key", "valueA").await.unwrap();
        assert!(b.get_string("key").await.unwrap().is_none());
        assert!(factory.store_path("store-a").exists());
    }
}
