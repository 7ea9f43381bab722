//! Object storage for uploaded documents.
//!
//! Only keys and signed URLs leave this module; document rows never carry a
//! directly fetchable location.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{CoreResult, StorageError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> CoreResult<StoredObject>;

    async fn get(&self, key: &str) -> CoreResult<Vec<u8>>;

    async fn delete(&self, key: &str) -> CoreResult<()>;

    /// Time-limited URL for a stored key.
    fn signed_url(&self, key: &str, ttl: Duration) -> SignedUrl;

    /// Check a signature produced by [`ObjectStore::signed_url`].
    fn verify(&self, key: &str, expires: i64, signature: &str) -> CoreResult<()>;
}

/// Hex SHA-256 over `secret:key:expires`.
pub fn sign(secret: &str, key: &str, expires: i64) -> String {
    format!(
        "{:x}",
        Sha256::digest(format!("{}:{}:{}", secret, key, expires).as_bytes())
    )
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

/// Storage key for a document upload.
pub fn document_key(project_id: Option<i32>, slug: &str) -> String {
    let scope = project_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "shared".to_string());
    format!("documents/{}/{}-{}", scope, uuid::Uuid::new_v4(), slug)
}

/// Filesystem-backed store rooted at a directory.
#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
    secret: String,
}

impl LocalObjectStore {
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            secret: secret.into(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/files/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        _content_type: Option<&str>,
    ) -> CoreResult<StoredObject> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::from)?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(StorageError::from)?;

        Ok(StoredObject {
            key: key.to_string(),
            url: self.object_url(key),
            size: bytes.len() as u64,
        })
    }

    async fn get(&self, key: &str) -> CoreResult<Vec<u8>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()).into())
            }
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }

    async fn delete(&self, key: &str) -> CoreResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }

    fn signed_url(&self, key: &str, ttl: Duration) -> SignedUrl {
        let expires_at = Utc::now() + ttl;
        let expires = expires_at.timestamp();
        SignedUrl {
            url: format!(
                "{}?expires={}&signature={}",
                self.object_url(key),
                expires,
                sign(&self.secret, key, expires)
            ),
            expires_at,
        }
    }

    fn verify(&self, key: &str, expires: i64, signature: &str) -> CoreResult<()> {
        if expires < Utc::now().timestamp()
            || !constant_time_eq(&sign(&self.secret, key, expires), signature)
        {
            return Err(StorageError::InvalidSignature.into());
        }
        Ok(())
    }
}
