//! # Blob Store
//!
//! Byte-blob persistence with two namespaces: `public` for shareable
//! material and `secret` for key material. The store knows nothing about
//! key formats; containers hand it opaque bytes.
//!
//! ## Namespace contracts
//!
//! - `public`: plain files, default permissions
//! - `secret`: directories created `0o700`, files written `0o600`, loads
//!   land directly in a page-locked [`SecretBuffer`]
//!
//! Blob names are single path components; anything containing a separator
//! or traversal is rejected before touching the filesystem.

use crate::crypto::error::CryptoError;
use crate::crypto::sbuf::SecretBuffer;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Result type alias for blob-store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Blob-store error type
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure, with the offending path
    #[error("I/O failure for {path}: {source}")]
    Io {
        /// Path the operation targeted
        path: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The requested blob does not exist
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// Blob name is not a single, plain path component
    #[error("Invalid blob name: {0:?}")]
    InvalidName(String),

    /// Locked-memory failure while loading a secret blob
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Store namespace: chooses directory, permissions, and load semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Shareable material, plain handling
    Public,
    /// Key material: restrictive permissions, locked loads
    Secret,
}

impl Namespace {
    fn dir_name(self) -> &'static str {
        match self {
            Namespace::Public => "public",
            Namespace::Secret => "secret",
        }
    }
}

/// Filesystem-backed blob store rooted at a caller-chosen directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `root`. Directories are created lazily on
    /// the first write into each namespace.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist `bytes` under `name` in `namespace`.
    ///
    /// Secret-namespace files are created with `0o600` permissions inside a
    /// `0o700` directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidName` for unsafe names and
    /// `StoreError::Io` on filesystem failure.
    pub fn save_bytes(&self, namespace: Namespace, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(namespace, name)?;
        self.ensure_dir(namespace)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        if namespace == Namespace::Secret {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path).map_err(|e| Self::io(&path, e))?;
        file.write_all(bytes).map_err(|e| Self::io(&path, e))?;
        file.sync_all().map_err(|e| Self::io(&path, e))?;

        debug!(namespace = namespace.dir_name(), name, len = bytes.len(), "blob saved");
        Ok(())
    }

    /// Load the blob `name` from `namespace` as plain bytes.
    ///
    /// For secret blobs prefer [`BlobStore::load_secret`], which never lets
    /// the contents touch unlocked memory longer than the read itself.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the blob does not exist.
    pub fn load_bytes(&self, namespace: Namespace, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(namespace, name)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let bytes = fs::read(&path).map_err(|e| Self::io(&path, e))?;
        debug!(namespace = namespace.dir_name(), name, len = bytes.len(), "blob loaded");
        Ok(bytes)
    }

    /// Load a secret blob straight into a page-locked buffer, wiping the
    /// transient read copy.
    ///
    /// # Errors
    ///
    /// As [`BlobStore::load_bytes`], plus `StoreError::Crypto` if the locked
    /// allocation fails.
    pub fn load_secret(&self, name: &str) -> Result<SecretBuffer> {
        let bytes = self.load_bytes(Namespace::Secret, name)?;
        Ok(SecretBuffer::from_vec(bytes)?)
    }

    /// Check whether `name` exists as a regular file in `namespace`.
    pub fn is_file_ok(&self, namespace: Namespace, name: &str) -> bool {
        self.path_for(namespace, name)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Remove the blob `name` from `namespace`.
    ///
    /// Returns `true` if a file was removed, `false` if it did not exist.
    pub fn remove(&self, namespace: Namespace, name: &str) -> Result<bool> {
        let path = self.path_for(namespace, name)?;
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| Self::io(&path, e))?;
        Ok(true)
    }

    fn path_for(&self, namespace: Namespace, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(namespace.dir_name()).join(name))
    }

    fn ensure_dir(&self, namespace: Namespace) -> Result<()> {
        let dir = self.root.join(namespace.dir_name());
        fs::create_dir_all(&dir).map_err(|e| Self::io(&dir, e))?;
        #[cfg(unix)]
        if namespace == Namespace::Secret {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o700);
            fs::set_permissions(&dir, perms).map_err(|e| Self::io(&dir, e))?;
        }
        Ok(())
    }

    fn io(path: &std::path::Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
