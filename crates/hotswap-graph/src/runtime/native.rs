//! Filesystem-backed runtime for native targets.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;

use super::{Runtime, RuntimeError, RuntimeResult};

/// Runtime that reads straight from the local filesystem via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RuntimeError::FileNotFound(path.to_path_buf()),
            _ => RuntimeError::Io(format!("{}: {}", path.display(), e)),
        })
    }
}
