//! Platform runtime abstraction
//!
//! The pipeline never touches the filesystem directly. Reading the manager
//! template goes through the `Runtime` trait so hosts can serve it from disk,
//! memory, or a virtual file system.

#[cfg(not(target_family = "wasm"))]
pub mod native;

// Test utilities (available in test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// Platform runtime trait
///
/// # Example
///
/// ```rust,ignore
/// use hotswap_graph::runtime::{Runtime, RuntimeResult};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct MyRuntime;
///
/// #[async_trait]
/// impl Runtime for MyRuntime {
///     async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
///         // Platform-specific implementation
///     }
/// }
/// ```
#[cfg(target_family = "wasm")]
#[async_trait(?Send)]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file's full contents
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;
}

#[cfg(not(target_family = "wasm"))]
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file's full contents
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;
}
