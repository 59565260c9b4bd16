//! Transport seam between the synchronizer and the HTTP stack.
//!
//! Everything above this trait talks to the archive only through these six
//! operations, which keeps the sync and session logic testable against an
//! in-memory implementation.

use super::auth::Auth;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

/// Blocking-style request primitives against the archive server.
///
/// Implementations must return `NixnatError::Transport` for any non-success
/// outcome and must not leave a partially written file at the destination
/// of `get_to_file` when they fail.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `uri` and return the response body.
    async fn get(&self, uri: &str, auth: &Auth) -> Result<Bytes>;

    /// GET `uri` and stream the body into `path`. Returns bytes written.
    async fn get_to_file(&self, uri: &str, auth: &Auth, path: &Path) -> Result<u64>;

    /// POST `body` to `uri` and return the response body as text.
    async fn post(&self, uri: &str, body: &str, auth: &Auth) -> Result<String>;

    async fn put(&self, uri: &str, auth: &Auth) -> Result<()>;

    async fn delete(&self, uri: &str, auth: &Auth) -> Result<()>;

    /// Upload a local file as multipart form data.
    async fn upload_file(&self, uri: &str, auth: &Auth, path: &Path) -> Result<()>;
}
