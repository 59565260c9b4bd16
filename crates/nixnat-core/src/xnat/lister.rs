//! Listing and fetching against the remote hierarchy.

use super::node::{with_json_format, NodeRef};
use super::records::{Record, RemoteFileEntry, ResourceEntry, ScanDescriptor};
use crate::error::{NixnatError, Result};
use crate::network::{Auth, Transport};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Representation requested from [`Lister::fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFormat {
    Raw,
    Json,
}

/// Body returned by [`Lister::fetch`].
#[derive(Debug, Clone)]
pub enum Fetched {
    Bytes(Bytes),
    Json(Value),
}

/// Issues listing queries and unwraps the `ResultSet.Result` envelope.
#[derive(Clone)]
pub struct Lister {
    transport: Arc<dyn Transport>,
}

impl Lister {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// GET `uri` as JSON and return its result rows.
    ///
    /// A response without the nested result array is an error, not an
    /// empty listing.
    pub async fn list(&self, uri: &str, auth: &Auth) -> Result<Vec<Record>> {
        let uri = with_json_format(uri);
        let body = self.transport.get(&uri, auth).await?;
        let rows = parse_result_set(&uri, &body)?;
        debug!("Listed {} rows from {}", rows.len(), uri);
        Ok(rows)
    }

    /// GET `uri` and return the body raw or decoded as JSON.
    pub async fn fetch(&self, uri: &str, auth: &Auth, format: FetchFormat) -> Result<Fetched> {
        match format {
            FetchFormat::Raw => Ok(Fetched::Bytes(self.transport.get(uri, auth).await?)),
            FetchFormat::Json => {
                let uri = with_json_format(uri);
                let body = self.transport.get(&uri, auth).await?;
                let value = serde_json::from_slice(&body).map_err(|e| {
                    NixnatError::transport(&uri, format!("Response is not JSON: {}", e))
                })?;
                Ok(Fetched::Json(value))
            }
        }
    }

    pub async fn subjects(&self, subjects_url: &str, auth: &Auth) -> Result<Vec<Record>> {
        self.list(subjects_url, auth).await
    }

    /// Experiments of a subject, optionally restricted to one XSI type.
    pub async fn experiments(
        &self,
        subject: &NodeRef,
        xsi_type: Option<&str>,
        auth: &Auth,
    ) -> Result<Vec<Record>> {
        let uri = match xsi_type {
            Some(xsi) => format!(
                "{}?xsiType={}",
                subject.experiments_uri(),
                urlencoding::encode(xsi)
            ),
            None => subject.experiments_uri(),
        };
        self.list(&uri, auth).await
    }

    pub async fn scans(&self, experiment: &NodeRef, auth: &Auth) -> Result<Vec<ScanDescriptor>> {
        let rows = self.list(&experiment.scans_uri(), auth).await?;
        Ok(rows.iter().map(ScanDescriptor::from_record).collect())
    }

    pub async fn resources(&self, node: &NodeRef, auth: &Auth) -> Result<Vec<ResourceEntry>> {
        let rows = self.list(&node.resources_uri(), auth).await?;
        Ok(rows.iter().map(ResourceEntry::from_record).collect())
    }

    /// Files of a resource node. Rows that cannot be read as file entries
    /// are skipped with a warning.
    pub async fn files(&self, resource: &NodeRef, auth: &Auth) -> Result<Vec<RemoteFileEntry>> {
        let uri = resource.files_uri();
        let rows = self.list(&uri, auth).await?;
        let mut files = Vec::with_capacity(rows.len());
        for row in &rows {
            match RemoteFileEntry::from_record(row) {
                Ok(entry) => files.push(entry),
                Err(e) => warn!("Skipping unreadable file row from {}: {}", uri, e),
            }
        }
        Ok(files)
    }
}

/// Unwrap `{ResultSet: {Result: [...]}}` into rows.
pub fn parse_result_set(uri: &str, body: &[u8]) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| NixnatError::transport(uri, format!("Response is not JSON: {}", e)))?;

    let rows = value
        .get("ResultSet")
        .and_then(|rs| rs.get("Result"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            NixnatError::transport(uri, "Response has no ResultSet.Result array")
        })?;

    rows.iter()
        .map(|row| {
            row.as_object().cloned().ok_or_else(|| {
                NixnatError::transport(uri, "ResultSet.Result contains a non-object row")
            })
        })
        .collect()
}
