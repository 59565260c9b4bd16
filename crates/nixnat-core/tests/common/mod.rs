//! In-memory transport shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use nixnat_core::{Auth, Credentials, NixnatError, Result, Transport};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

pub const SERVER: &str = "https://xnat.test";
pub const PROJECT: &str = "PETMR";

pub fn credentials() -> Credentials {
    Credentials::new(PROJECT, SERVER, "alice", "s3cret")
}

pub fn subjects_url() -> String {
    format!("{}/data/projects/{}/subjects", SERVER, PROJECT)
}

/// Wrap rows in the `ResultSet.Result` envelope.
pub fn listing(rows: Value) -> Vec<u8> {
    serde_json::to_vec(&json!({ "ResultSet": { "Result": rows } })).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: &'static str,
    pub uri: String,
}

/// Responses are keyed by URI with the query string removed.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, std::result::Result<Vec<u8>, u16>>>,
    session_body: Mutex<String>,
    session_status: Mutex<Option<u16>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.set_session_body("0123456789ABCDEF");
        fake
    }

    pub fn set_session_body(&self, body: &str) {
        *self.session_body.lock().unwrap() = body.to_string();
    }

    /// Make the session endpoint answer with an HTTP error status.
    pub fn fail_session(&self, status: u16) {
        *self.session_status.lock().unwrap() = Some(status);
    }

    pub fn respond(&self, uri: &str, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(uri.to_string(), Ok(body.into()));
    }

    pub fn fail(&self, uri: &str, status: u16) {
        self.routes.lock().unwrap().insert(uri.to_string(), Err(status));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    fn record(&self, method: &'static str, uri: &str) {
        self.calls.lock().unwrap().push(Call {
            method,
            uri: uri.to_string(),
        });
    }

    fn lookup(&self, uri: &str) -> Result<Vec<u8>> {
        let key = uri.split('?').next().unwrap_or(uri);
        match self.routes.lock().unwrap().get(key) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(NixnatError::Transport {
                uri: uri.to_string(),
                message: format!("HTTP {}", status),
                status: Some(*status),
            }),
            None => Err(NixnatError::Transport {
                uri: uri.to_string(),
                message: "HTTP 404".to_string(),
                status: Some(404),
            }),
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, uri: &str, _auth: &Auth) -> Result<Bytes> {
        self.record("GET", uri);
        self.lookup(uri).map(Bytes::from)
    }

    async fn get_to_file(&self, uri: &str, _auth: &Auth, path: &Path) -> Result<u64> {
        self.record("DOWNLOAD", uri);
        let body = self.lookup(uri)?;
        std::fs::write(path, &body)?;
        Ok(body.len() as u64)
    }

    async fn post(&self, uri: &str, _body: &str, _auth: &Auth) -> Result<String> {
        self.record("POST", uri);
        if let Some(status) = *self.session_status.lock().unwrap() {
            return Err(NixnatError::Transport {
                uri: uri.to_string(),
                message: format!("POST returned status {}", status),
                status: Some(status),
            });
        }
        Ok(self.session_body.lock().unwrap().clone())
    }

    async fn put(&self, uri: &str, _auth: &Auth) -> Result<()> {
        self.record("PUT", uri);
        Ok(())
    }

    async fn delete(&self, uri: &str, _auth: &Auth) -> Result<()> {
        self.record("DELETE", uri);
        Ok(())
    }

    async fn upload_file(&self, uri: &str, _auth: &Auth, path: &Path) -> Result<()> {
        self.record("UPLOAD", uri);
        if !path.exists() {
            return Err(NixnatError::io_with_path(
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing upload"),
                path,
            ));
        }
        Ok(())
    }
}
