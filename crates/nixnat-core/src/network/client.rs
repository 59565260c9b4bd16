//! HTTP transport backed by reqwest.
//!
//! Provides:
//! - Cookie or basic authentication per request
//! - Status checking (any non-2xx becomes a transport error)
//! - Streamed downloads through a `.part` temp file renamed into place
//! - Multipart file upload streamed from disk

use super::auth::Auth;
use super::transport::Transport;
use crate::config::NetworkConfig;
use crate::{NixnatError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use reqwest::{header, redirect, Client, RequestBuilder, Response};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Runtime options for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Total timeout for listing and session requests.
    pub timeout: Duration,
    /// Connect timeout; transfers use only this, so large files are not cut off.
    pub connect_timeout: Duration,
    /// Skip TLS certificate verification (self-signed archive servers).
    pub accept_invalid_certs: bool,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: NetworkConfig::REQUEST_TIMEOUT,
            connect_timeout: NetworkConfig::CONNECT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

/// reqwest implementation of [`Transport`].
pub struct HttpTransport {
    /// Client for API requests (has total timeout)
    client: Client,
    /// Client for downloads (connect timeout only)
    download_client: Client,
    /// Client for uploads (connect timeout only)
    upload_client: Client,
}

impl HttpTransport {
    /// Create a transport with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for archive requests");
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| NixnatError::config(format!("Failed to create HTTP client: {}", e)))?;

        let download_client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| {
                NixnatError::config(format!("Failed to create download HTTP client: {}", e))
            })?;

        let upload_client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| {
                NixnatError::config(format!("Failed to create upload HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            download_client,
            upload_client,
        })
    }

    fn authorize(request: RequestBuilder, auth: &Auth) -> RequestBuilder {
        match auth {
            Auth::Cookie(cookie) => request.header(header::COOKIE, cookie.as_str()),
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }

    async fn send(request: RequestBuilder, method: &str, uri: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| NixnatError::Transport {
            uri: uri.to_string(),
            message: format!("{} failed: {}", method, e),
            status: e.status().map(|s| s.as_u16()),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NixnatError::Transport {
                uri: uri.to_string(),
                message: format!("{} returned status {}", method, status),
                status: Some(status.as_u16()),
            });
        }

        debug!("{} {} -> {}", method, uri, status);
        Ok(response)
    }

    async fn stream_to(response: Response, uri: &str, temp_path: &Path) -> Result<u64> {
        let mut file = tokio::fs::File::create(temp_path)
            .await
            .map_err(|e| NixnatError::io_with_path(e, temp_path))?;

        let mut bytes_written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                NixnatError::transport(uri, format!("Error reading download stream: {}", e))
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|e| NixnatError::io_with_path(e, temp_path))?;
            bytes_written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| NixnatError::io_with_path(e, temp_path))?;
        Ok(bytes_written)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, uri: &str, auth: &Auth) -> Result<Bytes> {
        let request = Self::authorize(self.client.get(uri), auth);
        let response = Self::send(request, "GET", uri).await?;
        response
            .bytes()
            .await
            .map_err(|e| NixnatError::transport(uri, format!("Failed to read body: {}", e)))
    }

    async fn get_to_file(&self, uri: &str, auth: &Auth, path: &Path) -> Result<u64> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| NixnatError::io_with_path(e, parent))?;
        }

        let request = Self::authorize(self.download_client.get(uri), auth);
        let response = Self::send(request, "GET", uri).await?;

        let temp_path = PathBuf::from(format!(
            "{}{}",
            path.display(),
            NetworkConfig::DOWNLOAD_TEMP_SUFFIX
        ));

        match Self::stream_to(response, uri, &temp_path).await {
            Ok(bytes) => {
                tokio::fs::rename(&temp_path, path).await.map_err(|e| {
                    let _ = std::fs::remove_file(&temp_path);
                    NixnatError::io_with_path(e, path)
                })?;
                info!("Downloaded {} bytes to {}", bytes, path.display());
                Ok(bytes)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp_path).await;
                Err(e)
            }
        }
    }

    async fn post(&self, uri: &str, body: &str, auth: &Auth) -> Result<String> {
        let request = Self::authorize(self.client.post(uri), auth).body(body.to_string());
        let response = Self::send(request, "POST", uri).await?;
        response
            .text()
            .await
            .map_err(|e| NixnatError::transport(uri, format!("Failed to read body: {}", e)))
    }

    async fn put(&self, uri: &str, auth: &Auth) -> Result<()> {
        let request = Self::authorize(self.client.put(uri), auth);
        Self::send(request, "PUT", uri).await?;
        Ok(())
    }

    async fn delete(&self, uri: &str, auth: &Auth) -> Result<()> {
        let request = Self::authorize(self.client.delete(uri), auth);
        Self::send(request, "DELETE", uri).await?;
        Ok(())
    }

    async fn upload_file(&self, uri: &str, auth: &Auth, path: &Path) -> Result<()> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| NixnatError::io_with_path(e, path))?;
        let file_size = file
            .metadata()
            .await
            .map_err(|e| NixnatError::io_with_path(e, path))?
            .len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        // Read in chunks so the whole file is never held in memory.
        let file_stream = stream::unfold(file, |mut file| async move {
            let mut buf = vec![0u8; NetworkConfig::UPLOAD_CHUNK_SIZE];
            match file.read(&mut buf).await {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    Some((Ok::<_, std::io::Error>(Bytes::from(buf)), file))
                }
                Err(e) => Some((Err(e), file)),
            }
        });

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(file_stream),
            file_size,
        )
        .file_name(file_name);
        let form = reqwest::multipart::Form::new().part(NetworkConfig::UPLOAD_FIELD, part);

        let request = Self::authorize(self.upload_client.post(uri), auth).multipart(form);
        Self::send(request, "POST", uri).await?;
        info!("Uploaded {} ({} bytes) to {}", path.display(), file_size, uri);
        Ok(())
    }
}
