//! nixnat core - XNAT session handling, scan and resource synchronization,
//! and acquisition classification of DICOM headers.
//!
//! The crate talks to an XNAT server over its REST interface. A session
//! cookie is obtained once from stored credentials and reused for every
//! listing and download. Downloads skip files already present locally with
//! the server-reported size, so repeated syncs are cheap.
//!
//! # Example
//!
//! ```rust,ignore
//! use nixnat_core::{CredentialStore, ScanSyncRequest, XnatApi};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> nixnat_core::Result<()> {
//!     let credentials = CredentialStore::default_location()?.load()?;
//!     let api = XnatApi::connect(credentials).await?;
//!
//!     let request = ScanSyncRequest::new("S01", "XNAT_E00042").formats(["DICOM"]);
//!     let manifest = api.sync_scans(&request).await?;
//!     println!("Fetched {} scans", manifest.scans.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod dicom;
pub mod error;
pub mod network;
pub mod platform;
pub mod session;
pub mod sync;
pub mod xnat;

mod api;

// Re-export commonly used types
pub use credentials::{resolve_auth, CredentialStore, Credentials};
pub use dicom::{
    classify_directory, classify_file, classify_header, Category, Classification, HeaderView,
    ScannerId,
};
pub use error::{NixnatError, Result};
pub use network::{Auth, HttpTransport, HttpTransportConfig, Transport};
pub use session::Session;
pub use sync::{
    FileKind, ResourceManifest, ResourceSynchronizer, ScanFiles, ScanFilter, ScanManifest,
    ScanSyncRequest, SyncWarning,
};
pub use xnat::{ExperimentRef, FetchFormat, Fetched, NodeRef, Record, RemoteFileEntry};

use std::sync::Arc;
use tracing::info;
use xnat::Lister;

/// Entry point for programmatic access to one XNAT project.
///
/// Holds the authenticated session and the transport it was obtained
/// through. Calls are issued one at a time; the session is never refreshed.
pub struct XnatApi {
    transport: Arc<dyn Transport>,
    session: Session,
    lister: Lister,
    synchronizer: ResourceSynchronizer,
}

impl XnatApi {
    /// Build an HTTP transport with default settings and log in.
    pub async fn connect(credentials: Credentials) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
        Self::with_transport(credentials, transport).await
    }

    /// Log in through an arbitrary transport.
    pub async fn with_transport(credentials: Credentials, transport: Arc<dyn Transport>) -> Result<Self> {
        let session = Session::establish(transport.as_ref(), credentials).await?;
        Ok(Self::assemble(transport, session))
    }

    /// Reuse a cookie from an earlier session. No request is made.
    pub fn resume(
        credentials: Credentials,
        transport: Arc<dyn Transport>,
        cookie: impl Into<String>,
    ) -> Result<Self> {
        let session = Session::resume(credentials, cookie)?;
        info!("Resuming XNAT session for project {}", session.credentials().project);
        Ok(Self::assemble(transport, session))
    }

    fn assemble(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self {
            lister: Lister::new(transport.clone()),
            synchronizer: ResourceSynchronizer::new(transport.clone()),
            transport,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `JSESSIONID=<token>`, for handing to another process.
    pub fn cookie(&self) -> &str {
        self.session.cookie()
    }

    pub fn credentials(&self) -> &Credentials {
        self.session.credentials()
    }

    /// The project's subjects collection as a hierarchy node.
    pub fn subjects_node(&self) -> NodeRef {
        NodeRef::subjects(&self.credentials().subjects_url)
    }
}
