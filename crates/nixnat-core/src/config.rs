//! Centralized configuration for nixnat.
//!
//! Constants for network operations, the XNAT REST surface and the on-disk
//! locations used for credentials and downloads.

use std::time::Duration;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const USER_AGENT: &'static str = "nixnat/0.2";
    pub const DOWNLOAD_TEMP_SUFFIX: &'static str = ".part";
    /// Multipart form field used for uploads.
    pub const UPLOAD_FIELD: &'static str = "fileupload";
    /// Read size for streamed uploads (1 MiB).
    pub const UPLOAD_CHUNK_SIZE: usize = 1024 * 1024;
}

/// XNAT REST surface.
pub struct XnatConfig;

impl XnatConfig {
    pub const SESSION_PATH: &'static str = "/data/JSESSIONID";
    pub const SESSION_COOKIE: &'static str = "JSESSIONID";
    pub const PETMR_SESSION_XSI: &'static str = "xnat:petmrSessionData";
    pub const RESOURCE_CATALOG_XSI: &'static str = "xnat:resourceCatalog";
    pub const DEFAULT_FORMATS: [&'static str; 2] = ["DICOM", "NIFTI"];
}

/// Shared directory and path configurations.
pub struct PathsConfig;

impl PathsConfig {
    pub const CONFIG_DIR_NAME: &'static str = ".niftypet";
    pub const CREDENTIALS_FILENAME: &'static str = "xnat.json";
    pub const DOWNLOADS_DIR_NAME: &'static str = "xnat_scans";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_are_reasonable() {
        assert!(NetworkConfig::REQUEST_TIMEOUT > Duration::ZERO);
        assert!(NetworkConfig::CONNECT_TIMEOUT <= NetworkConfig::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_session_path_is_rooted() {
        assert!(XnatConfig::SESSION_PATH.starts_with("/data/"));
        assert!(XnatConfig::SESSION_PATH.ends_with(XnatConfig::SESSION_COOKIE));
    }
}
