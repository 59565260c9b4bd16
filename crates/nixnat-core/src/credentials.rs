//! XNAT credential record and its on-disk store.
//!
//! The record is written once by the interactive setup and read back every
//! time a session is established. On Unix the file is owner read/write only.

use crate::config::PathsConfig;
use crate::error::{NixnatError, Result};
use crate::network::Auth;
use crate::platform::{config_dir, set_private};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Connection details for one XNAT project.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "prj")]
    pub project: String,
    /// Server base URL without trailing slash.
    #[serde(rename = "url")]
    pub server_url: String,
    /// `username:password`.
    #[serde(rename = "usrpwd")]
    pub userpass: String,
    /// `<url>/data/projects/<project>/subjects`.
    #[serde(rename = "sbj")]
    pub subjects_url: String,
    /// Preferred download root.
    #[serde(rename = "opth", default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("project", &self.project)
            .field("server_url", &self.server_url)
            .field("userpass", &"<redacted>")
            .field("subjects_url", &self.subjects_url)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Credentials {
    pub fn new(project: &str, server_url: &str, username: &str, password: &str) -> Self {
        let project = project.trim().to_string();
        let server_url = server_url
            .replace(['\'', '"'], "")
            .trim()
            .trim_end_matches('/')
            .to_string();
        let subjects_url = format!("{}/data/projects/{}/subjects", server_url, project);

        Self {
            project,
            server_url,
            userpass: format!("{}:{}", username.trim(), password),
            subjects_url,
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Basic credentials for requests that cannot use a cookie.
    pub fn basic_auth(&self) -> Result<Auth> {
        if self.userpass.trim().is_empty() {
            return Err(NixnatError::config(format!(
                "No username:password configured for {}",
                self.server_url
            )));
        }
        Ok(Auth::from_userpass(&self.userpass))
    }

    /// Absolute URL for a server-relative path such as a file `URI`.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.server_url, path)
        } else {
            format!("{}/{}", self.server_url, path)
        }
    }
}

/// Choose request authentication: a non-empty cookie first, then the stored
/// `user:pass`. Fails without touching the network when neither is present.
pub fn resolve_auth(cookie: Option<&str>, credentials: &Credentials) -> Result<Auth> {
    match cookie.map(str::trim).filter(|c| !c.is_empty()) {
        Some(cookie) => Ok(Auth::Cookie(cookie.to_string())),
        None => credentials.basic_auth().map_err(|_| {
            NixnatError::config("Session ID or username:password are not given")
        }),
    }
}

/// JSON file holding one [`Credentials`] record.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at `<dir>/xnat.json`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_file_name(dir, PathsConfig::CREDENTIALS_FILENAME)
    }

    pub fn with_file_name(dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self {
            path: dir.as_ref().join(file_name),
        }
    }

    /// Store at `~/.niftypet/xnat.json`.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(config_dir()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the record and restrict it to the owner.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| NixnatError::io_with_path(e, parent))?;
        }

        let contents = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, contents)
            .map_err(|e| NixnatError::io_with_path(e, &self.path))?;
        set_private(&self.path)?;

        info!("Saved XNAT credentials to {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Credentials> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| NixnatError::io_with_path(e, &self.path))?;
        let credentials: Credentials = serde_json::from_str(&contents)?;
        debug!(
            "Loaded credentials for project {} from {}",
            credentials.project,
            self.path.display()
        );
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Credentials {
        Credentials::new(" AMYPAD ", "'https://xnat.example.org/' ", "alice", "pw")
    }

    #[test]
    fn test_new_derives_subjects_url() {
        let creds = sample();
        assert_eq!(creds.project, "AMYPAD");
        assert_eq!(creds.server_url, "https://xnat.example.org");
        assert_eq!(creds.userpass, "alice:pw");
        assert_eq!(
            creds.subjects_url,
            "https://xnat.example.org/data/projects/AMYPAD/subjects"
        );
    }

    #[test]
    fn test_serializes_with_legacy_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["prj"], "AMYPAD");
        assert_eq!(json["url"], "https://xnat.example.org");
        assert_eq!(json["usrpwd"], "alice:pw");
        assert!(json["sbj"].as_str().unwrap().ends_with("/subjects"));
        assert!(json.get("opth").is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp.path().join("nested"));
        assert!(!store.exists());

        let creds = sample().with_output_dir("/data/xnat");
        store.save(&creds).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), creds);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp.path());
        store.save(&sample()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "Credential file should have 0600 permissions");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp.path());
        assert!(matches!(store.load(), Err(NixnatError::Io { .. })));
    }

    #[test]
    fn test_resolve_auth_prefers_cookie() {
        let auth = resolve_auth(Some("JSESSIONID=XYZ"), &sample()).unwrap();
        assert_eq!(auth, Auth::Cookie("JSESSIONID=XYZ".into()));

        let auth = resolve_auth(Some("  "), &sample()).unwrap();
        assert!(!auth.is_cookie());
    }

    #[test]
    fn test_resolve_auth_without_anything_is_config_error() {
        let mut creds = sample();
        creds.userpass = String::new();
        assert!(matches!(
            resolve_auth(None, &creds),
            Err(NixnatError::Config { .. })
        ));
    }

    #[test]
    fn test_absolute_url() {
        let creds = sample();
        assert_eq!(
            creds.absolute_url("/data/experiments/E1/scans/1/resources/DICOM/files/a.dcm"),
            "https://xnat.example.org/data/experiments/E1/scans/1/resources/DICOM/files/a.dcm"
        );
        assert_eq!(
            creds.absolute_url("https://other.example.org/x"),
            "https://other.example.org/x"
        );
    }
}
