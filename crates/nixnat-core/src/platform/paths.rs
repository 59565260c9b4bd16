//! Platform-specific path utilities.
//!
//! - Credential directory (`~/.niftypet`)
//! - Default download directory for synchronized scans

use crate::config::PathsConfig;
use crate::error::{NixnatError, Result};
use std::path::{Path, PathBuf};

/// Directory holding the persisted credential record.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        NixnatError::config("Could not determine home directory")
    })?;
    Ok(home.join(PathsConfig::CONFIG_DIR_NAME))
}

/// Fallback download directory when neither the caller nor the credential
/// record names one.
///
/// # Platform Behavior
/// - **Linux/macOS**: `~/xnat_scans`
/// - **Windows**: `%LOCALAPPDATA%\xnat_scans`
pub fn default_output_dir() -> Result<PathBuf> {
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        let home = dirs::home_dir().ok_or_else(|| {
            NixnatError::config("Could not determine home directory")
        })?;
        Ok(home.join(PathsConfig::DOWNLOADS_DIR_NAME))
    }

    #[cfg(target_os = "windows")]
    {
        let local = dirs::data_local_dir().ok_or_else(|| {
            NixnatError::config("Could not determine local app data directory")
        })?;
        Ok(local.join(PathsConfig::DOWNLOADS_DIR_NAME))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        Err(NixnatError::config(
            "Unknown platform and no output folder provided",
        ))
    }
}

/// Pick the download root: explicit path, then the configured directory if
/// it exists, then the platform default.
pub fn resolve_output_dir(explicit: Option<&Path>, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match configured {
        Some(dir) if dir.is_dir() => Ok(dir.to_path_buf()),
        _ => default_output_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_output_dir_wins() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("not-yet-created");
        let resolved = resolve_output_dir(Some(&explicit), Some(temp.path())).unwrap();
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_configured_dir_used_when_present() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_output_dir(None, Some(temp.path())).unwrap();
        assert_eq!(resolved, temp.path());
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    #[test]
    fn test_missing_configured_dir_falls_back() {
        let resolved = resolve_output_dir(None, Some(Path::new("/nonexistent/xnat/out"))).unwrap();
        assert!(resolved.ends_with(PathsConfig::DOWNLOADS_DIR_NAME));
    }
}
