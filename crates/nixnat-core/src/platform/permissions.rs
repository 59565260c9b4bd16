//! Platform-specific file permission handling.

use crate::error::{NixnatError, Result};
use std::path::Path;
use tracing::debug;

/// Set file permissions to be readable and writable by owner only.
///
/// # Platform Behavior
/// - **Linux/macOS**: Sets mode 0o600
/// - **Windows**: Uses standard file permissions (no special handling)
pub fn set_private(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata =
            std::fs::metadata(path).map_err(|e| NixnatError::io_with_path(e, path))?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(0o600);
        std::fs::set_permissions(path, permissions)
            .map_err(|e| NixnatError::io_with_path(e, path))?;
        debug!("Set private permissions (0600) on: {}", path.display());
    }

    #[cfg(windows)]
    {
        debug!(
            "Skipping private permission setting on Windows for: {}",
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_set_private() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("xnat.json");
        File::create(&file_path).unwrap();

        set_private(&file_path).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&file_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_set_private_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.json");
        assert!(matches!(
            set_private(&missing),
            Err(NixnatError::Io { path: Some(_), .. })
        ));
    }
}
