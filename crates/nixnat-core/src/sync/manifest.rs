//! Result records returned by the synchronizer.
//!
//! Manifests are rebuilt on every call and never persisted.

use crate::xnat::RemoteFileEntry;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Bucket a downloaded resource file falls into, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Dcm,
    Bf,
    Ima,
    Nii,
}

impl FileKind {
    /// Checked in this order; the first marker found in the name wins.
    pub const ALL: [FileKind; 4] = [FileKind::Dcm, FileKind::Bf, FileKind::Ima, FileKind::Nii];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Dcm => "dcm",
            FileKind::Bf => "bf",
            FileKind::Ima => "ima",
            FileKind::Nii => "nii",
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            FileKind::Dcm => ".dcm",
            FileKind::Bf => ".bf",
            FileKind::Ima => ".ima",
            FileKind::Nii => ".nii",
        }
    }

    /// Case-insensitive substring match against `.dcm`, `.bf`, `.ima`, `.nii`.
    pub fn classify(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Self::ALL.into_iter().find(|kind| lower.contains(kind.marker()))
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic produced while synchronizing. None of these fail the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncWarning {
    /// The experiment lists no scans at all.
    NoScans { experiment: String },
    /// Scans exist but the filter picked none of them.
    NoScansSelected { experiment: String },
    /// A selected scan yielded no files in the accepted formats.
    NoMatchingFiles { scan: String },
    /// The resource entry list handed to `sync_resources` was empty.
    NoResources,
    ListingFailed { uri: String, message: String },
    DirectoryFailed { path: PathBuf, message: String },
    DownloadFailed { name: String, message: String },
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncWarning::NoScans { experiment } => {
                write!(f, "no scans listed for experiment {}", experiment)
            }
            SyncWarning::NoScansSelected { experiment } => {
                write!(f, "no scans of experiment {} match the filter", experiment)
            }
            SyncWarning::NoMatchingFiles { scan } => write!(f, "no scan data for {}", scan),
            SyncWarning::NoResources => f.write_str("requested resources data is missing"),
            SyncWarning::ListingFailed { uri, message } => {
                write!(f, "listing {} failed: {}", uri, message)
            }
            SyncWarning::DirectoryFailed { path, message } => {
                write!(f, "cannot create {}: {}", path.display(), message)
            }
            SyncWarning::DownloadFailed { name, message } => {
                write!(f, "error downloading {}: {}", name, message)
            }
        }
    }
}

/// What was recorded for one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanFiles {
    /// Local paths, in listing order.
    Downloaded(Vec<PathBuf>),
    /// Remote entries only (info-only mode).
    Listed(Vec<RemoteFileEntry>),
}

/// Output of `sync_scans`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanManifest {
    /// Session cookie used for the calls, reusable by the caller.
    pub cookie: String,
    /// Keyed by `<ID>_<type>`.
    pub scans: BTreeMap<String, ScanFiles>,
    pub warnings: Vec<SyncWarning>,
}

impl ScanManifest {
    pub fn new(cookie: impl Into<String>) -> Self {
        Self {
            cookie: cookie.into(),
            scans: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Downloaded paths for a scan key.
    pub fn paths(&self, key: &str) -> Option<&[PathBuf]> {
        match self.scans.get(key)? {
            ScanFiles::Downloaded(paths) => Some(paths),
            ScanFiles::Listed(_) => None,
        }
    }

    /// Remote entries for a scan key (info-only mode).
    pub fn listed(&self, key: &str) -> Option<&[RemoteFileEntry]> {
        match self.scans.get(key)? {
            ScanFiles::Listed(entries) => Some(entries),
            ScanFiles::Downloaded(_) => None,
        }
    }
}

/// Output of `sync_resources`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceManifest {
    pub cookie: String,
    pub dcm: Vec<PathBuf>,
    pub bf: Vec<PathBuf>,
    pub ima: Vec<PathBuf>,
    pub nii: Vec<PathBuf>,
    pub warnings: Vec<SyncWarning>,
}

impl ResourceManifest {
    pub fn new(cookie: impl Into<String>) -> Self {
        Self {
            cookie: cookie.into(),
            ..Default::default()
        }
    }

    pub fn bucket(&self, kind: FileKind) -> &[PathBuf] {
        match kind {
            FileKind::Dcm => &self.dcm,
            FileKind::Bf => &self.bf,
            FileKind::Ima => &self.ima,
            FileKind::Nii => &self.nii,
        }
    }

    pub fn push(&mut self, kind: FileKind, path: &Path) {
        let bucket = match kind {
            FileKind::Dcm => &mut self.dcm,
            FileKind::Bf => &mut self.bf,
            FileKind::Ima => &mut self.ima,
            FileKind::Nii => &mut self.nii,
        };
        bucket.push(path.to_path_buf());
    }

    /// Number of classified files across all buckets.
    pub fn total(&self) -> usize {
        FileKind::ALL.iter().map(|kind| self.bucket(*kind).len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_classify() {
        assert_eq!(FileKind::classify("1.3.12.2.1107.DCM"), Some(FileKind::Dcm));
        assert_eq!(FileKind::classify("listmode.bf"), Some(FileKind::Bf));
        assert_eq!(FileKind::classify("norm.IMA"), Some(FileKind::Ima));
        assert_eq!(FileKind::classify("t1.nii.gz"), Some(FileKind::Nii));
        assert_eq!(FileKind::classify("notes.txt"), None);
    }

    #[test]
    fn test_file_kind_precedence() {
        // Siemens raw data often ships as header/payload pairs.
        assert_eq!(FileKind::classify("scan.dcm.bf"), Some(FileKind::Dcm));
        assert_eq!(FileKind::classify("scan.bf.ima"), Some(FileKind::Bf));
    }

    #[test]
    fn test_resource_manifest_buckets() {
        let mut manifest = ResourceManifest::new("JSESSIONID=a");
        manifest.push(FileKind::Bf, Path::new("/tmp/a.bf"));
        manifest.push(FileKind::Dcm, Path::new("/tmp/a.dcm"));
        assert_eq!(manifest.bucket(FileKind::Bf), [PathBuf::from("/tmp/a.bf")]);
        assert_eq!(manifest.total(), 2);
        assert!(manifest.bucket(FileKind::Nii).is_empty());
    }

    #[test]
    fn test_scan_manifest_accessors() {
        let mut manifest = ScanManifest::new("JSESSIONID=a");
        assert!(manifest.is_empty());
        manifest.scans.insert(
            "1_T1".into(),
            ScanFiles::Downloaded(vec![PathBuf::from("/x/scan-1_T1.dcm")]),
        );
        assert_eq!(manifest.paths("1_T1").unwrap().len(), 1);
        assert!(manifest.listed("1_T1").is_none());
        assert!(manifest.paths("2_T2").is_none());
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let json = serde_json::to_value(SyncWarning::NoMatchingFiles { scan: "1_T1".into() }).unwrap();
        assert_eq!(json["kind"], "no_matching_files");
        assert_eq!(json["scan"], "1_T1");
    }
}
