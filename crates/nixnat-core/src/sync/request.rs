//! Scan selection and the parameters of a scan synchronization.

use crate::config::XnatConfig;
use crate::error::{NixnatError, Result};
use crate::xnat::{ExperimentRef, RemoteFileEntry, ScanDescriptor};
use std::collections::HashMap;
use std::path::PathBuf;

/// Which scans of an experiment to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanFilter {
    #[default]
    All,
    /// Scan type contains any of these substrings.
    ByType(Vec<String>),
    /// Scan ID equals one of these.
    ById(Vec<String>),
}

impl ScanFilter {
    /// Build from the two optional criteria. Giving both is rejected; giving
    /// neither selects every scan.
    pub fn new(types: Vec<String>, ids: Vec<String>) -> Result<Self> {
        match (types.is_empty(), ids.is_empty()) {
            (true, true) => Ok(ScanFilter::All),
            (false, true) => Ok(ScanFilter::ByType(types)),
            (true, false) => Ok(ScanFilter::ById(ids)),
            (false, false) => Err(NixnatError::Validation {
                field: "scan filter".to_string(),
                message: "select scans by type or by ID, not both".to_string(),
            }),
        }
    }

    pub fn matches(&self, scan: &ScanDescriptor) -> bool {
        match self {
            ScanFilter::All => true,
            ScanFilter::ByType(types) => types.iter().any(|t| scan.scan_type.contains(t.as_str())),
            ScanFilter::ById(ids) => ids.iter().any(|id| *id == scan.id),
        }
    }

    /// Matching scans in listing order, each at most once.
    pub fn select<'a>(&self, scans: &'a [ScanDescriptor]) -> Vec<&'a ScanDescriptor> {
        scans.iter().filter(|scan| self.matches(scan)).collect()
    }
}

/// Parameters of one `sync_scans` call.
#[derive(Debug, Clone)]
pub struct ScanSyncRequest {
    pub subject: String,
    pub experiment: ExperimentRef,
    pub filter: ScanFilter,
    /// Accepted resource formats, compared exactly.
    pub formats: Vec<String>,
    /// Download root. `None` uses the configured or platform default.
    pub destination: Option<PathBuf>,
    /// Free-text suffix added to every local filename.
    pub comment: String,
    pub quality_in_path: bool,
    /// List files without downloading them.
    pub info_only: bool,
}

impl ScanSyncRequest {
    pub fn new(subject: &str, experiment: impl Into<ExperimentRef>) -> Self {
        Self {
            subject: subject.to_string(),
            experiment: experiment.into(),
            filter: ScanFilter::All,
            formats: XnatConfig::DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect(),
            destination: None,
            comment: String::new(),
            quality_in_path: true,
            info_only: false,
        }
    }

    pub fn filter(mut self, filter: ScanFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn destination(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination = Some(dir.into());
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    pub fn quality_in_path(mut self, enabled: bool) -> Self {
        self.quality_in_path = enabled;
        self
    }

    pub fn info_only(mut self, enabled: bool) -> Self {
        self.info_only = enabled;
        self
    }

    pub fn accepts_format(&self, format: &str) -> bool {
        self.formats.iter().any(|f| f == format)
    }
}

/// Local filename for one file of a scan:
/// `scan-<ID>_<type>[_q-<quality>][_<comment>][_<NNNN>][.<ext>]`.
pub fn scan_file_name(
    scan: &ScanDescriptor,
    quality_in_path: bool,
    comment: &str,
    ordinal: Option<usize>,
    entry: &RemoteFileEntry,
) -> String {
    let mut name = format!("scan-{}", scan.key(quality_in_path));
    if !comment.is_empty() {
        name.push('_');
        name.push_str(comment);
    }
    if let Some(n) = ordinal {
        name.push_str(&format!("_{:04}", n));
    }
    if let Some(ext) = entry.extension() {
        name.push('.');
        name.push_str(ext);
    }
    name
}

/// Ordinals for the files of one scan: `Some(n)` (1-based, per extension)
/// only where two or more files share an extension.
pub fn file_ordinals(files: &[RemoteFileEntry]) -> Vec<Option<usize>> {
    let extensions: Vec<Option<String>> = files
        .iter()
        .map(|f| f.extension().map(str::to_lowercase))
        .collect();

    let mut totals: HashMap<&Option<String>, usize> = HashMap::new();
    for ext in &extensions {
        *totals.entry(ext).or_default() += 1;
    }

    let mut seen: HashMap<&Option<String>, usize> = HashMap::new();
    extensions
        .iter()
        .map(|ext| {
            if totals[ext] < 2 {
                return None;
            }
            let count = seen.entry(ext).or_default();
            *count += 1;
            Some(*count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(id: &str, scan_type: &str, quality: &str) -> ScanDescriptor {
        ScanDescriptor {
            scan_type: scan_type.into(),
            quality: quality.into(),
            id: id.into(),
        }
    }

    #[test]
    fn test_filter_new() {
        assert_eq!(ScanFilter::new(vec![], vec![]).unwrap(), ScanFilter::All);
        assert!(matches!(
            ScanFilter::new(vec!["T1".into()], vec![]).unwrap(),
            ScanFilter::ByType(_)
        ));
        assert!(matches!(
            ScanFilter::new(vec![], vec!["3".into()]).unwrap(),
            ScanFilter::ById(_)
        ));
        assert!(ScanFilter::new(vec!["T1".into()], vec!["3".into()]).is_err());
    }

    #[test]
    fn test_filter_select() {
        let scans = vec![
            scan("1", "localizer", "usable"),
            scan("2", "T1_MPRAGE", "usable"),
            scan("3", "T2_SPACE", "questionable"),
            scan("30", "UTE_T1", "usable"),
        ];

        let by_type = ScanFilter::ByType(vec!["T1".into(), "MPRAGE".into()]);
        let ids: Vec<&str> = by_type.select(&scans).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["2", "30"]);

        let by_id = ScanFilter::ById(vec!["3".into()]);
        let ids: Vec<&str> = by_id.select(&scans).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["3"]);

        assert_eq!(ScanFilter::All.select(&scans).len(), 4);
    }

    #[test]
    fn test_scan_file_name() {
        let s = scan("2", "T1_MPRAGE", "usable");
        let entry = RemoteFileEntry::new("image.nii.gz", "10", "/u");
        assert_eq!(
            scan_file_name(&s, true, "", None, &entry),
            "scan-2_T1_MPRAGE_q-usable.gz"
        );
        assert_eq!(
            scan_file_name(&s, false, "baseline", Some(7), &entry),
            "scan-2_T1_MPRAGE_baseline_0007.gz"
        );
        let bare = RemoteFileEntry::new("README", "10", "/u");
        assert_eq!(scan_file_name(&s, false, "", None, &bare), "scan-2_T1_MPRAGE");
    }

    #[test]
    fn test_file_ordinals() {
        let files = vec![
            RemoteFileEntry::new("a.dcm", "1", "/a"),
            RemoteFileEntry::new("b.json", "1", "/b"),
            RemoteFileEntry::new("c.DCM", "1", "/c"),
        ];
        assert_eq!(file_ordinals(&files), [Some(1), None, Some(2)]);

        let single = vec![RemoteFileEntry::new("t1.nii", "1", "/a")];
        assert_eq!(file_ordinals(&single), [None]);

        let bare = vec![
            RemoteFileEntry::new("README", "1", "/a"),
            RemoteFileEntry::new("LICENSE", "1", "/b"),
        ];
        assert_eq!(file_ordinals(&bare), [Some(1), Some(2)]);
    }

    #[test]
    fn test_request_defaults() {
        let request = ScanSyncRequest::new("S01", "E01");
        assert_eq!(request.filter, ScanFilter::All);
        assert!(request.accepts_format("DICOM"));
        assert!(request.accepts_format("NIFTI"));
        assert!(!request.accepts_format("secondary"));
        assert!(request.quality_in_path);
        assert!(!request.info_only);
    }
}
