//! Acquisition classification of DICOM headers.
//!
//! Rules are evaluated top to bottom and the first match wins. Header
//! sentinels (image type, comment, CSA data type) come before the TR/TE
//! thresholds so raw PET data is never mistaken for an MR sequence.

use super::header::HeaderView;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const NORM_COMMENT: &str = "PET Normalization data";
const NORM_CSA: &str = "MRPETNORM";
const LIST_COMMENT: &str = "Listmode";
const LIST_CSA: &str = "MRPETLM_LARGE";
const MUMAP_COMMENT: &str = "MR based umap";

/// Scanner family, as far as classification cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScannerId {
    /// Siemens Biograph mMR.
    Mmr,
    Other,
}

impl ScannerId {
    /// `Mmr` when the model names an mMR or Biograph and the vendor is
    /// Siemens.
    pub fn from_header(header: &HeaderView) -> Self {
        let model_matches = ["mMR", "Biograph"].iter().any(|m| header.model.contains(m));
        if model_matches && header.vendor.to_lowercase().contains("siemens") {
            ScannerId::Mmr
        } else {
            ScannerId::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScannerId::Mmr => "mmr",
            ScannerId::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Norm,
    List,
    Mumap,
    T1,
    T2,
    Ute2,
    Ute1,
    Physio,
    Unknown,
}

impl Category {
    /// Labels preceding the scanner ID.
    fn prefix(&self) -> &'static [&'static str] {
        match self {
            Category::Norm => &["raw", "norm"],
            Category::List => &["raw", "list"],
            Category::Mumap => &["raw", "mumap", "ute", "mr"],
            Category::T1 => &["mr", "t1"],
            Category::T2 => &["mr", "t2"],
            Category::Ute2 => &["mr", "ute", "ute2"],
            Category::Ute1 => &["mr", "ute", "ute1"],
            Category::Physio => &["raw", "physio"],
            Category::Unknown => &["unknown"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Norm => "norm",
            Category::List => "list",
            Category::Mumap => "mumap",
            Category::T1 => "t1",
            Category::T2 => "t2",
            Category::Ute2 => "ute2",
            Category::Ute1 => "ute1",
            Category::Physio => "physio",
            Category::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

fn image_type_contains(header: &HeaderView, marker: &str) -> bool {
    header.image_type.iter().any(|v| v.contains(marker))
}

fn is_norm(h: &HeaderView) -> bool {
    image_type_contains(h, "PET_NORM") || h.comment == NORM_COMMENT || h.csa_type == NORM_CSA
}

fn is_list(h: &HeaderView) -> bool {
    image_type_contains(h, "PET_LISTMODE") || h.comment == LIST_COMMENT || h.csa_type == LIST_CSA
}

fn is_mumap(h: &HeaderView) -> bool {
    image_type_contains(h, "MRPET_UMAP3D") || h.comment == MUMAP_COMMENT
}

fn is_t1(h: &HeaderView) -> bool {
    h.tr > 400.0 && h.tr < 2500.0 && h.te < 20.0
}

fn is_t2(h: &HeaderView) -> bool {
    h.tr > 2500.0 && h.te > 50.0
}

fn is_ute2(h: &HeaderView) -> bool {
    h.tr < 50.0 && h.te > 1.0 && h.te < 20.0
}

fn is_ute1(h: &HeaderView) -> bool {
    h.tr > 0.0 && h.tr < 50.0 && h.te > 0.0 && h.te < 0.1
}

fn is_physio(h: &HeaderView) -> bool {
    h.image_type.iter().any(|v| v == "PET_PHYSIO") || h.comment.to_lowercase().contains("physio")
}

type Rule = (Category, fn(&HeaderView) -> bool);

/// Evaluation order matters.
const RULES: [Rule; 8] = [
    (Category::Norm, is_norm),
    (Category::List, is_list),
    (Category::Mumap, is_mumap),
    (Category::T1, is_t1),
    (Category::T2, is_t2),
    (Category::Ute2, is_ute2),
    (Category::Ute1, is_ute1),
    (Category::Physio, is_physio),
];

/// Result of classifying one header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// `None` for [`Category::Unknown`].
    pub scanner: Option<ScannerId>,
    /// Lower-cased comment, kept as a diagnostic for unknown headers.
    pub comment: String,
}

impl Classification {
    /// The label sequence, e.g. `["mr", "t1", "mmr"]` or
    /// `["unknown", "<comment>"]`.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .category
            .prefix()
            .iter()
            .map(|s| s.to_string())
            .collect();
        match self.scanner {
            Some(scanner) => labels.push(scanner.as_str().to_string()),
            None => labels.push(self.comment.clone()),
        }
        labels
    }
}

/// Classify a header. Total: every view gets exactly one result.
pub fn classify_header(header: &HeaderView) -> Classification {
    let comment = header.comment.to_lowercase();
    match RULES.iter().find(|(_, rule)| rule(header)) {
        Some((category, _)) => Classification {
            category: *category,
            scanner: Some(ScannerId::from_header(header)),
            comment,
        },
        None => Classification {
            category: Category::Unknown,
            scanner: None,
            comment,
        },
    }
}

/// Read and classify one file.
pub fn classify_file(path: &Path) -> Result<Classification> {
    let header = HeaderView::read_file(path)?;
    let classification = classify_header(&header);
    debug!("{} -> {:?}", path.display(), classification.labels());
    Ok(classification)
}

/// `.dcm` or `.ima`, any case.
pub fn is_dicom_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("ima"))
        .unwrap_or(false)
}

/// Classify every DICOM file below `dir` and group the paths by label
/// sequence. Unreadable files are logged and left out.
pub fn classify_directory(dir: &Path) -> BTreeMap<Vec<String>, Vec<PathBuf>> {
    let mut groups: BTreeMap<Vec<String>, Vec<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_dicom_path(entry.path()) {
            continue;
        }
        match classify_file(entry.path()) {
            Ok(classification) => groups
                .entry(classification.labels())
                .or_default()
                .push(entry.into_path()),
            Err(e) => warn!("{}", e),
        }
    }

    groups
}
