//! The handful of header fields the classifier looks at.

use crate::error::{NixnatError, Result};
use dicom_core::Tag;
use dicom_object::DefaultDicomObject;
use std::path::Path;
use tracing::debug;

/// (0008,0008) Image Type, multi-valued.
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
/// (0008,0070) Manufacturer.
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
/// (0008,1090) Manufacturer's Model Name.
pub const MODEL_NAME: Tag = Tag(0x0008, 0x1090);
/// (0029,1108) Siemens CSA data type (private).
pub const CSA_DATA_TYPE: Tag = Tag(0x0029, 0x1108);
/// (0020,4000) Image Comments.
pub const IMAGE_COMMENTS: Tag = Tag(0x0020, 0x4000);
/// (0018,0080) Repetition Time, ms.
pub const REPETITION_TIME: Tag = Tag(0x0018, 0x0080);
/// (0018,0081) Echo Time, ms.
pub const ECHO_TIME: Tag = Tag(0x0018, 0x0081);

/// Tags read into a [`HeaderView`].
pub const VIEW_TAGS: [Tag; 7] = [
    IMAGE_TYPE,
    MANUFACTURER,
    MODEL_NAME,
    CSA_DATA_TYPE,
    IMAGE_COMMENTS,
    REPETITION_TIME,
    ECHO_TIME,
];

/// Read-only subset of a DICOM header. Absent fields hold empty strings or
/// zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderView {
    pub image_type: Vec<String>,
    pub vendor: String,
    pub model: String,
    pub csa_type: String,
    pub comment: String,
    /// Repetition time in milliseconds.
    pub tr: f64,
    /// Echo time in milliseconds.
    pub te: f64,
}

impl HeaderView {
    /// Build a view from `(tag, value)` pairs. Tags outside [`VIEW_TAGS`] are
    /// ignored; a repeated tag overwrites the earlier value.
    pub fn from_tags<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Tag, S)>,
        S: AsRef<str>,
    {
        let mut view = HeaderView::default();
        for (tag, value) in pairs {
            let value = clean(value.as_ref());
            match tag {
                IMAGE_TYPE => {
                    view.image_type = value
                        .split('\\')
                        .map(clean)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                MANUFACTURER => view.vendor = value.to_string(),
                MODEL_NAME => view.model = value.to_string(),
                CSA_DATA_TYPE => view.csa_type = value.to_string(),
                IMAGE_COMMENTS => view.comment = value.to_string(),
                REPETITION_TIME => view.tr = parse_ms(value),
                ECHO_TIME => view.te = parse_ms(value),
                _ => {}
            }
        }
        view
    }

    /// Extract the view from an already parsed object.
    pub fn from_object(obj: &DefaultDicomObject) -> Self {
        let pairs = VIEW_TAGS.iter().filter_map(|tag| {
            let elem = obj.element(*tag).ok()?;
            let value = elem.to_str().ok()?;
            Some((*tag, value.into_owned()))
        });
        Self::from_tags(pairs)
    }

    /// Parse a file and extract the view.
    pub fn read_file(path: &Path) -> Result<Self> {
        let obj = dicom_object::open_file(path).map_err(|e| NixnatError::Dicom {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let view = Self::from_object(&obj);
        debug!(
            "{}: image type {:?}, CSA {:?}, TR {}, TE {}",
            path.display(),
            view.image_type,
            view.csa_type,
            view.tr,
            view.te
        );
        Ok(view)
    }
}

/// DICOM pads string values with spaces or NULs.
fn clean(value: &str) -> &str {
    value.trim_matches(|c: char| c == '\0' || c.is_whitespace())
}

fn parse_ms(value: &str) -> f64 {
    value
        .split('\\')
        .next()
        .map(clean)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tags() {
        let view = HeaderView::from_tags([
            (IMAGE_TYPE, "ORIGINAL\\PRIMARY\\PET_NORM "),
            (MANUFACTURER, "SIEMENS"),
            (MODEL_NAME, "Biograph_mMR\0"),
            (REPETITION_TIME, " 2300.0"),
            (ECHO_TIME, "2.98"),
        ]);
        assert_eq!(view.image_type, ["ORIGINAL", "PRIMARY", "PET_NORM"]);
        assert_eq!(view.vendor, "SIEMENS");
        assert_eq!(view.model, "Biograph_mMR");
        assert_eq!(view.tr, 2300.0);
        assert_eq!(view.te, 2.98);
        assert!(view.comment.is_empty());
        assert!(view.csa_type.is_empty());
    }

    #[test]
    fn test_unparsable_timing_is_zero() {
        let view = HeaderView::from_tags([(REPETITION_TIME, "n/a"), (ECHO_TIME, "")]);
        assert_eq!(view.tr, 0.0);
        assert_eq!(view.te, 0.0);
    }

    #[test]
    fn test_unknown_tags_ignored() {
        let view = HeaderView::from_tags([(Tag(0x0010, 0x0010), "Doe^John")]);
        assert_eq!(view, HeaderView::default());
    }

    #[test]
    fn test_read_file_rejects_non_dicom() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("fake.dcm");
        std::fs::write(&path, b"not a dicom file").unwrap();
        let err = HeaderView::read_file(&path).unwrap_err();
        assert!(matches!(err, NixnatError::Dicom { .. }));
    }
}
