//! Classification of DICOM files written to disk.

use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use nixnat_core::dicom::{
    classify_directory, classify_file, HeaderView, ECHO_TIME, IMAGE_COMMENTS, IMAGE_TYPE,
    MANUFACTURER, MODEL_NAME, REPETITION_TIME,
};
use nixnat_core::{Category, NixnatError};
use std::path::Path;
use tempfile::TempDir;

fn write_dicom(path: &Path, elements: &[(Tag, VR, &str)]) {
    let mut obj = InMemDicomObject::new_empty();
    for (tag, vr, value) in elements {
        obj.put(DataElement::new(*tag, *vr, PrimitiveValue::from(*value)));
    }
    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax("1.2.840.10008.1.2.1")
                .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.4")
                .media_storage_sop_instance_uid("1.2.826.0.1.3680043.2.1125.1"),
        )
        .unwrap();
    file.write_to_file(path).unwrap();
}

fn mmr_t1(path: &Path) {
    write_dicom(
        path,
        &[
            (IMAGE_TYPE, VR::CS, "ORIGINAL\\PRIMARY\\M\\ND"),
            (MANUFACTURER, VR::LO, "SIEMENS"),
            (MODEL_NAME, VR::LO, "Biograph_mMR"),
            (REPETITION_TIME, VR::DS, "2400"),
            (ECHO_TIME, VR::DS, "2.63"),
        ],
    );
}

fn mmr_norm(path: &Path) {
    write_dicom(
        path,
        &[
            (IMAGE_TYPE, VR::CS, "ORIGINAL\\PRIMARY\\PET_NORM"),
            (MANUFACTURER, VR::LO, "SIEMENS"),
            (MODEL_NAME, VR::LO, "Biograph_mMR"),
            (IMAGE_COMMENTS, VR::LT, "PET Normalization data"),
        ],
    );
}

#[test]
fn test_read_file_extracts_view() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t1.dcm");
    mmr_t1(&path);

    let view = HeaderView::read_file(&path).unwrap();
    assert_eq!(view.image_type, ["ORIGINAL", "PRIMARY", "M", "ND"]);
    assert_eq!(view.model, "Biograph_mMR");
    assert_eq!(view.tr, 2400.0);
    assert_eq!(view.te, 2.63);
    assert!(view.comment.is_empty());
}

#[test]
fn test_classify_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("norm.dcm");
    mmr_norm(&path);

    let result = classify_file(&path).unwrap();
    assert_eq!(result.category, Category::Norm);
    assert_eq!(result.labels(), ["raw", "norm", "mmr"]);
}

#[test]
fn test_classify_missing_file_is_dicom_error() {
    let err = classify_file(Path::new("/nonexistent/scan.dcm")).unwrap_err();
    assert!(matches!(err, NixnatError::Dicom { .. }));
}

#[test]
fn test_classify_directory_groups_by_labels() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("scan-2");
    std::fs::create_dir_all(&nested).unwrap();

    mmr_t1(&temp.path().join("a.dcm"));
    mmr_t1(&nested.join("b.IMA"));
    mmr_norm(&temp.path().join("norm.dcm"));
    std::fs::write(temp.path().join("broken.dcm"), b"not dicom").unwrap();
    std::fs::write(temp.path().join("listmode.bf"), b"raw").unwrap();

    let groups = classify_directory(temp.path());

    assert_eq!(groups.len(), 2);
    let t1 = &groups[&vec!["mr".to_string(), "t1".into(), "mmr".into()]];
    assert_eq!(t1.len(), 2);
    let norm = &groups[&vec!["raw".to_string(), "norm".into(), "mmr".into()]];
    assert_eq!(norm, &[temp.path().join("norm.dcm")]);
}
