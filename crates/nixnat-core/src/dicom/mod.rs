//! DICOM header access and acquisition classification.

mod classify;
mod header;

pub use classify::{
    classify_directory, classify_file, classify_header, is_dicom_path, Category, Classification,
    ScannerId,
};
pub use header::{
    HeaderView, CSA_DATA_TYPE, ECHO_TIME, IMAGE_COMMENTS, IMAGE_TYPE, MANUFACTURER, MODEL_NAME,
    REPETITION_TIME, VIEW_TAGS,
};
