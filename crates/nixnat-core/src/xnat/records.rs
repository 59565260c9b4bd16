//! Typed views over listing rows.
//!
//! Listing endpoints return loosely typed rows; IDs and sizes arrive as
//! strings on some servers and as numbers on others, so every field is read
//! leniently into a `String`.

use crate::error::{NixnatError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One row of a `{ResultSet: {Result: [...]}}` listing.
pub type Record = Map<String, Value>;

/// Read a field as text. Missing or null fields read as an empty string.
pub fn field_str(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// `(type, quality, ID)` of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDescriptor {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub scan_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quality: String,
    #[serde(rename = "ID", default, deserialize_with = "lenient_string")]
    pub id: String,
}

impl ScanDescriptor {
    pub fn from_record(record: &Record) -> Self {
        Self {
            scan_type: field_str(record, "type"),
            quality: field_str(record, "quality"),
            id: field_str(record, "ID"),
        }
    }

    /// `<ID>_<type>`, optionally with `_q-<quality>`.
    pub fn key(&self, with_quality: bool) -> String {
        if with_quality {
            format!("{}_{}_q-{}", self.id, self.scan_type, self.quality)
        } else {
            format!("{}_{}", self.id, self.scan_type)
        }
    }
}

/// Resource attached to a scan or experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub label: String,
    pub format: String,
}

impl ResourceEntry {
    pub fn from_record(record: &Record) -> Self {
        Self {
            label: field_str(record, "label"),
            format: field_str(record, "format"),
        }
    }
}

/// File listed under a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileEntry {
    #[serde(rename = "Name", deserialize_with = "lenient_string")]
    pub name: String,
    /// Server-reported byte count, kept as text.
    #[serde(rename = "Size", default, deserialize_with = "lenient_string")]
    pub size: String,
    /// Server-relative path.
    #[serde(rename = "URI", deserialize_with = "lenient_string")]
    pub uri: String,
    #[serde(rename = "file_format", default, deserialize_with = "lenient_string")]
    pub format: String,
}

impl RemoteFileEntry {
    pub fn new(name: &str, size: &str, uri: &str) -> Self {
        Self {
            name: name.to_string(),
            size: size.to_string(),
            uri: uri.to_string(),
            format: String::new(),
        }
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        serde_json::from_value(Value::Object(record.clone())).map_err(|e| {
            NixnatError::Validation {
                field: "file entry".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Extension after the last dot of the remote name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// Experiment given either directly by ID or as a listing row.
#[derive(Debug, Clone)]
pub enum ExperimentRef {
    Id(String),
    Record(Record),
}

impl ExperimentRef {
    pub fn id(&self) -> Result<String> {
        match self {
            ExperimentRef::Id(id) => Ok(id.clone()),
            ExperimentRef::Record(record) => {
                let id = field_str(record, "ID");
                if id.is_empty() {
                    Err(NixnatError::Validation {
                        field: "experiment".to_string(),
                        message: "experiment record has no ID".to_string(),
                    })
                } else {
                    Ok(id)
                }
            }
        }
    }
}

impl From<&str> for ExperimentRef {
    fn from(id: &str) -> Self {
        ExperimentRef::Id(id.to_string())
    }
}

impl From<String> for ExperimentRef {
    fn from(id: String) -> Self {
        ExperimentRef::Id(id)
    }
}

impl From<Record> for ExperimentRef {
    fn from(record: Record) -> Self {
        ExperimentRef::Record(record)
    }
}
