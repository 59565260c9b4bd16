//! Remote hierarchy: node references, typed listing rows and the lister.
//!
//! The archive is addressed as projects → subjects → experiments → scans →
//! resources → files. Nothing here is cached; every traversal re-queries.

mod lister;
mod node;
mod records;

pub use lister::{parse_result_set, FetchFormat, Fetched, Lister};
pub use node::{with_json_format, NodeRef};
pub use records::{field_str, ExperimentRef, Record, RemoteFileEntry, ResourceEntry, ScanDescriptor};
