//! Resource synchronization: mirror selected scans and resource files locally.
//!
//! Both entry points process scans and files strictly one after another and
//! never fail a whole batch because of one item. Per-item problems are logged
//! and returned as [`SyncWarning`]s inside the manifest.
//!
//! A local file is considered current when it exists and its byte count,
//! rendered as text, equals the server-reported size. This is a size check,
//! not a checksum.

mod manifest;
mod request;

pub use manifest::{FileKind, ResourceManifest, ScanFiles, ScanManifest, SyncWarning};
pub use request::{file_ordinals, scan_file_name, ScanFilter, ScanSyncRequest};

use crate::credentials::Credentials;
use crate::error::Result;
use crate::network::{Auth, Transport};
use crate::platform::resolve_output_dir;
use crate::session::Session;
use crate::xnat::{Lister, NodeRef, RemoteFileEntry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How a single file was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    /// A local copy of the reported size already existed.
    Skipped,
    Downloaded,
}

/// Whether `path` already holds a file of exactly `reported_size` bytes.
pub fn local_copy_matches(path: &Path, reported_size: &str) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata.len().to_string() == reported_size,
        _ => false,
    }
}

/// Downloads scans and resource files through a [`Transport`].
#[derive(Clone)]
pub struct ResourceSynchronizer {
    transport: Arc<dyn Transport>,
    lister: Lister,
}

impl ResourceSynchronizer {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let lister = Lister::new(transport.clone());
        Self { transport, lister }
    }

    /// Fetch the selected scans of one experiment.
    ///
    /// Files land in `<root>/<ID>_<type>[_q-<quality>]/` under deterministic
    /// names and are recorded under the key `<ID>_<type>`. Listing
    /// or download failures for individual scans and files are recorded as
    /// warnings; only fatal errors and an unusable request abort the call.
    pub async fn sync_scans(&self, session: &Session, request: &ScanSyncRequest) -> Result<ScanManifest> {
        let credentials = session.credentials();
        let auth = session.auth();
        let experiment_id = request.experiment.id()?;
        let root = resolve_output_dir(
            request.destination.as_deref(),
            credentials.output_dir.as_deref(),
        )?;

        let mut manifest = ScanManifest::new(session.cookie());
        let experiment = NodeRef::subjects(&credentials.subjects_url)
            .subject(&request.subject)
            .experiment(&experiment_id);

        let scans = match self.lister.scans(&experiment, &auth).await {
            Ok(scans) => scans,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("Cannot list scans of {}: {}", experiment_id, e);
                manifest.warnings.push(SyncWarning::ListingFailed {
                    uri: experiment.scans_uri(),
                    message: e.to_string(),
                });
                return Ok(manifest);
            }
        };

        if scans.is_empty() {
            warn!("No scans listed for experiment {}", experiment_id);
            manifest.warnings.push(SyncWarning::NoScans {
                experiment: experiment_id,
            });
            return Ok(manifest);
        }

        let picked = request.filter.select(&scans);
        if picked.is_empty() {
            warn!(
                "None of the {} scans of {} match {:?}",
                scans.len(),
                experiment_id,
                request.filter
            );
            manifest.warnings.push(SyncWarning::NoScansSelected {
                experiment: experiment_id,
            });
            return Ok(manifest);
        }

        info!(
            "Synchronizing {} of {} scans from experiment {}",
            picked.len(),
            scans.len(),
            experiment_id
        );

        for scan in picked {
            let key = scan.key(false);
            let scan_node = experiment.clone().scan(&scan.id);

            let resources = match self.lister.resources(&scan_node, &auth).await {
                Ok(resources) => resources,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Cannot list resources of scan {}: {}", key, e);
                    manifest.warnings.push(SyncWarning::ListingFailed {
                        uri: scan_node.resources_uri(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            // Every accepted format of a scan lands in the same directory.
            let mut files: Vec<RemoteFileEntry> = Vec::new();
            for resource in resources.iter().filter(|r| request.accepts_format(&r.format)) {
                let resource_node = scan_node.clone().resource(&resource.format);
                match self.lister.files(&resource_node, &auth).await {
                    Ok(listed) if !listed.is_empty() => files.extend(listed),
                    Ok(_) => debug!("Resource {} of scan {} is empty", resource.format, key),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!("Cannot list files of {} for scan {}: {}", resource.format, key, e);
                        manifest.warnings.push(SyncWarning::ListingFailed {
                            uri: resource_node.files_uri(),
                            message: e.to_string(),
                        });
                    }
                }
            }

            if files.is_empty() {
                warn!("No scan data for {}", key);
                manifest
                    .warnings
                    .push(SyncWarning::NoMatchingFiles { scan: key });
                continue;
            }

            let scan_dir = root.join(scan.key(request.quality_in_path));
            if let Err(e) = std::fs::create_dir_all(&scan_dir) {
                error!("Cannot create {}: {}", scan_dir.display(), e);
                manifest.warnings.push(SyncWarning::DirectoryFailed {
                    path: scan_dir,
                    message: e.to_string(),
                });
                continue;
            }

            if request.info_only {
                manifest.scans.insert(key, ScanFiles::Listed(files));
                continue;
            }

            let mut paths = Vec::with_capacity(files.len());
            for (entry, ordinal) in files.iter().zip(file_ordinals(&files)) {
                let name = scan_file_name(
                    scan,
                    request.quality_in_path,
                    &request.comment,
                    ordinal,
                    entry,
                );
                let path = scan_dir.join(name);
                match self.fetch_file(credentials, &auth, entry, &path).await {
                    Ok(_) => paths.push(path),
                    Err(e) => {
                        error!("Error downloading {} for scan {}: {}", entry.name, key, e);
                        manifest.warnings.push(SyncWarning::DownloadFailed {
                            name: entry.name.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            manifest.scans.insert(key, ScanFiles::Downloaded(paths));
        }

        Ok(manifest)
    }

    /// Fetch a flat list of remote files into one directory and bucket them
    /// by extension.
    ///
    /// Files already present with the reported size are not downloaded
    /// again but are still bucketed. Files matching no bucket stay on disk
    /// and are left out of the manifest. An unusable destination is reported
    /// as a warning with an empty manifest.
    pub async fn sync_resources(
        &self,
        session: &Session,
        entries: &[RemoteFileEntry],
        destination: Option<&Path>,
    ) -> Result<ResourceManifest> {
        let credentials = session.credentials();
        let auth = session.auth();
        let mut manifest = ResourceManifest::new(session.cookie());

        if entries.is_empty() {
            warn!("Requested resources data is missing");
            manifest.warnings.push(SyncWarning::NoResources);
            return Ok(manifest);
        }

        let root = resolve_output_dir(destination, credentials.output_dir.as_deref())?;
        if let Err(e) = std::fs::create_dir_all(&root) {
            error!("Cannot create {}: {}", root.display(), e);
            manifest.warnings.push(SyncWarning::DirectoryFailed {
                path: root,
                message: e.to_string(),
            });
            return Ok(manifest);
        }

        let mut skipped = 0usize;
        for entry in entries {
            let Some(path) = flat_destination(&root, &entry.name) else {
                warn!("Skipping resource entry with unusable name {:?}", entry.name);
                manifest.warnings.push(SyncWarning::DownloadFailed {
                    name: entry.name.clone(),
                    message: "entry name has no file component".to_string(),
                });
                continue;
            };

            match self.fetch_file(credentials, &auth, entry, &path).await {
                Ok(outcome) => {
                    if outcome == FileOutcome::Skipped {
                        skipped += 1;
                    }
                    match FileKind::classify(&entry.name) {
                        Some(kind) => manifest.push(kind, &path),
                        None => debug!("{} kept on disk but matches no file kind", path.display()),
                    }
                }
                Err(e) => {
                    error!("Error downloading {}: {}", entry.name, e);
                    manifest.warnings.push(SyncWarning::DownloadFailed {
                        name: entry.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Resource sync finished: {} classified of {} entries ({} already present)",
            manifest.total(),
            entries.len(),
            skipped
        );
        Ok(manifest)
    }

    async fn fetch_file(
        &self,
        credentials: &Credentials,
        auth: &Auth,
        entry: &RemoteFileEntry,
        path: &Path,
    ) -> Result<FileOutcome> {
        if local_copy_matches(path, &entry.size) {
            info!(
                "File of the same size, {} already exists: skipping download",
                path.display()
            );
            return Ok(FileOutcome::Skipped);
        }

        let url = credentials.absolute_url(&entry.uri);
        self.transport.get_to_file(&url, auth, path).await?;
        Ok(FileOutcome::Downloaded)
    }
}

/// `<root>/<final component of name>`; names never create subdirectories.
fn flat_destination(root: &Path, name: &str) -> Option<PathBuf> {
    Path::new(name).file_name().map(|file| root.join(file))
}
