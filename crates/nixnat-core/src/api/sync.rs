//! Synchronization methods on XnatApi.

use crate::sync::{ResourceManifest, ScanManifest, ScanSyncRequest};
use crate::xnat::RemoteFileEntry;
use crate::{Result, XnatApi};
use std::path::Path;

impl XnatApi {
    /// Download (or list, in info-only mode) the selected scans of one
    /// experiment.
    pub async fn sync_scans(&self, request: &ScanSyncRequest) -> Result<ScanManifest> {
        self.synchronizer.sync_scans(&self.session, request).await
    }

    /// Download a flat list of files into one directory.
    pub async fn sync_resources(
        &self,
        entries: &[RemoteFileEntry],
        destination: Option<&Path>,
    ) -> Result<ResourceManifest> {
        self.synchronizer
            .sync_resources(&self.session, entries, destination)
            .await
    }

    /// Files of an experiment-level resource, ready for [`Self::sync_resources`].
    pub async fn experiment_resource_files(
        &self,
        subject: &str,
        experiment: &str,
        label: &str,
    ) -> Result<Vec<RemoteFileEntry>> {
        let node = self
            .subjects_node()
            .subject(subject)
            .experiment(experiment)
            .resource(label);
        self.lister.files(&node, &self.session.auth()).await
    }
}
