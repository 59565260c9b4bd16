//! Listing and raw fetch methods on XnatApi.

use crate::config::XnatConfig;
use crate::xnat::{FetchFormat, Fetched, Record};
use crate::{Result, XnatApi};

impl XnatApi {
    // ========================================
    // Remote Hierarchy
    // ========================================

    /// Rows of any listing URI.
    pub async fn list(&self, uri: &str) -> Result<Vec<Record>> {
        self.lister.list(uri, &self.session.auth()).await
    }

    /// GET any URI, raw or as JSON.
    pub async fn fetch(&self, uri: &str, format: FetchFormat) -> Result<Fetched> {
        self.lister.fetch(uri, &self.session.auth(), format).await
    }

    /// Subjects of the configured project.
    pub async fn subjects(&self) -> Result<Vec<Record>> {
        self.lister
            .subjects(&self.credentials().subjects_url, &self.session.auth())
            .await
    }

    /// Experiments of a subject, optionally restricted to one XSI type.
    pub async fn experiments(&self, subject: &str, xsi_type: Option<&str>) -> Result<Vec<Record>> {
        let node = self.subjects_node().subject(subject);
        self.lister.experiments(&node, xsi_type, &self.session.auth()).await
    }

    /// PET/MR session experiments of a subject.
    pub async fn petmr_experiments(&self, subject: &str) -> Result<Vec<Record>> {
        self.experiments(subject, Some(XnatConfig::PETMR_SESSION_XSI)).await
    }
}
