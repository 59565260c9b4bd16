//! Container creation and upload methods on XnatApi.

use crate::config::XnatConfig;
use crate::error::NixnatError;
use crate::xnat::{field_str, NodeRef};
use crate::{Result, XnatApi};
use std::path::Path;
use tracing::info;

impl XnatApi {
    /// PUT an empty container at `uri`.
    pub async fn create_container(&self, uri: &str) -> Result<()> {
        let url = self.credentials().absolute_url(uri);
        self.transport.put(&url, &self.session.auth()).await
    }

    pub async fn delete(&self, uri: &str) -> Result<()> {
        let url = self.credentials().absolute_url(uri);
        self.transport.delete(&url, &self.session.auth()).await
    }

    /// Attach a file to a resource of the subject's first PET/MR session,
    /// creating the resource catalog first.
    pub async fn upload_experiment_resource(
        &self,
        subject: &str,
        label: &str,
        format: &str,
        file: &Path,
    ) -> Result<()> {
        let experiments = self.petmr_experiments(subject).await?;
        let experiment_id = experiments
            .first()
            .map(|row| field_str(row, "ID"))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| NixnatError::Validation {
                field: "experiment".to_string(),
                message: format!("subject {} has no PET/MR session", subject),
            })?;

        let resource: NodeRef = self
            .subjects_node()
            .subject(subject)
            .experiment(&experiment_id)
            .resource(label);
        let auth = self.session.auth();

        let catalog_uri = format!(
            "{}?xsi:type={}&format={}",
            resource.uri(),
            XnatConfig::RESOURCE_CATALOG_XSI,
            urlencoding::encode(format)
        );
        self.transport.put(&catalog_uri, &auth).await?;
        self.transport
            .upload_file(&resource.files_uri(), &auth, file)
            .await?;

        info!(
            "Uploaded {} to resource {} of experiment {}",
            file.display(),
            label,
            experiment_id
        );
        Ok(())
    }
}
