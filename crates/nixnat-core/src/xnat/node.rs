//! Hierarchy node references and the listing URIs derived from them.

use urlencoding::encode;

/// Location in the project hierarchy, rooted at the subjects collection.
///
/// Nodes are never cached; each URI built from a node is queried afresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    subjects_url: String,
    subject: Option<String>,
    experiment: Option<String>,
    scan: Option<String>,
    resource: Option<String>,
}

impl NodeRef {
    /// The subjects collection itself.
    pub fn subjects(subjects_url: &str) -> Self {
        Self {
            subjects_url: subjects_url.trim_end_matches('/').to_string(),
            subject: None,
            experiment: None,
            scan: None,
            resource: None,
        }
    }

    pub fn subject(mut self, id: &str) -> Self {
        self.subject = Some(id.to_string());
        self
    }

    pub fn experiment(mut self, id: &str) -> Self {
        self.experiment = Some(id.to_string());
        self
    }

    pub fn scan(mut self, id: &str) -> Self {
        self.scan = Some(id.to_string());
        self
    }

    /// Resource label (for scans this is the resource format, e.g. `DICOM`).
    pub fn resource(mut self, label: &str) -> Self {
        self.resource = Some(label.to_string());
        self
    }

    pub fn scan_id(&self) -> Option<&str> {
        self.scan.as_deref()
    }

    /// URI of this node.
    pub fn uri(&self) -> String {
        let mut uri = self.subjects_url.clone();
        if let Some(subject) = &self.subject {
            uri.push('/');
            uri.push_str(&encode(subject));
        }
        if let Some(experiment) = &self.experiment {
            uri.push_str("/experiments/");
            uri.push_str(&encode(experiment));
        }
        if let Some(scan) = &self.scan {
            uri.push_str("/scans/");
            uri.push_str(&encode(scan));
        }
        if let Some(resource) = &self.resource {
            uri.push_str("/resources/");
            uri.push_str(&encode(resource));
        }
        uri
    }

    pub fn experiments_uri(&self) -> String {
        format!("{}/experiments", self.uri())
    }

    pub fn scans_uri(&self) -> String {
        format!("{}/scans", self.uri())
    }

    pub fn resources_uri(&self) -> String {
        format!("{}/resources", self.uri())
    }

    pub fn files_uri(&self) -> String {
        format!("{}/files", self.uri())
    }
}

/// Append `format=json` to a listing URI unless a format is already set.
pub fn with_json_format(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(mut parsed) => {
            if parsed.query_pairs().any(|(key, _)| key == "format") {
                return uri.to_string();
            }
            parsed.query_pairs_mut().append_pair("format", "json");
            parsed.to_string()
        }
        Err(_) => {
            if uri.contains("format=") {
                uri.to_string()
            } else if uri.contains('?') {
                format!("{uri}&format=json")
            } else {
                format!("{uri}?format=json")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBJECTS: &str = "https://xnat.example.org/data/projects/P1/subjects";

    #[test]
    fn test_node_uris() {
        let exp = NodeRef::subjects(SUBJECTS).subject("S01").experiment("E01");
        assert_eq!(
            exp.scans_uri(),
            "https://xnat.example.org/data/projects/P1/subjects/S01/experiments/E01/scans"
        );

        let res = exp.clone().scan("3").resource("DICOM");
        assert_eq!(
            res.files_uri(),
            "https://xnat.example.org/data/projects/P1/subjects/S01/experiments/E01/scans/3/resources/DICOM/files"
        );
        assert_eq!(res.scan_id(), Some("3"));
    }

    #[test]
    fn test_segments_are_encoded() {
        let node = NodeRef::subjects(SUBJECTS).subject("S 01");
        assert!(node.uri().ends_with("/subjects/S%2001"));
    }

    #[test]
    fn test_with_json_format() {
        assert_eq!(
            with_json_format("https://x.org/data/projects"),
            "https://x.org/data/projects?format=json"
        );
        assert_eq!(
            with_json_format("https://x.org/data/experiments?xsiType=xnat:petmrSessionData"),
            "https://x.org/data/experiments?xsiType=xnat:petmrSessionData&format=json"
        );
        assert_eq!(
            with_json_format("https://x.org/data/projects?format=xml"),
            "https://x.org/data/projects?format=xml"
        );
        assert_eq!(with_json_format("relative/path"), "relative/path?format=json");
    }
}
