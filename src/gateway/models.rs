use serde::{Deserialize, Serialize};

use crate::core::{ProjectReport, ProjectType};

/// Body of `POST /api/generate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub project_info: Option<ProjectReport>,
    #[serde(default)]
    pub sample_code: Option<String>,
}

/// Compact echo of the analyzed project returned next to the README
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub languages: Vec<String>,
    pub file_count: usize,
}

impl From<&ProjectReport> for ProjectSummary {
    fn from(report: &ProjectReport) -> Self {
        Self {
            name: report.name.clone(),
            project_type: report.project_type,
            languages: report.languages.clone(),
            file_count: report.files.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub readme: String,
    pub project_info: ProjectSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            retry_after: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
