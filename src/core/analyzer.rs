// src/core/analyzer.rs
use std::path::{Path, PathBuf};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::error::{ReadmeAiError, Result};
use super::languages::LanguageClassifier;
use super::manifest::ManifestReader;
use super::project_type::{ProjectType, ProjectTypeClassifier};
use super::sample::SampleCodeExtractor;
use super::scanner::{FileDescriptor, FileSystemScanner};
use super::structure::StructureSummarizer;

/// Composite summary of one project, built once per analysis.
/// Fields sent as `null` over the wire read as their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    /// Manifest name, or the root directory's name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Absolute path of the analyzed root
    #[serde(rename = "path", alias = "rootPath", default, deserialize_with = "null_as_default")]
    pub root_path: String,

    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub project_type: ProjectType,

    /// Distinct language labels in first-seen order
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,

    /// Bare package names; may contain duplicates across manifests
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<FileDescriptor>,

    /// Shallow directory listing, one entry per line
    #[serde(
        rename = "structure",
        alias = "structureListing",
        default,
        deserialize_with = "null_as_default"
    )]
    pub structure_listing: String,
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Orchestrates scanning, manifest reading and classification for one root
pub struct ProjectAnalyzer {
    root_path: PathBuf,
}

impl ProjectAnalyzer {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            root_path: path.as_ref().to_path_buf(),
        }
    }

    /// Analyze the project. Only an unusable root is an error; individual
    /// unreadable files and manifests are left out of the report.
    pub async fn analyze(&self) -> Result<ProjectReport> {
        let root = self.resolve_root().await?;
        info!("🔍 Analyzing project at {}", root.display());

        let files = FileSystemScanner::new(&root)?.scan().await?;
        let manifests = ManifestReader::new(&root).read().await;
        let languages = LanguageClassifier::classify(&files);
        let project_type = ProjectTypeClassifier::classify(manifests.package.as_ref(), &files);

        let summarizer = StructureSummarizer::standard()?;
        let structure_root = root.clone();
        let structure_listing =
            tokio::task::spawn_blocking(move || summarizer.summarize(&structure_root))
                .await
                .map_err(|e| ReadmeAiError::FileSystem(format!("Structure listing failed: {}", e)))?;

        let name = manifests
            .package
            .as_ref()
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| directory_name(&root));

        Ok(ProjectReport {
            name,
            root_path: root.to_string_lossy().to_string(),
            project_type,
            languages,
            dependencies: manifests.dependencies,
            files,
            structure_listing,
        })
    }

    /// Representative code for the prompt, independent of `analyze`
    pub async fn sample_code(&self) -> Result<String> {
        let root = self.resolve_root().await?;
        SampleCodeExtractor::new(&root)?.extract().await
    }

    async fn resolve_root(&self) -> Result<PathBuf> {
        let root = tokio::fs::canonicalize(&self.root_path).await.map_err(|e| {
            ReadmeAiError::FileSystem(format!(
                "Cannot resolve project directory {}: {}",
                self.root_path.display(),
                e
            ))
        })?;

        if !tokio::fs::metadata(&root).await?.is_dir() {
            return Err(ReadmeAiError::FileSystem(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        Ok(root)
    }
}

fn directory_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string())
}
