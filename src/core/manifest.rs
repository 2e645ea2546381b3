use std::path::{Path, PathBuf};
use serde_json::Value as JsonValue;
use tracing::debug;

pub const PACKAGE_MANIFEST: &str = "package.json";
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// The parts of a `package.json` the analyzer cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: Option<String>,
    /// `dependencies` keys in document order
    pub dependencies: Vec<String>,
    /// `devDependencies` keys in document order
    pub dev_dependencies: Vec<String>,
}

impl PackageManifest {
    /// Project the untyped document onto the known fields
    pub fn from_json(document: &JsonValue) -> Self {
        let keys = |field: &str| -> Vec<String> {
            document
                .get(field)
                .and_then(|d| d.as_object())
                .map(|deps| deps.keys().cloned().collect())
                .unwrap_or_default()
        };

        Self {
            name: document
                .get("name")
                .and_then(|n| n.as_str())
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
            dependencies: keys("dependencies"),
            dev_dependencies: keys("devDependencies"),
        }
    }

    /// Runtime dependencies followed by dev dependencies
    pub fn all_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .map(String::as_str)
    }

    pub fn depends_on(&self, package: &str) -> bool {
        self.all_dependencies().any(|dep| dep == package)
    }
}

/// What the manifest reader found at a project root
#[derive(Debug, Clone, Default)]
pub struct ManifestSummary {
    /// Present only when `package.json` exists and parses
    pub package: Option<PackageManifest>,
    /// Package names, manifest names first, then requirement names
    pub dependencies: Vec<String>,
}

/// Reads dependency manifests at a project root. Unreadable or malformed
/// files contribute nothing; they never fail the analysis.
pub struct ManifestReader {
    root: PathBuf,
}

impl ManifestReader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub async fn read(&self) -> ManifestSummary {
        let package = self.read_package_manifest().await;
        let requirements = self.read_requirements().await.unwrap_or_default();

        let mut dependencies: Vec<String> = package
            .as_ref()
            .map(|p| p.all_dependencies().map(String::from).collect())
            .unwrap_or_default();
        dependencies.extend(requirements);

        ManifestSummary {
            package,
            dependencies,
        }
    }

    pub async fn read_package_manifest(&self) -> Option<PackageManifest> {
        let path = self.root.join(PACKAGE_MANIFEST);
        let content = tokio::fs::read_to_string(&path).await.ok()?;

        match serde_json::from_str::<JsonValue>(&content) {
            Ok(document) => Some(PackageManifest::from_json(&document)),
            Err(e) => {
                debug!("Ignoring unparseable {}: {}", path.display(), e);
                None
            }
        }
    }

    pub async fn read_requirements(&self) -> Option<Vec<String>> {
        let path = self.root.join(REQUIREMENTS_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Some(parse_requirements(&content)),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!("Ignoring unreadable {}: {}", path.display(), e);
                }
                None
            }
        }
    }
}

/// Bare package names from a pip requirements file.
/// Lines are trimmed first, so indented `#` comments are skipped too.
pub fn parse_requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let name = line.split("==").next().unwrap_or(line);
            let name = name.split(">=").next().unwrap_or(name);
            name.trim().to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}
