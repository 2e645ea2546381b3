use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::manifest::{PackageManifest, REQUIREMENTS_FILE};
use super::scanner::FileDescriptor;

/// Project archetype, serialized as its display label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectType {
    NodeEcosystem,
    Python,
    WebStatic,
    React,
    NextFramework,
    Vue,
    Angular,
    TypeScriptGeneric,
    JavaScriptGeneric,
    Unknown,
}

impl ProjectType {
    pub const ALL: [ProjectType; 10] = [
        ProjectType::NodeEcosystem,
        ProjectType::Python,
        ProjectType::WebStatic,
        ProjectType::React,
        ProjectType::NextFramework,
        ProjectType::Vue,
        ProjectType::Angular,
        ProjectType::TypeScriptGeneric,
        ProjectType::JavaScriptGeneric,
        ProjectType::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProjectType::NodeEcosystem => "Node.js",
            ProjectType::Python => "Python",
            ProjectType::WebStatic => "Web Application",
            ProjectType::React => "React",
            ProjectType::NextFramework => "Next.js",
            ProjectType::Vue => "Vue.js",
            ProjectType::Angular => "Angular",
            ProjectType::TypeScriptGeneric => "TypeScript",
            ProjectType::JavaScriptGeneric => "JavaScript",
            ProjectType::Unknown => "Unknown",
        }
    }

    /// Unrecognized labels map to `Unknown`
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .unwrap_or(ProjectType::Unknown)
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Default for ProjectType {
    fn default() -> Self {
        ProjectType::Unknown
    }
}

impl From<String> for ProjectType {
    fn from(label: String) -> Self {
        ProjectType::from_label(&label)
    }
}

impl From<ProjectType> for String {
    fn from(project_type: ProjectType) -> Self {
        project_type.label().to_string()
    }
}

/// Signals available to the classifier
pub struct Evidence<'a> {
    pub manifest: Option<&'a PackageManifest>,
    pub files: &'a [FileDescriptor],
}

impl Evidence<'_> {
    fn manifest_depends_on(&self, package: &str) -> bool {
        self.manifest.map(|m| m.depends_on(package)).unwrap_or(false)
    }

    fn has_extension(&self, extensions: &[&str]) -> bool {
        self.files
            .iter()
            .any(|f| extensions.contains(&f.extension.as_str()))
    }
}

pub struct ClassificationRule {
    pub name: &'static str,
    pub matches: fn(&Evidence<'_>) -> bool,
    pub project_type: ProjectType,
}

/// Evaluated top to bottom; the first matching rule decides. Any parsed
/// package manifest stops at `package-manifest` at the latest, so extension
/// evidence is only consulted for projects without one.
pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "next-dependency",
        matches: depends_on_next,
        project_type: ProjectType::NextFramework,
    },
    ClassificationRule {
        name: "react-dependency",
        matches: depends_on_react,
        project_type: ProjectType::React,
    },
    ClassificationRule {
        name: "vue-dependency",
        matches: depends_on_vue,
        project_type: ProjectType::Vue,
    },
    ClassificationRule {
        name: "angular-dependency",
        matches: depends_on_angular,
        project_type: ProjectType::Angular,
    },
    ClassificationRule {
        name: "typescript-dependency",
        matches: depends_on_typescript,
        project_type: ProjectType::TypeScriptGeneric,
    },
    ClassificationRule {
        name: "package-manifest",
        matches: has_package_manifest,
        project_type: ProjectType::NodeEcosystem,
    },
    ClassificationRule {
        name: "requirements-file",
        matches: has_requirements_file,
        project_type: ProjectType::Python,
    },
    ClassificationRule {
        name: "typescript-sources",
        matches: has_typescript_sources,
        project_type: ProjectType::TypeScriptGeneric,
    },
    ClassificationRule {
        name: "javascript-sources",
        matches: has_javascript_sources,
        project_type: ProjectType::JavaScriptGeneric,
    },
    ClassificationRule {
        name: "markup-sources",
        matches: has_markup_sources,
        project_type: ProjectType::WebStatic,
    },
];

fn depends_on_next(evidence: &Evidence<'_>) -> bool {
    evidence.manifest_depends_on("next")
}

fn depends_on_react(evidence: &Evidence<'_>) -> bool {
    evidence.manifest_depends_on("react")
}

fn depends_on_vue(evidence: &Evidence<'_>) -> bool {
    evidence.manifest_depends_on("vue")
}

fn depends_on_angular(evidence: &Evidence<'_>) -> bool {
    evidence.manifest_depends_on("@angular/core")
}

fn depends_on_typescript(evidence: &Evidence<'_>) -> bool {
    evidence.manifest_depends_on("typescript")
}

fn has_package_manifest(evidence: &Evidence<'_>) -> bool {
    evidence.manifest.is_some()
}

fn has_requirements_file(evidence: &Evidence<'_>) -> bool {
    evidence.files.iter().any(|f| f.file_name() == REQUIREMENTS_FILE)
}

fn has_typescript_sources(evidence: &Evidence<'_>) -> bool {
    evidence.has_extension(&[".ts", ".tsx"])
}

fn has_javascript_sources(evidence: &Evidence<'_>) -> bool {
    evidence.has_extension(&[".js", ".jsx"])
}

fn has_markup_sources(evidence: &Evidence<'_>) -> bool {
    evidence.has_extension(&[".html", ".htm", ".css", ".scss"])
}

pub struct ProjectTypeClassifier;

impl ProjectTypeClassifier {
    pub fn matching_rule(evidence: &Evidence<'_>) -> Option<&'static ClassificationRule> {
        RULES.iter().find(|rule| (rule.matches)(evidence))
    }

    pub fn classify(manifest: Option<&PackageManifest>, files: &[FileDescriptor]) -> ProjectType {
        let evidence = Evidence { manifest, files };
        match Self::matching_rule(&evidence) {
            Some(rule) => {
                debug!("Project type decided by rule '{}'", rule.name);
                rule.project_type
            }
            None => ProjectType::Unknown,
        }
    }
}
