// src/core/scanner.rs
use std::path::{Path, PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReadmeAiError, Result};
use super::analyzer::null_as_default;

/// Upper bound on the number of files kept in a report
pub const MAX_SCANNED_FILES: usize = 100;

pub const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "ts", "jsx", "tsx", "py", "java", "go", "rs", "rb", "php", "cs", "cpp", "c", "h", "hpp",
];

pub const MARKUP_EXTENSIONS: &[&str] = &["html", "htm", "css", "scss"];

pub const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "requirements.txt",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
];

/// Dependency caches, build output, VCS metadata and virtual environments
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".git",
    "venv",
    "__pycache__",
    "target",
];

/// One discovered file, relative to the scanned root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path relative to the project root, `/`-separated
    #[serde(rename = "path", alias = "relativePath")]
    pub relative_path: String,

    /// Extension with its leading dot, empty when there is none
    #[serde(rename = "type", alias = "extension", default, deserialize_with = "null_as_default")]
    pub extension: String,

    #[serde(rename = "size", alias = "sizeBytes", default, deserialize_with = "null_as_default")]
    pub size_bytes: u64,
}

impl FileDescriptor {
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// Inclusion and exclusion globs evaluated against root-relative paths.
/// Exclusion always wins and prunes whole directories.
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl PathFilter {
    pub fn new(include: &[String], excluded_dirs: &[&str]) -> Result<Self> {
        let include = if include.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in include {
                builder.add(Glob::new(pattern)?);
            }
            Some(builder.build()?)
        };

        let mut builder = GlobSetBuilder::new();
        for dir in excluded_dirs {
            builder.add(Glob::new(&format!("**/{}", dir))?);
            builder.add(Glob::new(&format!("**/{}/**", dir))?);
        }

        Ok(Self {
            include,
            exclude: builder.build()?,
        })
    }

    /// Filter used for the report's file inventory
    pub fn inventory() -> Result<Self> {
        let extensions: Vec<&str> = SOURCE_EXTENSIONS
            .iter()
            .chain(MARKUP_EXTENSIONS.iter())
            .copied()
            .collect();

        let mut include = vec![format!("**/*.{{{}}}", extensions.join(","))];
        include.extend(MANIFEST_FILES.iter().map(|name| format!("**/{}", name)));
        include.push("**/*.md".to_string());

        Self::new(&include, EXCLUDED_DIRS)
    }

    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.is_match(relative)
    }

    pub fn is_included(&self, relative: &Path) -> bool {
        if self.is_excluded(relative) {
            return false;
        }
        self.include
            .as_ref()
            .map(|set| set.is_match(relative))
            .unwrap_or(true)
    }
}

/// Bounded, best-effort inventory of a directory tree
pub struct FileSystemScanner {
    root: PathBuf,
    filter: PathFilter,
    limit: usize,
}

impl FileSystemScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        Ok(Self::with_filter(root, PathFilter::inventory()?, MAX_SCANNED_FILES))
    }

    pub fn with_filter<P: AsRef<Path>>(root: P, filter: PathFilter, limit: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            filter,
            limit,
        }
    }

    /// Scan the tree. The first `limit` matches are stat'ed; entries whose
    /// stat fails are dropped, so the result may hold fewer than `limit` files.
    pub async fn scan(&self) -> Result<Vec<FileDescriptor>> {
        let root = self.root.clone();
        let filter = self.filter.clone();
        let limit = self.limit;

        let candidates = tokio::task::spawn_blocking(move || collect_matches(&root, &filter, limit))
            .await
            .map_err(|e| ReadmeAiError::FileSystem(format!("Directory walk failed: {}", e)))?;

        let mut files = Vec::with_capacity(candidates.len());
        for relative in candidates {
            if let Some(descriptor) = self.describe(relative).await {
                files.push(descriptor);
            }
        }

        debug!("Scanned {} files under {}", files.len(), self.root.display());
        Ok(files)
    }

    async fn describe(&self, relative: String) -> Option<FileDescriptor> {
        let metadata = match tokio::fs::metadata(self.root.join(&relative)).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Dropping {}: {}", relative, e);
                return None;
            }
        };

        if !metadata.is_file() {
            return None;
        }

        Some(FileDescriptor {
            extension: extension_of(&relative),
            size_bytes: metadata.len(),
            relative_path: relative,
        })
    }
}

/// Walk `root` in file-name order, skipping hidden and excluded entries, and
/// return up to `limit` root-relative paths of non-directory entries the
/// filter includes. The walk stops as soon as the limit is reached.
pub(crate) fn collect_matches(root: &Path, filter: &PathFilter, limit: usize) -> Vec<String> {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let prune = filter.clone();
    let walk_root = root.to_path_buf();
    builder.filter_entry(move |entry| match entry.path().strip_prefix(&walk_root) {
        Ok(relative) if !relative.as_os_str().is_empty() => !prune.is_excluded(relative),
        _ => true,
    });

    builder
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.depth() > 0)
        .filter(|entry| !entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            filter
                .is_included(relative)
                .then(|| to_slash_path(relative))
        })
        .take(limit)
        .collect()
}

pub(crate) fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) fn extension_of(relative: &str) -> String {
    Path::new(relative)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
