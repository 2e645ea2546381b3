use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ReadmeAiError, Result};
use super::scanner::{collect_matches, PathFilter};

pub const MAX_SAMPLE_FILES: usize = 3;
pub const MAX_SAMPLE_LINES: usize = 30;

const SAMPLE_PATTERN: &str = "**/*.{js,ts,jsx,tsx,py}";
const SAMPLE_EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", ".git"];

/// Picks a few script sources and keeps only their heads
pub struct SampleCodeExtractor {
    root: PathBuf,
    filter: PathFilter,
    max_files: usize,
    max_lines: usize,
}

impl SampleCodeExtractor {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            filter: PathFilter::new(&[SAMPLE_PATTERN.to_string()], SAMPLE_EXCLUDED_DIRS)?,
            max_files: MAX_SAMPLE_FILES,
            max_lines: MAX_SAMPLE_LINES,
        })
    }

    /// Concatenated `--- path ---` sections. Files that cannot be read are
    /// skipped; they are not replaced by later candidates.
    pub async fn extract(&self) -> Result<String> {
        let root = self.root.clone();
        let filter = self.filter.clone();
        let max_files = self.max_files;

        let candidates = tokio::task::spawn_blocking(move || collect_matches(&root, &filter, max_files))
            .await
            .map_err(|e| ReadmeAiError::FileSystem(format!("Directory walk failed: {}", e)))?;

        let mut sample = String::new();
        for relative in candidates {
            let content = match tokio::fs::read_to_string(self.root.join(&relative)).await {
                Ok(content) => content,
                Err(e) => {
                    debug!("Skipping sample {}: {}", relative, e);
                    continue;
                }
            };

            let head = head_lines(&content, self.max_lines);
            sample.push_str(&format!("\n--- {} ---\n{}\n", relative, head));
        }

        Ok(sample)
    }
}

fn head_lines(content: &str, max_lines: usize) -> String {
    content
        .split('\n')
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[tokio::test]
    async fn takes_three_files_thirty_lines_each() {
        let temp = TempDir::new().unwrap();
        let long: String = (1..=40).map(|i| format!("line {}\n", i)).collect();
        temp.child("a.py").write_str(&long).unwrap();
        temp.child("b.ts").write_str("const b = 1;").unwrap();
        temp.child("c.js").write_str("let c;").unwrap();
        temp.child("d.tsx").write_str("never sampled").unwrap();

        let sample = SampleCodeExtractor::new(temp.path()).unwrap().extract().await.unwrap();

        assert!(sample.starts_with("\n--- a.py ---\nline 1\n"));
        assert!(sample.contains("line 30\n\n--- b.ts ---"));
        assert!(!sample.contains("line 31"));
        assert!(sample.contains("\n--- c.js ---\nlet c;\n"));
        assert!(!sample.contains("d.tsx"));
    }

    #[tokio::test]
    async fn dependency_caches_are_never_sampled() {
        let temp = TempDir::new().unwrap();
        temp.child("dist/out.js").write_str("bundled").unwrap();
        temp.child("node_modules/x/index.js").write_str("vendored").unwrap();
        temp.child("src/main.py").write_str("print('hi')").unwrap();

        let sample = SampleCodeExtractor::new(temp.path()).unwrap().extract().await.unwrap();
        assert_eq!(sample, "\n--- src/main.py ---\nprint('hi')\n");
    }

    #[tokio::test]
    async fn non_utf8_sources_are_skipped() {
        let temp = TempDir::new().unwrap();
        temp.child("a.js").write_binary(&[0xff, 0xfe, 0x00]).unwrap();
        temp.child("b.js").write_str("ok();").unwrap();

        let sample = SampleCodeExtractor::new(temp.path()).unwrap().extract().await.unwrap();
        assert_eq!(sample, "\n--- b.js ---\nok();\n");
    }

    #[tokio::test]
    async fn no_sources_yields_empty_sample() {
        let temp = TempDir::new().unwrap();
        temp.child("README.md").write_str("# docs").unwrap();

        let sample = SampleCodeExtractor::new(temp.path()).unwrap().extract().await.unwrap();
        assert!(sample.is_empty());
    }
}
