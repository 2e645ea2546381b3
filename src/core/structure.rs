use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::Result;
use super::scanner::{to_slash_path, PathFilter, EXCLUDED_DIRS};

pub const MAX_STRUCTURE_DEPTH: usize = 3;
pub const MAX_STRUCTURE_ENTRIES: usize = 50;

/// Shallow, capped listing of a directory tree for prompt context.
/// Unlike the file inventory there is no extension filter, and directories
/// are listed alongside files. Exclusions are the inventory's.
pub struct StructureSummarizer {
    max_depth: usize,
    max_entries: usize,
    filter: PathFilter,
}

impl StructureSummarizer {
    pub fn new(max_depth: usize, max_entries: usize) -> Result<Self> {
        Ok(Self {
            max_depth,
            max_entries,
            filter: PathFilter::new(&[], EXCLUDED_DIRS)?,
        })
    }

    pub fn standard() -> Result<Self> {
        Self::new(MAX_STRUCTURE_DEPTH, MAX_STRUCTURE_ENTRIES)
    }

    /// One root-relative path per line, at most `max_entries` lines
    pub fn summarize<P: AsRef<Path>>(&self, root: P) -> String {
        self.entries(root).join("\n")
    }

    pub fn entries<P: AsRef<Path>>(&self, root: P) -> Vec<String> {
        let root: PathBuf = root.as_ref().to_path_buf();

        WalkDir::new(&root)
            .min_depth(1)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.should_skip(&root, entry))
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.path().strip_prefix(&root).ok().map(to_slash_path))
            .take(self.max_entries)
            .collect()
    }

    fn should_skip(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }

        if entry.file_name().to_string_lossy().starts_with('.') {
            return true;
        }

        entry.file_type().is_dir()
            && entry
                .path()
                .strip_prefix(root)
                .map(|relative| self.filter.is_excluded(relative))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn listing_includes_directories_and_skips_excluded_trees() {
        let temp = TempDir::new().unwrap();
        temp.child("src/lib.rs").write_str("").unwrap();
        temp.child("Makefile").write_str("").unwrap();
        temp.child("node_modules/left-pad/index.js").write_str("").unwrap();
        temp.child(".env").write_str("SECRET=1").unwrap();

        let listing = StructureSummarizer::standard().unwrap().summarize(temp.path());
        assert_eq!(listing, "Makefile\nsrc\nsrc/lib.rs");
    }

    #[test]
    fn excluded_directories_match_the_file_inventory() {
        let temp = TempDir::new().unwrap();
        let inventory = PathFilter::inventory().unwrap();
        for dir in EXCLUDED_DIRS.iter().filter(|d| !d.starts_with('.')) {
            temp.child(format!("{}/inner.txt", dir)).write_str("").unwrap();
            temp.child(format!("pkg/{}/inner.txt", dir)).write_str("").unwrap();
            assert!(inventory.is_excluded(Path::new(dir)));
        }
        temp.child("pkg/main.py").write_str("").unwrap();

        let entries = StructureSummarizer::standard().unwrap().entries(temp.path());
        assert_eq!(entries, vec!["pkg", "pkg/main.py"]);
    }

    #[test]
    fn listing_is_bounded_by_depth() {
        let temp = TempDir::new().unwrap();
        temp.child("a/b/c/d/deep.txt").write_str("").unwrap();

        let entries = StructureSummarizer::standard().unwrap().entries(temp.path());
        assert_eq!(entries, vec!["a", "a/b", "a/b/c"]);
    }

    #[test]
    fn listing_is_bounded_by_entry_count() {
        let temp = TempDir::new().unwrap();
        for i in 0..80 {
            temp.child(format!("file_{:02}.txt", i)).write_str("").unwrap();
        }

        let listing = StructureSummarizer::standard().unwrap().summarize(temp.path());
        assert_eq!(listing.lines().count(), MAX_STRUCTURE_ENTRIES);
        assert!(listing.starts_with("file_00.txt"));
    }
}
