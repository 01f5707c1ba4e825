//! Candidate source files under an extraction root.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every file under `root` whose name ends with the configured suffix, in a
/// stable order (directory walk sorted by file name).
#[derive(Debug, Clone)]
pub struct SourceFileSet {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl SourceFileSet {
    /// Walk `root` recursively. Any unreadable directory entry fails the walk.
    pub fn discover(root: impl Into<PathBuf>, suffix: &str) -> Result<Self, walkdir::Error> {
        let root = root.into();
        let mut files = Vec::new();

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.file_name().to_string_lossy().ends_with(suffix)
            {
                files.push(entry.into_path());
            }
        }

        Ok(Self { root, files })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consecutive slices of at most `size` files, in enumeration order.
    pub fn batches(&self, size: usize) -> std::slice::Chunks<'_, PathBuf> {
        self.files.chunks(size.max(1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "class X {}").unwrap();
    }

    #[test]
    fn test_discovers_matching_files_in_stable_order() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b/Beta.java");
        touch(tmp.path(), "a/z/Zed.java");
        touch(tmp.path(), "a/Alpha.java");
        touch(tmp.path(), "a/notes.txt");
        touch(tmp.path(), "Root.java");
        std::fs::create_dir_all(tmp.path().join("empty.java")).unwrap();

        let set = SourceFileSet::discover(tmp.path(), ".java").unwrap();
        let names: Vec<_> = set
            .files()
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, vec!["Root.java", "a/Alpha.java", "a/z/Zed.java", "b/Beta.java"]);
    }

    #[test]
    fn test_empty_directories_yield_nothing() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("src/main/java")).unwrap();

        let set = SourceFileSet::discover(tmp.path(), ".java").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_batches_cover_every_file_once() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            touch(tmp.path(), &format!("F{}.java", i));
        }

        let set = SourceFileSet::discover(tmp.path(), ".java").unwrap();
        let sizes: Vec<_> = set.batches(2).map(<[PathBuf]>::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(SourceFileSet::discover(tmp.path().join("gone"), ".java").is_err());
    }
}
