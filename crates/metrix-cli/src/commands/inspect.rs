//! `metrix inspect` command implementation

use metrix_core::analysis::{self, FileMetrics};
use std::path::Path;

use crate::error::{CliError, Result};

/// Metrics of one file, path recorded relative to its parent directory.
pub fn inspect_file(file: &Path) -> Result<FileMetrics> {
    if !file.is_file() {
        return Err(CliError::FileNotFound(file.display().to_string()));
    }

    let root = file.parent().unwrap_or_else(|| Path::new(""));
    Ok(analysis::analyze_file(root, file, None)?)
}

pub fn run(file: &Path) -> Result<()> {
    let metrics = inspect_file(file)?;
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("Counter.java");
        std::fs::write(&path, "class Counter { int n; void inc() { n++; } }").unwrap();

        let metrics = inspect_file(&path).unwrap();
        assert_eq!(metrics.path, "Counter.java");
        assert_eq!(metrics.classes[0].number_attributes, 1);
        assert_eq!(metrics.classes[0].methods[0].name, "inc");
    }

    #[test]
    fn test_inspect_missing_file() {
        let err = inspect_file(Path::new("/definitely/not/here/X.java")).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }
}
