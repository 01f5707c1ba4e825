//! ZIP extraction into a project's source root.
//!
//! The archive is untrusted input. Every entry name is normalized lexically
//! and must stay below the destination; absolute paths, drive prefixes and
//! `..` segments that climb out of the destination abort the extraction.
//! Symbolic-link entries are skipped.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Unix file-type bits for a symbolic link
const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive not found: {0}")]
    Missing(PathBuf),

    #[error("Failed to read archive {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read archive entry #{index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry '{0}' escapes the destination directory")]
    PathTraversal(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Extraction task failed: {0}")]
    Task(String),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// What an extraction wrote
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    pub skipped: usize,
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Resolve an entry name against `destination`, refusing anything that would
/// land outside it.
pub fn resolve_entry_path(destination: &Path, entry_name: &str) -> ArchiveResult<PathBuf> {
    // Archivers on Windows sometimes write backslash separators
    let normalized = entry_name.replace('\\', "/");
    let mut relative = PathBuf::new();

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {},
            Component::ParentDir => {
                if !relative.pop() {
                    return Err(ArchiveError::PathTraversal(entry_name.to_string()));
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::PathTraversal(entry_name.to_string()));
            },
        }
    }

    // A drive letter such as "C:" is a normal component on Unix
    if relative
        .components()
        .next()
        .and_then(|c| c.as_os_str().to_str())
        .is_some_and(|first| first.len() == 2 && first.ends_with(':'))
    {
        return Err(ArchiveError::PathTraversal(entry_name.to_string()));
    }

    let resolved = destination.join(&relative);
    if !resolved.starts_with(destination) {
        return Err(ArchiveError::PathTraversal(entry_name.to_string()));
    }

    Ok(resolved)
}

fn reset_destination(destination: &Path) -> ArchiveResult<()> {
    match std::fs::remove_dir_all(destination) {
        Ok(()) => {},
        Err(e) if e.kind() == io::ErrorKind::NotFound => {},
        Err(e) => return Err(io_err(destination)(e)),
    }
    std::fs::create_dir_all(destination).map_err(io_err(destination))
}

/// Unpack `archive` into `destination`.
///
/// The destination is deleted and recreated first, so the result mirrors
/// exactly the archive's current contents. Any failure aborts the whole
/// extraction; files written before the failing entry stay on disk.
pub fn extract(archive: &Path, destination: &Path) -> ArchiveResult<ExtractionSummary> {
    reset_destination(destination)?;

    let file = File::open(archive).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ArchiveError::Missing(archive.to_path_buf()),
        _ => io_err(archive)(e),
    })?;

    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|source| {
        ArchiveError::Malformed {
            path: archive.to_path_buf(),
            source,
        }
    })?;

    let mut summary = ExtractionSummary::default();

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|source| ArchiveError::Entry { index, source })?;

        let target = resolve_entry_path(destination, entry.name())?;

        if entry.is_dir() {
            std::fs::create_dir_all(&target).map_err(io_err(&target))?;
            summary.directories += 1;
            continue;
        }

        if entry.unix_mode().is_some_and(|mode| mode & S_IFMT == S_IFLNK) {
            debug!(entry = entry.name(), "Skipping symbolic link entry");
            summary.skipped += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let mut out = File::create(&target).map_err(io_err(&target))?;
        summary.bytes += io::copy(&mut entry, &mut out).map_err(io_err(&target))?;
        summary.files += 1;
    }

    info!(
        archive = %archive.display(),
        files = summary.files,
        directories = summary.directories,
        skipped = summary.skipped,
        bytes = summary.bytes,
        "Archive extracted"
    );

    Ok(summary)
}

/// [`extract`] on the blocking thread pool.
pub async fn extract_blocking(
    archive: PathBuf,
    destination: PathBuf,
) -> ArchiveResult<ExtractionSummary> {
    tokio::task::spawn_blocking(move || extract(&archive, &destination))
        .await
        .map_err(|e| ArchiveError::Task(e.to_string()))?
}
