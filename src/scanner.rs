use crate::error::{Error, Result};
use crate::extractor::Framework;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing source trees.
///
/// The `FileScanner` recursively walks an input root and collects every file whose
/// extension is in its filter. Entries are visited in file-name order within each
/// directory, so the resulting list (and every route list built from it) is stable across
/// runs on an unchanged tree. Hidden directories and the framework's dependency/cache
/// directories (`node_modules`, `__pycache__`) are not descended into.
///
/// # Example
///
/// ```no_run
/// use route_docgen::scanner::FileScanner;
/// use route_docgen::Framework;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::for_framework(PathBuf::from("./my-app"), Framework::Flask);
/// let result = scanner.scan().unwrap();
/// println!("Found {} Python files", result.files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Matching files in deterministic walk order
    pub files: Vec<PathBuf>,
}

impl FileScanner {
    /// Creates a scanner for `root_path` accepting the given extensions (without dots).
    pub fn new(root_path: PathBuf, extensions: &[&str]) -> Self {
        Self {
            root_path,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            excluded_dirs: Vec::new(),
        }
    }

    /// Creates a scanner using `framework`'s extensions and excluded directories.
    pub fn for_framework(root_path: PathBuf, framework: Framework) -> Self {
        Self::new(root_path, framework.extensions()).with_excluded_dirs(framework.excluded_dirs())
    }

    pub fn with_excluded_dirs(mut self, dirs: &[&str]) -> Self {
        self.excluded_dirs
            .extend(dirs.iter().map(|d| d.to_string()));
        self
    }

    /// Scans the tree and collects all matching files.
    ///
    /// A root that is itself a file is returned as the only result when its extension
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the root does not exist, or [`Error::Io`] if a
    /// directory inside it cannot be read.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.exists() {
            return Err(Error::NotFound(self.root_path.clone()));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root itself
                if e.depth() == 0 {
                    return true;
                }
                if !e.file_type().is_dir() {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_excluded = self.excluded_dirs.iter().any(|d| *d == file_name);

                !is_hidden && !is_excluded
            })
        {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root_path.clone());
                let message = e.to_string();
                let io_error = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message));
                Error::io(path, io_error)
            })?;

            if entry.file_type().is_file() && self.accepts(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }

        debug!(
            "Scanned {}: {} matching files",
            self.root_path.display(),
            files.len()
        );

        Ok(ScanResult { files })
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }
}
