use anyhow::Result;
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target"];

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a project directory to find the source files
/// whose comments should be searched for annotations. It automatically skips dependency and
/// build directories (`node_modules`, `target`) and hidden directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use openapi_from_comments::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./api/controllers"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} source files", result.files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    extensions: Vec<String>,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Paths of all matching files, sorted by file name within each directory
    pub files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory, matching `.js` files.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The root directory to scan
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            extensions: vec!["js".to_string()],
        }
    }

    /// Replaces the matched file extensions (without the leading dot, case-insensitive).
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    fn matches(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Scans the directory tree and collects all files with a matching extension.
    ///
    /// Entries are visited in file-name order so repeated scans of an unchanged tree
    /// return the same list. If any directories or files cannot be accessed, warnings are
    /// logged and added to the result, but scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                if !e.file_type().is_dir() {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && !SKIPPED_DIRS.iter().any(|d| *d == file_name)
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && self.matches(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult { files, warnings })
    }
}
