//! Input discovery for merge sessions

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::session::InputFile;

/// Extensions picked up when walking a directory
pub const INPUT_EXTENSIONS: [&str; 3] = ["docx", "txt", "pdf"];

/// Errors that can occur while collecting input files
#[derive(Debug)]
pub enum WalkerError {
    /// IO error
    Io(std::io::Error),
    /// An input path does not exist
    NotFound(PathBuf),
}

impl From<std::io::Error> for WalkerError {
    fn from(err: std::io::Error) -> Self {
        WalkerError::Io(err)
    }
}

impl std::fmt::Display for WalkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkerError::Io(e) => write!(f, "IO error: {}", e),
            WalkerError::NotFound(path) => write!(f, "Input not found: {}", path.display()),
        }
    }
}

impl std::error::Error for WalkerError {}

/// Expand the given paths into input files
///
/// Files are kept as given, whatever their extension; directories are walked
/// in file-name order for `.docx`, `.txt` and `.pdf` files. Word lock files
/// (`~$name.docx`) are skipped. A path listed twice is only returned once.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, WalkerError> {
    let mut inputs: Vec<PathBuf> = Vec::new();

    for path in paths {
        if path.is_file() {
            push_unique(&mut inputs, path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(false).sort_by_file_name() {
                let entry = entry.map_err(std::io::Error::other)?;
                if entry.file_type().is_file() && is_input_file(entry.path()) {
                    push_unique(&mut inputs, entry.into_path());
                }
            }
        } else {
            return Err(WalkerError::NotFound(path.clone()));
        }
    }

    log::info!("Collected {} input file(s)", inputs.len());
    Ok(inputs)
}

/// Read one input file from disk
pub fn read_input(path: &Path) -> Result<InputFile, WalkerError> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(InputFile::new(name, bytes))
}

fn is_input_file(path: &Path) -> bool {
    let lock_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"));
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    !lock_file && extension.is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext.as_str()))
}

fn push_unique(inputs: &mut Vec<PathBuf>, path: PathBuf) {
    if !inputs.contains(&path) {
        inputs.push(path);
    }
}
