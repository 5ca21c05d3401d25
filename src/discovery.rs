// Local CSV file discovery

use crate::error::{PlotError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// CSV files found in a directory.
#[derive(Debug)]
pub struct Discovery {
    pub directory: PathBuf,
    /// File names, sorted.
    pub files: Vec<String>,
    /// Set when the directory is missing or unreadable; the list is then empty.
    pub warning: Option<PlotError>,
}

impl Discovery {
    /// Full path of a discovered file. Names outside the list are rejected.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if self.files.iter().any(|f| f == name) {
            Ok(self.directory.join(name))
        } else {
            Err(PlotError::UnknownFile {
                name: name.to_string(),
                directory: self.directory.clone(),
            })
        }
    }
}

/// List the `.csv` files directly inside `directory`.
///
/// A missing or unreadable directory is reported through
/// `Discovery::warning`, not as an error; uploads remain usable without it.
pub fn discover_csv_files(directory: &Path) -> Discovery {
    let listing = if directory.is_dir() {
        list_csv_files(directory).map_err(|source| PlotError::UnreadableDirectory {
            path: directory.to_path_buf(),
            source,
        })
    } else {
        Err(PlotError::MissingDirectory {
            path: directory.to_path_buf(),
        })
    };

    match listing {
        Ok(files) => {
            debug!(directory = %directory.display(), count = files.len(), "discovered csv files");
            Discovery {
                directory: directory.to_path_buf(),
                files,
                warning: None,
            }
        }
        Err(warning) => {
            warn!("{}. Upload a CSV file instead.", warning);
            Discovery {
                directory: directory.to_path_buf(),
                files: vec![],
                warning: Some(warning),
            }
        }
    }
}

fn list_csv_files(directory: &Path) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(".csv") {
                files.push(name.to_string());
            }
        }
    }
    files.sort();
    Ok(files)
}
