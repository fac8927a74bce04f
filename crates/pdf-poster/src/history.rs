//! Listing of previously generated posters
//!
//! The listing is a convenience view over the output folder, not
//! authoritative state: it can always be rebuilt with [`GeneratedFiles::scan`].

use crate::constants::OUTPUT_EXTENSION;
use crate::types::*;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// List the posters in `folder`, newest first.
///
/// Files are ordered by creation time, or modification time where the
/// platform does not record creation. A missing folder is an empty listing.
pub fn list_generated_files(folder: impl AsRef<Path>) -> Result<Vec<GeneratedFile>> {
    let folder = folder.as_ref();
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !is_pdf(&path) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((created, path));
    }

    files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    Ok(files
        .into_iter()
        .map(|(_, path)| GeneratedFile::new(path))
        .collect())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION))
        .unwrap_or(false)
}

/// Most-recent-first read model of generated posters.
///
/// Owned by the embedding application, which calls [`GeneratedFiles::record`]
/// after each successful run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedFiles {
    files: Vec<GeneratedFile>,
}

impl GeneratedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the listing from the contents of `folder`
    pub fn scan(folder: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            files: list_generated_files(folder)?,
        })
    }

    /// Put a newly generated file at the front of the listing
    pub fn record(&mut self, file: GeneratedFile) {
        self.files.retain(|existing| existing != &file);
        self.files.insert(0, file);
    }

    pub fn latest(&self) -> Option<&GeneratedFile> {
        self.files.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
