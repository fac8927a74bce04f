//! Document output for poster generation

use super::naming::{base_file_name, numbered_file_name};
use crate::constants::MAX_NAME_ATTEMPTS;
use crate::options::{CollisionPolicy, TiledPosterOptions};
use crate::types::*;
use lopdf::Document;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Save a document to an explicit path, replacing any existing file
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || serialize(&mut doc)).await??;
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| output_error(&path, source))?;
    Ok(())
}

/// Write the finished poster into the output folder.
///
/// The bytes go to a temp file inside the folder first and are then moved
/// into place. A failed run never leaves a partial poster behind.
pub(crate) fn save_poster(
    mut doc: Document,
    options: &TiledPosterOptions,
) -> Result<GeneratedFile> {
    if options.compress {
        doc.compress();
    }
    let bytes = serialize(&mut doc)?;

    let folder = &options.output_folder;
    std::fs::create_dir_all(folder).map_err(|source| output_error(folder, source))?;

    let mut temp = NamedTempFile::new_in(folder).map_err(|source| output_error(folder, source))?;
    temp.write_all(&bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|source| output_error(temp.path(), source))?;

    let base = base_file_name(&options.naming, chrono::Utc::now().timestamp());
    let path = persist(temp, folder, &base, options.on_collision)?;
    log::debug!("Saved {} bytes to {}", bytes.len(), path.display());

    Ok(GeneratedFile::new(path))
}

fn serialize(doc: &mut Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

/// Move the temp file to its final name under `policy`
fn persist(
    mut temp: NamedTempFile,
    folder: &Path,
    base: &str,
    policy: CollisionPolicy,
) -> Result<PathBuf> {
    let target = folder.join(base);

    match policy {
        CollisionPolicy::Overwrite => {
            temp.persist(&target)
                .map_err(|e| output_error(&target, e.error))?;
            Ok(target)
        }
        CollisionPolicy::Fail => match temp.persist_noclobber(&target) {
            Ok(_) => Ok(target),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                Err(PosterError::FilenameCollision { path: target })
            }
            Err(e) => Err(output_error(&target, e.error)),
        },
        CollisionPolicy::Disambiguate => {
            for attempt in 0..MAX_NAME_ATTEMPTS {
                let candidate = folder.join(numbered_file_name(base, attempt));
                match temp.persist_noclobber(&candidate) {
                    Ok(_) => {
                        if attempt > 0 {
                            log::info!(
                                "{} already exists, wrote {} instead",
                                base,
                                candidate.display()
                            );
                        }
                        return Ok(candidate);
                    }
                    Err(e) if e.error.kind() == ErrorKind::AlreadyExists => temp = e.file,
                    Err(e) => return Err(output_error(&candidate, e.error)),
                }
            }
            Err(PosterError::FilenameCollision { path: target })
        }
    }
}

fn output_error(path: &Path, source: std::io::Error) -> PosterError {
    PosterError::OutputIo {
        path: path.to_owned(),
        source,
    }
}
