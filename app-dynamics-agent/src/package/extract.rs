use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use tar::Archive;
use thiserror::Error;
use tracing::{debug, instrument};
use zip::ZipArchive;

#[derive(Debug, Error)]
#[error("extract error: {0}")]
pub struct ExtractError(pub String);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArchiveType {
    Zip,
    TarGz,
}

impl ArchiveType {
    /// Guesses the archive type from the suffix of the location it is downloaded from.
    pub fn from_uri(uri: &str) -> Result<Self, ExtractError> {
        let path = uri.split(['?', '#']).next().unwrap_or_default();
        if path.ends_with(".zip") {
            Ok(ArchiveType::Zip)
        } else if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            Ok(ArchiveType::TarGz)
        } else {
            Err(ExtractError(format!("unsupported archive type: {uri}")))
        }
    }

    #[instrument(skip_all, fields(archive_path = %archive_path.to_string_lossy()), name = "extracting_archive")]
    pub fn extract(&self, archive_path: &Path, dest_path: &Path) -> Result<(), ExtractError> {
        match self {
            ArchiveType::TarGz => extract_tar_gz(archive_path, dest_path),
            ArchiveType::Zip => extract_zip(archive_path, dest_path),
        }
    }
}

/// Extracts a tar.gz archive located at `tar_path` into the directory at `destination_path`.
/// Files in the archive which have a '..' in their path are skipped during the unpacking process.
fn extract_tar_gz(tar_path: &Path, destination_path: &Path) -> Result<(), ExtractError> {
    debug!("Extracting tar.gz archive to '{:?}'", destination_path);

    let tar_gz =
        File::open(tar_path).map_err(|e| ExtractError(format!("opening tar.gz file: {e}")))?;
    let tar = GzDecoder::new(tar_gz);
    Archive::new(tar)
        .unpack(destination_path)
        .map_err(|e| ExtractError(format!("extracting tar.gz file: {e}")))
}

/// Extracts a zip archive located at `zip_path` into the directory at `destination`, overwriting
/// files if they already exist. Extraction is not atomic, some files may be left on disk on error.
fn extract_zip(zip_path: &Path, destination: &Path) -> Result<(), ExtractError> {
    debug!("Extracting zip archive to '{:?}'", destination);

    let file = File::open(zip_path).map_err(|e| ExtractError(format!("opening zip file: {e}")))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| ExtractError(format!("reading zip file: {e}")))?;

    archive
        .extract(destination)
        .map_err(|e| ExtractError(format!("extracting zip file: {e}")))
}
