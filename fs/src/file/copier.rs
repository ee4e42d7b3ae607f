use crate::utils::{validate_path, FsError};
use crate::LocalFile;
use std::path::Path;
use std::{fs, io};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum CopyError {
    #[error("copying '{path}': {err}")]
    Io { path: String, err: io::Error },

    #[error("invalid path: {0}")]
    InvalidPath(#[from] FsError),
}

pub trait FileCopier {
    /// Copies every file below `source` into `destination`, keeping the relative layout and
    /// overwriting files that already exist.
    fn copy_dir(&self, source: &Path, destination: &Path) -> Result<(), CopyError>;
}

impl FileCopier for LocalFile {
    #[instrument(skip_all, fields(source = %source.display(), destination = %destination.display()))]
    fn copy_dir(&self, source: &Path, destination: &Path) -> Result<(), CopyError> {
        validate_path(source)?;
        validate_path(destination)?;
        copy_recursive(source, destination)
    }
}

fn copy_recursive(source: &Path, destination: &Path) -> Result<(), CopyError> {
    fs::create_dir_all(destination).map_err(|err| io_error(destination, err))?;
    for entry in fs::read_dir(source).map_err(|err| io_error(source, err))? {
        let entry = entry.map_err(|err| io_error(source, err))?;
        let from = entry.path();
        let to = destination.join(entry.file_name());
        let file_type = entry.file_type().map_err(|err| io_error(&from, err))?;
        if file_type.is_dir() {
            copy_recursive(&from, &to)?;
        } else {
            debug!("copying {} to {}", from.display(), to.display());
            fs::copy(&from, &to).map_err(|err| io_error(&from, err))?;
        }
    }
    Ok(())
}

fn io_error(path: &Path, err: io::Error) -> CopyError {
    CopyError::Io {
        path: path.to_string_lossy().into(),
        err,
    }
}
