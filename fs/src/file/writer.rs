use crate::directory_manager::{DirectoryManagementError, DirectoryManager, DirectoryManagerFs};
use crate::utils::{validate_path, FsError};
use crate::LocalFile;
use std::io::Write;
use std::path::Path;
use std::{fs, io};
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("directory error: {0}")]
    DirectoryError(#[from] DirectoryManagementError),

    #[error("error creating file: {0}")]
    ErrorCreatingFile(#[from] io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] FsError),
}

pub trait FileWriter {
    /// Writes `content` to `path`, replacing any previous content. Missing parent directories
    /// are created.
    fn write(&self, path: &Path, content: &[u8]) -> Result<(), WriteError>;
}

impl FileWriter for LocalFile {
    /// On Unix the file is restricted to its owner (0600), also when it already existed.
    #[instrument(skip_all, fields(path = %path.display()))]
    fn write(&self, path: &Path, content: &[u8]) -> Result<(), WriteError> {
        validate_path(path)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            DirectoryManagerFs.create(parent)?;
        }

        let mut file_options = fs::OpenOptions::new();
        file_options.create(true).write(true).truncate(true);

        #[cfg(target_family = "unix")]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            file_options.mode(crate::utils::get_file_permissions().mode());
        }

        file_options.open(path)?.write_all(content)?;

        // the open mode is only honoured on creation
        #[cfg(target_family = "unix")]
        fs::set_permissions(path, crate::utils::get_file_permissions())?;

        Ok(())
    }
}

#[cfg(feature = "mocks")]
pub mod mock {
    ////////////////////////////////////////////////////////////////////////////////////
    // Mock
    ////////////////////////////////////////////////////////////////////////////////////
    use super::*;
    use crate::mock::MockLocalFile;
    use mockall::predicate;
    use std::io::ErrorKind;

    impl MockLocalFile {
        pub fn should_write(&mut self, path: &Path, content: Vec<u8>) {
            self.expect_write()
                .with(predicate::eq(path.to_path_buf()), predicate::eq(content))
                .once()
                .returning(|_, _| Ok(()));
        }

        pub fn should_not_write(&mut self, path: &Path, content: Vec<u8>) {
            self.expect_write()
                .with(predicate::eq(path.to_path_buf()), predicate::eq(content))
                .once()
                .returning(|_, _| {
                    Err(WriteError::ErrorCreatingFile(io::Error::from(
                        ErrorKind::PermissionDenied,
                    )))
                });
        }
    }
}
