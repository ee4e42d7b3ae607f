//! Filesystem helpers used to materialize files inside a droplet sandbox.
pub mod directory_manager;
pub mod file;
pub mod utils;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFile;

#[cfg(feature = "mocks")]
pub mod mock {
    use crate::file::copier::{CopyError, FileCopier};
    use crate::file::writer::{FileWriter, WriteError};
    use mockall::mock;
    use std::path::Path;

    mock! {
        pub LocalFile {}

        impl FileWriter for LocalFile {
            fn write(&self, path: &Path, content: &[u8]) -> Result<(), WriteError>;
        }

        impl FileCopier for LocalFile {
            fn copy_dir(&self, source: &Path, destination: &Path) -> Result<(), CopyError>;
        }
    }
}
