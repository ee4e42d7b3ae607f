use super::utils::{validate_path, FsError};
use std::fs::DirBuilder;
use std::path::Path;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug, Clone)]
pub enum DirectoryManagementError {
    #[error("cannot create directory '{0}' : {1}")]
    ErrorCreatingDirectory(String, String),

    #[error("invalid directory: {0}")]
    InvalidDirectory(#[from] FsError),
}

pub trait DirectoryManager {
    /// Creates the directory and all its missing parents. Existing directories are left untouched.
    fn create(&self, path: &Path) -> Result<(), DirectoryManagementError>;
}

pub struct DirectoryManagerFs;

impl DirectoryManager for DirectoryManagerFs {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn create(&self, path: &Path) -> Result<(), DirectoryManagementError> {
        validate_path(path)?;
        owner_only_builder().create(path).map_err(|err| {
            DirectoryManagementError::ErrorCreatingDirectory(
                path.display().to_string(),
                err.to_string(),
            )
        })
    }
}

/// Recursive builder, new directories are only accessible by their owner on unix.
fn owner_only_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(target_family = "unix")]
    {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
        builder.mode(crate::utils::get_directory_permissions().mode());
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_to_create_cannot_contain_dots() {
        let path = PathBuf::from("some/path/../with/../dots");

        let result = DirectoryManagerFs.create(&path);

        assert_eq!(
            "invalid directory: dots disallowed in path `some/path/../with/../dots`".to_string(),
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn test_nested_folder_creation() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join(".java-buildpack").join("app_dynamics_agent");

        DirectoryManagerFs.create(path.as_path()).unwrap();

        #[cfg(target_family = "unix")]
        {
            use std::fs::metadata;
            use std::os::unix::fs::PermissionsExt;
            assert_eq!(
                crate::utils::get_directory_permissions().mode() & 0o777,
                metadata(&path).unwrap().permissions().mode() & 0o777
            );
        }
        assert!(path.is_dir());
    }

    #[test]
    fn test_folder_creation_should_not_fail_if_exists() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("sandbox");

        DirectoryManagerFs.create(path.as_path()).unwrap();
        DirectoryManagerFs.create(path.as_path()).unwrap();
        assert!(path.is_dir());
    }
}
