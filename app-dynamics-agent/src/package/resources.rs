use super::{InstallError, ResourceCopier};
use crate::defaults::COMPONENT_ID;
use fs::file::copier::FileCopier;
use fs::LocalFile;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copies the resources bundled for this component, found under `{resources_dir}/app_dynamics_agent`.
/// Having no bundled resources is not an error.
pub struct DirectoryResourceCopier<F: FileCopier = LocalFile> {
    resources_dir: PathBuf,
    copier: F,
}

impl DirectoryResourceCopier<LocalFile> {
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self::with_copier(resources_dir, LocalFile)
    }
}

impl<F: FileCopier> DirectoryResourceCopier<F> {
    pub fn with_copier(resources_dir: impl Into<PathBuf>, copier: F) -> Self {
        Self {
            resources_dir: resources_dir.into(),
            copier,
        }
    }
}

impl<F: FileCopier> ResourceCopier for DirectoryResourceCopier<F> {
    fn copy_bundled_resources_into(&self, destination: &Path) -> Result<(), InstallError> {
        let source = self.resources_dir.join(COMPONENT_ID);
        if !source.is_dir() {
            debug!("no bundled resources found in {}", source.display());
            return Ok(());
        }
        self.copier.copy_dir(&source, destination)?;
        Ok(())
    }
}
