//! Installation of the versioned agent bundle and of the resources shipped with the component.
pub mod extract;
pub mod index;
pub mod installer;
pub mod resources;

use crate::http::client::HttpResponseError;
use crate::http::reqwest::ReqwestBuildError;
use extract::ExtractError;
use fs::directory_manager::DirectoryManagementError;
use fs::file::copier::CopyError;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("could not fetch repository index `{0}`: {1}")]
    Index(String, String),
    #[error("no version of `{0}` matches `{1}`")]
    VersionNotFound(String, String),
    #[error("could not download `{0}`: {1}")]
    Download(String, String),
    #[error("could not create the installation directory: {0}")]
    Destination(#[from] DirectoryManagementError),
    #[error("{0}")]
    Extract(#[from] ExtractError),
    #[error("could not copy bundled resources: {0}")]
    Resources(#[from] CopyError),
    #[error("{0}")]
    HttpClient(#[from] ReqwestBuildError),
    #[error("{0}")]
    Http(#[from] HttpResponseError),
}

/// Identifies the bundle to install: a name used for reporting and a version pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub name: String,
    pub version: String,
}

impl Bundle {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

pub trait DependencyInstaller {
    /// Makes the bundle available and unpacks it into `destination`.
    fn download_and_unpack(&self, bundle: &Bundle, destination: &Path) -> Result<(), InstallError>;
}

pub trait ResourceCopier {
    fn copy_bundled_resources_into(&self, destination: &Path) -> Result<(), InstallError>;
}
