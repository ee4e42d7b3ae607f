//! Buildpack framework component lifecycle: detect, compile and release.
pub mod app_dynamics_agent;
pub mod configurator;
pub mod notifier;

use crate::application::{ApplicationMetadata, Droplet};
use crate::defaults::{API_SERVICE_FILTER, PROXY_SERVICE_FILTER, SERVICE_FILTER};
use crate::java_opts::JavaOpts;
use crate::package::InstallError;
use crate::services::{ServiceFilter, Services, ServicesError};
use configurator::ConfigureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameworkError {
    #[error("{0}")]
    Services(#[from] ServicesError),
    #[error("installation failed: {0}")]
    Install(#[from] InstallError),
    #[error("configuration failed: {0}")]
    Configure(#[from] ConfigureError),
}

/// The application being staged and what the platform exposes about it.
#[derive(Debug, Clone)]
pub struct ApplicationContext {
    pub droplet: Droplet,
    pub services: Services,
    pub application: ApplicationMetadata,
}

pub trait Component {
    /// The detection tag when the component applies to the application, `None` otherwise.
    fn detect(&self, context: &ApplicationContext) -> Option<String>;

    /// Installs everything the component needs inside the droplet.
    fn compile(&self, context: &ApplicationContext) -> Result<(), FrameworkError>;

    /// Options the application must be launched with.
    fn release(&self, context: &ApplicationContext) -> Result<JavaOpts, FrameworkError>;
}

/// Filters selecting the controller service, the optional proxy and the optional deployment API
/// credentials among the bound services.
#[derive(Debug, Clone)]
pub struct ServiceFilters {
    pub primary: ServiceFilter,
    pub proxy: ServiceFilter,
    pub api: ServiceFilter,
}

impl ServiceFilters {
    pub fn try_default() -> Result<Self, ServicesError> {
        Ok(Self {
            primary: ServiceFilter::try_from(SERVICE_FILTER)?,
            proxy: ServiceFilter::try_from(PROXY_SERVICE_FILTER)?,
            api: ServiceFilter::try_from(API_SERVICE_FILTER)?,
        })
    }
}
