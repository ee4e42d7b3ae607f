use super::configurator::{Configurator, ReleaseContext};
use super::notifier::{DeploymentNotifier, HttpDeploymentNotifier};
use super::{ApplicationContext, Component, FrameworkError, ServiceFilters};
use crate::config::{FrameworkConfig, StaticConfig};
use crate::defaults::{CREDENTIAL_HOST_NAME, DETECT_TAG_PREFIX};
use crate::java_opts::JavaOpts;
use crate::package::installer::RepositoryInstaller;
use crate::package::resources::DirectoryResourceCopier;
use crate::package::{Bundle, DependencyInstaller, ResourceCopier};
use crate::secret::FileSecretMaterializer;
use crate::services::ServiceRegistry;
use std::path::Path;
use tracing::{debug, info, instrument};

const BUNDLE_NAME: &str = "AppDynamics Agent";

/// Runs the AppDynamics Java agent alongside the application when an AppDynamics service is bound.
pub struct AppDynamicsAgent<I, C, N>
where
    I: DependencyInstaller,
    C: ResourceCopier,
    N: DeploymentNotifier,
{
    version: String,
    static_config: StaticConfig,
    installer: I,
    copier: C,
    configurator: Configurator<N>,
}

impl AppDynamicsAgent<RepositoryInstaller, DirectoryResourceCopier, HttpDeploymentNotifier> {
    pub fn try_from_config(
        config: &FrameworkConfig,
        resources_dir: &Path,
    ) -> Result<Self, FrameworkError> {
        Ok(Self::new(
            config.repository.version.clone(),
            config.static_config.clone(),
            RepositoryInstaller::try_new(config.repository.repository_root.clone())?,
            DirectoryResourceCopier::new(resources_dir),
            Configurator::new(
                ServiceFilters::try_default()?,
                HttpDeploymentNotifier::new(config.notification.clone()),
            ),
        ))
    }
}

impl<I, C, N> AppDynamicsAgent<I, C, N>
where
    I: DependencyInstaller,
    C: ResourceCopier,
    N: DeploymentNotifier,
{
    pub fn new(
        version: String,
        static_config: StaticConfig,
        installer: I,
        copier: C,
        configurator: Configurator<N>,
    ) -> Self {
        Self {
            version,
            static_config,
            installer,
            copier,
            configurator,
        }
    }

    /// Exactly one AppDynamics service with a controller host must be bound.
    pub fn supports(&self, context: &ApplicationContext) -> bool {
        context
            .services
            .one_service(&self.configurator.filters().primary, &[CREDENTIAL_HOST_NAME])
    }
}

impl<I, C, N> Component for AppDynamicsAgent<I, C, N>
where
    I: DependencyInstaller,
    C: ResourceCopier,
    N: DeploymentNotifier,
{
    fn detect(&self, context: &ApplicationContext) -> Option<String> {
        if !self.supports(context) {
            debug!("no single AppDynamics service with a controller host bound");
            return None;
        }
        // detect does not reach the repository, the tag carries the configured version pattern
        // (`4.5.+`) rather than the version compile resolves
        Some(format!("{DETECT_TAG_PREFIX}={}", self.version))
    }

    #[instrument(skip_all, fields(droplet = %context.droplet.root().display()))]
    fn compile(&self, context: &ApplicationContext) -> Result<(), FrameworkError> {
        let sandbox = context.droplet.sandbox();
        self.installer
            .download_and_unpack(&Bundle::new(BUNDLE_NAME, &self.version), sandbox)?;
        self.copier.copy_bundled_resources_into(sandbox)?;
        info!("{BUNDLE_NAME} installed in {}", sandbox.display());
        Ok(())
    }

    #[instrument(skip_all, fields(droplet = %context.droplet.root().display()))]
    fn release(&self, context: &ApplicationContext) -> Result<JavaOpts, FrameworkError> {
        let release_context = ReleaseContext {
            services: &context.services,
            application: &context.application,
            static_config: &self.static_config,
            droplet: &context.droplet,
        };
        let secrets = FileSecretMaterializer::new(context.droplet.sandbox());
        Ok(self.configurator.configure(&release_context, &secrets)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ApplicationMetadata, Droplet};
    use crate::framework::configurator::ConfigureError;
    use crate::framework::notifier::tests::MockDeploymentNotifier;
    use crate::package::tests::{MockDependencyInstaller, MockResourceCopier};
    use crate::package::InstallError;
    use crate::services::{ServiceBinding, Services};
    use assert_matches::assert_matches;
    use mockall::predicate;
    use mockall::Sequence;
    use std::path::PathBuf;
    use tempfile::tempdir;

    type TestAgent =
        AppDynamicsAgent<MockDependencyInstaller, MockResourceCopier, MockDeploymentNotifier>;

    fn agent(installer: MockDependencyInstaller, copier: MockResourceCopier) -> TestAgent {
        let mut notifier = MockDeploymentNotifier::new();
        notifier.expect_notify().never();
        AppDynamicsAgent::new(
            "4.5.+".to_string(),
            StaticConfig::default(),
            installer,
            copier,
            Configurator::new(ServiceFilters::try_default().unwrap(), notifier),
        )
    }

    fn idle_agent() -> TestAgent {
        let mut installer = MockDependencyInstaller::new();
        installer.expect_download_and_unpack().never();
        let mut copier = MockResourceCopier::new();
        copier.expect_copy_bundled_resources_into().never();
        agent(installer, copier)
    }

    fn context(root: &Path, bindings: Vec<ServiceBinding>) -> ApplicationContext {
        ApplicationContext {
            droplet: Droplet::new(root),
            services: Services::from(bindings),
            application: [("application_name", "myapp")].into_iter().collect::<ApplicationMetadata>(),
        }
    }

    fn appdynamics(host_name: &str) -> ServiceBinding {
        ServiceBinding::new("appdynamics", [("host-name", host_name)].into_iter().collect())
    }

    #[test]
    fn test_detect() {
        let context = context(Path::new("/tmp/app"), vec![appdynamics("ctrl.example.com")]);
        assert_eq!(
            idle_agent().detect(&context),
            Some("app-dynamics-agent=4.5.+".to_string())
        );
    }

    #[test]
    fn test_detect_tagged_service() {
        let binding = ServiceBinding::new("monitoring", [("host-name", "ctrl")].into_iter().collect())
            .with_label("user-provided")
            .with_tags(["app-dynamics"]);
        let context = context(Path::new("/tmp/app"), vec![binding]);
        assert!(idle_agent().detect(&context).is_some());
    }

    #[test]
    fn test_detect_not_applicable() {
        let agent = idle_agent();
        assert_eq!(agent.detect(&context(Path::new("/tmp/app"), vec![])), None);
        assert_eq!(agent.detect(&context(Path::new("/tmp/app"), vec![appdynamics("")])), None);
        assert_eq!(
            agent.detect(&context(
                Path::new("/tmp/app"),
                vec![appdynamics("a"), appdynamics("b")]
            )),
            None
        );
    }

    #[test]
    fn test_compile() {
        let mut sequence = Sequence::new();
        let sandbox = PathBuf::from("/tmp/app/.java-buildpack/app_dynamics_agent");

        let mut installer = MockDependencyInstaller::new();
        installer
            .expect_download_and_unpack()
            .with(
                predicate::eq(Bundle::new("AppDynamics Agent", "4.5.+")),
                predicate::eq(sandbox.clone()),
            )
            .once()
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));
        let mut copier = MockResourceCopier::new();
        copier
            .expect_copy_bundled_resources_into()
            .with(predicate::eq(sandbox))
            .once()
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));

        agent(installer, copier)
            .compile(&context(Path::new("/tmp/app"), vec![appdynamics("ctrl")]))
            .unwrap();
    }

    #[test]
    fn test_compile_install_failure() {
        let mut installer = MockDependencyInstaller::new();
        installer.expect_download_and_unpack().once().returning(|bundle, _| {
            Err(InstallError::VersionNotFound(
                bundle.name.clone(),
                bundle.version.clone(),
            ))
        });
        let mut copier = MockResourceCopier::new();
        copier.expect_copy_bundled_resources_into().never();

        let result = agent(installer, copier)
            .compile(&context(Path::new("/tmp/app"), vec![appdynamics("ctrl")]));
        assert_matches!(
            result,
            Err(FrameworkError::Install(InstallError::VersionNotFound(_, _)))
        );
    }

    #[test]
    fn test_release() {
        let app = tempdir().unwrap();
        let proxy = ServiceBinding::new(
            "proxy",
            [("host", "proxy.example.com"), ("password", "pr0xy")]
                .into_iter()
                .collect(),
        );
        let context = context(app.path(), vec![appdynamics("ctrl.example.com"), proxy]);

        let java_opts = idle_agent().release(&context).unwrap();

        let password_file = context.droplet.sandbox().join("proxyPass.txt");
        assert_eq!(std::fs::read_to_string(password_file).unwrap(), "pr0xy");
        assert_eq!(
            java_opts.render(&context.droplet).join(" "),
            "-javaagent:$PWD/.java-buildpack/app_dynamics_agent/javaagent.jar \
             -Dappdynamics.agent.applicationName=myapp \
             -Dappdynamics.agent.tierName=myapp \
             -Dappdynamics.agent.nodeName= \
             -Dappdynamics.controller.hostName=ctrl.example.com \
             -Dappdynamics.agent.logs.dir=$PWD/.java-buildpack/app_dynamics_agent/logs \
             -Dappdynamics.http.proxyHost=proxy.example.com \
             -Dappdynamics.http.proxyPasswordFile=$PWD/.java-buildpack/app_dynamics_agent/proxyPass.txt"
        );
    }

    #[test]
    fn test_release_app_dir_with_parent_components() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("work")).unwrap();
        let proxy = ServiceBinding::new(
            "proxy",
            [("host", "proxy.example.com"), ("password", "pr0xy")]
                .into_iter()
                .collect(),
        );
        let context = context(
            &dir.path().join("work/../app"),
            vec![appdynamics("ctrl.example.com"), proxy],
        );

        let java_opts = idle_agent().release(&context).unwrap();

        let password_file = dir
            .path()
            .join("app/.java-buildpack/app_dynamics_agent/proxyPass.txt");
        assert_eq!(std::fs::read_to_string(password_file).unwrap(), "pr0xy");
        assert!(java_opts.render(&context.droplet).contains(
            &"-Dappdynamics.http.proxyPasswordFile=$PWD/.java-buildpack/app_dynamics_agent/proxyPass.txt"
                .to_string()
        ));
    }

    #[test]
    fn test_release_missing_host_name() {
        let app = tempdir().unwrap();
        let proxy = ServiceBinding::new("proxy", [("password", "pr0xy")].into_iter().collect());
        let context = context(app.path(), vec![appdynamics(""), proxy]);

        let result = idle_agent().release(&context);

        assert_matches!(
            result,
            Err(FrameworkError::Configure(ConfigureError::MissingCredential("host-name")))
        );
        assert!(!context.droplet.sandbox().exists());
    }
}
