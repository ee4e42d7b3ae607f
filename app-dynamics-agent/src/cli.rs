use crate::application::{ApplicationMetadata, ApplicationMetadataError, Droplet};
use crate::config::{ConfigError, FrameworkConfig};
use crate::defaults::{VCAP_APPLICATION_ENV, VCAP_SERVICES_ENV};
use crate::framework::app_dynamics_agent::AppDynamicsAgent;
use crate::framework::notifier::HttpDeploymentNotifier;
use crate::framework::{ApplicationContext, Component, FrameworkError};
use crate::logging::config::LoggingError;
use crate::package::installer::RepositoryInstaller;
use crate::package::resources::DirectoryResourceCopier;
use crate::services::{Services, ServicesError};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not read the component config: `{0}`")]
    ConfigRead(#[from] ConfigError),
    #[error("Could not initialize logging: `{0}`")]
    LoggingInit(#[from] LoggingError),
    #[error("Invalid `VCAP_SERVICES`: `{0}`")]
    Services(#[from] ServicesError),
    #[error("Invalid `VCAP_APPLICATION`: `{0}`")]
    Application(#[from] ApplicationMetadataError),
    #[error("{0}")]
    Framework(#[from] FrameworkError),
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
pub struct Cli {
    #[command(subcommand)]
    phase: Phase,
}

#[derive(Debug, Subcommand)]
enum Phase {
    /// Print the detection tag when an AppDynamics service is bound, exit with 1 otherwise
    Detect(PhaseArgs),
    /// Install the agent in the application directory
    Compile(CompileArgs),
    /// Print the java options the application must be launched with
    Release(PhaseArgs),
}

#[derive(Debug, Args)]
struct PhaseArgs {
    /// Application directory being staged
    #[arg(long)]
    app_dir: PathBuf,

    /// Component configuration file
    #[arg(long)]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct CompileArgs {
    #[command(flatten)]
    phase: PhaseArgs,

    /// Directory holding the resources bundled with the buildpack
    #[arg(long, default_value = "resources")]
    resources_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PhaseKind {
    Detect,
    Compile,
    Release,
}

/// Result of a phase, as it has to be reported to the buildpack.
#[derive(Debug, PartialEq)]
pub enum PhaseOutput {
    Detected(String),
    NotApplicable,
    Compiled,
    Released(String),
}

type Agent = AppDynamicsAgent<RepositoryInstaller, DirectoryResourceCopier, HttpDeploymentNotifier>;

/// A phase ready to run, with logging initialized.
pub struct PhaseCommand {
    kind: PhaseKind,
    agent: Agent,
    context: ApplicationContext,
}

impl Cli {
    /// Parses command line arguments, loads the configuration and initializes logging.
    pub fn init() -> Result<PhaseCommand, CliError> {
        Self::parse().into_command()
    }

    fn into_command(self) -> Result<PhaseCommand, CliError> {
        let (kind, args, resources_dir) = match self.phase {
            Phase::Detect(args) => (PhaseKind::Detect, args, None),
            Phase::Compile(CompileArgs {
                phase,
                resources_dir,
            }) => (PhaseKind::Compile, phase, Some(resources_dir)),
            Phase::Release(args) => (PhaseKind::Release, args, None),
        };

        let config = FrameworkConfig::load(&args.config)?;
        config.log.try_init()?;
        debug!(config = %args.config.display(), "component config loaded");

        let context = application_context(
            args.app_dir,
            std::env::var(VCAP_SERVICES_ENV).ok(),
            std::env::var(VCAP_APPLICATION_ENV).ok(),
        )?;
        let agent = AppDynamicsAgent::try_from_config(
            &config,
            &resources_dir.unwrap_or_else(|| PathBuf::from("resources")),
        )?;

        Ok(PhaseCommand {
            kind,
            agent,
            context,
        })
    }
}

impl PhaseCommand {
    pub fn run(self) -> Result<PhaseOutput, CliError> {
        info!(phase = ?self.kind, app_dir = %self.context.droplet.root().display(), "Running");
        let output = match self.kind {
            PhaseKind::Detect => match self.agent.detect(&self.context) {
                Some(tag) => PhaseOutput::Detected(tag),
                None => PhaseOutput::NotApplicable,
            },
            PhaseKind::Compile => {
                self.agent.compile(&self.context)?;
                PhaseOutput::Compiled
            }
            PhaseKind::Release => {
                let java_opts = self.agent.release(&self.context)?;
                PhaseOutput::Released(java_opts.render(&self.context.droplet).join(" "))
            }
        };
        Ok(output)
    }
}

/// Builds the application context from the platform provided documents. Unset documents are
/// treated as empty.
fn application_context(
    app_dir: PathBuf,
    vcap_services: Option<String>,
    vcap_application: Option<String>,
) -> Result<ApplicationContext, CliError> {
    let services = Services::from_vcap_services(vcap_services.as_deref().unwrap_or_default())?;
    let application = match vcap_application.as_deref().map(str::trim) {
        Some(content) if !content.is_empty() => ApplicationMetadata::from_json(content)?,
        _ => ApplicationMetadata::default(),
    };
    Ok(ApplicationContext {
        droplet: Droplet::new(app_dir),
        services,
        application,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tests::filter;
    use crate::services::ServiceRegistry;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_compile() {
        let cli = Cli::try_parse_from([
            "app-dynamics-agent",
            "compile",
            "--app-dir",
            "/tmp/app",
            "--config",
            "/tmp/config.yml",
        ])
        .unwrap();

        assert_matches!(cli.phase, Phase::Compile(CompileArgs { phase, resources_dir }) => {
            assert_eq!(phase.app_dir, PathBuf::from("/tmp/app"));
            assert_eq!(phase.config, PathBuf::from("/tmp/config.yml"));
            assert_eq!(resources_dir, PathBuf::from("resources"));
        });
    }

    #[test]
    fn test_parse_requires_app_dir() {
        assert!(Cli::try_parse_from(["app-dynamics-agent", "release", "--config", "c.yml"]).is_err());
    }

    #[test]
    fn test_application_context() {
        let context = application_context(
            PathBuf::from("/tmp/app"),
            Some(r#"{"appdynamics": [{"name": "appd", "credentials": {"host-name": "ctrl"}}]}"#.to_string()),
            Some(r#"{"application_name": "myapp"}"#.to_string()),
        )
        .unwrap();

        assert_eq!(context.droplet.root(), PathBuf::from("/tmp/app"));
        assert_eq!(context.application.application_name(), Some("myapp".to_string()));
        assert!(context.services.one_service(&filter("appdynamics"), &["host-name"]));
    }

    #[test]
    fn test_application_context_unset_documents() {
        let context =
            application_context(PathBuf::from("/tmp/app"), None, Some("  ".to_string())).unwrap();

        assert!(context.services.bindings().is_empty());
        assert_eq!(context.application.application_name(), None);
    }

    #[test]
    fn test_application_context_invalid_services() {
        let result = application_context(PathBuf::from("/tmp/app"), Some("[".to_string()), None);
        assert_matches!(result, Err(CliError::Services(_)));
    }
}
