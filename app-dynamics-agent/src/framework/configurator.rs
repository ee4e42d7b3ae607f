//! Translation of the AppDynamics service credentials into agent system properties.
use super::notifier::{BasicAuth, DeploymentNotifier, NotificationRequest};
use super::ServiceFilters;
use crate::application::{ApplicationMetadata, Droplet};
use crate::config::StaticConfig;
use crate::defaults::*;
use crate::java_opts::{JavaOpts, JavaOptsError};
use crate::proxy::ProxySettings;
use crate::secret::{SecretError, SecretMaterializer};
use crate::services::{Credentials, ServiceRegistry};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ConfigureError {
    #[error("no single service matching `{0}` is bound to the application")]
    MissingService(String),
    #[error("'{0}' credential must be set")]
    MissingCredential(&'static str),
    #[error("{0}")]
    Secret(#[from] SecretError),
    #[error("{0}")]
    JavaOpts(#[from] JavaOptsError),
}

/// Everything the configurator reads about the application being released.
pub struct ReleaseContext<'a, R: ServiceRegistry> {
    pub services: &'a R,
    pub application: &'a ApplicationMetadata,
    pub static_config: &'a StaticConfig,
    pub droplet: &'a Droplet,
}

pub struct Configurator<N: DeploymentNotifier> {
    filters: ServiceFilters,
    notifier: N,
}

impl<N: DeploymentNotifier> Configurator<N> {
    pub fn new(filters: ServiceFilters, notifier: N) -> Self {
        Self { filters, notifier }
    }

    pub fn filters(&self) -> &ServiceFilters {
        &self.filters
    }

    /// Builds the agent options for the application and reports the deployment to the controller
    /// when an API service is bound. Reporting never fails the configuration.
    pub fn configure<R, S>(
        &self,
        context: &ReleaseContext<R>,
        secrets: &S,
    ) -> Result<JavaOpts, ConfigureError>
    where
        R: ServiceRegistry,
        S: SecretMaterializer,
    {
        let binding = context
            .services
            .find_service(&self.filters.primary)
            .ok_or_else(|| ConfigureError::MissingService(self.filters.primary.to_string()))?;
        let credentials = binding.credentials();
        let host_name = credentials
            .non_empty(CREDENTIAL_HOST_NAME)
            .ok_or(ConfigureError::MissingCredential(CREDENTIAL_HOST_NAME))?;

        let application_name =
            application_name(credentials, context.static_config, context.application);
        let tier_name = credentials
            .get(CREDENTIAL_TIER_NAME)
            .map(String::from)
            .or_else(|| context.static_config.default_tier_name.clone())
            .or_else(|| context.application.application_name())
            .unwrap_or_default();
        let node_name = credentials
            .get(CREDENTIAL_NODE_NAME)
            .map(String::from)
            .or_else(|| context.static_config.default_node_name.clone())
            .unwrap_or_default();

        let sandbox = context.droplet.sandbox();
        let mut java_opts = JavaOpts::default();
        java_opts
            .add_java_agent(sandbox.join(JAVA_AGENT_JAR))?
            .add_system_property(PROPERTY_APPLICATION_NAME, &application_name)?
            .add_system_property(PROPERTY_TIER_NAME, tier_name)?
            .add_system_property(PROPERTY_NODE_NAME, node_name)?;

        for (credential, property) in [
            (CREDENTIAL_ACCOUNT_ACCESS_KEY, PROPERTY_ACCOUNT_ACCESS_KEY),
            (CREDENTIAL_ACCOUNT_NAME, PROPERTY_ACCOUNT_NAME),
        ] {
            add_optional(&mut java_opts, credentials, credential, property)?;
        }
        java_opts.add_system_property(PROPERTY_HOST_NAME, host_name)?;
        for (credential, property) in [
            (CREDENTIAL_PORT, PROPERTY_PORT),
            (CREDENTIAL_SSL_ENABLED, PROPERTY_SSL_ENABLED),
        ] {
            add_optional(&mut java_opts, credentials, credential, property)?;
        }
        java_opts.add_path_property(PROPERTY_LOGS_DIR, sandbox.join(LOGS_DIR))?;

        let proxy = self.proxy_settings(context.services);
        if let Some(proxy) = &proxy {
            java_opts.append(proxy_opts(proxy, secrets)?)?;
        }

        info!(
            application = %application_name,
            controller = %host_name,
            "AppDynamics agent configured"
        );

        self.notify_deployment(context, credentials, &application_name, proxy);
        Ok(java_opts)
    }

    fn proxy_settings<R: ServiceRegistry>(&self, services: &R) -> Option<ProxySettings> {
        let binding = services.find_service(&self.filters.proxy);
        if binding.is_none() {
            debug!("no single proxy service bound, connecting directly");
        }
        binding.map(|binding| ProxySettings::from_credentials(binding.credentials()))
    }

    fn notify_deployment<R: ServiceRegistry>(
        &self,
        context: &ReleaseContext<R>,
        credentials: &Credentials,
        application_name: &str,
        proxy: Option<ProxySettings>,
    ) {
        let Some(api) = context.services.find_service(&self.filters.api) else {
            debug!("no single deployment API service bound, skipping deployment notification");
            return;
        };
        let api_credentials = api.credentials();
        let (Some(username), Some(password)) = (
            api_credentials.non_empty(CREDENTIAL_USERNAME),
            api_credentials.non_empty(CREDENTIAL_PASSWORD),
        ) else {
            debug!("deployment API service without credentials, skipping deployment notification");
            return;
        };
        // host-name was validated by configure
        let Some(host_name) = credentials.non_empty(CREDENTIAL_HOST_NAME) else {
            return;
        };

        let request = NotificationRequest::new(
            host_name,
            credentials.non_empty(CREDENTIAL_PORT),
            credentials
                .non_empty(CREDENTIAL_APPLICATION_NAME)
                .unwrap_or(application_name),
            format!("Deploying: {application_name}"),
            BasicAuth::for_account(
                username,
                password,
                credentials.non_empty(CREDENTIAL_ACCOUNT_NAME),
            ),
        );
        match request {
            Ok(request) => {
                let outcome = self.notifier.notify(&request, proxy);
                debug!(?outcome, "deployment notification outcome");
            }
            Err(err) => warn!("Skipping deployment notification: {err}"),
        }
    }
}

/// The name the agent reports the application as: the `application-name` credential, then the
/// configured default, then the platform application name.
pub fn application_name(
    credentials: &Credentials,
    static_config: &StaticConfig,
    application: &ApplicationMetadata,
) -> String {
    credentials
        .get(CREDENTIAL_APPLICATION_NAME)
        .map(String::from)
        .or_else(|| static_config.default_application_name.clone())
        .or_else(|| application.application_name())
        .unwrap_or_default()
}

fn add_optional(
    java_opts: &mut JavaOpts,
    credentials: &Credentials,
    credential: &str,
    property: &str,
) -> Result<(), JavaOptsError> {
    match credentials.non_empty(credential) {
        Some(value) => {
            java_opts.add_system_property(property, value)?;
        }
        None => debug!("credential `{credential}` not set, `{property}` omitted"),
    }
    Ok(())
}

fn proxy_opts<S: SecretMaterializer>(
    proxy: &ProxySettings,
    secrets: &S,
) -> Result<JavaOpts, ConfigureError> {
    let mut java_opts = JavaOpts::default();
    if let Some(host) = &proxy.host {
        java_opts.add_system_property(PROPERTY_PROXY_HOST, host)?;
    }
    if let Some(username) = &proxy.username {
        java_opts.add_system_property(PROPERTY_PROXY_USER, username)?;
    }
    if let Some(port) = &proxy.port {
        java_opts.add_system_property(PROPERTY_PROXY_PORT, port)?;
    }
    if let Some(password) = &proxy.password {
        let path = secrets.materialize(PROXY_PASSWORD_FILE, password)?;
        java_opts.add_path_property(PROPERTY_PROXY_PASSWORD_FILE, path)?;
    }
    Ok(java_opts)
}
