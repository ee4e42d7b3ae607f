pub const COMPONENT_ID: &str = "app_dynamics_agent";
pub const DETECT_TAG_PREFIX: &str = "app-dynamics-agent";
pub const BUILDPACK_DIR: &str = ".java-buildpack";

// Service filters
pub const SERVICE_FILTER: &str = r"(?i)app[-]?dynamics";
pub const PROXY_SERVICE_FILTER: &str = r"(?i)proxy";
pub const API_SERVICE_FILTER: &str = r"(?i)app[-_]?d[-_]?api";

// Credential keys
pub const CREDENTIAL_APPLICATION_NAME: &str = "application-name";
pub const CREDENTIAL_TIER_NAME: &str = "tier-name";
pub const CREDENTIAL_NODE_NAME: &str = "node-name";
pub const CREDENTIAL_ACCOUNT_ACCESS_KEY: &str = "account-access-key";
pub const CREDENTIAL_ACCOUNT_NAME: &str = "account-name";
pub const CREDENTIAL_HOST_NAME: &str = "host-name";
pub const CREDENTIAL_PORT: &str = "port";
pub const CREDENTIAL_SSL_ENABLED: &str = "ssl-enabled";
pub const CREDENTIAL_HOST: &str = "host";
pub const CREDENTIAL_USERNAME: &str = "username";
pub const CREDENTIAL_PASSWORD: &str = "password";

// Application metadata keys
pub const APPLICATION_NAME_KEY: &str = "application_name";

// Agent system properties
pub const PROPERTY_APPLICATION_NAME: &str = "appdynamics.agent.applicationName";
pub const PROPERTY_TIER_NAME: &str = "appdynamics.agent.tierName";
pub const PROPERTY_NODE_NAME: &str = "appdynamics.agent.nodeName";
pub const PROPERTY_ACCOUNT_ACCESS_KEY: &str = "appdynamics.agent.accountAccessKey";
pub const PROPERTY_ACCOUNT_NAME: &str = "appdynamics.agent.accountName";
pub const PROPERTY_HOST_NAME: &str = "appdynamics.controller.hostName";
pub const PROPERTY_PORT: &str = "appdynamics.controller.port";
pub const PROPERTY_SSL_ENABLED: &str = "appdynamics.controller.ssl.enabled";
pub const PROPERTY_LOGS_DIR: &str = "appdynamics.agent.logs.dir";
pub const PROPERTY_PROXY_HOST: &str = "appdynamics.http.proxyHost";
pub const PROPERTY_PROXY_USER: &str = "appdynamics.http.proxyUser";
pub const PROPERTY_PROXY_PORT: &str = "appdynamics.http.proxyPort";
pub const PROPERTY_PROXY_PASSWORD_FILE: &str = "appdynamics.http.proxyPasswordFile";

// Sandbox layout
pub const JAVA_AGENT_JAR: &str = "javaagent.jar";
pub const LOGS_DIR: &str = "logs";
pub const PROXY_PASSWORD_FILE: &str = "proxyPass.txt";
pub const REPOSITORY_INDEX: &str = "index.yml";

// Deployment notification
pub const EVENT_TYPE_DEPLOYMENT: &str = "APPLICATION_DEPLOYMENT";
pub const EVENT_SEVERITY_INFO: &str = "INFO";
pub const DEFAULT_CONTROLLER_PORT: u16 = 443;

// Environment
pub const VCAP_SERVICES_ENV: &str = "VCAP_SERVICES";
pub const VCAP_APPLICATION_ENV: &str = "VCAP_APPLICATION";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
