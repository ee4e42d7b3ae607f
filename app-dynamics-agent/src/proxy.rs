//! Proxy the agent and the deployment notification go through, taken from a bound proxy service.
use crate::defaults::{CREDENTIAL_HOST, CREDENTIAL_PASSWORD, CREDENTIAL_PORT, CREDENTIAL_USERNAME};
use crate::services::Credentials;
use std::fmt;

/// Every field is optional, empty credential values are treated as absent.
#[derive(Clone, Default, PartialEq)]
pub struct ProxySettings {
    pub host: Option<String>,
    pub port: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxySettings {
    pub fn from_credentials(credentials: &Credentials) -> Self {
        let field = |key: &str| credentials.non_empty(key).map(String::from);
        Self {
            host: field(CREDENTIAL_HOST),
            port: field(CREDENTIAL_PORT),
            username: field(CREDENTIAL_USERNAME),
            password: field(CREDENTIAL_PASSWORD),
        }
    }

    /// Url of the proxy without credentials, `None` when no host is set.
    pub fn url(&self) -> Option<String> {
        let host = self.host.as_ref()?;
        Some(match &self.port {
            Some(port) => format!("http://{host}:{port}"),
            None => format!("http://{host}"),
        })
    }
}

// the password must never reach the logs
impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
