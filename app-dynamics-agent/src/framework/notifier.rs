//! Best-effort report of the deployment to the controller events REST API.
//!
//! Nothing in this module fails the release: every error ends up as a [NotificationOutcome::Failed]
//! which is only logged.
use crate::config::NotificationConfig;
use crate::defaults::{DEFAULT_CONTROLLER_PORT, EVENT_SEVERITY_INFO, EVENT_TYPE_DEPLOYMENT};
use crate::http::client::{HttpClient, ReqwestHttpClient};
use crate::http::config::HttpConfig;
use crate::proxy::ProxySettings;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::AUTHORIZATION;
use http::{HeaderValue, Method, Request, StatusCode};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum NotifyError {
    #[error("invalid controller port `{0}`")]
    InvalidPort(String),
    #[error("invalid controller url: {0}")]
    InvalidUrl(String),
    #[error("could not build the notification request: {0}")]
    BuildingRequest(String),
}

#[derive(Clone, PartialEq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    /// The controller authenticates API users as `{username}@{account}`.
    pub fn for_account(username: &str, password: &str, account: Option<&str>) -> Self {
        let username = match account {
            Some(account) => format!("{username}@{account}"),
            None => username.to_string(),
        };
        Self {
            username,
            password: password.to_string(),
        }
    }

    fn header_value(&self) -> Result<HeaderValue, NotifyError> {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(|err| NotifyError::BuildingRequest(err.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Deployment event reported to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub event_type: &'static str,
    pub summary: String,
    pub severity: &'static str,
    pub target_url: String,
    pub basic_auth: BasicAuth,
}

impl NotificationRequest {
    /// Builds the event for `application` (the controller application the event belongs to) at
    /// `https://{host}:{port}`. The port defaults to 443.
    pub fn new(
        host: &str,
        port: Option<&str>,
        application: &str,
        summary: String,
        basic_auth: BasicAuth,
    ) -> Result<Self, NotifyError> {
        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| NotifyError::InvalidPort(port.to_string()))?,
            None => DEFAULT_CONTROLLER_PORT,
        };
        let mut url = Url::parse(&format!("https://{host}/"))
            .map_err(|err| NotifyError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| NotifyError::InvalidUrl(format!("{host} cannot be a base")))?
            .clear()
            .extend(["controller", "rest", "applications", application, "events"]);
        url.query_pairs_mut()
            .append_pair("eventtype", EVENT_TYPE_DEPLOYMENT)
            .append_pair("summary", &summary)
            .append_pair("severity", EVENT_SEVERITY_INFO);

        // url drops default ports, the controller url always carries it
        let target_url = format!(
            "https://{}:{port}{}?{}",
            url.host_str().unwrap_or(host),
            url.path(),
            url.query().unwrap_or_default()
        );

        Ok(Self {
            event_type: EVENT_TYPE_DEPLOYMENT,
            summary,
            severity: EVENT_SEVERITY_INFO,
            target_url,
            basic_auth,
        })
    }

    fn to_http_request(&self) -> Result<Request<Vec<u8>>, NotifyError> {
        Request::builder()
            .method(Method::POST)
            .uri(self.target_url.as_str())
            .header(AUTHORIZATION, self.basic_auth.header_value()?)
            .body(Vec::new())
            .map_err(|err| NotifyError::BuildingRequest(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationOutcome {
    Delivered { status: StatusCode, body: String },
    Failed(String),
}

/// Performs the single notification request through `client`. No retries.
pub fn send_notification<C: HttpClient>(
    client: &C,
    request: &NotificationRequest,
) -> NotificationOutcome {
    let http_request = match request.to_http_request() {
        Ok(http_request) => http_request,
        Err(err) => return failed(err.to_string()),
    };

    match client.send(http_request) {
        Ok(response) => {
            let status = response.status();
            let body = String::from_utf8_lossy(response.body()).to_string();
            if status.is_success() {
                info!(%status, "Deployment notification sent");
                debug!(%body, "Deployment notification response");
            } else {
                warn!(%status, %body, "Deployment notification rejected by the controller");
            }
            NotificationOutcome::Delivered { status, body }
        }
        Err(err) => failed(err.to_string()),
    }
}

fn failed(err: String) -> NotificationOutcome {
    warn!("Deployment notification failed: {err}");
    NotificationOutcome::Failed(err)
}

pub trait DeploymentNotifier {
    /// Reports the deployment, through `proxy` when set.
    fn notify(&self, request: &NotificationRequest, proxy: Option<ProxySettings>)
        -> NotificationOutcome;
}

/// Sends the notification with a reqwest client built for each call, as the proxy depends on
/// the services bound to the application being released.
#[derive(Debug, Clone, Default)]
pub struct HttpDeploymentNotifier {
    config: NotificationConfig,
}

impl HttpDeploymentNotifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }
}

impl DeploymentNotifier for HttpDeploymentNotifier {
    fn notify(
        &self,
        request: &NotificationRequest,
        proxy: Option<ProxySettings>,
    ) -> NotificationOutcome {
        let mut http_config = HttpConfig::new(self.config.timeout, self.config.connect_timeout);
        if let Some(proxy) = proxy {
            http_config = http_config.with_proxy(proxy);
        }
        match ReqwestHttpClient::try_new(http_config) {
            Ok(client) => send_notification(&client, request),
            Err(err) => failed(err.to_string()),
        }
    }
}
