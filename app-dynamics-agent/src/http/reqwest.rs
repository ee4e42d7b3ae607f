//! # Helpers to build a reqwest blocking client and handle its responses
use super::config::HttpConfig;
use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::Proxy;
use std::time::Duration;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum ReqwestResponseError {
    #[error("could not read response body: {0}")]
    ReadingResponse(String),
    #[error("could not build response: {0}")]
    BuildingResponse(String),
}

/// Helper to build a [http::Response<Vec<u8>>] from a reqwest's blocking response.
/// It includes status, version and body. Headers are not included.
pub fn try_build_response(res: Response) -> Result<http::Response<Vec<u8>>, ReqwestResponseError> {
    let status = res.status();
    let version = res.version();
    let body: Vec<u8> = res
        .bytes()
        .map_err(|err| ReqwestResponseError::ReadingResponse(err.to_string()))?
        .into();
    http::Response::builder()
        .status(status)
        .version(version)
        .body(body)
        .map_err(|err| ReqwestResponseError::BuildingResponse(err.to_string()))
}

#[derive(thiserror::Error, Debug)]
pub enum ReqwestBuildError {
    #[error("could not build the reqwest client: {0}")]
    ClientBuilder(String),
}

/// Builds a reqwest blocking client according to the provided configuration.
///
/// When a proxy with a host is configured every request goes through it, authenticating with the
/// proxy username and password if a username is set.
pub fn try_build_reqwest_client(config: HttpConfig) -> Result<Client, ReqwestBuildError> {
    let mut builder = reqwest_builder_with_timeout(config.timeout, config.conn_timeout);

    if let Some(proxy_config) = config.proxy {
        if let Some(proxy_url) = proxy_config.url() {
            debug!(%proxy_url, "routing requests through proxy");
            let mut proxy = Proxy::all(proxy_url).map_err(|err| {
                ReqwestBuildError::ClientBuilder(format!("invalid proxy url: {err}"))
            })?;
            if let Some(username) = proxy_config.username.as_deref() {
                proxy = proxy.basic_auth(username, proxy_config.password.as_deref().unwrap_or(""));
            }
            builder = builder.proxy(proxy);
        }
    }

    builder
        .build()
        .map_err(|err| ReqwestBuildError::ClientBuilder(err.to_string()))
}

/// Returns a reqwest [ClientBuilder] with the default setup and the provided timeout values.
pub fn reqwest_builder_with_timeout(timeout: Duration, conn_timeout: Duration) -> ClientBuilder {
    Client::builder()
        .use_rustls_tls() // Use rust-tls backend, system (native) certificates are loaded
        .timeout(timeout)
        .connect_timeout(conn_timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxySettings;
    use assert_matches::assert_matches;
    use http::StatusCode;
    use httpmock::MockServer;

    #[test]
    fn test_reqwest_proxy() {
        // Target server simulating the real service
        let expected_response = "OK!";
        let target_server = MockServer::start();
        target_server.mock(|when, then| {
            when.any_request();
            then.status(200).body(expected_response);
        });
        // Proxy server will request the target server, allowing requests to that host only
        let proxy_server = MockServer::start();
        proxy_server.proxy(|rule| {
            rule.filter(|when| {
                when.host(target_server.host()).port(target_server.port());
            });
        });
        let proxy = ProxySettings {
            host: Some(proxy_server.host()),
            port: Some(proxy_server.port().to_string()),
            ..Default::default()
        };
        let config =
            HttpConfig::new(Duration::from_secs(3), Duration::from_secs(3)).with_proxy(proxy);
        let client = try_build_reqwest_client(config)
            .unwrap_or_else(|e| panic!("Unexpected error building the client {e}"));
        let resp = client
            .get(target_server.url("/path").as_str())
            .send()
            .unwrap_or_else(|e| panic!("Error performing request: {e}"));

        assert_eq!(resp.status(), StatusCode::OK.as_u16());
        assert_eq!(resp.text().unwrap(), expected_response.to_string())
    }

    #[test]
    fn test_proxy_without_host_is_ignored() {
        let config = HttpConfig::new(Duration::from_secs(1), Duration::from_secs(1)).with_proxy(
            ProxySettings {
                port: Some("3128".to_string()),
                ..Default::default()
            },
        );
        assert!(try_build_reqwest_client(config).is_ok());
    }

    #[test]
    fn test_invalid_proxy_url() {
        let config = HttpConfig::new(Duration::from_secs(1), Duration::from_secs(1)).with_proxy(
            ProxySettings {
                host: Some("proxy host with spaces".to_string()),
                ..Default::default()
            },
        );
        assert_matches!(
            try_build_reqwest_client(config),
            Err(ReqwestBuildError::ClientBuilder(e)) => assert!(e.contains("invalid proxy url"))
        );
    }

    #[test]
    fn test_try_build_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/events");
            then.status(201).body("created");
        });
        let client = try_build_reqwest_client(HttpConfig::new(
            Duration::from_secs(3),
            Duration::from_secs(3),
        ))
        .unwrap();

        let response = try_build_response(client.get(server.url("/events")).send().unwrap()).unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body(), b"created");
    }
}
