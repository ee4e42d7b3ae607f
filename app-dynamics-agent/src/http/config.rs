use crate::proxy::ProxySettings;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    pub(crate) timeout: Duration,
    pub(crate) conn_timeout: Duration,
    pub(crate) proxy: Option<ProxySettings>,
}

impl HttpConfig {
    pub fn new(timeout: Duration, conn_timeout: Duration) -> Self {
        Self {
            timeout,
            conn_timeout,
            proxy: None,
        }
    }

    pub fn with_proxy(self, proxy: ProxySettings) -> Self {
        Self {
            proxy: Some(proxy),
            ..self
        }
    }
}
