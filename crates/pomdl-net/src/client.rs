use std::future::Future;

use bytes::Bytes;

use crate::error::TransportError;

/// A fully buffered HTTP response. POM and metadata documents are small, so
/// nothing here streams.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations handle their own redirect following and timeout
/// configuration. Non-2xx statuses must be returned as [`HttpResponse`]
/// values; [`TransportError`] is reserved for failures where no response was
/// obtained at all.
pub trait HttpClient: Send + Sync {
    /// Issue a GET for `url`, attaching a basic-auth header when `auth`
    /// carries a username/password pair.
    fn get(
        &self,
        url: &str,
        auth: Option<(&str, &str)>,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use super::*;

    /// Per-request timeout configuration.
    #[derive(Clone, Copy, Debug)]
    pub struct Timeouts {
        pub connect: Duration,
        pub read: Duration,
    }

    impl Default for Timeouts {
        fn default() -> Self {
            Self {
                connect: Duration::from_secs(10),
                read: Duration::from_secs(30),
            }
        }
    }

    /// Construction settings for [`ReqwestClient`].
    #[derive(Clone, Debug, Default)]
    pub struct ClientSettings {
        pub proxies: Vec<String>,
        pub timeouts: Timeouts,
    }

    impl ClientSettings {
        /// Settings with proxies taken from the conventional environment
        /// variables (`https_proxy`, `http_proxy`).
        pub fn from_env() -> Self {
            let proxies = ["https_proxy", "HTTPS_PROXY", "http_proxy", "HTTP_PROXY"]
                .iter()
                .filter_map(|var| std::env::var(var).ok())
                .filter(|value| !value.is_empty())
                .collect();
            Self {
                proxies,
                timeouts: Timeouts::default(),
            }
        }

        pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
            self.timeouts = timeouts;
            self
        }

        pub fn build(self) -> Result<ReqwestClient, TransportError> {
            let mut builder = reqwest::Client::builder()
                .connect_timeout(self.timeouts.connect)
                .timeout(self.timeouts.read);

            let (secure, insecure): (Vec<_>, Vec<_>) = self
                .proxies
                .into_iter()
                .partition(|uri| uri.starts_with("https://"));

            for uri in secure {
                builder = builder.proxy(
                    reqwest::Proxy::https(&uri)
                        .map_err(|e| TransportError::InvalidUrl(format!("proxy {uri}: {e}")))?,
                );
            }
            for uri in insecure {
                builder = builder.proxy(
                    reqwest::Proxy::http(&uri)
                        .map_err(|e| TransportError::InvalidUrl(format!("proxy {uri}: {e}")))?,
                );
            }

            let client = builder
                .build()
                .map_err(|e| TransportError::Other(format!("failed to build client: {e}")))?;
            Ok(ReqwestClient { client })
        }
    }

    /// Production HTTP client backed by `reqwest`.
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self, TransportError> {
            ClientSettings::default().build()
        }
    }

    impl HttpClient for ReqwestClient {
        async fn get(
            &self,
            url: &str,
            auth: Option<(&str, &str)>,
        ) -> Result<HttpResponse, TransportError> {
            let mut request = self.client.get(url);
            if let Some((username, password)) = auth {
                request = request.basic_auth(username, Some(password));
            }

            let response = request.send().await.map_err(classify)?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(classify)?;
            Ok(HttpResponse { status, body })
        }
    }

    fn classify(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            if error.is_connect() {
                TransportError::ConnectTimeout(error.to_string())
            } else {
                TransportError::ReadTimeout(error.to_string())
            }
        } else if error.is_builder() {
            TransportError::InvalidUrl(error.to_string())
        } else if is_tls_error(&error) {
            TransportError::Tls(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }

    // reqwest has no TLS predicate, so scan the source chain for the usual
    // handshake failure markers.
    fn is_tls_error(error: &reqwest::Error) -> bool {
        let mut source = std::error::Error::source(error);
        while let Some(inner) = source {
            let message = inner.to_string().to_ascii_lowercase();
            if message.contains("tls") || message.contains("ssl") || message.contains("certificate")
            {
                return true;
            }
            source = inner.source();
        }
        false
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientSettings, ReqwestClient, Timeouts};
