//! Backend reads: list query construction and the HTTP source.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::response::{self, ResponseItem};

const USER_AGENT: &str = concat!("portal-lists/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid page URL: {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header '{header}', expected 'Key: Value'")]
    InvalidHeader { header: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed list response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Archive selector for the archive-contents listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreezeRef {
    pub id: String,
    pub checksum: String,
}

/// The `operation=list` read, optionally scoped to one archive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub freeze: Option<FreezeRef>,
}

impl ListQuery {
    pub fn list() -> Self {
        Self::default()
    }

    pub fn archive(id: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            freeze: Some(FreezeRef {
                id: id.into(),
                checksum: checksum.into(),
            }),
        }
    }

    /// Relative URL, resolved against the current page.
    pub fn to_relative(&self) -> String {
        match &self.freeze {
            Some(f) => format!(
                "?freeze_id={};checksum={};output_format=json;operation=list",
                f.id, f.checksum
            ),
            None => "?output_format=json;operation=list".to_string(),
        }
    }
}

/// Where refreshers read list responses from.
pub trait ListSource: Send + Sync {
    fn fetch(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Vec<ResponseItem>, TransportError>> + Send;
}

#[derive(Clone, Debug)]
pub struct ClientOptions {
    /// The portal page whose backend serves the listing.
    pub page_url: String,
    pub proxy: Option<String>,
    /// Extra `Key: Value` request header.
    pub header: Option<String>,
    pub timeout_seconds: u64,
    pub insecure: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            page_url: String::new(),
            proxy: None,
            header: None,
            timeout_seconds: 10,
            insecure: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpListSource {
    client: reqwest::Client,
    page_url: reqwest::Url,
}

impl HttpListSource {
    pub fn new(options: &ClientOptions) -> Result<Self, TransportError> {
        let page_url =
            reqwest::Url::parse(options.page_url.trim()).map_err(|e| TransportError::InvalidUrl {
                url: options.page_url.clone(),
                source: e,
            })?;
        let client = build_client(options)?;
        Ok(Self { client, page_url })
    }

    pub fn page_url(&self) -> &reqwest::Url {
        &self.page_url
    }

    pub fn resolve(&self, query: &ListQuery) -> Result<reqwest::Url, TransportError> {
        let relative = query.to_relative();
        self.page_url
            .join(&relative)
            .map_err(|e| TransportError::InvalidUrl {
                url: relative,
                source: e,
            })
    }
}

impl ListSource for HttpListSource {
    async fn fetch(&self, query: &ListQuery) -> Result<Vec<ResponseItem>, TransportError> {
        let url = self.resolve(query)?;
        let url_str = url.to_string();
        tracing::debug!(event = "lists.transport.request", url = %url_str);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url_str.clone(),
                source: e,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url_str,
                status,
            });
        }
        let body = resp.bytes().await.map_err(|e| TransportError::Body {
            url: url_str.clone(),
            source: e,
        })?;
        tracing::debug!(
            event = "lists.transport.response",
            url = %url_str,
            status = status.as_u16(),
            bytes = body.len()
        );
        response::parse_list_response(&body).map_err(|e| TransportError::Decode {
            url: url_str,
            source: e,
        })
    }
}

fn build_client(options: &ClientOptions) -> Result<reqwest::Client, TransportError> {
    use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

    if let Some(raw) = options.header.as_deref().filter(|h| !h.trim().is_empty()) {
        let invalid = || TransportError::InvalidHeader {
            header: raw.to_string(),
        };
        let (key, value) = raw.split_once(':').ok_or_else(invalid)?;
        let key = HeaderName::from_str(key.trim()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
        headers.append(key, value);
    }

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(options.timeout_seconds.max(1)))
        .danger_accept_invalid_certs(options.insecure);

    if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| TransportError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| TransportError::HttpClientBuild { source: e })
}
