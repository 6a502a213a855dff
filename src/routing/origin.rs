//! Upstream origin (scheme + authority).

use axum::http::uri::{Authority, InvalidUri, Scheme};
use axum::http::Uri;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Reasons a URL cannot be used as a forwarding origin.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OriginError {
    #[error("not an absolute URL: {0}")]
    Parse(String),

    #[error("unsupported scheme '{0}' (expected http or https)")]
    Scheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("invalid authority: {0}")]
    Authority(String),
}

/// Where a request is forwarded: scheme, host and port of a backend.
///
/// Any path, query or fragment on the configured URL is not part of the
/// origin; the inbound request's path and query are used instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: Scheme,
    authority: Authority,
}

impl Origin {
    /// Parse an absolute `http`/`https` URL into an origin.
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let url = Url::parse(raw.trim()).map_err(|e| OriginError::Parse(e.to_string()))?;
        Self::from_url(&url)
    }

    pub fn from_url(url: &Url) -> Result<Self, OriginError> {
        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(OriginError::Scheme(other.to_string())),
        };
        let host = url.host_str().filter(|h| !h.is_empty()).ok_or(OriginError::MissingHost)?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority)
            .map_err(|e: InvalidUri| OriginError::Authority(e.to_string()))?;

        Ok(Self { scheme, authority })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Build the outbound URI: this origin plus the inbound path and query.
    pub fn uri_for(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        let path_and_query = inbound
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

impl FromStr for Origin {
    type Err = OriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
