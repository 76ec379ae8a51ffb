use crate::{error::Error, util};
use hyper::{body, Body, Request, Uri};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionData {
    pub interaction_number: u32,
    pub request_data: RequestData,
    pub response_data: ResponseData,
}

/// A request as it was recorded into a cassette. `url` is absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestData {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// The scheme and host a playback server stands in for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
}

impl Origin {
    pub fn new<S1: Into<String>, S2: Into<String>>(scheme: S1, host: S2) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// Parses `scheme://host[:port]`, ignoring any path.
    pub fn parse<S: AsRef<str>>(origin: S) -> Result<Self, Error> {
        let uri: Uri = origin
            .as_ref()
            .parse()
            .map_err(|_| Error::RelativeUri(origin.as_ref().into()))?;

        match (uri.scheme_str(), uri.authority()) {
            (Some(scheme), Some(authority)) => Ok(Self::new(scheme, authority.as_str())),
            _ => Err(Error::RelativeUri(origin.as_ref().into())),
        }
    }
}

/// The reduced view of a request that the matcher compares.
///
/// Both live requests and recorded interactions are reduced to this shape.
/// `path` always starts with `/` and carries the query string, and an empty
/// body is stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub scheme: String,
    pub method: String,
    pub host: String,
    pub path: String,
    pub body: Option<String>,
    pub headers: HashMap<String, String>,
}

impl RequestDescriptor {
    pub fn new<S1, S2, S3, S4>(scheme: S1, method: S2, host: S3, path: S4) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: AsRef<str>,
    {
        Self {
            scheme: scheme.into(),
            method: method.into(),
            host: host.into(),
            path: normalize_path(path.as_ref()),
            body: None,
            headers: HashMap::new(),
        }
    }

    pub fn with_body<S: Into<String>>(mut self, body: S) -> Self {
        let body = body.into();
        self.body = if body.is_empty() { None } else { Some(body) };
        self
    }

    pub fn with_header<S1: Into<String>, S2: Into<String>>(mut self, name: S1, value: S2) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Reduces a recorded request. An unparseable URL leaves scheme and host
    /// empty, so the descriptor can never match a live request.
    pub fn from_recorded(request_data: &RequestData) -> Self {
        let (scheme, host, path) = match request_data.url.parse::<Uri>() {
            Ok(uri) => (
                uri.scheme_str().unwrap_or_default().to_string(),
                uri.authority()
                    .map(|authority| authority.as_str().to_string())
                    .unwrap_or_default(),
                path_and_query(&uri),
            ),
            Err(_) => {
                tracing::debug!(url = %request_data.url, "recorded request has an invalid url");
                (String::new(), String::new(), request_data.url.clone())
            }
        };

        Self {
            headers: request_data.headers.clone(),
            ..Self::new(scheme, request_data.method.as_str(), host, path)
        }
        .with_body(request_data.body.as_str())
    }

    /// Reduces a client-side request whose URI is absolute.
    pub async fn from_request(request: Request<Body>) -> Result<Self, Error> {
        let uri = request.uri().clone();
        let origin = match (uri.scheme_str(), uri.authority()) {
            (Some(scheme), Some(authority)) => Origin::new(scheme, authority.as_str()),
            _ => return Err(Error::RelativeUri(uri.to_string())),
        };

        Self::from_proxied_request(request, &origin).await
    }

    /// Reduces a request received by a server that impersonates `origin`.
    pub async fn from_proxied_request(
        mut request: Request<Body>,
        origin: &Origin,
    ) -> Result<Self, Error> {
        let method = request.method().to_string();
        let path = path_and_query(request.uri());
        let headers = util::extract_headers(request.headers());

        let body = body::to_bytes(request.body_mut())
            .await
            .map_err(|_| Error::InvalidBody)?;

        Ok(Self {
            headers,
            ..Self::new(origin.scheme.as_str(), method, origin.host.as_str(), path)
        }
        .with_body(String::from_utf8_lossy(&body)))
    }

    /// A short `METHOD scheme://host/path` label for diagnostics.
    pub fn summary(&self) -> String {
        format!("{} {}://{}{}", self.method, self.scheme, self.host, self.path)
    }
}

fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|path_and_query| path_and_query.as_str().to_string())
        .unwrap_or_default()
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
