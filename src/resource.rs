//! Locating Kick resources on the API and identity hosts.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Default host of the public REST API.
pub const API_BASE_URL: &str = "https://api.kick.com";

/// Default host of the OAuth / identity endpoints.
pub const ID_BASE_URL: &str = "https://id.kick.com";

/// The Kick surface a resource lives on.
///
/// The two surfaces wrap their responses differently, so the kind also selects
/// how a response is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// The public REST API. Bodies are wrapped in `{"data": ..., "message": ...}`.
    Api,
    /// The identity (OAuth) host. Bodies are returned unwrapped.
    Id,
}

impl ResourceKind {
    /// The configuration name of this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Api => "api",
            ResourceKind::Id => "id",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(ResourceKind::Api),
            "id" | "oauth" | "identity" => Ok(ResourceKind::Id),
            _ => Err(Error::UnknownResourceType(s.to_string())),
        }
    }
}

/// Base URLs of the two Kick surfaces.
///
/// Override them to point a client at a mock server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawBaseUrls")]
pub struct BaseUrls {
    pub api: Url,
    pub id: Url,
}

impl BaseUrls {
    /// Parses both base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if either URL is malformed.
    pub fn new(api: impl AsRef<str>, id: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            api: Url::parse(api.as_ref())?,
            id: Url::parse(id.as_ref())?,
        })
    }

    /// Returns the base URL configured for `kind`.
    pub fn for_kind(&self, kind: ResourceKind) -> &Url {
        match kind {
            ResourceKind::Api => &self.api,
            ResourceKind::Id => &self.id,
        }
    }
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            api: Url::parse(API_BASE_URL).expect("API_BASE_URL is a valid URL"),
            id: Url::parse(ID_BASE_URL).expect("ID_BASE_URL is a valid URL"),
        }
    }
}

#[derive(Deserialize)]
struct RawBaseUrls {
    #[serde(default)]
    api: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

impl TryFrom<RawBaseUrls> for BaseUrls {
    type Error = Error;

    fn try_from(raw: RawBaseUrls) -> Result<Self> {
        let defaults = BaseUrls::default();
        Ok(Self {
            api: raw.api.as_deref().map(Url::parse).transpose()?.unwrap_or(defaults.api),
            id: raw.id.as_deref().map(Url::parse).transpose()?.unwrap_or(defaults.id),
        })
    }
}

/// A single endpoint: the surface it lives on and its path relative to that surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    kind: ResourceKind,
    path: String,
    base_url: Url,
}

impl Resource {
    pub fn new(kind: ResourceKind, base_url: Url, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            base_url,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Joins the base URL and the path with exactly one `/` between them.
    ///
    /// The path is treated as opaque: existing percent escapes are kept as is
    /// and `..` segments are not resolved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestConstruction`] if the joined string is not a valid URL.
    ///
    /// ```
    /// use kick_sdk::resource::{Resource, ResourceKind};
    /// use url::Url;
    ///
    /// let base = Url::parse("https://api.kick.com/").unwrap();
    /// let resource = Resource::new(ResourceKind::Api, base, "/public/v1/users");
    /// assert_eq!(resource.url().unwrap().as_str(), "https://api.kick.com/public/v1/users");
    /// ```
    pub fn url(&self) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = self.path.trim_start_matches('/');

        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };

        Url::parse(&joined).map_err(|e| {
            Error::RequestConstruction(format!("invalid resource URL {joined:?}: {e}"))
        })
    }
}
