//! Page identity: the host/path/query triple adapters match against

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

/// Identity of a loaded page.
///
/// `query` is stored without the leading `?`. An empty path is normalized to `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PageIdentity {
    pub host: String,
    pub path: String,
    pub query: String,
}

impl PageIdentity {
    /// Build an identity from its parts.
    pub fn new(host: impl Into<String>, path: impl Into<String>, query: impl Into<String>) -> Self {
        let path = path.into();
        let query = query.into();
        Self {
            host: host.into().to_ascii_lowercase(),
            path: if path.is_empty() { "/".to_string() } else { path },
            query: query.strip_prefix('?').map(str::to_string).unwrap_or(query),
        }
    }

    /// Parse a page URL such as `https://chatgpt.com/c/abc?model=x`.
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url.trim()).map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self::new(
            parsed.host_str().unwrap_or_default(),
            parsed.path(),
            parsed.query().unwrap_or_default(),
        ))
    }
}

impl fmt::Display for PageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}{}", self.host, self.path)
        } else {
            write!(f, "{}{}?{}", self.host, self.path, self.query)
        }
    }
}
