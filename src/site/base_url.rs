use std::collections::HashMap;
use std::fmt;

const PRODUCTION_URL: &str = "https://adeloopdoc.netlify.app";
const DEVELOPMENT_URL: &str = "http://localhost:3000";

/// Absolute origin the site is served from, without a trailing slash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BaseUrl(String);

impl BaseUrl {
    pub(crate) fn parse(raw: &str) -> Result<Self, BaseUrlError> {
        let trimmed = raw.trim();
        let Some(rest) = trimmed.strip_prefix("https://").or_else(|| trimmed.strip_prefix("http://")) else {
            return Err(BaseUrlError::MissingScheme(raw.to_string()));
        };
        if rest.trim_matches('/').is_empty() {
            return Err(BaseUrlError::MissingHost(raw.to_string()));
        }
        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    /// Absolute URL for a site path such as `/docs/intro`.
    pub(crate) fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BaseUrlError {
    #[error("base url '{0}' must start with http:// or https://")]
    MissingScheme(String),

    #[error("base url '{0}' has no host")]
    MissingHost(String),
}

/// Pick the site origin: explicit override, then deploy-provider variables, then a fixed fallback.
pub(crate) fn resolve_base_url(
    configured: Option<&str>,
    env: &HashMap<String, String>,
) -> Result<BaseUrl, BaseUrlError> {
    let lookup = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(url) = configured {
        return BaseUrl::parse(url);
    }
    for name in ["SITE_URL", "URL", "DEPLOY_PRIME_URL"] {
        if let Some(url) = lookup(name) {
            return BaseUrl::parse(url);
        }
    }
    if let Some(host) = lookup("VERCEL_URL") {
        return BaseUrl::parse(&format!("https://{host}"));
    }
    if lookup("NODE_ENV") == Some("production") {
        return BaseUrl::parse(PRODUCTION_URL);
    }
    BaseUrl::parse(DEVELOPMENT_URL)
}
