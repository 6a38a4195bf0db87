//! Target URL validation and the local-address policy.

use std::fmt;

use url::Url;

use crate::config::Environment;
use crate::relay::error::RelayError;

/// A validated, absolute http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl(Url);

impl TargetUrl {
    /// Parse the caller-supplied URL. `None` and `""` both count as missing.
    pub fn parse(raw: Option<&str>) -> Result<Self, RelayError> {
        let raw = match raw {
            Some(s) if !s.is_empty() => s,
            _ => return Err(RelayError::MissingUrl),
        };

        let url = Url::parse(raw).map_err(RelayError::InvalidUrl)?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(RelayError::UnsupportedScheme(other.to_string())),
        }
        if url.host_str().is_none() {
            return Err(RelayError::InvalidUrl(url::ParseError::EmptyHost));
        }

        Ok(Self(url))
    }

    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// Loopback names and mDNS hosts.
    pub fn is_local(&self) -> bool {
        let host = self.host();
        host == "localhost" || host == "127.0.0.1" || host.ends_with(".local")
    }

    /// Reject local targets when running in production.
    pub fn enforce_policy(&self, environment: Environment) -> Result<(), RelayError> {
        if environment.is_production() && self.is_local() {
            return Err(RelayError::LocalTargetBlocked {
                host: self.host().to_string(),
            });
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_url(self) -> Url {
        self.0
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_are_the_same() {
        assert!(matches!(TargetUrl::parse(None), Err(RelayError::MissingUrl)));
        assert!(matches!(TargetUrl::parse(Some("")), Err(RelayError::MissingUrl)));
    }

    #[test]
    fn relative_or_garbage_is_invalid() {
        assert!(matches!(
            TargetUrl::parse(Some("not a url")),
            Err(RelayError::InvalidUrl(_))
        ));
        assert!(matches!(
            TargetUrl::parse(Some("/api/data")),
            Err(RelayError::InvalidUrl(_))
        ));
    }

    #[test]
    fn only_http_schemes() {
        assert!(matches!(
            TargetUrl::parse(Some("ftp://example.com/file")),
            Err(RelayError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(TargetUrl::parse(Some("https://example.com/data?x=1")).is_ok());
    }

    #[test]
    fn host_is_normalized() {
        let target = TargetUrl::parse(Some("HTTP://LocalHost:3000/x")).unwrap();
        assert_eq!(target.host(), "localhost");
        assert!(target.is_local());
        assert_eq!(target.as_str(), "http://localhost:3000/x");
    }

    #[test]
    fn local_hosts_blocked_only_in_production() {
        for raw in [
            "http://localhost/",
            "http://127.0.0.1:8080/api",
            "https://printer.local/status",
        ] {
            let target = TargetUrl::parse(Some(raw)).unwrap();
            assert!(matches!(
                target.enforce_policy(Environment::Production),
                Err(RelayError::LocalTargetBlocked { .. })
            ));
            assert!(target.enforce_policy(Environment::Development).is_ok());
        }
    }

    #[test]
    fn public_hosts_pass_in_production() {
        let target = TargetUrl::parse(Some("https://api.example.com/v1")).unwrap();
        assert!(!target.is_local());
        assert!(target.enforce_policy(Environment::Production).is_ok());
    }
}
