//! Forwarding rule: prefix matching and outbound URI construction.
//!
//! # Responsibilities
//! - Match the inbound path against the mount prefix (case-sensitive)
//! - Translate the path (pass-through or strip-prefix)
//! - Build the outbound URI against the fixed upstream origin
//! - Carry the forced `Host` header value
//!
//! # Design Decisions
//! - Compiled once from validated config; immutable at runtime
//! - Plain prefix matching, no regex, O(n) in the path length
//! - Query strings are never touched

use axum::http::uri::{Authority, Scheme, Uri};
use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::{RouteConfig, UpstreamConfig};
use crate::gateway::error::GatewayError;

/// Error compiling a [`ForwardingRule`] from configuration.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid upstream origin {0:?}")]
    Origin(String),

    #[error("invalid host header value {0:?}")]
    HostHeader(String),
}

/// Static forwarding rule, derived from config at startup.
#[derive(Debug, Clone)]
pub struct ForwardingRule {
    scheme: Scheme,
    authority: Authority,
    host_value: HeaderValue,
    mount_prefix: String,
    strip_prefix: bool,
}

impl ForwardingRule {
    /// Compile a rule from validated configuration.
    pub fn from_config(upstream: &UpstreamConfig, route: &RouteConfig) -> Result<Self, RuleError> {
        let origin: Uri = upstream
            .origin
            .parse()
            .map_err(|_| RuleError::Origin(upstream.origin.clone()))?;
        let scheme = origin
            .scheme()
            .cloned()
            .ok_or_else(|| RuleError::Origin(upstream.origin.clone()))?;
        let authority = origin
            .authority()
            .cloned()
            .ok_or_else(|| RuleError::Origin(upstream.origin.clone()))?;

        // Virtual-host upstreams route on Host; always force it to the
        // upstream authority, never pass the client's value through.
        let host = if upstream.host_header.is_empty() {
            authority.as_str()
        } else {
            upstream.host_header.as_str()
        };
        let host_value = HeaderValue::from_str(host)
            .map_err(|_| RuleError::HostHeader(host.to_string()))?;

        Ok(Self {
            scheme,
            authority,
            host_value,
            mount_prefix: route.mount_prefix.clone(),
            strip_prefix: route.strip_prefix,
        })
    }

    /// True when the inbound path falls under the mount prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.mount_prefix)
    }

    /// The forced outbound `Host` header value.
    pub fn host_value(&self) -> &HeaderValue {
        &self.host_value
    }

    /// Upstream scheme (for x-forwarded-proto and TLS decisions).
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Translate an inbound path per the configured mode.
    pub fn translate_path<'a>(&self, path: &'a str) -> &'a str {
        if !self.strip_prefix {
            return path;
        }
        match path.strip_prefix(self.mount_prefix.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            // Not under the prefix (or prefix ends mid-segment): forward
            // the path as-is rather than produce a rootless one.
            _ => path,
        }
    }

    /// Build the outbound URI for an inbound request URI. The query
    /// string, when present, is carried over verbatim.
    pub fn outbound_uri(&self, inbound: &Uri) -> Result<Uri, GatewayError> {
        let path = self.translate_path(inbound.path());
        let path_and_query = match inbound.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path.to_string(),
        };
        let uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?;
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RouteConfig, UpstreamConfig};

    fn rule(strip: bool) -> ForwardingRule {
        let upstream = UpstreamConfig {
            origin: "https://devdb.sphereemr.com".to_string(),
            ..UpstreamConfig::default()
        };
        let route = RouteConfig {
            mount_prefix: "/fmi".to_string(),
            strip_prefix: strip,
            health_enabled: true,
        };
        ForwardingRule::from_config(&upstream, &route).unwrap()
    }

    #[test]
    fn matches_prefix() {
        let r = rule(false);
        assert!(r.matches("/fmi/data/v1/databases/EIDBI/sessions"));
        assert!(r.matches("/fmi"));
        assert!(!r.matches("/health"));
        assert!(!r.matches("/api/fmi"));
    }

    #[test]
    fn pass_through_keeps_path() {
        let r = rule(false);
        let uri: Uri = "/fmi/data/v1/databases/EIDBI/sessions".parse().unwrap();
        assert_eq!(
            r.outbound_uri(&uri).unwrap().to_string(),
            "https://devdb.sphereemr.com/fmi/data/v1/databases/EIDBI/sessions"
        );
    }

    #[test]
    fn strip_removes_leading_prefix() {
        let r = rule(true);
        let uri: Uri = "/fmi/data/v1/databases/EIDBI/sessions".parse().unwrap();
        assert_eq!(
            r.outbound_uri(&uri).unwrap().to_string(),
            "https://devdb.sphereemr.com/data/v1/databases/EIDBI/sessions"
        );
    }

    #[test]
    fn strip_of_bare_prefix_yields_root() {
        let r = rule(true);
        let uri: Uri = "/fmi".parse().unwrap();
        assert_eq!(
            r.outbound_uri(&uri).unwrap().to_string(),
            "https://devdb.sphereemr.com/"
        );
    }

    #[test]
    fn query_string_is_preserved() {
        let r = rule(true);
        let uri: Uri = "/fmi/data/v1/records?_limit=10&_offset=5".parse().unwrap();
        assert_eq!(
            r.outbound_uri(&uri).unwrap().to_string(),
            "https://devdb.sphereemr.com/data/v1/records?_limit=10&_offset=5"
        );
    }

    #[test]
    fn host_value_defaults_to_origin_authority() {
        let r = rule(false);
        assert_eq!(r.host_value().to_str().unwrap(), "devdb.sphereemr.com");
    }

    #[test]
    fn host_value_honors_override() {
        let upstream = UpstreamConfig {
            origin: "https://10.0.0.7:8443".to_string(),
            host_header: "devdb.sphereemr.com".to_string(),
            ..UpstreamConfig::default()
        };
        let r = ForwardingRule::from_config(&upstream, &RouteConfig::default()).unwrap();
        assert_eq!(r.host_value().to_str().unwrap(), "devdb.sphereemr.com");
    }
}
