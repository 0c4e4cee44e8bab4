//! Session endpoint address derivation.

use std::fmt;

use crate::identity::TargetIdentity;

/// WebSocket URL scheme for the session endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plain `ws://`.
    Ws,
    /// TLS `wss://`, selected by a secure origin.
    Wss,
}

impl Scheme {
    /// Scheme matching the page's security: secure origin selects `wss`.
    #[must_use]
    pub const fn from_secure(secure: bool) -> Self {
        if secure { Self::Wss } else { Self::Ws }
    }

    /// URL scheme literal.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }

    /// Whether connecting over this scheme needs TLS support.
    #[must_use]
    pub const fn requires_tls(self) -> bool {
        matches!(self, Self::Wss)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where webshell sessions are opened: a host plus a scheme.
///
/// The per-session URL is a pure function of this pair and the target
/// identity; same inputs produce a byte-identical URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    scheme: Scheme,
}

impl Endpoint {
    /// Create an endpoint for `host` (may carry a port, e.g. `gw:8080`).
    #[must_use]
    pub fn new(host: impl Into<String>, scheme: Scheme) -> Self {
        Self {
            host: host.into(),
            scheme,
        }
    }

    /// The configured host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured scheme.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Session URL for one target:
    /// `<scheme>://<host>/ws/<namespace>/<pod>/<container_name>/webshell`.
    #[must_use]
    pub fn session_url(&self, identity: &TargetIdentity) -> String {
        format!(
            "{}://{}/ws/{}/{}/{}/webshell",
            self.scheme, self.host, identity.namespace, identity.pod, identity.container_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_origin_selects_wss() {
        assert_eq!(Scheme::from_secure(true), Scheme::Wss);
        assert_eq!(Scheme::from_secure(false), Scheme::Ws);
    }

    #[test]
    fn session_url_shape() {
        let identity = TargetIdentity::new("ns1", "pod1", "c1");
        let endpoint = Endpoint::new("example.com", Scheme::Wss);
        assert_eq!(
            endpoint.session_url(&identity),
            "wss://example.com/ws/ns1/pod1/c1/webshell"
        );
    }

    #[test]
    fn plain_scheme_and_port_carry_through() {
        let identity = TargetIdentity::new("default", "web-0", "app");
        let endpoint = Endpoint::new("localhost:8080", Scheme::Ws);
        assert_eq!(
            endpoint.session_url(&identity),
            "ws://localhost:8080/ws/default/web-0/app/webshell"
        );
    }

    #[test]
    fn url_is_deterministic() {
        let identity = TargetIdentity::new("a", "b", "c");
        let endpoint = Endpoint::new("h", Scheme::Ws);
        assert_eq!(
            endpoint.session_url(&identity),
            endpoint.session_url(&identity)
        );
    }
}
