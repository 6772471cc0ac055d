//! Client-context extraction at the routing boundary.
//!
//! The IP address recorded as an entry's origin is resolved in this order:
//!
//! 1. first value of `x-forwarded-for`
//! 2. `x-real-ip`
//! 3. `cf-connecting-ip` (Cloudflare)
//! 4. the raw connection's remote address
//! 5. the literal `"unknown"`
//!
//! Upstream proxy headers are trusted over the socket peer.  Deployments
//! that are reachable without a proxy in front must strip these headers at
//! the edge, otherwise a client can choose the address it is audited under.

use sprout_contracts::entry::Origin;
use sprout_core::traits::RequestView;

const UNKNOWN: &str = "unknown";

/// Build the `Origin` of an entry from an inbound request.
pub fn extract_client_info<R: RequestView + ?Sized>(request: &R) -> Origin {
    Origin {
        ip_address: resolve_ip(request),
        user_agent: non_empty(request.header("user-agent"))
            .unwrap_or(UNKNOWN)
            .to_string(),
        endpoint: request.path().to_string(),
        method: request.method().to_string(),
    }
}

fn resolve_ip<R: RequestView + ?Sized>(request: &R) -> String {
    let forwarded = request
        .header("x-forwarded-for")
        .and_then(|v| non_empty(v.split(',').next()));

    forwarded
        .or_else(|| non_empty(request.header("x-real-ip")))
        .or_else(|| non_empty(request.header("cf-connecting-ip")))
        .or_else(|| non_empty(request.remote_addr()))
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// An owned request description for callers that do not have a framework
/// request type at hand (background jobs, tests, the CLI).
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    headers: Vec<(String, String)>,
    remote_addr: Option<String>,
    path: String,
    method: String,
}

impl RequestParts {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }
}

impl RequestView for RequestParts {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &str {
        &self.method
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RequestParts {
        RequestParts::new("POST", "/sessions/complete")
            .with_header("User-Agent", "sprout-ios/2.1")
            .with_remote_addr("192.0.2.10")
    }

    #[test]
    fn forwarded_for_wins_and_takes_first_hop() {
        let req = request()
            .with_header("X-Forwarded-For", " 203.0.113.5 , 10.0.0.1")
            .with_header("X-Real-IP", "198.51.100.2")
            .with_header("CF-Connecting-IP", "198.51.100.3");

        let origin = extract_client_info(&req);
        assert_eq!(origin.ip_address, "203.0.113.5");
        assert_eq!(origin.user_agent, "sprout-ios/2.1");
        assert_eq!(origin.endpoint, "/sessions/complete");
        assert_eq!(origin.method, "POST");
    }

    #[test]
    fn real_ip_then_cloudflare_then_socket() {
        let req = request()
            .with_header("x-real-ip", "198.51.100.2")
            .with_header("cf-connecting-ip", "198.51.100.3");
        assert_eq!(extract_client_info(&req).ip_address, "198.51.100.2");

        let req = request().with_header("cf-connecting-ip", "198.51.100.3");
        assert_eq!(extract_client_info(&req).ip_address, "198.51.100.3");

        assert_eq!(extract_client_info(&request()).ip_address, "192.0.2.10");
    }

    #[test]
    fn empty_headers_fall_through() {
        let req = request()
            .with_header("x-forwarded-for", "")
            .with_header("x-real-ip", "  ");
        assert_eq!(extract_client_info(&req).ip_address, "192.0.2.10");
    }

    #[test]
    fn nothing_known_is_unknown() {
        let origin = extract_client_info(&RequestParts::new("GET", "/health"));
        assert_eq!(origin.ip_address, "unknown");
        assert_eq!(origin.user_agent, "unknown");
    }

    #[test]
    fn works_through_a_trait_object() {
        let req = request();
        let view: &dyn RequestView = &req;
        assert_eq!(extract_client_info(view).ip_address, "192.0.2.10");
    }
}
