//! Target filtering for outbound requests.
//!
//! Saved links come from untrusted chat input, so the fetcher refuses
//! non-HTTP schemes and addresses that resolve to the local network.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

/// Hostname suffixes that only make sense inside a private network.
const LOCAL_SUFFIXES: [&str; 3] = [".local", ".internal", ".localhost"];

/// Returns `true` if `url` must not be fetched.
pub fn is_blocked_target(url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return true;
    }

    match url.host() {
        None => true,
        Some(Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => is_private_ip(&IpAddr::V6(v6)),
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || LOCAL_SUFFIXES.iter().any(|s| domain.ends_with(s))
        }
    }
}

/// Check if an IP is in a loopback, private or otherwise reserved range.
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_v4(&mapped);
            }
            is_private_v6(v6)
        }
    }
}

fn is_private_v4(v4: &Ipv4Addr) -> bool {
    let [a, b, c, _] = v4.octets();
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_broadcast()
        || v4.is_unspecified()
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xC0) == 64)
        // 192.0.0.0/24 IETF protocol assignments
        || (a == 192 && b == 0 && c == 0)
}

fn is_private_v6(v6: &Ipv6Addr) -> bool {
    let first = v6.segments()[0];
    v6.is_loopback()
        || v6.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xFE00) == 0xFC00
        // fe80::/10 link local
        || (first & 0xFFC0) == 0xFE80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked(s: &str) -> bool {
        is_blocked_target(&Url::parse(s).unwrap())
    }

    #[test]
    fn blocks_non_http_schemes() {
        assert!(blocked("file:///etc/passwd"));
        assert!(blocked("ftp://files.example.com/a.txt"));
    }

    #[test]
    fn blocks_private_and_loopback_ips() {
        assert!(blocked("http://192.168.1.1/admin"));
        assert!(blocked("http://10.0.0.1/"));
        assert!(blocked("http://127.0.0.1:8080/"));
        assert!(blocked("http://100.64.1.2/"));
        assert!(blocked("http://[::1]/"));
        assert!(blocked("http://[fd12:3456::1]/"));
        assert!(blocked("http://[::ffff:10.0.0.1]/"));
    }

    #[test]
    fn blocks_local_hostnames() {
        assert!(blocked("http://localhost:3000/api"));
        assert!(blocked("http://printer.local/"));
        assert!(blocked("https://metadata.internal/latest"));
    }

    #[test]
    fn allows_public_targets() {
        assert!(!blocked("https://example.com/article"));
        assert!(!blocked("http://93.184.216.34/"));
        assert!(!blocked("https://[2606:4700::1111]/"));
    }
}
