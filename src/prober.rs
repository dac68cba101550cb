//! Probe transport abstraction and the ICMP implementation.
//!
//! A [`Prober`] answers one question: did the host respond within the
//! timeout, and if so, how fast. Every failure mode along the way (DNS
//! resolution, socket setup, ICMP errors, timeout) classifies as
//! [`ProbeOutcome::Timeout`] rather than an error, so a down target is a
//! first-class observation and never aborts a probe batch.

use std::net::IpAddr;
use std::time::Duration;

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence};
use tokio::time::timeout;

/// Outcome of a single probe attempt. Transient; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    /// The host replied within the timeout.
    Reply {
        /// Round-trip time in milliseconds.
        rtt_ms: f64,
    },
    /// No reply within the timeout, or the attempt could not be made.
    Timeout,
}

/// A single-attempt reachability probe against a host address.
#[async_trait::async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Probe `address` once, waiting at most `probe_timeout` for a reply.
    async fn probe(&self, address: &str, probe_timeout: Duration) -> ProbeOutcome;
}

/// ICMP echo prober.
#[derive(Debug, Default)]
pub struct IcmpProber;

impl IcmpProber {
    /// Create a new ICMP prober.
    pub fn new() -> Self {
        Self
    }
}

/// Resolve hostname to IP address.
async fn resolve_host(host: &str) -> Result<IpAddr, std::io::Error> {
    // Try to parse as an IP address directly before hitting DNS
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
    addrs
        .into_iter()
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"))
}

#[async_trait::async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, address: &str, probe_timeout: Duration) -> ProbeOutcome {
        let ip_addr = match resolve_host(address).await {
            Ok(ip) => ip,
            Err(e) => {
                tracing::warn!(host = %address, error = %e, "Failed to resolve hostname");
                return ProbeOutcome::Timeout;
            }
        };

        let client = match ip_addr {
            IpAddr::V4(_) => Client::new(&Config::default()),
            IpAddr::V6(_) => Client::new(&Config::builder().kind(ICMP::V6).build()),
        };
        let client = match client {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(host = %address, error = %e, "Failed to create ICMP client");
                return ProbeOutcome::Timeout;
            }
        };

        let mut pinger = client.pinger(ip_addr, PingIdentifier(rand::random())).await;
        pinger.timeout(probe_timeout);

        match timeout(probe_timeout, pinger.ping(PingSequence(0), &[])).await {
            Ok(Ok((_, rtt))) => {
                let rtt_ms = rtt.as_secs_f64() * 1000.0;
                tracing::trace!(host = %address, rtt_ms, "Probe reply");
                ProbeOutcome::Reply { rtt_ms }
            }
            Ok(Err(e)) => {
                tracing::trace!(host = %address, error = %e, "Probe failed");
                ProbeOutcome::Timeout
            }
            Err(_) => {
                tracing::trace!(host = %address, timeout_ms = probe_timeout.as_millis(), "Probe timed out");
                ProbeOutcome::Timeout
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_host_ipv4() {
        let ip = resolve_host("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[tokio::test]
    async fn test_resolve_host_ipv6() {
        let ip = resolve_host("::1").await.unwrap();
        assert_eq!(ip, IpAddr::V6(std::net::Ipv6Addr::LOCALHOST));
    }
}
