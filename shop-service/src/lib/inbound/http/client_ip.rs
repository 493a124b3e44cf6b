use std::fmt;
use std::net::IpAddr;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use thiserror::Error;

use crate::inbound::http::router::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolved address of the client that originated the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

impl fmt::Display for ClientIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrustedProxyError {
    #[error("Invalid trusted proxy entry: {0}")]
    InvalidEntry(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProxyRange {
    V4 { network: u32, prefix: u32 },
    V6 { network: u128, prefix: u32 },
}

impl ProxyRange {
    fn parse(entry: &str) -> Result<Self, TrustedProxyError> {
        let invalid = || TrustedProxyError::InvalidEntry(entry.to_string());
        let (addr, prefix) = match entry.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix.parse::<u32>().map_err(|_| invalid())?)),
            None => (entry, None),
        };

        match addr.parse::<IpAddr>().map_err(|_| invalid())? {
            IpAddr::V4(ip) => {
                let prefix = prefix.unwrap_or(32);
                if prefix > 32 {
                    return Err(invalid());
                }
                Ok(ProxyRange::V4 {
                    network: u32::from(ip) & v4_mask(prefix),
                    prefix,
                })
            }
            IpAddr::V6(ip) => {
                let prefix = prefix.unwrap_or(128);
                if prefix > 128 {
                    return Err(invalid());
                }
                Ok(ProxyRange::V6 {
                    network: u128::from(ip) & v6_mask(prefix),
                    prefix,
                })
            }
        }
    }

    fn contains(&self, ip: IpAddr) -> bool {
        match (self, ip.to_canonical()) {
            (ProxyRange::V4 { network, prefix }, IpAddr::V4(ip)) => {
                u32::from(ip) & v4_mask(*prefix) == *network
            }
            (ProxyRange::V6 { network, prefix }, IpAddr::V6(ip)) => {
                u128::from(ip) & v6_mask(*prefix) == *network
            }
            _ => false,
        }
    }
}

fn v4_mask(prefix: u32) -> u32 {
    u32::MAX.checked_shl(32 - prefix).unwrap_or(0)
}

fn v6_mask(prefix: u32) -> u128 {
    u128::MAX.checked_shl(128 - prefix).unwrap_or(0)
}

/// Peers whose `X-Forwarded-For` header is believed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedProxies {
    ranges: Vec<ProxyRange>,
}

impl TrustedProxies {
    /// Parse plain addresses (`127.0.0.1`) and CIDR ranges (`10.0.0.0/8`).
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, TrustedProxyError> {
        let ranges = entries
            .iter()
            .map(|e| e.as_ref().trim())
            .filter(|e| !e.is_empty())
            .map(ProxyRange::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    pub fn is_trusted(&self, ip: IpAddr) -> bool {
        self.ranges.iter().any(|range| range.contains(ip))
    }

    /// First `X-Forwarded-For` entry when the peer is trusted, the peer otherwise.
    pub fn resolve(&self, peer: IpAddr, forwarded_for: Option<&str>) -> IpAddr {
        if !self.is_trusted(peer) {
            return peer;
        }

        forwarded_for
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
            .unwrap_or(peer)
    }
}

/// Middleware that attaches [`ClientIp`] to the request.
///
/// Requests served without connection info (in-process tests) pass through
/// untouched.
pub async fn resolve_client_ip(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(peer) = peer {
        let forwarded_for = req
            .headers()
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok());
        let ip = state.trusted_proxies.resolve(peer, forwarded_for);
        req.extensions_mut().insert(ClientIp(ip));
    }

    next.run(req).await
}
