use axum::extract::ConnectInfo;
use axum::http::Request;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_governor::{GovernorError, key_extractor::KeyExtractor};
use uuid::Uuid;

use crate::auth::TenantContext;

/// Bucket identity for rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKey {
    Company(Uuid),
    Ip(IpAddr),
}

/// Keys authenticated requests by company so every user of a tenant shares
/// one bucket. Requests without a tenant context fall back to the client IP:
/// X-Forwarded-For, X-Real-IP, peer address, then localhost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantKeyExtractor;

impl KeyExtractor for TenantKeyExtractor {
    type Key = LimitKey;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if let Some(tenant) = req.extensions().get::<TenantContext>() {
            return Ok(LimitKey::Company(tenant.company_id));
        }
        Ok(LimitKey::Ip(client_ip(req)))
    }
}

pub fn client_ip<T>(req: &Request<T>) -> IpAddr {
    let headers = req.headers();

    // First hop of the proxy chain
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok());
    if let Some(ip) = forwarded {
        return ip;
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok());
    if let Some(ip) = real_ip {
        return ip;
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::LOCALHOST), |info| info.0.ip())
}
