//! Client origin extractor: remote address and User-Agent.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;

use carechart_auth::ClientOrigin;

/// Request origin used to stamp audit entries and sessions.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo(pub ClientOrigin);

impl ClientInfo {
    /// Read the origin from request parts.
    ///
    /// The first `X-Forwarded-For` hop wins over the socket address.
    pub fn from_parts(parts: &Parts) -> Self {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let ip_address = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Self(ClientOrigin {
            ip_address,
            user_agent,
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_forwarded_for_first_hop() {
        let (parts, _) = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .header(USER_AGENT, "curl/8")
            .body(())
            .unwrap()
            .into_parts();
        let ClientInfo(origin) = ClientInfo::from_parts(&parts);
        assert_eq!(origin.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(origin.user_agent.as_deref(), Some("curl/8"));
    }

    #[test]
    fn test_missing_headers() {
        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        let ClientInfo(origin) = ClientInfo::from_parts(&parts);
        assert_eq!(origin, ClientOrigin::default());
    }
}
