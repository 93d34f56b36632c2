use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::response;

/// Checks every request against a single shared-secret bearer token.
/// Per the spec's Non-goals, user authentication beyond this check is out
/// of scope: there is no per-user identity, no RBAC, no session.
#[derive(Clone)]
pub struct BearerAuth {
    token: Option<String>,
}

impl BearerAuth {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub async fn layer(
        axum::extract::State(auth): axum::extract::State<Self>,
        req: Request,
        next: Next,
    ) -> Response {
        let Some(expected) = auth.token.as_deref() else {
            // No token configured: auth is disabled (local/dev mode).
            return next.run(req).await;
        };
        let presented = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        match presented {
            Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => {
                next.run(req).await
            }
            _ => response::unauthorized("missing or invalid bearer token"),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
