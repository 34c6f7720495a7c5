use std::sync::Arc;

use application::auth::{AuthError, AuthService};
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
struct AuthRejectionBody {
    message: &'static str,
    reason: String,
}

/// 401 returned by the authorization gates.
#[derive(Debug)]
pub struct AuthRejection(AuthError);

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        AuthRejection(err)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(AuthRejectionBody {
                message: "authorization failed",
                reason: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

fn authorization_header(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Verifies the bearer token and stores the caller's `Identity` in the request extensions.
pub async fn authorize(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let identity = auth
        .verify_bearer(authorization_header(&req))
        .inspect_err(|err| warn!(reason = %err, uri = %req.uri(), "auth: rejected request"))?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// `authorize` restricted to sellers.
pub async fn authorize_seller(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let identity = auth
        .verify_seller_bearer(authorization_header(&req))
        .inspect_err(|err| warn!(reason = %err, uri = %req.uri(), "auth: rejected seller request"))?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests;
