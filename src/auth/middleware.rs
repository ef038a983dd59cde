use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::{AuthError, Role};
use crate::common::AppState;
use crate::error::{AppError, AppResult};

/// Authenticated principal for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: Role,
}

impl TenantContext {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject non-admin principals with `"Only admins can <action>"`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the principal is not an admin.
    pub fn require_admin(&self, action: &str) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Only admins can {action}")))
        }
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}

/// Verify the bearer token and attach the [`TenantContext`] to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let claims = state.authenticator.verify(header).inspect_err(|e| {
        tracing::debug!(error = %e, "token_rejected");
    })?;

    req.extensions_mut().insert(TenantContext {
        user_id: claims.sub,
        company_id: claims.company_id,
        role: claims.role,
    });

    Ok(next.run(req).await)
}
