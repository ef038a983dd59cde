//! Bearer-token authentication and the per-request tenant context.
//!
//! Every `/api` route runs behind [`require_auth`], which verifies the HS256
//! token and stores a [`TenantContext`] in the request extensions. The company
//! id used for data scoping is only ever taken from the verified claims.

mod claims;
mod middleware;

pub use claims::{Authenticator, Claims, Role};
pub use middleware::{TenantContext, require_auth};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}
