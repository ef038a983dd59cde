//! Token issuance, verification and role gating.
//!
//! Run with: cargo test --test auth_test

use chrono::Duration;
use flowboard::auth::{AuthError, Authenticator, Role, TenantContext};
use flowboard::error::AppError;
use uuid::Uuid;

#[test]
fn issued_token_verifies_with_claims() {
    let auth = Authenticator::new("test-secret");
    let user = Uuid::new_v4();
    let company = Uuid::new_v4();

    let token = auth
        .issue_token(user, company, Role::Admin, Duration::minutes(5))
        .unwrap();
    let claims = auth.verify(&format!("Bearer {token}")).unwrap();

    assert_eq!(claims.sub, user);
    assert_eq!(claims.company_id, company);
    assert_eq!(claims.role, Role::Admin);
}

#[test]
fn wrong_secret_is_rejected() {
    let token = Authenticator::new("one")
        .issue_token(Uuid::new_v4(), Uuid::new_v4(), Role::User, Duration::minutes(5))
        .unwrap();

    let err = Authenticator::new("two")
        .verify(&format!("Bearer {token}"))
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)));
}

#[test]
fn expired_token_is_rejected() {
    let auth = Authenticator::new("test-secret");
    let token = auth
        .issue_token(Uuid::new_v4(), Uuid::new_v4(), Role::User, Duration::hours(-1))
        .unwrap();

    assert!(auth.verify(&format!("Bearer {token}")).is_err());
}

#[test]
fn non_bearer_scheme_is_rejected() {
    let auth = Authenticator::new("test-secret");
    let token = auth
        .issue_token(Uuid::new_v4(), Uuid::new_v4(), Role::User, Duration::minutes(5))
        .unwrap();

    assert!(auth.verify(&token).is_err());
    assert!(auth.verify(&format!("Basic {token}")).is_err());
    assert!(auth.verify("Bearer ").is_err());
}

#[test]
fn auth_errors_map_to_unauthorized() {
    assert!(matches!(
        AppError::from(AuthError::MissingToken),
        AppError::Unauthorized(msg) if msg == "Missing authorization token"
    ));
    assert!(matches!(
        AppError::from(AuthError::InvalidToken("bad".to_string())),
        AppError::Unauthorized(msg) if msg == "Invalid or expired token"
    ));
}

#[test]
fn only_admins_pass_the_admin_gate() {
    let user = TenantContext {
        user_id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        role: Role::User,
    };
    let admin = TenantContext {
        role: Role::Admin,
        ..user
    };

    assert!(admin.require_admin("create widgets").is_ok());
    assert!(matches!(
        user.require_admin("create widgets"),
        Err(AppError::Forbidden(msg)) if msg == "Only admins can create widgets"
    ));
}

#[test]
fn missing_fields_message() {
    let err = AppError::missing_fields(&["deviceTypeId", "displayName"]);
    assert!(matches!(err, AppError::Validation(msg) if msg == "deviceTypeId, displayName are required"));

    let err = AppError::missing_fields(&["layouts"]);
    assert!(matches!(err, AppError::Validation(msg) if msg == "layouts is required"));
}
