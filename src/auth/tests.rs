use super::*;
use std::env;
use uuid::Uuid;

fn set_env_vars() {
    unsafe {
        env::set_var("SESSION_USER_SECRET", "usersecretforunittesting1234567890");
        env::set_var("SESSION_ADMIN_SECRET", "adminsecretforunittesting1234567890");
    }
}

fn sample_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::new_v4(),
        full_name: "Ana Maria".to_string(),
        email: "ana@example.com".to_string(),
        cpf: "52998224725".to_string(),
    }
}

#[test]
fn test_user_session_round_trip() {
    set_env_vars();
    let user = sample_user();

    let token = issue_user_session(&user).expect("Issuing a session should succeed");
    let claims = validate_session(&token, "usersecretforunittesting1234567890", ROLE_USER)
        .expect("Valid token should pass");

    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.name, user.full_name);
    assert_eq!(claims.cpf.as_deref(), Some("52998224725"));
    assert_eq!(claims.role, ROLE_USER);
}

#[test]
fn test_user_token_rejected_for_admin_role() {
    set_env_vars();
    let user = sample_user();

    let token = issue_user_session(&user).unwrap();
    let result = validate_session(&token, "usersecretforunittesting1234567890", ROLE_ADMIN);

    assert!(result.is_err());
}

#[test]
fn test_token_rejected_with_wrong_secret() {
    set_env_vars();
    let user = sample_user();

    let token = issue_user_session(&user).unwrap();
    let result = validate_session(&token, "wrongsecret", ROLE_USER);

    assert!(result.is_err());
}

#[test]
fn test_expired_token_rejected() {
    set_env_vars();
    let claims = SessionClaims {
        sub: Uuid::new_v4().to_string(),
        name: "Ana Maria".to_string(),
        cpf: None,
        role: ROLE_USER.to_string(),
        exp: 1, // past
    };

    let token = issue_session(&claims, "usersecretforunittesting1234567890").unwrap();
    let result = validate_session(&token, "usersecretforunittesting1234567890", ROLE_USER);

    assert!(result.is_err());
}

#[test]
fn test_admin_session_round_trip() {
    set_env_vars();
    let admin = AuthenticatedAdmin {
        id: Uuid::new_v4(),
        full_name: "Coordinator".to_string(),
        email: "coord@example.com".to_string(),
    };

    let token = issue_admin_session(&admin).unwrap();
    let claims = validate_session(&token, "adminsecretforunittesting1234567890", ROLE_ADMIN)
        .expect("Valid admin token should pass");

    assert_eq!(claims.sub, admin.id.to_string());
    assert_eq!(claims.role, ROLE_ADMIN);
    assert_eq!(claims.cpf, None);
}

#[test]
fn test_password_hash_and_verify() {
    let hash = hash_password("s3nh4-secreta").unwrap();

    assert_ne!(hash, "s3nh4-secreta");
    assert!(verify_password("s3nh4-secreta", &hash));
    assert!(!verify_password("wrong-password", &hash));
}

#[test]
fn test_verify_rejects_garbage_hash() {
    assert!(!verify_password("anything", "not-a-phc-string"));
}
