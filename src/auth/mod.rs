use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::config_loader;
use crate::domain::value_objects::accounts::{AuthenticatedAdmin, AuthenticatedUser};

pub const USER_SESSION_COOKIE: &str = "rc_session";
pub const ADMIN_SESSION_COOKIE: &str = "rc_admin_session";

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

const USER_SESSION_TTL_HOURS: i64 = 24 * 7;
const ADMIN_SESSION_TTL_HOURS: i64 = 12;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub name: String,
    pub cpf: Option<String>,
    pub role: String,
    pub exp: usize,
}

/// A logged-in shop user, extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: Uuid,
    pub full_name: String,
    pub cpf: Option<String>,
}

/// A logged-in administrator, extracted from the admin session cookie.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin_id: Uuid,
    pub full_name: String,
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

// Tell axum how to convert `AuthError` into a response.
impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::UNAUTHORIZED,
            format!("Unauthorized: {}", self.0),
        )
            .into_response()
    }
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("Failed to hash password: {}", err))?;
    Ok(hash.to_string())
}

pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn issue_user_session(user: &AuthenticatedUser) -> Result<String, AuthError> {
    let secrets = config_loader::get_session_secrets()?;
    let claims = SessionClaims {
        sub: user.id.to_string(),
        name: user.full_name.clone(),
        cpf: Some(user.cpf.clone()),
        role: ROLE_USER.to_string(),
        exp: session_expiry(USER_SESSION_TTL_HOURS),
    };
    issue_session(&claims, &secrets.user_secret)
}

pub fn issue_admin_session(admin: &AuthenticatedAdmin) -> Result<String, AuthError> {
    let secrets = config_loader::get_session_secrets()?;
    let claims = SessionClaims {
        sub: admin.id.to_string(),
        name: admin.full_name.clone(),
        cpf: None,
        role: ROLE_ADMIN.to_string(),
        exp: session_expiry(ADMIN_SESSION_TTL_HOURS),
    };
    issue_session(&claims, &secrets.admin_secret)
}

fn session_expiry(ttl_hours: i64) -> usize {
    (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize
}

fn issue_session(claims: &SessionClaims, secret: &str) -> Result<String, AuthError> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| anyhow::anyhow!("Failed to sign session token: {}", err))?;
    Ok(token)
}

pub fn validate_session(
    token: &str,
    secret: &str,
    expected_role: &str,
) -> Result<SessionClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

    let token_data = decode::<SessionClaims>(token, &decoding_key, &validation)
        .map_err(|err| anyhow::anyhow!("Session validation failed: {}", err))?;

    if token_data.claims.role != expected_role {
        return Err(anyhow::anyhow!("Session does not belong to this principal").into());
    }

    Ok(token_data.claims)
}

/// An HttpOnly session cookie scoped to the whole site.
pub fn session_cookie(name: &'static str, token: String) -> Cookie<'static> {
    Cookie::build((name, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// A cookie matching `session_cookie`'s scope, for `CookieJar::remove`.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

#[async_trait]
impl<S> FromRequestParts<S> for UserSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = session_claims_from_cookie(parts, state, USER_SESSION_COOKIE, ROLE_USER)
            .await?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid user ID in session".to_string(),
            )
        })?;

        Ok(UserSession {
            user_id,
            full_name: claims.name,
            cpf: claims.cpf,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = session_claims_from_cookie(parts, state, ADMIN_SESSION_COOKIE, ROLE_ADMIN)
            .await?;

        let admin_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid admin ID in session".to_string(),
            )
        })?;

        Ok(AdminSession {
            admin_id,
            full_name: claims.name,
        })
    }
}

async fn session_claims_from_cookie<S>(
    parts: &mut Parts,
    state: &S,
    cookie_name: &'static str,
    expected_role: &str,
) -> Result<SessionClaims, (StatusCode, String)>
where
    S: Send + Sync,
{
    let jar = match CookieJar::from_request_parts(parts, state).await {
        Ok(jar) => jar,
        Err(err) => match err {},
    };

    let token = jar
        .get(cookie_name)
        .ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing session cookie".to_string(),
        ))?
        .value()
        .to_string();

    let secrets = config_loader::get_session_secrets()
        .map_err(|err| (StatusCode::UNAUTHORIZED, format!("Unauthorized: {}", err)))?;

    let secret = match expected_role {
        ROLE_ADMIN => secrets.admin_secret,
        _ => secrets.user_secret,
    };

    validate_session(&token, &secret, expected_role)
        .map_err(|err| (StatusCode::UNAUTHORIZED, err.0.to_string()))
}

#[cfg(test)]
mod tests;
