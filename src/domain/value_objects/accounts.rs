use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserModel {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub cpf: String,
    pub city: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminModel {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// A successfully authenticated user, ready to be put in a session cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub cpf: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedAdmin {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SessionProfileDto {
    pub ok: bool,
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

/// Loose shape check before hitting the unique index; full validation is
/// the mail server's problem.
pub fn email_looks_valid(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if local.chars().any(char::is_whitespace) || domain.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(email_looks_valid("ana@example.com"));
        assert!(email_looks_valid("a.b+c@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!email_looks_valid("ana"));
        assert!(!email_looks_valid("ana@"));
        assert!(!email_looks_valid("@example.com"));
        assert!(!email_looks_valid("ana@example"));
        assert!(!email_looks_valid("ana maria@example.com"));
    }
}
