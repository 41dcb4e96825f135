use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth;
use crate::domain::entities::admins::InsertAdminEntity;
use crate::domain::entities::users::InsertUserEntity;
use crate::domain::repositories::admins::AdminRepository;
use crate::domain::repositories::users::UserRepository;
use crate::domain::value_objects::accounts::{
    AuthenticatedAdmin, AuthenticatedUser, CreateAdminModel, LoginModel, RegisterUserModel,
    email_looks_valid,
};
use crate::domain::value_objects::cpf;
use crate::infrastructure::postgres::postgres_connection::is_unique_violation;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AccountsError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Password must have at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("Invalid CPF")]
    InvalidCpf,
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("CPF already registered")]
    DuplicateCpf,
    #[error("Email or CPF already registered")]
    DuplicateAccount,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AccountsError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AccountsError::MissingField(_)
            | AccountsError::InvalidEmail
            | AccountsError::PasswordTooShort
            | AccountsError::InvalidCpf => StatusCode::BAD_REQUEST,
            AccountsError::DuplicateEmail
            | AccountsError::DuplicateCpf
            | AccountsError::DuplicateAccount => StatusCode::CONFLICT,
            AccountsError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AccountsResult<T> = std::result::Result<T, AccountsError>;

pub struct AccountsUseCase<U, A>
where
    U: UserRepository + Send + Sync + 'static,
    A: AdminRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    admin_repo: Arc<A>,
}

impl<U, A> AccountsUseCase<U, A>
where
    U: UserRepository + Send + Sync + 'static,
    A: AdminRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, admin_repo: Arc<A>) -> Self {
        Self {
            user_repo,
            admin_repo,
        }
    }

    pub async fn register_user(
        &self,
        model: RegisterUserModel,
    ) -> AccountsResult<AuthenticatedUser> {
        let full_name = required_field(&model.full_name, "full_name")?;
        let city = required_field(&model.city, "city")?;
        let email = required_field(&model.email, "email")?.to_lowercase();
        if model.password.trim().is_empty() {
            return Err(AccountsError::MissingField("password"));
        }

        if !email_looks_valid(&email) {
            return Err(AccountsError::InvalidEmail);
        }
        if model.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountsError::PasswordTooShort);
        }

        // Signup only checks the digit count; the full check-digit rule is
        // enforced where the CPF is charged against.
        let cpf_digits = cpf::normalize(&model.cpf);
        if cpf_digits.len() != 11 {
            return Err(AccountsError::InvalidCpf);
        }

        if self
            .user_repo
            .find_by_email(email.clone())
            .await
            .map_err(AccountsError::Internal)?
            .is_some()
        {
            warn!("accounts: signup rejected, email already registered");
            return Err(AccountsError::DuplicateEmail);
        }
        if self
            .user_repo
            .find_by_cpf(cpf_digits.clone())
            .await
            .map_err(AccountsError::Internal)?
            .is_some()
        {
            warn!("accounts: signup rejected, CPF already registered");
            return Err(AccountsError::DuplicateCpf);
        }

        let password_hash = auth::hash_password(&model.password)?;

        let user_id = self
            .user_repo
            .create(InsertUserEntity {
                full_name: full_name.clone(),
                email: email.clone(),
                password_hash,
                cpf: cpf_digits.clone(),
                city,
            })
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    return AccountsError::DuplicateAccount;
                }
                error!(db_error = ?err, "accounts: failed to create user");
                AccountsError::Internal(err)
            })?;

        info!(%user_id, "accounts: user registered");
        Ok(AuthenticatedUser {
            id: user_id,
            full_name,
            email,
            cpf: cpf_digits,
        })
    }

    pub async fn login_user(&self, model: LoginModel) -> AccountsResult<AuthenticatedUser> {
        let email = model.email.trim().to_lowercase();

        let Some(user) = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(AccountsError::Internal)?
        else {
            return Err(AccountsError::InvalidCredentials);
        };

        if !auth::verify_password(&model.password, &user.password_hash) {
            return Err(AccountsError::InvalidCredentials);
        }

        info!(user_id = %user.id, "accounts: user logged in");
        Ok(AuthenticatedUser {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            cpf: user.cpf,
        })
    }

    pub async fn login_admin(&self, model: LoginModel) -> AccountsResult<AuthenticatedAdmin> {
        let email = model.email.trim().to_lowercase();

        let Some(admin) = self
            .admin_repo
            .find_by_email(email)
            .await
            .map_err(AccountsError::Internal)?
        else {
            return Err(AccountsError::InvalidCredentials);
        };

        if !auth::verify_password(&model.password, &admin.password_hash) {
            return Err(AccountsError::InvalidCredentials);
        }

        info!(admin_id = %admin.id, "accounts: admin logged in");
        Ok(AuthenticatedAdmin {
            id: admin.id,
            full_name: admin.full_name,
            email: admin.email,
        })
    }

    pub async fn create_admin(&self, model: CreateAdminModel) -> AccountsResult<Uuid> {
        let full_name = required_field(&model.full_name, "full_name")?;
        let email = required_field(&model.email, "email")?.to_lowercase();
        if model.password.trim().is_empty() {
            return Err(AccountsError::MissingField("password"));
        }
        if !email_looks_valid(&email) {
            return Err(AccountsError::InvalidEmail);
        }

        if self
            .admin_repo
            .find_by_email(email.clone())
            .await
            .map_err(AccountsError::Internal)?
            .is_some()
        {
            return Err(AccountsError::DuplicateEmail);
        }

        let password_hash = auth::hash_password(&model.password)?;

        let admin_id = self
            .admin_repo
            .create(InsertAdminEntity {
                full_name,
                email,
                password_hash,
            })
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    return AccountsError::DuplicateEmail;
                }
                error!(db_error = ?err, "accounts: failed to create admin");
                AccountsError::Internal(err)
            })?;

        info!(%admin_id, "accounts: admin created");
        Ok(admin_id)
    }
}

fn required_field(value: &str, name: &'static str) -> AccountsResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountsError::MissingField(name));
    }
    Ok(trimmed.to_string())
}
