//! User accounts: registration, login and token authentication.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use galerie_common::{AppError, AppResult, IdGenerator};
use galerie_db::entities::user;
use galerie_db::repositories::UserRepository;

/// Input for user registration.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 30))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Service for account management.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    #[must_use]
    pub const fn new(user_repo: UserRepository, id_gen: IdGenerator) -> Self {
        Self { user_repo, id_gen }
    }

    /// Register a new account. The username is unique case-insensitively.
    pub async fn register(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if !input
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Validation(
                "Username may only contain letters, digits and underscores".to_string(),
            ));
        }

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();
        let token = self.id_gen.generate_token();

        let created = self
            .user_repo
            .create(user::ActiveModel {
                id: Set(user_id),
                username: Set(input.username.clone()),
                username_lower: Set(input.username.to_lowercase()),
                email: Set(input.email),
                password_hash: Set(password_hash),
                token: Set(Some(token)),
                is_verified: Set(false),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        info!(user_id = %created.id, username = %created.username, "user registered");
        Ok(created)
    }

    /// Verify credentials and return the account with its API token,
    /// minting a token if the account has none.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(user::Model, String)> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if let Some(token) = user.token.clone() {
            return Ok((user, token));
        }

        let token = self.id_gen.generate_token();
        let updated = self
            .user_repo
            .update(user::ActiveModel {
                id: Set(user.id),
                token: Set(Some(token.clone())),
                ..Default::default()
            })
            .await?;

        Ok((updated, token))
    }

    /// Resolve a bearer token to its account.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Invalidate the account's API token.
    pub async fn logout(&self, user: &user::Model) -> AppResult<()> {
        self.user_repo
            .update(user::ActiveModel {
                id: Set(user.id.clone()),
                token: Set(None),
                ..Default::default()
            })
            .await?;
        Ok(())
    }

    /// Look up an account by id.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
