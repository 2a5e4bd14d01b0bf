//! Authentication and registration service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, RegisterRequest, Role, User},
    repository::Store,
    services::tokens::TokenCodec,
};

/// Hash a password using Argon2 with a fresh random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Compare a cleartext password against a stored Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Token issued by a successful login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenCodec) -> Self {
        Self { store, tokens }
    }

    /// Verify a username (or email) and password pair
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<User> {
        let user = {
            let mut tx = self.store.begin().await?;
            tx.user_by_username_or_email(login).await?
        };

        let user = user.ok_or_else(|| {
            tracing::debug!("Login rejected: unknown user {}", login);
            AppError::Authentication("Invalid username or password".to_string())
        })?;

        if !verify_password(password, &user.password)? {
            tracing::debug!("Login rejected: wrong password for {}", user.username);
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        Ok(user)
    }

    /// Authenticate and issue a bearer token for the verified identity
    pub async fn login(&self, login: &str, password: &str) -> AppResult<IssuedToken> {
        let user = self.authenticate(login, password).await?;
        let token = self
            .tokens
            .issue(&user.username, &[user.role.to_string()], Utc::now())?;

        tracing::info!("User {} logged in", user.username);
        Ok(IssuedToken { token, user })
    }

    /// Public self-registration, always with the plain user role
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<User> {
        let user = self
            .create_user(&request.username, &request.email, &request.password, Role::User)
            .await?;
        tracing::info!("User {} registered", user.username);
        Ok(user)
    }

    /// Create a user after checking username and email uniqueness
    pub async fn create_user(&self, username: &str, email: &str, password: &str, role: Role) -> AppResult<User> {
        // Hashed before the transaction is opened
        let password_hash = hash_password(password)?;

        let mut tx = self.store.begin().await?;

        if tx.username_exists(username).await? {
            return Err(AppError::DuplicateKey("Username is already taken!".to_string()));
        }
        if tx.email_exists(email).await? {
            return Err(AppError::DuplicateKey("Email is already in use!".to_string()));
        }

        let user = tx
            .insert_user(&NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await?;
        tx.commit().await?;

        Ok(user)
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }
}
