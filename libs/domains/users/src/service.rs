use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{RegisterRequest, User};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a new user.
    ///
    /// Validates the input (including the password confirmation), hashes the
    /// password, and persists a non-privileged account. The confirmation
    /// field is discarded here and never stored.
    pub async fn register(&self, input: RegisterRequest) -> UserResult<User> {
        input.validate()?;

        if self.repository.username_exists(&input.username).await? {
            return Err(UserError::DuplicateUsername(input.username));
        }

        let password_hash = self.hash_password(&input.password)?;
        let user = User::new(input.username, input.email, password_hash);

        self.repository.create(user).await
    }

    /// Verify user credentials (for token issuance)
    pub async fn verify_credentials(&self, username: &str, password: &str) -> UserResult<User> {
        let user = self
            .repository
            .get_by_username(username)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Hash a password with Argon2 and a fresh random salt
    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    /// Verify a password against a stored Argon2 hash
    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "correct horse battery".to_string(),
            password_confirmation: "correct horse battery".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let service = UserService::new(InMemoryUserRepository::new());

        let user = service.register(register_request("alice")).await.unwrap();

        assert_ne!(user.password_hash, "correct horse battery");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_rejects_password_mismatch_without_persisting() {
        // No expectations set: reaching the repository would panic
        let service = UserService::new(MockUserRepository::new());

        let mut input = register_request("alice");
        input.password_confirmation = "something else".to_string();

        let err = service.register(input).await.unwrap_err();
        match err {
            UserError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("password"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_never_elevates_roles() {
        let service = UserService::new(InMemoryUserRepository::new());

        // Extra fields in the payload are dropped by deserialization; the
        // DTO has no role fields at all
        let input: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "mallory",
            "email": "mallory@example.com",
            "password": "correct horse battery",
            "password_confirmation": "correct horse battery",
            "is_staff": true,
            "is_superuser": true,
        }))
        .unwrap();

        let user = service.register(input).await.unwrap();
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let service = UserService::new(InMemoryUserRepository::new());

        service.register(register_request("alice")).await.unwrap();
        let err = service.register(register_request("alice")).await.unwrap_err();

        assert!(matches!(err, UserError::DuplicateUsername(_)));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.register(register_request("alice")).await.unwrap();

        let user = service
            .verify_credentials("alice", "correct horse battery")
            .await
            .unwrap();
        assert_eq!(user.username, "alice");

        let err = service
            .verify_credentials("alice", "wrong password")
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));

        let err = service
            .verify_credentials("nobody", "correct horse battery")
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));
    }
}
