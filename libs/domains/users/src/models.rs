use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User roles derived from the account flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Every authenticated account
    #[default]
    Customer,
    /// Staff accounts allowed to write products
    Seller,
    /// Superuser accounts allowed to write categories as well
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Seller => write!(f, "seller"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// User entity - matches the SQL schema
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Username (unique)
    pub username: String,
    /// Email address
    pub email: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Staff flag: the account may write products (seller)
    pub is_staff: bool,
    /// Superuser flag: the account may write categories too (admin)
    pub is_superuser: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new non-privileged user (password already hashed by the
    /// service layer). Role flags always start false; elevation happens out
    /// of band.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username,
            email,
            password_hash,
            is_staff: false,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The account's roles, derived from its flags
    pub fn roles(&self) -> Vec<Role> {
        let mut roles = vec![Role::Customer];
        if self.is_staff {
            roles.push(Role::Seller);
        }
        if self.is_superuser {
            roles.push(Role::Admin);
        }
        roles
    }

    /// Role names as carried in JWT claims
    pub fn role_names(&self) -> Vec<String> {
        self.roles().iter().map(|r| r.to_string()).collect()
    }
}

/// DTO for user registration.
///
/// Deliberately has no role fields: a registration can never create a
/// privileged account.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(
        length(min = 8, max = 128),
        must_match(other = "password_confirmation", message = "Password fields didn't match.")
    )]
    pub password: String,
    /// Must match `password`; discarded after validation
    pub password_confirmation: String,
}

/// Response after successful registration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
    pub message: String,
}

/// DTO for obtaining a token pair
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TokenObtainRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Access/refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// DTO for refreshing an access token
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TokenRefreshRequest {
    #[validate(length(min = 1))]
    pub refresh: String,
}

/// A freshly issued access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRefreshResponse {
    pub access: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct horse battery".to_string(),
            password_confirmation: "correct horse battery".to_string(),
        }
    }

    #[test]
    fn test_register_request_valid() {
        assert!(register_request().validate().is_ok());
    }

    #[test]
    fn test_register_request_password_mismatch_is_password_scoped() {
        let mut input = register_request();
        input.password_confirmation = "something else".to_string();

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_register_request_rejects_invalid_email() {
        let mut input = register_request();
        input.email = "not-an-email".to_string();

        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_new_user_is_unprivileged() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
        );

        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        assert_eq!(user.roles(), vec![Role::Customer]);
    }

    #[test]
    fn test_roles_follow_account_flags() {
        let mut user = User::new(
            "bob".to_string(),
            "bob@example.com".to_string(),
            "hash".to_string(),
        );

        user.is_staff = true;
        assert_eq!(user.roles(), vec![Role::Customer, Role::Seller]);
        assert_eq!(user.role_names(), vec!["customer", "seller"]);

        user.is_superuser = true;
        assert_eq!(user.roles(), vec![Role::Customer, Role::Seller, Role::Admin]);
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [Role::Customer, Role::Seller, Role::Admin] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }

        assert!("superhero".parse::<Role>().is_err());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "super-secret-hash".to_string(),
        );

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("super-secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
