use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT token time-to-live constants
pub const ACCESS_TOKEN_TTL: i64 = 900; // 15 minutes
pub const REFRESH_TOKEN_TTL: i64 = 604800; // 7 days

/// Discriminates access tokens from refresh tokens so a refresh token can
/// never be presented on an authenticated route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,          // Subject (user ID)
    pub username: String,     // Username
    pub roles: Vec<String>,   // Role names consumed by permission checks
    pub token_type: TokenType,
    pub exp: i64,             // Expiration time
    pub iat: i64,             // Issued at
    pub jti: String,          // JWT ID
}

/// Stateless JWT authentication: HS256-signed access/refresh token pair.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
}

impl JwtAuth {
    /// Create a new JWT auth instance.
    ///
    /// # Example
    /// ```ignore
    /// use axum_helpers::{JwtAuth, JwtConfig};
    /// use core_config::FromEnv;
    ///
    /// let config = JwtConfig::from_env()?;
    /// let jwt_auth = JwtAuth::new(&config);
    /// ```
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
        }
    }

    /// Create access token (15 min)
    pub fn create_access_token(
        &self,
        user_id: &str,
        username: &str,
        roles: &[String],
    ) -> eyre::Result<String> {
        self.create_token(user_id, username, roles, TokenType::Access, ACCESS_TOKEN_TTL)
    }

    /// Create refresh token (7 days)
    pub fn create_refresh_token(
        &self,
        user_id: &str,
        username: &str,
        roles: &[String],
    ) -> eyre::Result<String> {
        self.create_token(
            user_id,
            username,
            roles,
            TokenType::Refresh,
            REFRESH_TOKEN_TTL,
        )
    }

    /// Create JWT token with specified type and TTL
    fn create_token(
        &self,
        user_id: &str,
        username: &str,
        roles: &[String],
        token_type: TokenType,
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let exp = (now + Duration::seconds(ttl_seconds)).timestamp();
        let iat = now.timestamp();
        let jti = Uuid::new_v4().to_string();

        let claims = JwtClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            roles: roles.to_vec(),
            token_type,
            exp,
            iat,
            jti,
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify JWT token signature and decode claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Verify a token and require it to be an access token
    pub fn verify_access_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(eyre::eyre!("Expected an access token"));
        }
        Ok(claims)
    }

    /// Verify a token and require it to be a refresh token
    pub fn verify_refresh_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(eyre::eyre!("Expected a refresh token"));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-at-least-32-chars!"))
    }

    #[test]
    fn test_access_token_round_trip() {
        let auth = auth();
        let roles = vec!["seller".to_string()];

        let token = auth
            .create_access_token("user-1", "alice", &roles)
            .unwrap();
        let claims = auth.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.roles, roles);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let auth = auth();
        let token = auth.create_refresh_token("user-1", "alice", &[]).unwrap();

        assert!(auth.verify_access_token(&token).is_err());
        assert!(auth.verify_refresh_token(&token).is_ok());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = auth();
        let token = auth.create_access_token("user-1", "alice", &[]).unwrap();

        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-32-chars-long!"));
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_tokens_carry_unique_jti() {
        let auth = auth();
        let a = auth.create_access_token("user-1", "alice", &[]).unwrap();
        let b = auth.create_access_token("user-1", "alice", &[]).unwrap();

        let ca = auth.verify_token(&a).unwrap();
        let cb = auth.verify_token(&b).unwrap();
        assert_ne!(ca.jti, cb.jti);
    }
}
