use crate::types::{AppError, Claims, Result, TokenResponse, TokenType};
use crate::utils::toml_config::AuthConfig;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Password hashing (Argon2id) and HS256 token issuing for user accounts.
pub struct AuthService {
    jwt_secret: String,
    access_expiry: i64,
    refresh_expiry: i64,
}

impl AuthService {
    /// `access_expiry` and `refresh_expiry` are in seconds.
    pub fn new(jwt_secret: String, access_expiry: i64, refresh_expiry: i64) -> Self {
        Self {
            jwt_secret,
            access_expiry,
            refresh_expiry,
        }
    }

    pub fn from_config(config: &AuthConfig, jwt_secret: String) -> Self {
        Self::new(jwt_secret, config.jwt_access_expiry, config.jwt_refresh_expiry)
    }

    pub fn access_expiry(&self) -> i64 {
        self.access_expiry
    }

    /// PHC-formatted Argon2id hash.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Auth(format!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Auth(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Issue an access/refresh token pair for a user.
    pub fn generate_tokens(&self, user_id: &str, email: &str) -> Result<TokenResponse> {
        Ok(TokenResponse {
            user_id: user_id.to_string(),
            access_token: self.sign(user_id, email, TokenType::Access, self.access_expiry)?,
            refresh_token: self.sign(user_id, email, TokenType::Refresh, self.refresh_expiry)?,
            expires_in: self.access_expiry,
        })
    }

    fn sign(
        &self,
        user_id: &str,
        email: &str,
        token_type: TokenType,
        ttl_secs: i64,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type,
            exp: (now + Duration::seconds(ttl_secs)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Auth(format!("Failed to generate token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))
    }

    /// Verify a token that may be used to call the API. Refresh tokens are
    /// rejected.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::Auth("Access token required".to_string()));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(
            "chatbotx-test-secret-at-least-32-chars".to_string(),
            1800,    // 30 minutes
            2592000, // 30 days
        )
    }

    #[test]
    fn test_password_round_trip() {
        let service = service();
        let hash = service.hash_password("student-pass-1").expect("should hash");

        assert!(hash.starts_with("$argon2"), "hash should be in PHC format");
        assert!(service.verify_password("student-pass-1", &hash).unwrap());
        assert!(!service.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_auth_error() {
        let result = service().verify_password("x", "not-a-phc-string");
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_tokens_carry_user() {
        let service = service();
        let tokens = service
            .generate_tokens("user-1", "learner@example.com")
            .expect("should generate tokens");

        assert_eq!(tokens.user_id, "user-1");
        assert_eq!(tokens.expires_in, 1800);
        assert_ne!(tokens.access_token, tokens.refresh_token);

        let claims = service.verify_token(&tokens.access_token).unwrap();
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "learner@example.com");
        assert!(claims.exp >= claims.iat + 1795 && claims.exp <= claims.iat + 1805);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let service = service();
        let tokens = service.generate_tokens("user-1", "learner@example.com").unwrap();

        let refresh = service.verify_token(&tokens.refresh_token).unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert!(refresh.exp > refresh.iat + 2_500_000);

        assert!(service.verify_access_token(&tokens.access_token).is_ok());
        assert!(matches!(
            service.verify_access_token(&tokens.refresh_token),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_foreign_or_garbage_tokens_are_rejected() {
        let other = AuthService::new("another-secret-that-is-32-chars-long".to_string(), 60, 60);
        let tokens = other.generate_tokens("user-2", "a@b.c").unwrap();

        assert!(service().verify_token(&tokens.access_token).is_err());
        assert!(service().verify_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = AuthConfig::default();
        let service = AuthService::from_config(&config, "x".repeat(32));
        assert_eq!(service.access_expiry(), config.jwt_access_expiry);
    }
}
