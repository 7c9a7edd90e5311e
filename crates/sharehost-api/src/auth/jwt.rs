use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sharehost_core::{AppError, User};

/// Tokens carry no expiry; revocation happens by replacing the stored token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub id: i32,
    pub username: String,
}

pub fn issue_token(user: &User, secret: &str) -> Result<String, AppError> {
    let claims = JwtClaims {
        id: user.id,
        username: user.username.clone(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> Result<JwtClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT verification failed");
        AppError::Unauthorized("Invalid token".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharehost_core::UserRole;

    fn user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            password_hash: String::new(),
            token: None,
            role: UserRole::User,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let token = issue_token(&user(), "secret").unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(
            claims,
            JwtClaims {
                id: 7,
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&user(), "secret").unwrap();
        assert!(matches!(
            verify_token(&token, "other"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(verify_token("not-a-jwt", "secret").is_err());
    }
}
