use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

/// Session lifetime of an issued token.
pub const TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// `users.id` as a decimal string.
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Who a verified token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: i32,
    pub username: String,
}

pub fn mint_token(
    user_id: i32,
    username: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("system clock is before the unix epoch"))?
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat,
        exp: iat + TOKEN_TTL_SECS,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("failed to encode token: {e}")))
}

/// Verify signature and expiry. Anything that does not check out is `None`;
/// the reason is only logged.
pub fn verify_token(token: &str, security: &SecurityConfig) -> Option<TokenSubject> {
    let validation = Validation::new(security.algorithm);

    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            debug!(reason = ?e.kind(), "token rejected");
            return None;
        }
    };

    match claims.sub.parse::<i32>() {
        Ok(user_id) => Some(TokenSubject {
            user_id,
            username: claims.username,
        }),
        Err(_) => {
            debug!(sub = %claims.sub, "token subject is not a user id");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    fn security(secret: &str) -> SecurityConfig {
        SecurityConfig::new(secret.as_bytes())
    }

    #[test]
    fn test_mint_and_verify() {
        let sec = security("test_secret_key_for_testing_purposes_only");
        let token = mint_token(7, "alice", SystemTime::now(), &sec).unwrap();

        assert_eq!(
            verify_token(&token, &sec),
            Some(TokenSubject {
                user_id: 7,
                username: "alice".to_string()
            })
        );
    }

    #[test]
    fn test_expired_token() {
        let sec = security("test_secret_key_for_testing_purposes_only");
        let issued = SystemTime::now() - Duration::from_secs(TOKEN_TTL_SECS as u64 + 3600);
        let token = mint_token(7, "alice", issued, &sec).unwrap();

        assert_eq!(verify_token(&token, &sec), None);
    }

    #[test]
    fn test_bad_signature() {
        let token = mint_token(7, "alice", SystemTime::now(), &security("secret-A")).unwrap();
        assert_eq!(verify_token(&token, &security("secret-B")), None);
    }

    #[test]
    fn test_garbage_token() {
        assert_eq!(verify_token("not.a.jwt", &security("s")), None);
    }

    #[test]
    fn test_non_numeric_subject() {
        let sec = security("s");
        let claims = Claims {
            sub: "google-oauth2|123".to_string(),
            username: "bob".to_string(),
            iat: 0,
            exp: 4_102_444_800,
        };
        let token = encode(
            &Header::new(sec.algorithm),
            &claims,
            &EncodingKey::from_secret(&sec.jwt_secret),
        )
        .unwrap();

        assert_eq!(verify_token(&token, &sec), None);
    }
}
