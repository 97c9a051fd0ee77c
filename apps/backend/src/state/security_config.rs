use jsonwebtoken::Algorithm;

/// Secret and algorithm used to verify bearer tokens.
#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: Vec<u8>,
    pub algorithm: Algorithm,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
        }
    }

    /// Read `NEXTAUTH_SECRET`; `None` when unset or blank.
    pub fn from_env() -> Option<Self> {
        std::env::var("NEXTAUTH_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(Self::new)
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"***")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
