//! Authenticated principal handed to us by the identity provider

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims issued by the external identity provider.
///
/// Only `sub` matters to the library: it carries the numeric user id that
/// books, loans, scores and progress records reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalClaims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl PrincipalClaims {
    /// Create a signed token (used by tooling and tests; production tokens come from the provider)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

/// The caller of a request, reduced to what the domain needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub name: Option<String>,
}

impl Principal {
    pub fn is(&self, user_id: Option<i32>) -> bool {
        user_id == Some(self.user_id)
    }
}

impl TryFrom<PrincipalClaims> for Principal {
    type Error = AppError;

    fn try_from(claims: PrincipalClaims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::Authentication(format!("Invalid subject: {}", claims.sub)))?;
        Ok(Self {
            user_id,
            name: claims.name,
        })
    }
}
