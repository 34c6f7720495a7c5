use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use domain::value_objects::{enums::user_roles::Role, iam::Identity};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::{UseCaseError, UseCaseResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const TOKEN_TTL_DAYS: i64 = 30;
pub const VERIFICATION_CODE_LEN: usize = 6;

const DUMMY_PASSWORD: &str = "storefront-dummy-password";
pub(crate) static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Wire format of the bearer token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingHeader,
    #[error("invalid authorization header format")]
    InvalidHeaderFormat,
    #[error("invalid token")]
    InvalidToken,
    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("invalid token claims")]
    InvalidClaims,
    #[error("token expired")]
    TokenExpired,
    #[error("please join seller program to manage products")]
    NotSeller,
}

impl From<AuthError> for UseCaseError {
    fn from(err: AuthError) -> Self {
        UseCaseError::Auth(err.to_string())
    }
}

/// Password hashing and HMAC-signed bearer tokens.
#[derive(Clone)]
pub struct AuthService {
    secret: String,
}

impl AuthService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn hash_password(&self, password: &str) -> UseCaseResult<String> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UseCaseError::Validation(format!(
                "password length should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| UseCaseError::Store(anyhow::anyhow!("password hash failed: {err}")))?;

        Ok(hash.to_string())
    }

    pub fn verify_password(&self, plain: &str, hashed: &str) -> bool {
        match PasswordHash::new(hashed) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Runs a full Argon2 verify against a throwaway hash so a missing
    /// account costs the same as a wrong password. Always false.
    pub fn verify_against_dummy(&self, plain: &str) -> bool {
        let hashed = DUMMY_HASH.get_or_init(|| {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(DUMMY_PASSWORD.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .unwrap_or_default()
        });
        self.verify_password(plain, hashed);
        false
    }

    pub fn generate_token(&self, user_id: i32, email: &str, role: Role) -> UseCaseResult<String> {
        if user_id <= 0 || email.is_empty() {
            return Err(UseCaseError::Validation(
                "invalid inputs for token generation".to_string(),
            ));
        }
        if self.secret.is_empty() {
            return Err(UseCaseError::Store(anyhow::anyhow!("jwt secret is missing")));
        }

        let issued_at = Utc::now();
        let claims = TokenClaims {
            user_id,
            email: email.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|err| UseCaseError::Store(anyhow::anyhow!("failed to sign token: {err}")))
    }

    pub fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAlgorithm => AuthError::UnexpectedAlgorithm,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
            _ => AuthError::InvalidToken,
        })?;

        let claims = token_data.claims;
        if Utc::now().timestamp() > claims.exp {
            return Err(AuthError::TokenExpired);
        }
        if claims.user_id <= 0 || claims.email.is_empty() {
            return Err(AuthError::InvalidClaims);
        }

        Ok(Identity {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        })
    }

    /// Verifies an `Authorization` header value of the form `Bearer <token>`.
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let header = header
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingHeader)?;

        let (scheme, token) = header
            .split_once(' ')
            .ok_or(AuthError::InvalidHeaderFormat)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
            return Err(AuthError::InvalidHeaderFormat);
        }

        self.verify_token(token)
    }

    /// `verify_bearer` plus the seller role check.
    pub fn verify_seller_bearer(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let identity = self.verify_bearer(header)?;
        if !identity.is_seller() {
            return Err(AuthError::NotSeller);
        }
        Ok(identity)
    }
}

/// Numeric one-time code sent over SMS.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..VERIFICATION_CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests;
