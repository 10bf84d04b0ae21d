//! Authentication: JWT bearer tokens backed by the users table, argon2
//! password hashing, and the axum extractors handlers use to identify the
//! caller. Authorization decisions live in [`policy`].

use std::sync::Arc;
use std::time::Duration;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::user;
use crate::errors::ServiceError;
use crate::AppState;

pub mod policy;

/// Claim structure for issued JWTs.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub admin: bool,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller identity extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub token_id: String,
}

impl AuthUser {
    fn from_claims(claims: Claims) -> Result<Self, AuthError> {
        let user_id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            user_id,
            name: claims.name,
            email: claims.email,
            is_admin: claims.admin,
            token_id: claims.jti,
        })
    }

    /// Whether this caller is the client identified by `email` on a record.
    pub fn owns_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

/// Authentication configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiration: Duration,
}

/// Issues and validates tokens, and owns user credential handling.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Deserialize, Serialize, validator::Validate, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Create a user account and hand back a signed token.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<(user::Model, String), ServiceError> {
        use validator::Validate;
        request.validate()?;

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(request.email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "a user with email {} already exists",
                request.email
            )));
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let created = user::ActiveModel {
            name: Set(request.name),
            email: Set(request.email),
            password_hash: Set(password_hash),
            is_admin: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        let token = self
            .issue_token(&created)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        Ok((created, token))
    }

    /// Verify credentials and hand back a signed token.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, String), ServiceError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?;

        let found = match found {
            Some(u) if verify_password(password, &u.password_hash) => u,
            // Same response for unknown email and wrong password.
            _ => return Err(ServiceError::AuthError("invalid credentials".to_string())),
        };

        let token = self
            .issue_token(&found)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        Ok((found, token))
    }

    /// Sign a token for an existing user.
    pub fn issue_token(&self, user: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::InternalError("invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user.user_id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            admin: user.is_admin,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Decode and validate a token, returning its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::InternalError(e.to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// Strict extractor: a missing or invalid token rejects with 401.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = state.auth.verify_token(&token)?;
        AuthUser::from_claims(claims)
    }
}

/// Lenient extractor: an absent token yields `None` so route policy decides
/// between 401 and 403; a malformed or expired token still rejects.
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn actor(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers) {
            None => Ok(Self(None)),
            Some(token) => {
                let claims = state.auth.verify_token(&token)?;
                Ok(Self(Some(AuthUser::from_claims(claims)?)))
            }
        }
    }
}

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No authentication token provided")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "AUTH_MISSING_TOKEN"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "AUTH_INVALID_TOKEN"),
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "AUTH_TOKEN_EXPIRED"),
            Self::TokenCreation(_) | Self::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_INTERNAL_ERROR")
            }
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> user::Model {
        user::Model {
            user_id: 42,
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: String::new(),
            is_admin: true,
            created_at: Utc::now(),
        }
    }

    fn service() -> AuthService {
        AuthService::new(
            AuthConfig {
                jwt_secret: "unit_test_secret_key_that_is_long_enough".to_string(),
                token_expiration: Duration::from_secs(3600),
            },
            Arc::new(DatabaseConnection::Disconnected),
        )
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let svc = service();
        let token = svc.issue_token(&sample_user()).unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "admin@example.com");
        assert!(claims.admin);

        let auth_user = AuthUser::from_claims(claims).unwrap();
        assert_eq!(auth_user.user_id, 42);
        assert!(auth_user.is_admin);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let mut token = svc.issue_token(&sample_user()).unwrap();
        token.push('x');
        assert!(matches!(
            svc.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn owns_email_is_case_insensitive() {
        let user = AuthUser {
            user_id: 1,
            name: "U".to_string(),
            email: "Client@Example.com".to_string(),
            is_admin: false,
            token_id: "jti".to_string(),
        };
        assert!(user.owns_email("client@example.com"));
        assert!(!user.owns_email("other@example.com"));
    }
}
