use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};
use crates::domain::{
    entities::restaurants::RestaurantEntity, value_objects::enums::user_roles::UserRole,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn can_manage(&self, restaurant: &RestaurantEntity) -> bool {
        self.is_admin() || restaurant.owner_id == self.user_id
    }
}

pub fn validate_jwt(token: &str, keys: &JwtKeys) -> Result<AuthUser, String> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &keys.decoding, &validation)
        .map_err(|err| format!("JWT validation failed: {err}"))?;
    let claims = token_data.claims;

    let user_id =
        Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token".to_string())?;
    let role = UserRole::parse(&claims.role).ok_or_else(|| "Unsupported role".to_string())?;

    Ok(AuthUser { user_id, role })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts.extensions.get::<JwtKeys>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication is not configured".to_string(),
        ))?;

        let auth_header = parts.headers.get(AUTHORIZATION).ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing Authorization header".to_string(),
        ))?;

        let auth_str = auth_header.to_str().map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            )
        })?;

        let token = auth_str.strip_prefix("Bearer ").ok_or((
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header format".to_string(),
        ))?;

        validate_jwt(token.trim(), &keys).map_err(|err| (StatusCode::UNAUTHORIZED, err))
    }
}

#[cfg(test)]
mod tests;
