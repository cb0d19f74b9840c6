use access_control::{Gate, PermissionResolver, Principal, SessionProvider};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::ops::Deref;

use crate::config::JwtConfig;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,       // Principal ID
    pub email: String,
    pub role: String,      // Kept raw; unknown roles hydrate to no grants
    pub exp: usize,        // Expiration time
    pub iat: usize,        // Issued at
}

pub fn issue_token(config: &JwtConfig, sub: &str, email: &str, role: &str) -> anyhow::Result<String> {
    let now = Utc::now();
    let exp = i64::try_from(config.expiry_hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| anyhow::anyhow!("Token expiry out of range: {}h", config.expiry_hours))?;

    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Token generation failed: {}", e))
}

/// Claims from a `Bearer` authorization header, `None` when absent or invalid.
pub fn bearer_claims(parts: &Parts, config: &JwtConfig) -> Option<Claims> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))?;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("Rejected bearer token: {}", e);
            None
        }
    }
}

/// Session backed by the request's bearer token.
pub struct BearerSession {
    claims: Option<Claims>,
    resolver: PermissionResolver,
}

impl BearerSession {
    pub fn new(claims: Option<Claims>, resolver: PermissionResolver) -> Self {
        Self { claims, resolver }
    }
}

#[async_trait]
impl SessionProvider for BearerSession {
    async fn current_principal(&self) -> anyhow::Result<Option<Principal>> {
        let Some(claims) = &self.claims else {
            return Ok(None);
        };

        let principal = self
            .resolver
            .hydrate(&claims.sub, &claims.email, &claims.role)
            .await?;
        Ok(Some(principal))
    }
}

/// Per-request gate. Handlers call it first and stop on anything but
/// `Allowed`.
pub struct RequestGate(Gate<BearerSession>);

impl Deref for RequestGate {
    type Target = Gate<BearerSession>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestGate {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, &state.config.jwt);
        let session = BearerSession::new(claims, state.resolver.clone());
        Ok(RequestGate(Gate::new(session)))
    }
}
