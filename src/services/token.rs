// src/services/token.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Claims, User},
};

/// Emite e valida os tokens Bearer (JWT HS256).
///
/// Sem estado: tudo deriva do segredo compartilhado e do TTL configurado.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("TTL do token fora do intervalo suportado"))?;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            workspace_id: user.workspace_id,
            role: user.role,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// `true` somente se assinatura, expiração e claims estiverem corretas. Nunca falha.
    pub fn validate(&self, token: &str) -> bool {
        decode::<Claims>(token, &self.decoding_key, &self.validation(true)).is_ok()
    }

    /// Lê o `sub` do token (assinatura conferida, expiração não).
    /// Quem chama deve ter usado `validate` antes.
    pub fn extract_subject_id(&self, token: &str) -> Result<Uuid, AppError> {
        Ok(self.decode_ignoring_expiry(token)?.sub)
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation(true))
            .map(|data| data.claims)
            .map_err(|_| AppError::MalformedCredential)
    }

    fn decode_ignoring_expiry(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation(false))
            .map(|data| data.claims)
            .map_err(|_| AppError::MalformedCredential)
    }

    fn validation(&self, check_expiry: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = check_expiry;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}
