// src/services/token.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{common::error::AppError, config::JwtSettings, models::auth::Claims};

// Emissor de tokens: sem estado por requisição, compartilhado por toda a aplicação.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    expiration: Duration,
}

impl TokenIssuer {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            expiration: Duration::hours(settings.expiration_hours),
        }
    }

    pub fn issue(&self, user_id: i32, tenant_id: i32, email: &str, roles: &[String]) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.expiration;

        let claims = Claims {
            sub: user_id.to_string(),
            tenant_id: tenant_id.to_string(),
            email: email.to_string(),
            jti: Uuid::new_v4().to_string(),
            role: roles.to_vec(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        // Header::default() = HS256
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Assinatura, validade, emissor e audiência. Qualquer falha vira `InvalidToken`.
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        if claims.user_id().is_none() || claims.tenant_id().is_none() {
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: "uma-chave-de-teste-com-mais-de-32-bytes!".into(),
            issuer: "InventoryApi".into(),
            audience: "InventoryClient".into(),
            expiration_hours: 24,
        }
    }

    #[test]
    fn issued_token_carries_identity_claims() {
        let issuer = TokenIssuer::new(&settings());
        let roles = vec!["Admin".to_string(), "Seller".to_string()];
        let token = issuer.issue(7, 3, "ana@acme.test", &roles).unwrap();

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.tenant_id(), Some(3));
        assert_eq!(claims.email, "ana@acme.test");
        assert_eq!(claims.role, roles);
        assert_eq!(claims.iss, "InventoryApi");
        assert_eq!(claims.aud, "InventoryClient");
        assert!(Uuid::parse_str(&claims.jti).is_ok());
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn every_token_gets_its_own_id() {
        let issuer = TokenIssuer::new(&settings());
        let a = issuer.validate(&issuer.issue(1, 1, "a@a.a", &[]).unwrap()).unwrap();
        let b = issuer.validate(&issuer.issue(1, 1, "a@a.a", &[]).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn tenant_claim_is_named_tenant_id() {
        let issuer = TokenIssuer::new(&settings());
        let token = issuer.issue(1, 42, "a@a.a", &[]).unwrap();

        let payload = token.split('.').nth(1).unwrap();
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, payload).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["tenantId"], "42");
        assert_eq!(json["sub"], "1");
    }

    #[test]
    fn rejects_foreign_signature_issuer_and_audience() {
        let issuer = TokenIssuer::new(&settings());

        let other_secret = TokenIssuer::new(&JwtSettings {
            secret: "outra-chave-completamente-diferente-123".into(),
            ..settings()
        });
        let other_issuer = TokenIssuer::new(&JwtSettings { issuer: "Someone".into(), ..settings() });
        let other_audience = TokenIssuer::new(&JwtSettings { audience: "Elsewhere".into(), ..settings() });

        for foreign in [other_secret, other_issuer, other_audience] {
            let token = foreign.issue(1, 1, "a@a.a", &[]).unwrap();
            assert!(matches!(issuer.validate(&token), Err(AppError::InvalidToken)));
        }
        assert!(matches!(issuer.validate("not-a-jwt"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn rejects_expired_tokens() {
        let expired = TokenIssuer::new(&JwtSettings { expiration_hours: -2, ..settings() });
        let token = expired.issue(1, 1, "a@a.a", &[]).unwrap();

        assert!(matches!(expired.validate(&token), Err(AppError::InvalidToken)));
    }
}
