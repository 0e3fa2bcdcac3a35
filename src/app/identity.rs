use anyhow::Result;
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};
use uuid::Uuid;

use crate::infra::db::Db;

/// Maps a session token minted by the identity provider to an internal user id.
///
/// Tokens are PASETO v4.local; the `sub` claim carries the provider's user id,
/// which is stored on `users.external_id`.
#[derive(Clone)]
pub struct SessionResolver {
    db: Db,
    key: [u8; 32],
    issuer: String,
    audience: String,
}

impl SessionResolver {
    pub fn new(db: Db, key: [u8; 32], issuer: String, audience: String) -> Self {
        Self {
            db,
            key,
            issuer,
            audience,
        }
    }

    /// `Ok(None)` for tokens that fail validation or name an unknown user.
    pub async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
        let Some(claims) = self.decrypt_claims(token)? else {
            return Ok(None);
        };
        let Some(external_id) = claims.get_claim("sub").and_then(|value| value.as_str()) else {
            return Ok(None);
        };

        let user_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE external_id = $1")
                .bind(external_id)
                .fetch_optional(self.db.pool())
                .await?;

        if user_id.is_none() {
            tracing::debug!(external_id, "session subject has no local user");
        }

        Ok(user_id)
    }

    /// Mints a session token the way the identity provider does.
    pub fn mint(&self, external_id: &str, ttl: std::time::Duration) -> Result<String> {
        let mut claims = Claims::new_expires_in(&ttl)?;
        claims.issuer(&self.issuer)?;
        claims.audience(&self.audience)?;
        claims.subject(external_id)?;
        let key = SymmetricKey::<V4>::from(&self.key)?;
        Ok(local::encrypt(&key, &claims, None, None)?)
    }

    fn decrypt_claims(&self, token: &str) -> Result<Option<Claims>> {
        let key = SymmetricKey::<V4>::from(&self.key)?;
        let mut rules = ClaimsValidationRules::new();
        rules.validate_issuer_with(&self.issuer);
        rules.validate_audience_with(&self.audience);

        let untrusted = match UntrustedToken::<Local, V4>::try_from(token) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        let trusted = match local::decrypt(&key, &untrusted, &rules, None, None) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        Ok(trusted.payload_claims().cloned())
    }
}
