//! Short-lived identity tokens shown by members at the door.
//!
//! Tokens are compact HS256 JWTs (`header.claims.signature`, base64url without
//! padding). Nothing is stored at issuance: validity is decided only by the
//! signature and the embedded expiry.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::contract::model::MemberProfile;
use crate::domain::error::DomainError;

/// Fixed validity window of every identity token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 5 * 60;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Signed claims. `jti` identifies the token for a future denylist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_no: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl IdentityClaims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// Issues and verifies identity tokens with one shared key.
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, DomainError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(DomainError::validation("token_secret", "must not be empty"));
        }
        let mac = <HmacSha256 as Mac>::new_from_slice(secret)
            .map_err(|e| DomainError::validation("token_secret", e.to_string()))?;
        Ok(Self { mac })
    }

    pub fn issue(
        &self,
        member: &MemberProfile,
        now: DateTime<Utc>,
    ) -> Result<(String, IdentityClaims), DomainError> {
        let iat = now.timestamp();
        let claims = IdentityClaims {
            sub: member.id,
            jti: Uuid::new_v4(),
            name: member.name.clone(),
            email: member.email.clone(),
            registration_no: member.registration_no.clone(),
            index_no: member.index_no.clone(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
        };

        let header = Header {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| DomainError::validation("token", e.to_string()))?;
        let claims_json = serde_json::to_vec(&claims)
            .map_err(|e| DomainError::validation("token", e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));
        Ok((format!("{signing_input}.{signature}"), claims))
    }

    /// Signature first, then freshness.
    ///
    /// Anything that does not verify against the key, including malformed
    /// input, is `SignatureInvalid`. A verified token at or past `exp` is `Expired`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, DomainError> {
        let claims = self.decode(token.trim()).ok_or(DomainError::SignatureInvalid)?;
        if now.timestamp() >= claims.exp {
            return Err(DomainError::Expired {
                expired_at: claims.expires_at(),
            });
        }
        Ok(claims)
    }

    fn decode(&self, token: &str) -> Option<IdentityClaims> {
        let mut parts = token.split('.');
        let (header_b64, claims_b64, sig_b64) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let signature = URL_SAFE_NO_PAD.decode(sig_b64).ok()?;
        let mut mac = self.mac.clone();
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let header_raw = URL_SAFE_NO_PAD.decode(header_b64).ok()?;
        let header: Header = serde_json::from_slice(&header_raw).ok()?;
        if header.alg != "HS256" {
            return None;
        }
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(claims_b64).ok()?).ok()
    }

    fn sign(&self, input: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }
}
