use std::sync::Arc;

use axum::{debug_handler, extract::State, Json};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{config::TwilioConfig, profiles::Document, AppError, AppJson, AppResult, GetField};

/// Lifetime the platform SDKs give access tokens when none is asked for.
pub const DEFAULT_TTL_SECS: i64 = 3600;

const CONTENT_TYPE: &str = "twilio-fpa;v=1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatGrant {
    pub service_sid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grants {
    pub identity: String,
    pub chat: ChatGrant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub jti: String,
    pub iss: String,
    pub sub: String,
    pub nbf: i64,
    pub exp: i64,
    pub grants: Grants,
}

/// Signs chat access tokens with the account's API key pair.
pub struct ChatTokenIssuer {
    account_sid: String,
    api_key: String,
    service_sid: String,
    signing_key: EncodingKey,
    ttl_secs: i64,
}

impl ChatTokenIssuer {
    pub fn new(twilio: &TwilioConfig) -> Self {
        Self {
            account_sid: twilio.account_sid.clone(),
            api_key: twilio.api_key.clone(),
            service_sid: twilio.service_sid.clone(),
            signing_key: EncodingKey::from_secret(twilio.api_secret.as_bytes()),
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    #[cfg(test)]
    fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn claims(&self, identity: &str, now: i64) -> AccessClaims {
        AccessClaims {
            jti: format!("{}-{now}", self.api_key),
            iss: self.api_key.clone(),
            sub: self.account_sid.clone(),
            nbf: now,
            exp: now + self.ttl_secs,
            grants: Grants {
                identity: identity.to_owned(),
                chat: ChatGrant { service_sid: self.service_sid.clone() },
            },
        }
    }

    pub fn issue(&self, identity: &str) -> AppResult<String> {
        if identity.is_empty() {
            return Err(AppError::Validation("Identity is required"));
        }

        let header = Header {
            cty: Some(CONTENT_TYPE.to_owned()),
            ..Header::new(Algorithm::HS256)
        };
        let claims = self.claims(identity, OffsetDateTime::now_utc().unix_timestamp());

        Ok(jsonwebtoken::encode(&header, &claims, &self.signing_key)?)
    }
}

#[derive(Serialize)]
pub(crate) struct TokenResponse {
    token: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn token(
    State(issuer): State<Arc<ChatTokenIssuer>>,
    AppJson(payload): AppJson<Document>,
) -> AppResult<Json<TokenResponse>> {
    let identity = payload.get_str_field("identity").unwrap_or_default();
    let token = issuer.issue(identity)?;
    tracing::debug!(%identity, "issued chat token");
    Ok(Json(TokenResponse { token }))
}
