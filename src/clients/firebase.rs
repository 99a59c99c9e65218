use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::constants::identity::{FIREBASE_ISSUER_PREFIX, USER_AGENT};
use crate::domain::AuthProvider;
use crate::services::identity_service::{IdentityError, IdentityProvider, VerifiedIdentity};

#[derive(Debug, Clone, Deserialize)]
struct JsonWebKey {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JsonWebKeySet {
    keys: Vec<JsonWebKey>,
}

#[derive(Debug, Deserialize)]
struct FirebaseInfo {
    sign_in_provider: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    firebase: Option<FirebaseInfo>,
}

type KeyCache = Option<(HashMap<String, JsonWebKey>, Instant)>;

/// Verifies Firebase ID tokens and deletes Firebase accounts.
#[derive(Clone)]
pub struct FirebaseIdentityClient {
    client: Client,
    project_id: String,
    jwks_url: String,
    identity_toolkit_url: String,
    access_token: Option<String>,
    key_ttl: Duration,
    keys: Arc<Mutex<KeyCache>>,
}

impl FirebaseIdentityClient {
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(config.request_timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            project_id: config.project_id.clone(),
            jwks_url: config.jwks_url.clone(),
            identity_toolkit_url: config.identity_toolkit_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            key_ttl: Duration::from_secs(config.key_cache_seconds),
            keys: Arc::new(Mutex::new(None)),
        }
    }

    async fn signing_key(&self, kid: &str) -> Result<JsonWebKey, IdentityError> {
        let mut cache = self.keys.lock().await;

        if let Some((keys, fetched_at)) = cache.as_ref()
            && fetched_at.elapsed() < self.key_ttl
            && let Some(key) = keys.get(kid)
        {
            return Ok(key.clone());
        }

        debug!("Refreshing identity provider signing keys");

        let response = self.client.get(&self.jwks_url).send().await?;
        if !response.status().is_success() {
            return Err(IdentityError::Unavailable(format!(
                "Failed to fetch signing keys: HTTP {}",
                response.status()
            )));
        }

        let set: JsonWebKeySet = response.json().await?;
        let keys: HashMap<String, JsonWebKey> =
            set.keys.into_iter().map(|k| (k.kid.clone(), k)).collect();

        let key = keys
            .get(kid)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidToken(format!("Unknown signing key: {kid}")))?;

        *cache = Some((keys, Instant::now()));

        Ok(key)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityClient {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let header = decode_header(token)
            .map_err(|e| IdentityError::InvalidToken(format!("Invalid token header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::InvalidToken(format!(
                "Unexpected algorithm: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("Missing key ID in token header".into()))?;

        let key = self.signing_key(&kid).await?;
        let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e)
            .map_err(|e| IdentityError::Provider(format!("Bad signing key: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("{FIREBASE_ISSUER_PREFIX}{}", self.project_id)]);

        let claims = decode::<IdTokenClaims>(token, &decoding_key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?
            .claims;

        if claims.sub.is_empty() {
            return Err(IdentityError::InvalidToken("Empty subject".into()));
        }

        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| IdentityError::InvalidToken("Token has no email".into()))?;

        let provider = AuthProvider::from_sign_in_provider(
            claims
                .firebase
                .as_ref()
                .and_then(|f| f.sign_in_provider.as_deref()),
        );

        Ok(VerifiedIdentity {
            subject_id: claims.sub,
            email,
            email_verified: claims.email_verified,
            provider,
            name: claims.name,
            picture: claims.picture,
        })
    }

    async fn delete_account(&self, subject_id: &str) -> Result<(), IdentityError> {
        let Some(token) = self.access_token.as_deref() else {
            return Err(IdentityError::Unavailable(
                "No identity admin access token configured".into(),
            ));
        };

        let url = format!(
            "{}/projects/{}/accounts:delete",
            self.identity_toolkit_url, self.project_id
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "localId": subject_id }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Already gone upstream
            StatusCode::NOT_FOUND => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(%status, "Identity provider refused account deletion");
                Err(IdentityError::Provider(format!("HTTP {status}: {body}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FirebaseIdentityClient {
        FirebaseIdentityClient::new(&IdentityConfig {
            project_id: "demo-project".to_string(),
            ..IdentityConfig::default()
        })
    }

    #[tokio::test]
    async fn rejects_garbage_tokens_without_network() {
        let err = client().verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn deletion_without_access_token_is_unavailable() {
        let err = client().delete_account("uid-1").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable(_)));
    }

    #[test]
    fn claims_parse_sign_in_provider() {
        let claims: IdTokenClaims = serde_json::from_str(
            r#"{"sub":"u1","email":"a@b.com","email_verified":false,
                "firebase":{"sign_in_provider":"password"}}"#,
        )
        .unwrap();
        assert_eq!(
            AuthProvider::from_sign_in_provider(
                claims.firebase.as_ref().and_then(|f| f.sign_in_provider.as_deref())
            ),
            AuthProvider::EmailPassword
        );
        assert!(!claims.email_verified);
    }
}
