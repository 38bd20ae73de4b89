//! JWT app-user authentication
//!
//! Box server authentication works in three steps:
//!
//! 1. **Unlock the key**: the app's private key is an encrypted PKCS#8 PEM,
//!    decrypted with `private_key_password`.
//! 2. **Sign an assertion**: an RS256 JWT naming the client as issuer and the
//!    app user as subject, with the public key ID in the `kid` header.
//! 3. **Exchange it**: the assertion is POSTed to the token endpoint with the
//!    JWT-bearer grant type and the client credentials.

use boxio_core::domain::{AccessToken, ConnectionError, Credentials};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use pkcs8::DecodePrivateKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::BoxClient;

/// OAuth2 grant type for JWT bearer assertions
pub const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertions are single-use; Box accepts at most 60 seconds
const ASSERTION_LIFETIME_SECS: i64 = 45;

/// Claims of the signed assertion
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub box_sub_type: String,
    pub aud: String,
    pub jti: String,
    pub exp: i64,
}

/// Successful response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Error response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Loads the RSA signing key from PEM text
///
/// Encrypted PKCS#8 keys are decrypted with `password`; unencrypted PKCS#8
/// and PKCS#1 keys are accepted as-is.
pub fn signing_key(pem: &str, password: &str) -> Result<EncodingKey, ConnectionError> {
    let key = if pem.contains("BEGIN ENCRYPTED PRIVATE KEY") {
        RsaPrivateKey::from_pkcs8_encrypted_pem(pem, password.as_bytes())
            .map_err(|e| ConnectionError::InvalidKey(format!("cannot decrypt private key: {e}")))?
    } else if pem.contains("BEGIN RSA PRIVATE KEY") {
        RsaPrivateKey::from_pkcs1_pem(pem)
            .map_err(|e| ConnectionError::InvalidKey(format!("invalid PKCS#1 key: {e}")))?
    } else {
        RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| ConnectionError::InvalidKey(format!("invalid PKCS#8 key: {e}")))?
    };

    let der = key
        .to_pkcs1_der()
        .map_err(|e| ConnectionError::InvalidKey(format!("cannot encode key: {e}")))?;
    Ok(EncodingKey::from_rsa_der(der.as_bytes()))
}

/// Signs an assertion for the app user named in `credentials`
pub fn build_assertion(
    credentials: &Credentials,
    key: &EncodingKey,
    audience: &str,
) -> Result<String, ConnectionError> {
    let claims = AssertionClaims {
        iss: credentials.client_id().to_string(),
        sub: credentials.user_id().to_string(),
        box_sub_type: "user".to_string(),
        aud: audience.to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        exp: (Utc::now() + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
    };

    let header = Header {
        alg: Algorithm::RS256,
        kid: Some(credentials.public_key_id().to_string()),
        ..Default::default()
    };

    encode(&header, &claims, key)
        .map_err(|e| ConnectionError::InvalidKey(format!("cannot sign assertion: {e}")))
}

/// Runs the full key, assertion and exchange sequence
#[tracing::instrument(skip_all, fields(user_id = %credentials.user_id()))]
pub async fn authenticate(
    client: &BoxClient,
    credentials: &Credentials,
) -> Result<AccessToken, ConnectionError> {
    let key = signing_key(
        credentials.private_key_pem(),
        credentials.private_key_password(),
    )?;
    let assertion = build_assertion(credentials, &key, client.token_url())?;
    debug!("Signed JWT assertion, exchanging for access token");

    let form = [
        ("grant_type", JWT_GRANT_TYPE),
        ("assertion", assertion.as_str()),
        ("client_id", credentials.client_id()),
        ("client_secret", credentials.client_secret()),
    ];

    let response = client
        .token_request()
        .form(&form)
        .send()
        .await
        .map_err(|e| ConnectionError::Unreachable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<TokenErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error_description.or(e.error))
            .unwrap_or(body);
        return Err(ConnectionError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ConnectionError::Unreachable(format!("invalid token response: {e}")))?;

    let expires_at = Utc::now() + Duration::seconds(token.expires_in.unwrap_or(3600));
    info!(%expires_at, "Obtained access token");
    Ok(AccessToken::new(token.access_token, expires_at))
}
