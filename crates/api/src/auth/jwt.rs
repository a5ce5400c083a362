//! Validation of identity-provider access tokens.
//!
//! Users sign in with an external identity provider; this server never issues
//! tokens. It only checks the signature and expiry of the bearer token and
//! takes the provider's subject id (`sub`) as the user's external id.
//!
//! Two key modes are supported: a shared HS256 secret or an RS256 public key
//! (PEM), the latter being what hosted identity providers publish.

use std::fmt;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims read from an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the identity provider's user id.
    pub sub: String,
    /// Primary email, when the provider includes it.
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Key material used to verify token signatures.
#[derive(Clone)]
pub enum JwtKey {
    /// HS256 shared secret.
    Secret(String),
    /// RS256 public key in PEM format.
    RsaPublicPem(String),
}

impl fmt::Debug for JwtKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JwtKey::Secret(_) => f.write_str("Secret(<redacted>)"),
            JwtKey::RsaPublicPem(_) => f.write_str("RsaPublicPem(..)"),
        }
    }
}

/// Configuration for access-token validation.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub key: JwtKey,
    /// Expected `iss` claim. Not checked when `None`.
    pub issuer: Option<String>,
}

impl AuthConfig {
    /// Load token validation settings from environment variables.
    ///
    /// | Env Var               | Required | Default |
    /// |-----------------------|----------|---------|
    /// | `AUTH_JWT_PUBLIC_KEY` | one of   | --      |
    /// | `AUTH_JWT_SECRET`     | one of   | --      |
    /// | `AUTH_JWT_ISSUER`     | no       | --      |
    ///
    /// The public key wins when both are set.
    ///
    /// # Panics
    ///
    /// Panics if neither key is set, or if the public key is not valid PEM.
    pub fn from_env() -> Self {
        let public_key = std::env::var("AUTH_JWT_PUBLIC_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let secret = std::env::var("AUTH_JWT_SECRET")
            .ok()
            .filter(|v| !v.is_empty());

        let key = match (public_key, secret) {
            (Some(pem), _) => {
                let pem = pem.replace("\\n", "\n");
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .expect("AUTH_JWT_PUBLIC_KEY must be a valid RSA public key in PEM format");
                JwtKey::RsaPublicPem(pem)
            }
            (None, Some(secret)) => JwtKey::Secret(secret),
            (None, None) => panic!("AUTH_JWT_PUBLIC_KEY or AUTH_JWT_SECRET must be set"),
        };

        let issuer = std::env::var("AUTH_JWT_ISSUER")
            .ok()
            .filter(|v| !v.is_empty());

        Self { key, issuer }
    }

    fn decoding_key(&self) -> Result<(DecodingKey, Algorithm), jsonwebtoken::errors::Error> {
        match &self.key {
            JwtKey::Secret(secret) => Ok((
                DecodingKey::from_secret(secret.as_bytes()),
                Algorithm::HS256,
            )),
            JwtKey::RsaPublicPem(pem) => {
                Ok((DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256))
            }
        }
    }
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the signature, `exp`, and `iss` when an issuer is configured.
/// Audience is not checked.
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let (key, algorithm) = config.decoding_key()?;

    let mut validation = Validation::new(algorithm);
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);
    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer]);
    }

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}
