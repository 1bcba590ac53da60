use crate::error::{ArgonathError, ErrorCode};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// The signed-in operator, as resolved from the hosted auth platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub email: Option<String>,
    pub roles: HashSet<String>,
}

impl Principal {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
            roles: HashSet::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub nbf: Option<usize>,
    #[serde(default)]
    pub iat: Option<usize>,
}

impl TryFrom<JwtClaims> for Principal {
    type Error = AuthError;

    fn try_from(claims: JwtClaims) -> Result<Self, Self::Error> {
        if claims.sub.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        let roles: Vec<String> = claims
            .role
            .into_iter()
            .chain(claims.roles)
            .filter_map(|role| {
                let trimmed = role.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect();

        let principal = Principal::new(claims.sub).with_roles(roles);
        Ok(match claims.email.filter(|email| !email.trim().is_empty()) {
            Some(email) => principal.with_email(email),
            None => principal,
        })
    }
}

/// Verifies session tokens issued by the hosted auth platform (HS256).
///
/// Issuer and audience are only checked when configured.
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    /// Accepts either the raw token or an `Authorization` header value.
    pub fn authenticate(&self, credential: &str) -> Result<Principal, AuthError> {
        let token = bearer_token(credential).ok_or(AuthError::MissingToken)?;
        let claims = decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|err| AuthError::InvalidToken(err.to_string()))?
            .claims;
        Principal::try_from(claims)
    }
}

fn bearer_token(credential: &str) -> Option<&str> {
    let credential = credential.trim();
    let token = match credential.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => credential,
    };
    (!token.is_empty() && !token.eq_ignore_ascii_case("bearer")).then_some(token)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid jwt: {0}")]
    InvalidToken(String),
    #[error("jwt claim sub must not be empty")]
    MissingSubject,
}

impl ArgonathError for AuthError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::Unauthenticated
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("no authenticated user")]
    Anonymous,
    #[error("user {subject} is not the creator of this mind map (created by {creator})")]
    NotCreator { subject: String, creator: String },
}

impl ArgonathError for AuthzError {
    fn error_code(&self) -> ErrorCode {
        match self {
            AuthzError::Anonymous => ErrorCode::Unauthenticated,
            AuthzError::NotCreator { .. } => ErrorCode::PermissionDenied,
        }
    }
}

/// Only the creator of a mind map may delete it.
pub fn ensure_creator(principal: &Principal, creator: &str) -> Result<(), AuthzError> {
    ensure_subject(&principal.subject, creator)
}

/// Same rule as [`ensure_creator`] for callers that only hold the raw user id.
pub fn ensure_subject(subject: &str, creator: &str) -> Result<(), AuthzError> {
    if subject.trim().is_empty() {
        return Err(AuthzError::Anonymous);
    }
    if subject != creator {
        return Err(AuthzError::NotCreator {
            subject: subject.to_string(),
            creator: creator.to_string(),
        });
    }
    Ok(())
}
