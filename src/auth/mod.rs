//! # Authentication
//!
//! Credentials the runner attaches to test requests on behalf of the
//! configured user.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::{Error, Result};

/// Supported authentication methods.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthMethod {
    #[default]
    None,
    BearerToken {
        token: String,
    },
}

impl AuthMethod {
    /// A bearer token when one is configured, otherwise no authentication.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some(token) if !token.is_empty() => AuthMethod::BearerToken {
                token: token.to_string(),
            },
            _ => AuthMethod::None,
        }
    }

    /// Add the credential unless the request already sets `Authorization`.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        let AuthMethod::BearerToken { token } = self else {
            return Ok(());
        };
        if headers.contains_key(AUTHORIZATION) {
            return Ok(());
        }

        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| Error::InvalidHeader {
            name: AUTHORIZATION.to_string(),
            reason: e.to_string(),
        })?;
        headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tokens_mean_no_auth() {
        assert_eq!(AuthMethod::from_token(None), AuthMethod::None);
        assert_eq!(AuthMethod::from_token(Some("  ")), AuthMethod::None);
    }

    #[test]
    fn bearer_is_added_when_absent() {
        let mut headers = HeaderMap::new();
        AuthMethod::from_token(Some("abc")).apply(&mut headers).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn explicit_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        AuthMethod::from_token(Some("abc")).apply(&mut headers).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Basic xyz");
    }
}
