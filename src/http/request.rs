use std::collections::HashMap;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::auth::AuthMethod;
use crate::error::{Error, Result};
use crate::spec::{Behavior, Test};

use super::method::HttpMethod;

/// Carries the test case identifier so server-side logs can be correlated.
pub const CASE_ID_HEADER: &str = "x-unittest-case";

/// A fully resolved request for one test case, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl PreparedRequest {
    /// Apply the header policy for `test` on top of its explicit headers.
    pub fn from_test(
        method: HttpMethod,
        url: String,
        test: &Test,
        behavior: &Behavior,
        auth: &AuthMethod,
    ) -> Result<Self> {
        let mut headers = build_headers(&test.request.headers)?;

        if behavior.inject_auth {
            auth.apply(&mut headers)?;
        }

        let mut body = None;
        if method.carries_body() {
            if let Some(value) = test.request.body() {
                body = Some(serde_json::to_string(value)?);
                if behavior.inject_content_type && !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
            }
        }

        if let Ok(value) = HeaderValue::from_str(&test.id) {
            headers.insert(HeaderName::from_static(CASE_ID_HEADER), value);
        }

        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }
}

pub fn build_headers(input: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| Error::InvalidHeader {
            name: key.clone(),
            reason: err.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| Error::InvalidHeader {
            name: key.clone(),
            reason: err.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
