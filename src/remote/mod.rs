//! Client for the Synrax service: spec generation from API documentation,
//! per-repository configuration and identity-token validation.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::environment::{UnittestConfig, is_absolute_url};
use crate::error::{Error, Result};
use crate::spec::{TestSpec, decode_spec};

/// Spec generation can take a while on large documents.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(300);

const LOG_BODY_LIMIT: usize = 500;

#[derive(Debug, Clone)]
pub struct RemoteClient {
    api_base: String,
    http: Client,
}

#[derive(Serialize)]
struct SpecRequest<'a> {
    documentation: &'a str,
    config: &'a UnittestConfig,
}

#[derive(Serialize)]
struct ConfigRequest<'a> {
    filter: ConfigFilter<'a>,
}

#[derive(Serialize)]
struct ConfigFilter<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    reason: String,
}

impl RemoteClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Transport(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            api_base: api_base.trim().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Ask the generator for a test spec covering `documentation`.
    pub async fn fetch_spec(&self, documentation: &str, config: &UnittestConfig) -> Result<TestSpec> {
        if self.api_base.is_empty() {
            return Err(Error::Config("API base URL is empty".to_string()));
        }
        if config.base_url.trim().is_empty() {
            return Err(Error::Config("config.base is empty".to_string()));
        }
        if !is_absolute_url(&config.base_url) {
            return Err(Error::Config(format!(
                "config.base must be an absolute URL, got={:?}",
                config.base_url
            )));
        }

        let url = format!("{}/ai/test_spec", self.api_base);
        info!(
            url = %url,
            docs_bytes = documentation.len(),
            config_base = %config.base_url,
            auth_token_present = config.token().is_some(),
            "requesting test spec"
        );

        let payload = SpecRequest { documentation, config };
        let body = self.post_json(&url, &payload, "test_spec").await?;

        let spec = decode_spec(&body).inspect_err(|err| {
            warn!(error = %err, body = %truncate_for_log(&body, 300), "test spec decode failed");
        })?;
        info!(endpoints = spec.endpoints.len(), cases = spec.case_count(), "test spec received");
        Ok(spec)
    }

    /// Load the stored configuration of a repository.
    pub async fn fetch_config(&self, repo_id: &str) -> Result<UnittestConfig> {
        let url = format!("{}/db/read?table=global_config", self.api_base);
        debug!(url = %url, repo_id, "requesting config");

        let payload = ConfigRequest {
            filter: ConfigFilter { id: repo_id },
        };
        let body = self.post_json(&url, &payload, "config").await?;

        let config = decode_config(&body).inspect_err(|err| {
            warn!(error = %err, body = %truncate_for_log(&body, LOG_BODY_LIMIT), "config decode failed");
        })?;
        info!(
            base = %config.base_url,
            auth_token_present = config.token().is_some(),
            "config received"
        );
        Ok(config)
    }

    /// Check the CI identity token for `repo_id`. A token the service
    /// rejects is an error carrying its reason.
    pub async fn validate_identity(&self, repo_id: &str, token: &str) -> Result<()> {
        let mut url = Url::parse(&format!("{}/github/oidc_validate", self.api_base))
            .map_err(|err| Error::Config(format!("invalid API base URL: {err}")))?;
        url.query_pairs_mut()
            .append_pair("oidc_token", token)
            .append_pair("repo_id", repo_id);

        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        if !(200..=299).contains(&status) {
            return Err(Error::Remote(format!("Unexpected status code passed: {status}")));
        }

        let body = response.bytes().await?;
        let verdict: IdentityResponse = serde_json::from_slice(&body)?;
        if verdict.status == "failure" {
            return Err(Error::Remote(verdict.reason));
        }

        debug!(repo_id, "identity token accepted");
        Ok(())
    }

    async fn post_json<T: Serialize>(&self, url: &str, payload: &T, what: &str) -> Result<Vec<u8>> {
        let raw = serde_json::to_vec(payload)?;
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(raw)
            .send()
            .await
            .inspect_err(|err| warn!(url, error = %err, "{what} request failed"))?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(url, status, bytes = body.len(), "{what} response");

        if !(200..=299).contains(&status) {
            let snippet = truncate_for_log(&body, LOG_BODY_LIMIT);
            return Err(Error::Remote(format!(
                "{what} request failed with status={status} body={snippet}"
            )));
        }
        Ok(body)
    }
}

/// Decode a config store response: the config itself, or the first object
/// anywhere in the payload that has a `base` or `auth_token` key.
pub fn decode_config(body: &[u8]) -> Result<UnittestConfig> {
    if let Ok(direct) = serde_json::from_slice::<UnittestConfig>(body) {
        if !direct.is_empty() {
            return Ok(direct);
        }
    }

    let value: Value = serde_json::from_slice(body)?;
    let object = find_config_object(&value).ok_or_else(|| {
        Error::Remote("could not find config object with base/auth_token fields".to_string())
    })?;
    Ok(serde_json::from_value(Value::Object(object.clone()))?)
}

fn find_config_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) if map.contains_key("base") || map.contains_key("auth_token") => Some(map),
        Value::Object(map) => map.values().find_map(find_config_object),
        Value::Array(items) => items.iter().find_map(find_config_object),
        _ => None,
    }
}

fn truncate_for_log(body: &[u8], max: usize) -> String {
    if body.len() <= max {
        return String::from_utf8_lossy(body).into_owned();
    }
    format!("{}...", String::from_utf8_lossy(&body[..max]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_config_at_top_level() {
        let config = decode_config(br#"{"base": "http://localhost:8000", "auth_token": "t"}"#).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.auth_token, "t");
    }

    #[test]
    fn decodes_config_nested_in_rows() {
        let body = br#"{"data": [{"id": "repo-1", "base": "http://api.internal", "auth_token": null}]}"#;
        let config = decode_config(body).unwrap();
        assert_eq!(config.base_url, "http://api.internal");
        assert!(config.token().is_none());
    }

    #[test]
    fn config_without_known_keys_is_rejected() {
        let err = decode_config(br#"{"rows": []}"#).unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
    }

    #[test]
    fn truncates_long_bodies() {
        assert_eq!(truncate_for_log(b"short", 10), "short");
        assert_eq!(truncate_for_log(b"0123456789abc", 10), "0123456789...");
    }

    #[tokio::test]
    async fn spec_fetch_requires_absolute_config_base() {
        let client = RemoteClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let config = UnittestConfig {
            auth_token: String::new(),
            base_url: "localhost:8000".into(),
        };
        let err = client.fetch_spec("docs", &config).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = client
            .fetch_spec("docs", &UnittestConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
