use std::time::{Duration, Instant};

use reqwest::Client;

use crate::error::{Error, Result};

use super::request::PreparedRequest;
use super::response::HttpResponse;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Sends prepared requests over one pooled client. Never retries.
#[derive(Debug, Clone)]
pub struct Executor {
    client: Client,
}

impl Executor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Transport(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { client })
    }

    /// Send `request` and read the whole body. Time spent is reported on
    /// both outcomes.
    pub async fn execute(&self, request: &PreparedRequest) -> std::result::Result<HttpResponse, SendFailure> {
        let started = Instant::now();
        let outcome = self.send(request).await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok((status, body)) => Ok(HttpResponse {
                status,
                body,
                latency_ms,
            }),
            Err(error) => Err(SendFailure { error, latency_ms }),
        }
    }

    async fn send(&self, request: &PreparedRequest) -> Result<(u16, String)> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// A send that produced no response.
#[derive(Debug)]
pub struct SendFailure {
    pub error: Error,
    /// Elapsed until the failure surfaced, e.g. the full timeout
    pub latency_ms: u64,
}
