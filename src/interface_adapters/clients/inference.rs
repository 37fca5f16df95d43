use crate::domain::ports::parse_raw_action;
use crate::domain::{Observation, Policy, PolicyError, RawAction};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct InferRequest<'a> {
    input: &'a [f64],
}

// Inference response; `action` must hold exactly two finite floats.
#[derive(Debug, Deserialize)]
struct InferResponse {
    action: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

// Thin reqwest client for a remote policy service.
#[derive(Clone)]
pub struct HttpPolicy {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPolicy {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Policy for HttpPolicy {
    fn name(&self) -> &str {
        "http"
    }

    async fn infer(&self, observation: Observation) -> Result<RawAction, PolicyError> {
        let url = format!("{}/infer", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&InferRequest {
                input: observation.as_slice(),
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PolicyError::Timeout
                } else {
                    PolicyError::Unavailable
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .json::<InferResponse>()
                .await
                .map_err(|e| PolicyError::Malformed(e.to_string()))?;
            return parse_raw_action(&body.action);
        }

        if status.is_server_error() {
            // Prefer the service's own message when it sends one.
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(PolicyError::Inference(message));
        }

        Err(PolicyError::Unavailable)
    }
}
