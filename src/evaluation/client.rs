use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use super::payload::parse_response_body;
use super::{EvaluationError, EvaluationRecord, EvaluationRequest, EvaluationResult, EvaluationService};

const CALCULATE_PATH: &str = "calculate";
const USER_AGENT: &str = concat!("mathpad/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpEvaluationService {
    client: Client,
    endpoint: String,
}

impl HttpEvaluationService {
    pub fn new(api_url: &str, timeout: Duration) -> EvaluationResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| EvaluationError::Transport { source })?;
        Ok(Self {
            client,
            endpoint: calculate_endpoint(api_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub(crate) fn calculate_endpoint(api_url: &str) -> String {
    format!("{}/{CALCULATE_PATH}", api_url.trim_end_matches('/'))
}

impl EvaluationService for HttpEvaluationService {
    fn calculate(&self, request: &EvaluationRequest) -> EvaluationResult<Vec<EvaluationRecord>> {
        tracing::debug!(
            endpoint = %self.endpoint,
            variables = request.dict_of_vars.len(),
            image_bytes = request.image.len(),
            "sending evaluation request"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .map_err(|source| EvaluationError::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint = %self.endpoint, %status, "evaluation service error status");
            return Err(EvaluationError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|source| EvaluationError::Transport { source })?;
        let records = parse_response_body(&body)?;
        tracing::info!(records = records.len(), "evaluation response received");
        Ok(records)
    }
}
