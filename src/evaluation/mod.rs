//! Request/response exchange with the remote expression evaluation service.

mod client;
mod payload;
mod worker;

use thiserror::Error;

pub use client::HttpEvaluationService;
pub use payload::{encode_png_data_url, parse_response_body, EvaluationRecord, EvaluationRequest};
pub use worker::{EvaluationCompletion, EvaluationTicket, EvaluationWorker};

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("failed to encode drawing surface: {message}")]
    Encode { message: String },
    #[error("evaluation service unreachable: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("evaluation service returned status {status}")]
    Status { status: u16 },
    #[error("malformed evaluation response: {message}")]
    MalformedResponse { message: String },
}

pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;

/// The remote evaluation service. Implementations are called from worker
/// threads, never from the session thread.
pub trait EvaluationService: Send + Sync {
    fn calculate(&self, request: &EvaluationRequest) -> EvaluationResult<Vec<EvaluationRecord>>;
}
