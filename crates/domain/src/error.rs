use thiserror::Error;

/// Error kinds the core distinguishes.
///
/// `NoveltyExhausted` is deliberately absent: a regeneration ceiling is not
/// a failure, it is surfaced as a metadata flag by the novelty controller.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
