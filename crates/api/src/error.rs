use kindred_domain::DomainError;
use serde::Serialize;
use tracing::error;

/// Boundary-facing error with the status code already resolved. Internal
/// traces are logged at construction time; only `detail` ever crosses the
/// wire.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    pub detail: String,
}

impl ApiError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self { status: 422, detail: detail.into() }
    }

    fn refusal(detail: impl Into<String>) -> Self {
        Self { status: 400, detail: detail.into() }
    }

    fn upstream(detail: impl Into<String>) -> Self {
        Self { status: 500, detail: detail.into() }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::InvalidInput(msg) => {
                error!(error = %err, "rejected malformed request");
                ApiError::malformed(msg.clone())
            }
            DomainError::NotFound(msg) => {
                error!(error = %err, "semantic refusal");
                ApiError::refusal(msg.clone())
            }
            DomainError::UpstreamUnavailable(_) | DomainError::ContractViolation(_) | DomainError::PersistenceFailure(_) => {
                error!(error = %err, "upstream capability failure");
                ApiError::upstream("an internal service failed to complete this request")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_400() {
        let api_error: ApiError = DomainError::NotFound("nothing to delete".into()).into();
        assert_eq!(api_error.status, 400);
    }

    #[test]
    fn invalid_input_maps_to_422() {
        let api_error: ApiError = DomainError::InvalidInput("bad body".into()).into();
        assert_eq!(api_error.status, 422);
    }

    #[test]
    fn upstream_failures_map_to_500_without_leaking_detail() {
        let api_error: ApiError = DomainError::PersistenceFailure("disk full".into()).into();
        assert_eq!(api_error.status, 500);
        assert!(!api_error.detail.contains("disk full"));
    }
}
