use axum::http::StatusCode;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("Restaurant dataset unavailable: {0}")]
    DataUnavailable(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidCriteria(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::DataUnavailable(format!("{:#}", err))
    }
}
