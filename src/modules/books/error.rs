use bookshelf_http::error::AppError;
use thiserror::Error;

/// Failures of the books module, independent of the HTTP layer.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error("invalid {parameter}: {message}")]
    InvalidPageRequest {
        parameter: &'static str,
        message: String,
    },

    #[error("cannot sort by unknown field '{0}'")]
    UnknownSortField(String),

    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl BookError {
    pub fn invalid(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidPageRequest {
            parameter,
            message: message.into(),
        }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound(_) => AppError::not_found(err.to_string()),
            BookError::InvalidPageRequest { parameter, message } => {
                AppError::invalid_parameter(parameter, message)
            }
            BookError::UnknownSortField(_) => AppError::invalid_parameter("sidx", err.to_string()),
            BookError::Storage(_) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}
