use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {message}")]
    Internal { code: &'static str, message: String },
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::Internal {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { code, .. } | Self::Internal { code, .. } => code,
            Self::Storage(_) => "storage_error",
            Self::Serialization(_) => "serialization_error",
            Self::Io(_) => "io_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn display_includes_message() {
        let error = AppError::bad_request("invalid_arguments", "command is required");
        assert_eq!(error.to_string(), "bad request: command is required");
        assert_eq!(error.code(), "invalid_arguments");
    }

    #[test]
    fn storage_errors_convert_from_rusqlite() {
        let error = AppError::from(rusqlite::Error::InvalidQuery);
        assert_eq!(error.code(), "storage_error");
        assert!(error.to_string().starts_with("storage error"));
    }
}
