use actix_web::http::StatusCode;
use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum AssistError {
    #[display("Configuration error: {message}")]
    ConfigurationError { message: String },
    #[display("{message}")]
    FileTooLarge { message: String },
    #[display("{message}")]
    PermissionDenied { message: String },
    #[display("{record_type} not found: {id}")]
    RecordNotFound { id: String, record_type: String },
    #[display("{message}")]
    Other { message: String },
}

impl AssistError {
    pub fn not_found(record_type: &str, id: impl ToString) -> Self {
        AssistError::RecordNotFound {
            id: id.to_string(),
            record_type: record_type.to_string(),
        }
    }
}

impl actix_web::error::ResponseError for AssistError {
    fn status_code(&self) -> StatusCode {
        match self {
            AssistError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
            AssistError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for AssistError {
    fn from(cause: std::io::Error) -> Self {
        AssistError::Other {
            message: format!("IO error: {cause:?}"),
        }
    }
}

impl From<sqlx::Error> for AssistError {
    fn from(cause: sqlx::Error) -> Self {
        AssistError::Other {
            message: format!("{cause:?}"),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AssistError {
    fn from(cause: sqlx::migrate::MigrateError) -> Self {
        AssistError::ConfigurationError {
            message: format!("Unable to run migrations: {cause:?}"),
        }
    }
}

impl From<toml::ser::Error> for AssistError {
    fn from(cause: toml::ser::Error) -> Self {
        AssistError::Other {
            message: format!("Unable to serialize toml string: {cause:?}"),
        }
    }
}

impl From<toml::de::Error> for AssistError {
    fn from(cause: toml::de::Error) -> Self {
        AssistError::ConfigurationError {
            message: cause.to_string(),
        }
    }
}

impl From<serde_json::Error> for AssistError {
    fn from(cause: serde_json::Error) -> Self {
        AssistError::Other {
            message: format!("{cause:?}"),
        }
    }
}

impl From<tera::Error> for AssistError {
    fn from(cause: tera::Error) -> Self {
        AssistError::Other {
            message: format!("Template error: {cause:?}"),
        }
    }
}

impl From<fernet::DecryptionError> for AssistError {
    fn from(_cause: fernet::DecryptionError) -> Self {
        AssistError::Other {
            message: "Invalid or expired session".to_string(),
        }
    }
}

impl From<image::ImageError> for AssistError {
    fn from(cause: image::ImageError) -> Self {
        AssistError::Other {
            message: format!("Image error: {cause:?}"),
        }
    }
}

impl From<actix_multipart::MultipartError> for AssistError {
    fn from(cause: actix_multipart::MultipartError) -> Self {
        AssistError::Other {
            message: format!("Malformed upload: {cause}"),
        }
    }
}

impl From<url::ParseError> for AssistError {
    fn from(cause: url::ParseError) -> Self {
        AssistError::Other {
            message: format!("Failed to parse URL: {cause:?}"),
        }
    }
}
