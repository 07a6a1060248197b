use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// The message is public; log the underlying cause before building this.
    InternalServerError(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::InternalServerError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::CategoryNotFound(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::TrainingCenterNotFound(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(StorageError::NotFound) => {
                json!({
                    "detail": "Recurso não encontrado"
                })
            }
            Self::Storage(StorageError::CategoryNotFound(name)) => {
                json!({
                    "detail": format!("A categoria {} não foi encontrada.", name)
                })
            }
            Self::Storage(StorageError::TrainingCenterNotFound(name)) => {
                json!({
                    "detail": format!("O centro de treinamento {} não foi encontrado.", name)
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg)) => {
                json!({
                    "detail": msg
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "detail": "Ocorreu um erro interno no servidor"
                })
            }
            Self::Validation(errors) => {
                let mut field_errors = Vec::new();
                collect_validation_messages(errors, "", &mut field_errors);

                json!({
                    "detail": "Dados inválidos",
                    "errors": field_errors
                })
            }
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::InternalServerError(msg) => {
                json!({
                    "detail": msg
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

// Malformed bodies, query strings and path segments all surface as 400 with the
// extractor's own explanation as the detail.
impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for WebError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

pub type WebResult<T> = Result<T, WebError>;

fn collect_validation_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(errors) => {
                out.extend(errors.iter().map(|e| {
                    format!(
                        "{}: {}",
                        path,
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    )
                }));
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_messages(nested, &path, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

/// Attach a request-specific message to a storage `NotFound`.
pub trait OrNotFound<T> {
    fn or_not_found(self, detail: impl FnOnce() -> String) -> WebResult<T>;
}

impl<T> OrNotFound<T> for storage::error::Result<T> {
    fn or_not_found(self, detail: impl FnOnce() -> String) -> WebResult<T> {
        self.map_err(|e| match e {
            StorageError::NotFound => WebError::NotFound(detail()),
            other => WebError::Storage(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: WebError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_category_is_bad_request() {
        let (status, body) =
            body_json(StorageError::CategoryNotFound("Elite".to_string()).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "A categoria Elite não foi encontrada.");
    }

    #[tokio::test]
    async fn test_missing_training_center_is_bad_request() {
        let (status, body) =
            body_json(StorageError::TrainingCenterNotFound("CT X".to_string()).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "O centro de treinamento CT X não foi encontrado.");
    }

    #[tokio::test]
    async fn test_constraint_violation_is_conflict() {
        let (status, _) =
            body_json(StorageError::ConstraintViolation("cpf".to_string()).into()).await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let (status, body) = body_json(StorageError::Database(sqlx::Error::PoolTimedOut).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Ocorreu um erro interno no servidor");
    }

    #[test]
    fn test_or_not_found_keeps_other_errors() {
        let not_found: storage::error::Result<()> = Err(StorageError::NotFound);
        let err = not_found.or_not_found(|| "Atleta não encontrado".to_string()).unwrap_err();
        assert!(matches!(err, WebError::NotFound(ref msg) if msg == "Atleta não encontrado"));

        let timed_out: storage::error::Result<()> = Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        let err = timed_out.or_not_found(|| unreachable!()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
