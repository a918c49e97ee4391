use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::wizard::WizardError;
use crate::services::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("{0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no booking flow is open")]
    NoOpenWizard,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            AppError::Store(StoreError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Wizard(WizardError::AuthenticationRequired) => StatusCode::UNAUTHORIZED,
            AppError::Wizard(WizardError::WrongStep) | AppError::NoOpenWizard => {
                StatusCode::CONFLICT
            }
            AppError::Wizard(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let mut body = serde_json::json!({ "error": self.to_string() });
        // The client reacts to this flag by opening the login dialog.
        if matches!(self, AppError::Wizard(WizardError::AuthenticationRequired)) {
            body["login_required"] = serde_json::Value::Bool(true);
        }

        (status, axum::Json(body)).into_response()
    }
}
