use axum::{
    extract::rejection::{JsonRejection, QueryRejection}, http::StatusCode, response::{IntoResponse, Response}, Json
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Required input missing or empty. Nothing was sent to a collaborator.
    #[error("{0}")]
    Validation(&'static str),

    /// Body or query string that did not parse into what the route expects.
    #[error("{0}")]
    Rejected(String),

    /// Anything the database or the chat platform threw at us.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),

    /// The conversation exists upstream but not every participant made it in.
    #[error("conversation {sid} left with {} of 2 participants: {source}", .participants.len())]
    OrphanedConversation {
        sid: String,
        participants: Vec<String>,
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Rejected(_) => StatusCode::BAD_REQUEST,
            AppError::Collaborator(_) | AppError::OrphanedConversation { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(msg) => json!({ "error": msg }),
            AppError::Rejected(msg) => json!({ "error": msg }),
            AppError::Collaborator(err) => {
                tracing::error!(error = %err, "collaborator failure");
                json!({ "error": err.to_string() })
            }
            AppError::OrphanedConversation { sid, participants, source } => {
                tracing::error!(%sid, ?participants, error = %source, "conversation orphaned");
                json!({
                    "error": source.to_string(),
                    "sid": sid,
                    "participants": participants,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

macro_rules! rejection_impl {
    ($R:ty) => {
        impl From<$R> for AppError {
            fn from(rejection: $R) -> Self {
                Self::Rejected(rejection.body_text())
            }
        }
    };
}

rejection_impl!(JsonRejection);
rejection_impl!(QueryRejection);

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Collaborator(anyhow::Error::from(err))
    }
}
