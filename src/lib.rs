pub mod chat;
pub mod config;
pub mod db;
pub mod profiles;

mod appresult;

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequest, FromRequestParts}, http::Method, Router
};
use serde_json::{Map, Value};
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};

pub use appresult::{AppError, AppResult};

use chat::{ChatTokenIssuer, ConversationsApi};
use profiles::ProfileStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub tokens: Arc<ChatTokenIssuer>,
    pub conversations: Arc<dyn ConversationsApi>,
}

/// `axum::Json`, but a bad body comes back as a JSON `AppError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` with the same treatment.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

pub trait GetField {
    /// The field as a string, or `None` if it is missing, not a string, or empty.
    fn get_str_field(&self, field: &str) -> Option<&str>;
}

impl GetField for Map<String, Value> {
    fn get_str_field(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

pub fn app(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS]);

    Router::new()
        .nest("/api/users", profiles::router())
        .nest("/api/chat", chat::router())

        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
