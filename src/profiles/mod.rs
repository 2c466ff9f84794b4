mod store;
mod upsert;

use axum::{routing::post, Router};

use crate::AppState;

pub use store::{Document, ProfileStore, SqliteProfileStore, StoredProfile};
pub use upsert::{upsert_profile, Upserted};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upsert::upsert))
}
