use std::sync::Arc;

use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{AppError, AppJson, AppResult, GetField};

use super::store::{Document, ProfileStore};

pub const EXTERNAL_ID: &str = "externalId";
pub const EMAIL: &str = "email";
pub const CREATED_AT: &str = "createdAt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted {
    Created(String),
    Updated(String),
}

#[derive(Serialize)]
pub(crate) struct UpsertResponse {
    message: &'static str,
    id: String,
}

/// Insert-if-absent, else merge. `createdAt` belongs to the gateway: it is
/// stamped on insert and never taken from the caller.
#[tracing::instrument(skip_all)]
pub async fn upsert_profile(store: &dyn ProfileStore, mut payload: Document) -> AppResult<Upserted> {
    let (Some(external_id), Some(_)) = (payload.get_str_field(EXTERNAL_ID), payload.get_str_field(EMAIL)) else {
        return Err(AppError::Validation("Missing required fields"));
    };
    let external_id = external_id.to_owned();

    payload.remove(CREATED_AT);

    if let Some(existing) = store.find_by_external_id(&external_id).await? {
        store.merge(&external_id, payload).await?;
        tracing::info!(%external_id, id = %existing.id, "profile updated");
        return Ok(Upserted::Updated(existing.id));
    }

    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(anyhow::Error::from)?;
    payload.insert(CREATED_AT.to_owned(), Value::String(now));

    let id = store.insert(&external_id, payload).await?;
    tracing::info!(%external_id, %id, "profile created");
    Ok(Upserted::Created(id))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn upsert(
    State(store): State<Arc<dyn ProfileStore>>,
    AppJson(payload): AppJson<Document>,
) -> AppResult<(StatusCode, Json<UpsertResponse>)> {
    Ok(match upsert_profile(store.as_ref(), payload).await? {
        Upserted::Created(id) => (
            StatusCode::CREATED,
            Json(UpsertResponse { message: "User profile created", id }),
        ),
        Upserted::Updated(id) => (
            StatusCode::OK,
            Json(UpsertResponse { message: "User profile updated", id }),
        ),
    })
}
