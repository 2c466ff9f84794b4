use std::sync::Arc;

use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;

use crate::{AppQuery, AppResult};

use super::platform::{Conversation, ConversationsApi};

pub const LIST_LIMIT: usize = 20;

pub async fn list_conversations(api: &dyn ConversationsApi, limit: usize) -> AppResult<Vec<Conversation>> {
    let limit = limit.clamp(1, LIST_LIMIT);
    let mut conversations = api.list_conversations(limit).await?;
    conversations.truncate(limit);
    Ok(conversations)
}

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    limit: Option<usize>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn list(
    State(api): State<Arc<dyn ConversationsApi>>,
    AppQuery(ListQuery { limit }): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<Conversation>>> {
    Ok(Json(list_conversations(api.as_ref(), limit.unwrap_or(LIST_LIMIT)).await?))
}
