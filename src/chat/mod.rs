mod list;
mod new;
mod platform;
mod token;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub use list::{list_conversations, LIST_LIMIT};
pub use new::{create_conversation, friendly_name};
pub use platform::{Conversation, ConversationsApi, TwilioConversations};
pub use token::{AccessClaims, ChatGrant, ChatTokenIssuer, Grants, DEFAULT_TTL_SECS};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token", post(token::token))
        .route("/create", post(new::new_conversation))
        .route("/list", get(list::list))
}
