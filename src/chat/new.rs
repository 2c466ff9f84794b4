use std::sync::Arc;

use axum::{debug_handler, extract::State, Json};

use crate::{profiles::Document, AppError, AppJson, AppResult, GetField};

use super::platform::{Conversation, ConversationsApi};

pub fn friendly_name(user_a: &str, user_b: &str) -> String {
    format!("Chat: {user_a} & {user_b}")
}

/// Create, then add A, then add B. There is no rollback: once the first
/// step succeeds the conversation exists upstream no matter what follows.
#[tracing::instrument(skip(api))]
pub async fn create_conversation(
    api: &dyn ConversationsApi,
    user_a: &str,
    user_b: &str,
) -> AppResult<Conversation> {
    if user_a.is_empty() || user_b.is_empty() {
        return Err(AppError::Validation("Both user identities are required"));
    }

    let conversation = api.create_conversation(&friendly_name(user_a, user_b)).await?;

    let mut participants = Vec::with_capacity(2);
    for identity in [user_a, user_b] {
        let added = api.add_participant(&conversation.sid, identity).await;
        if let Err(source) = added {
            return Err(AppError::OrphanedConversation {
                sid: conversation.sid,
                participants,
                source,
            });
        }
        participants.push(identity.to_owned());
    }

    tracing::info!(sid = %conversation.sid, "conversation provisioned");
    Ok(conversation)
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_conversation(
    State(api): State<Arc<dyn ConversationsApi>>,
    AppJson(payload): AppJson<Document>,
) -> AppResult<Json<Conversation>> {
    let conversation = create_conversation(
        api.as_ref(),
        payload.get_str_field("userA").unwrap_or_default(),
        payload.get_str_field("userB").unwrap_or_default(),
    )
    .await?;

    Ok(Json(conversation))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use anyhow::anyhow;
    use async_trait::async_trait;

    use super::*;

    /// In-process stand-in for the platform. `fail_on_add` makes the n-th
    /// participant-add call (1-based) fail.
    #[derive(Default)]
    pub(crate) struct FakePlatform {
        pub(crate) conversations: Mutex<Vec<Conversation>>,
        pub(crate) participants: Mutex<HashMap<String, Vec<String>>>,
        pub(crate) fail_on_add: Option<usize>,
        pub(crate) fail_on_create: bool,
        adds: Mutex<usize>,
    }

    #[async_trait]
    impl ConversationsApi for FakePlatform {
        async fn create_conversation(&self, friendly_name: &str) -> anyhow::Result<Conversation> {
            if self.fail_on_create {
                return Err(anyhow!("service unavailable"));
            }

            let mut conversations = self.conversations.lock().unwrap();
            let conversation = Conversation {
                sid: format!("CH{:04}", conversations.len() + 1),
                friendly_name: friendly_name.to_owned(),
            };
            conversations.push(conversation.clone());
            Ok(conversation)
        }

        async fn add_participant(&self, conversation_sid: &str, identity: &str) -> anyhow::Result<()> {
            let attempt = {
                let mut adds = self.adds.lock().unwrap();
                *adds += 1;
                *adds
            };
            if self.fail_on_add == Some(attempt) {
                return Err(anyhow!("participant {identity} rejected"));
            }

            self.participants
                .lock()
                .unwrap()
                .entry(conversation_sid.to_owned())
                .or_default()
                .push(identity.to_owned());
            Ok(())
        }

        async fn list_conversations(&self, limit: usize) -> anyhow::Result<Vec<Conversation>> {
            let conversations = self.conversations.lock().unwrap();
            Ok(conversations.iter().rev().take(limit).cloned().collect())
        }
    }

    #[tokio::test]
    async fn both_users_end_up_in_a_named_conversation() {
        let platform = FakePlatform::default();

        let conversation = create_conversation(&platform, "alice", "bob").await.unwrap();

        assert_eq!(conversation.friendly_name, "Chat: alice & bob");
        assert!(!conversation.sid.is_empty());
        assert_eq!(
            platform.participants.lock().unwrap()[&conversation.sid],
            vec!["alice".to_owned(), "bob".to_owned()]
        );
    }

    #[tokio::test]
    async fn missing_identity_creates_nothing() {
        let platform = FakePlatform::default();

        for (a, b) in [("", "bob"), ("alice", ""), ("", "")] {
            let err = create_conversation(&platform, a, b).await.unwrap_err();
            assert!(matches!(err, AppError::Validation("Both user identities are required")));
        }

        assert!(platform.conversations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_add_failure_leaves_an_orphan() {
        let platform = FakePlatform { fail_on_add: Some(2), ..Default::default() };

        let err = create_conversation(&platform, "alice", "bob").await.unwrap_err();

        let AppError::OrphanedConversation { sid, participants, .. } = err else {
            panic!("expected an orphaned conversation");
        };
        assert_eq!(participants, vec!["alice".to_owned()]);
        assert_eq!(platform.conversations.lock().unwrap().len(), 1);
        assert_eq!(platform.participants.lock().unwrap()[&sid], vec!["alice".to_owned()]);
    }

    #[tokio::test]
    async fn first_add_failure_leaves_an_empty_conversation() {
        let platform = FakePlatform { fail_on_add: Some(1), ..Default::default() };

        let err = create_conversation(&platform, "alice", "bob").await.unwrap_err();

        assert!(matches!(&err, AppError::OrphanedConversation { participants, .. } if participants.is_empty()));
        assert!(platform.participants.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_failure_is_a_collaborator_error() {
        let platform = FakePlatform { fail_on_create: true, ..Default::default() };

        let err = create_conversation(&platform, "alice", "bob").await.unwrap_err();

        assert!(matches!(err, AppError::Collaborator(_)));
        assert_eq!(err.to_string(), "service unavailable");
    }
}
