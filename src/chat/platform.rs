use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::config::TwilioConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub sid: String,
    pub friendly_name: String,
}

/// The slice of the conversations platform this service uses.
#[async_trait]
pub trait ConversationsApi: Send + Sync {
    async fn create_conversation(&self, friendly_name: &str) -> anyhow::Result<Conversation>;
    async fn add_participant(&self, conversation_sid: &str, identity: &str) -> anyhow::Result<()>;
    async fn list_conversations(&self, limit: usize) -> anyhow::Result<Vec<Conversation>>;
}

#[derive(Deserialize)]
struct ConversationResource {
    sid: String,
    friendly_name: Option<String>,
}

impl From<ConversationResource> for Conversation {
    fn from(ConversationResource { sid, friendly_name }: ConversationResource) -> Self {
        Conversation { sid, friendly_name: friendly_name.unwrap_or_default() }
    }
}

#[derive(Deserialize)]
struct ConversationPage {
    conversations: Vec<ConversationResource>,
}

#[derive(Deserialize)]
struct PlatformError {
    message: String,
}

/// Twilio Conversations v1 over REST.
#[derive(Clone)]
pub struct TwilioConversations {
    http_client: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
}

impl TwilioConversations {
    pub fn new(twilio: &TwilioConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: twilio.conversations_url.trim_end_matches('/').to_owned(),
            account_sid: twilio.account_sid.clone(),
            auth_token: twilio.auth_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url)
    }

    /// Turns a non-2xx reply into an error carrying the platform's message.
    async fn check(response: Response) -> anyhow::Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        let message = serde_json::from_str::<PlatformError>(&body)
            .map(|err| err.message)
            .unwrap_or(body);
        Err(anyhow!("conversations API returned {status}: {message}"))
    }
}

#[async_trait]
impl ConversationsApi for TwilioConversations {
    async fn create_conversation(&self, friendly_name: &str) -> anyhow::Result<Conversation> {
        let response = self.http_client.post(self.url("Conversations"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("FriendlyName", friendly_name)])
            .send()
            .await?;

        let resource: ConversationResource = Self::check(response).await?.json().await?;
        Ok(resource.into())
    }

    async fn add_participant(&self, conversation_sid: &str, identity: &str) -> anyhow::Result<()> {
        let response = self.http_client.post(self.url(&format!("Conversations/{conversation_sid}/Participants")))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("Identity", identity)])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn list_conversations(&self, limit: usize) -> anyhow::Result<Vec<Conversation>> {
        let response = self.http_client.get(self.url("Conversations"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .query(&[("PageSize", limit)])
            .send()
            .await?;

        let page: ConversationPage = Self::check(response).await?.json().await?;
        Ok(page.conversations.into_iter().take(limit).map(Conversation::from).collect())
    }
}
