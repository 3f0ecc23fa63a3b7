use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    services::completion::{ChatMessage, CompletionClient},
};

const CHEF_PERSONA: &str = "You are an expert Indian chef assistant named MyDishGenie. \
Your goal is to help users with their cooking questions. \
Keep your answers concise, friendly, and helpful. Focus on Indian cuisine.";

const CHEF_GREETING: &str = "Yes, I am MyDishGenie! How can I help you in the kitchen today?";

/// Speaker of a chat turn as sent by the chat widget
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    /// The assistant's earlier replies
    #[serde(alias = "assistant")]
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl From<&ChatTurn> for ChatMessage {
    fn from(turn: &ChatTurn) -> Self {
        match turn.role {
            ChatRole::User => ChatMessage::user(turn.text.clone()),
            ChatRole::Model => ChatMessage::assistant(turn.text.clone()),
        }
    }
}

/// Builds the message list sent to the model: persona, greeting, then the conversation
pub fn build_messages(history: &[ChatTurn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(CHEF_PERSONA));
    messages.push(ChatMessage::assistant(CHEF_GREETING));
    messages.extend(
        history
            .iter()
            .filter(|turn| !turn.text.trim().is_empty())
            .map(ChatMessage::from),
    );
    messages
}

/// Answers a cooking question given the conversation so far
pub async fn reply(client: &CompletionClient, history: &[ChatTurn]) -> AppResult<String> {
    match history.last() {
        Some(turn) if turn.role == ChatRole::User && !turn.text.trim().is_empty() => {}
        _ => {
            return Err(AppError::InvalidInput(
                "Chat history must end with a non-empty user message".to_string(),
            ))
        }
    }

    let reply = client
        .complete_messages(build_messages(history), false)
        .await?;

    tracing::info!(turns = history.len(), chars = reply.len(), "Chef chat replied");

    Ok(reply)
}
