//! Owned snapshot of a chat message plus the collaborator traits the
//! surrounding bot layer implements.
//!
//! The gateway layer converts its client library's message type into a
//! [`MessageSnapshot`] before handing it to the pipeline, so this crate
//! never depends on the chat client directly.

use crate::errors::Result;

/// One name/value pair inside a rich embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    /// Field label
    pub name: String,
    /// Field body
    pub value: String,
}

/// Visible state of one rich embed attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedSnapshot {
    /// Embed title, if the platform has resolved one yet
    pub title: Option<String>,
    /// Embed description text
    pub description: Option<String>,
    /// Embed target URL
    pub url: Option<String>,
    /// Platform embed type, e.g. `"video"`
    pub kind: Option<String>,
    /// Embed fields
    pub fields: Vec<EmbedField>,
}

/// Owned, client-independent view of one chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot {
    /// Stable message id
    pub message_id: u64,
    /// Channel the message was posted in
    pub channel_id: u64,
    /// Channel display name, used as the link-source label
    pub channel_name: String,
    /// Server the message belongs to; `None` for direct messages
    pub guild_id: Option<u64>,
    /// Plain text content
    pub content: String,
    /// Rich embeds, possibly still unresolved when first seen
    pub embeds: Vec<EmbedSnapshot>,
    /// Permalink to the message
    pub jump_url: String,
}

impl MessageSnapshot {
    /// Content plus every embed's description and field values, newline
    /// joined - the text the extraction patterns run against.
    #[must_use]
    pub fn combined_text(&self) -> String {
        let mut parts = vec![self.content.clone()];
        for embed in &self.embeds {
            if let Some(description) = &embed.description {
                parts.push(description.clone());
            }
            for field in &embed.fields {
                parts.push(field.value.clone());
            }
        }
        parts.join("\n")
    }

    /// Title of the first embed that has one.
    #[must_use]
    pub fn embed_title(&self) -> Option<&str> {
        self.embeds.iter().find_map(|e| e.title.as_deref())
    }
}

/// Re-reads a message's current state, used while waiting for an embed to
/// resolve. `Ok(None)` means the message no longer exists.
pub trait MessageFetcher {
    /// Fetches the message's current snapshot, or `None` if it was deleted.
    fn fetch(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> impl std::future::Future<Output = Result<Option<MessageSnapshot>>> + Send;
}

/// Pull-style iterator over a channel's full message history.
pub trait MessageHistory {
    /// Next message in the iteration order, or `None` when exhausted.
    fn next_message(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Option<MessageSnapshot>>> + Send;
}
