//! Shared test utilities for `Linkdex`.
//!
//! This module provides common helper functions for setting up temp-backed
//! stores, building message snapshots, and stubbing the chat-layer
//! collaborator traits.

use crate::errors::{Error, Result};
use crate::ingest::message::{EmbedSnapshot, MessageFetcher, MessageHistory, MessageSnapshot};
use crate::store::TenantStore;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Initializes tracing once per test binary, reading `RUST_LOG` if set.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates a store for `tenant_id` backed by a fresh temp directory.
/// The directory guard must stay alive for the duration of the test.
#[allow(clippy::unwrap_used)]
pub fn temp_store(tenant_id: u64) -> (tempfile::TempDir, TenantStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = TenantStore::open(tenant_id, dir.path()).unwrap();
    (dir, store)
}

/// Builds a plain text message with a unique id and jump URL.
pub fn plain_message(guild_id: u64, channel_name: &str, content: &str) -> MessageSnapshot {
    let message_id = NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed);
    MessageSnapshot {
        message_id,
        channel_id: 1000 + guild_id,
        channel_name: channel_name.to_string(),
        guild_id: Some(guild_id),
        content: content.to_string(),
        embeds: Vec::new(),
        jump_url: format!("https://discord/jump/{guild_id}/{message_id}"),
    }
}

/// Builds a message whose first embed already carries a title.
pub fn message_with_embed(
    guild_id: u64,
    channel_name: &str,
    content: &str,
    embed_title: &str,
) -> MessageSnapshot {
    let mut message = plain_message(guild_id, channel_name, content);
    message.embeds.push(EmbedSnapshot {
        title: Some(embed_title.to_string()),
        ..Default::default()
    });
    message
}

/// Fetcher stub replaying a fixed script of fetch results. An exhausted
/// script reports the message as gone, matching a deleted message.
pub struct QueueFetcher {
    script: Mutex<VecDeque<Option<MessageSnapshot>>>,
}

impl QueueFetcher {
    /// A fetcher whose script is empty; any fetch reports "gone".
    #[must_use]
    pub fn empty() -> Self {
        Self::scripted(Vec::new())
    }

    /// A fetcher replaying `steps` in order.
    #[must_use]
    pub fn scripted(steps: Vec<Option<MessageSnapshot>>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
        }
    }
}

impl MessageFetcher for QueueFetcher {
    async fn fetch(&self, _channel_id: u64, _message_id: u64) -> Result<Option<MessageSnapshot>> {
        #[allow(clippy::unwrap_used)]
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.flatten())
    }
}

/// History stub yielding a fixed list of messages in order.
pub struct VecHistory {
    messages: VecDeque<MessageSnapshot>,
}

impl VecHistory {
    /// A history over `messages`, oldest first.
    #[must_use]
    pub fn new(messages: Vec<MessageSnapshot>) -> Self {
        Self {
            messages: messages.into(),
        }
    }
}

impl MessageHistory for VecHistory {
    async fn next_message(&mut self) -> Result<Option<MessageSnapshot>> {
        Ok(self.messages.pop_front())
    }
}

/// History stub yielding its messages and then failing, matching an
/// iteration the chat layer cuts short mid-stream.
pub struct FailingHistory {
    messages: VecDeque<MessageSnapshot>,
}

impl FailingHistory {
    /// A history yielding `messages` before the failure.
    #[must_use]
    pub fn new(messages: Vec<MessageSnapshot>) -> Self {
        Self {
            messages: messages.into(),
        }
    }
}

impl MessageHistory for FailingHistory {
    async fn next_message(&mut self) -> Result<Option<MessageSnapshot>> {
        self.messages.pop_front().map(Some).ok_or_else(|| Error::Fetch {
            message: "history stream interrupted".to_string(),
        })
    }
}
