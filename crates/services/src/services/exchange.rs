use std::sync::Arc;

use db::{
    DBService,
    models::{chat::Chat, chat_message::ChatMessage},
};
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::generator::{GeneratorError, ResponseGenerator};

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("chat not found")]
    ChatNotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error("failed to persist exchange for chat {chat_id} after streaming {content_len} bytes")]
    Persistence {
        chat_id: Uuid,
        content_len: usize,
        #[source]
        source: sqlx::Error,
    },
}

/// Drives one exchange: a human message in, an AI message out.
///
/// Fragments are forwarded to the outbound channel in production order while
/// being accumulated in memory; once the generator is exhausted the full
/// HUMAN/AI pair is committed to the store as a single transaction. Delivery
/// and durability are decoupled on purpose: a client disconnect mid-stream
/// (the outbound receiver dropping) stops forwarding but the generator is
/// still drained and the transcript still committed. A commit failure after a
/// completed stream is a recorded fault, never retried, since the delivered
/// bytes are already gone.
///
/// Each call is an independent future; the store pool is the only shared
/// state, and no connection is held across generator waits.
#[derive(Clone)]
pub struct ExchangeRunner {
    db: DBService,
    generator: Arc<dyn ResponseGenerator>,
}

impl ExchangeRunner {
    pub fn new(db: DBService, generator: Arc<dyn ResponseGenerator>) -> Self {
        Self { db, generator }
    }

    /// Streaming variant: fragments go out on `outbound` as produced.
    /// Returns the committed pair.
    pub async fn run_streaming(
        &self,
        chat_id: Uuid,
        user_content: String,
        outbound: mpsc::Sender<String>,
    ) -> Result<(ChatMessage, ChatMessage), ExchangeError> {
        self.run(chat_id, user_content, Some(outbound)).await
    }

    /// Buffered variant: the same lifecycle with no outbound channel; the
    /// accumulated reply is only observable through the committed pair.
    pub async fn run_buffered(
        &self,
        chat_id: Uuid,
        user_content: String,
    ) -> Result<(ChatMessage, ChatMessage), ExchangeError> {
        self.run(chat_id, user_content, None).await
    }

    async fn run(
        &self,
        chat_id: Uuid,
        user_content: String,
        outbound: Option<mpsc::Sender<String>>,
    ) -> Result<(ChatMessage, ChatMessage), ExchangeError> {
        Chat::find_by_id(&self.db.pool, chat_id)
            .await?
            .ok_or(ExchangeError::ChatNotFound)?;
        tracing::debug!(chat_id = %chat_id, "exchange started");

        let mut fragments = self.generator.generate(&user_content);
        let mut accumulated = String::new();
        let mut delivery = outbound;
        let mut fragment_count = 0u64;

        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            accumulated.push_str(&fragment);
            fragment_count += 1;

            if let Some(tx) = &delivery {
                if tx.send(fragment).await.is_err() {
                    tracing::debug!(
                        chat_id = %chat_id,
                        "client disconnected mid-stream; draining generator to completion"
                    );
                    delivery = None;
                }
            }
        }

        tracing::debug!(
            chat_id = %chat_id,
            fragments = fragment_count,
            "generator exhausted; committing exchange"
        );

        let pair = ChatMessage::append_pair(&self.db.pool, chat_id, &user_content, &accumulated)
            .await
            .map_err(|source| {
                tracing::error!(
                    chat_id = %chat_id,
                    content_len = accumulated.len(),
                    error = %source,
                    "exchange commit failed after streaming completed"
                );
                ExchangeError::Persistence {
                    chat_id,
                    content_len: accumulated.len(),
                    source,
                }
            })?;

        tracing::info!(
            chat_id = %chat_id,
            content_len = accumulated.len(),
            "exchange committed"
        );
        Ok(pair)
    }
}
