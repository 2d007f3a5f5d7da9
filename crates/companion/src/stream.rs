//! Streaming answer consumer.
//!
//! The backend request runs as a task on the tokio runtime and forwards
//! [`StreamChunk`]s over a channel. The UI thread calls [`StreamConsumer::poll`]
//! each frame, which is the only place the transcript gets written while an
//! answer streams in. Failures never escape: they become transcript text.

use crate::conversation::{Conversation, MessageId, Sender};
use futures::future::{AbortHandle, Abortable};
use providers::ChatBackend;
use shared::agent_api::StreamChunk;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Shown in place of the answer when the request or stream fails
pub const STREAM_ERROR_TEXT: &str = "Error: Could not connect to the bot.";

/// How a stream ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    /// Bot text was replaced with [`STREAM_ERROR_TEXT`]
    Failed,
}

struct ActiveStream {
    bot_id: MessageId,
    rx: UnboundedReceiver<StreamChunk>,
    abort: AbortHandle,
}

pub struct StreamConsumer {
    backend: Arc<dyn ChatBackend>,
    runtime: Handle,
    active: Option<ActiveStream>,
}

impl StreamConsumer {
    pub fn new(backend: Arc<dyn ChatBackend>, runtime: Handle) -> Self {
        Self {
            backend,
            runtime,
            active: None,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.active.is_some()
    }

    /// Start answering `prompt`. Returns false (and touches nothing) if a
    /// stream is already in flight.
    pub fn send(&mut self, prompt: &str, conversation: &mut Conversation) -> bool {
        if self.active.is_some() {
            tracing::debug!("send ignored: a stream is already in flight");
            return false;
        }

        conversation.push(Sender::User, prompt);
        let bot_id = conversation.push(Sender::Bot, "");

        let (tx, rx) = unbounded_channel();
        let (abort, registration) = AbortHandle::new_pair();
        let backend = Arc::clone(&self.backend);
        let question = prompt.to_string();

        self.runtime.spawn(Abortable::new(
            async move {
                if let Err(e) = backend.stream_answer(&question, tx.clone()).await {
                    let _ = tx.send(StreamChunk::Error(e.to_string()));
                }
            },
            registration,
        ));

        self.active = Some(ActiveStream { bot_id, rx, abort });
        true
    }

    /// Apply every chunk delivered so far, in arrival order. Returns the
    /// outcome once the stream has ended; `None` while it is still running
    /// (or when nothing is in flight).
    pub fn poll(&mut self, conversation: &mut Conversation) -> Option<StreamOutcome> {
        let outcome = {
            let active = self.active.as_mut()?;
            loop {
                match active.rx.try_recv() {
                    Ok(StreamChunk::Text(fragment)) => {
                        conversation.append_to_bot(active.bot_id, &fragment);
                    }
                    Ok(StreamChunk::Done) => break StreamOutcome::Completed,
                    Ok(StreamChunk::Error(e)) => {
                        tracing::warn!("chat stream failed: {}", e);
                        conversation.replace_bot_text(active.bot_id, STREAM_ERROR_TEXT);
                        break StreamOutcome::Failed;
                    }
                    Err(TryRecvError::Empty) => return None,
                    Err(TryRecvError::Disconnected) => {
                        tracing::warn!("chat stream task ended without finishing");
                        conversation.replace_bot_text(active.bot_id, STREAM_ERROR_TEXT);
                        break StreamOutcome::Failed;
                    }
                }
            }
        };

        self.active = None;
        tracing::info!("chat stream finished: {:?}", outcome);
        Some(outcome)
    }

    /// Stop the read task on teardown. Nothing writes the transcript after
    /// this, so the bot message is left as it was.
    fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.abort.abort();
        tracing::info!("chat stream cancelled");
        true
    }
}

impl Drop for StreamConsumer {
    fn drop(&mut self) {
        self.cancel();
    }
}
