use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use providers::ChatBackend;
use shared::agent_api::StreamChunk;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Notify;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    None,
    /// Request fails before any fragment
    BeforeStream,
    /// Fragments arrive, then the stream errors
    MidStream,
}

/// Backend that replays a fixed list of fragments, optionally waiting on a gate first.
pub struct ScriptedBackend {
    fragments: Vec<String>,
    failure: Failure,
    gate: Option<Arc<Notify>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            failure: Failure::None,
            gate: None,
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, failure: Failure) -> Self {
        self.failure = failure;
        self
    }

    /// Hold every request until the returned gate is notified (once per request).
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().clone()
    }
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedBackend {
    async fn stream_answer(&self, question: &str, tx: UnboundedSender<StreamChunk>) -> Result<()> {
        self.questions.lock().push(question.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.failure == Failure::BeforeStream {
            return Err(anyhow!("connection refused"));
        }

        for fragment in &self.fragments {
            let _ = tx.send(StreamChunk::Text(fragment.clone()));
            tokio::task::yield_now().await;
        }

        if self.failure == Failure::MidStream {
            let _ = tx.send(StreamChunk::Error("connection reset".into()));
        } else {
            let _ = tx.send(StreamChunk::Done);
        }
        Ok(())
    }
}
