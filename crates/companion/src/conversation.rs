//! Transcript of prompt/answer exchanges for the reading session.
//!
//! Append-only. The one mutation allowed is on the text of the most recently
//! appended bot message, while its answer streams in.

use chrono::{DateTime, Local};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    text: String,
    created_at: DateTime<Local>,
}

impl Message {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        self.messages.push(Message {
            id,
            sender,
            text: text.into(),
            created_at: Local::now(),
        });
        id
    }

    /// Append a fragment to the bot message `id`. Ignored unless `id` is the
    /// most recent bot message.
    pub fn append_to_bot(&mut self, id: MessageId, fragment: &str) -> bool {
        match self.latest_bot_mut(id) {
            Some(msg) => {
                msg.text.push_str(fragment);
                true
            }
            None => false,
        }
    }

    /// Replace the text of bot message `id` wholesale. Same targeting rule as
    /// [`Conversation::append_to_bot`].
    pub fn replace_bot_text(&mut self, id: MessageId, text: &str) -> bool {
        match self.latest_bot_mut(id) {
            Some(msg) => {
                msg.text = text.to_string();
                true
            }
            None => false,
        }
    }

    fn latest_bot_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        let msg = self
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.sender == Sender::Bot)?;
        if msg.id == id {
            Some(msg)
        } else {
            tracing::warn!("ignoring write to stale bot message {:?}", id);
            None
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
