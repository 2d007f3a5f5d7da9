//! Selection-to-prompt pipeline and streaming answer consumer for the reader.
//!
//! Data flows selection -> popup -> prompt -> panel -> stream -> conversation.
//! [`PanelController`] owns every piece and is the only thing the UI talks to.

pub mod conversation;
pub mod panel;
pub mod popup;
pub mod prompt;
pub mod selection;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_support;

pub use conversation::{Conversation, Message, MessageId, Sender};
pub use panel::{PanelController, PanelEvent, PanelState};
pub use popup::ActionPopup;
pub use prompt::{compose, route, Action, PendingPrompt, PromptRoute, RequestId};
pub use selection::{SelectionRead, SelectionRect, SelectionSnapshot, SelectionTracker};
pub use stream::{StreamConsumer, StreamOutcome, STREAM_ERROR_TEXT};
