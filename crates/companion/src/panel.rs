//! Companion panel state machine.
//!
//! | event              | effect                                                         |
//! |--------------------|----------------------------------------------------------------|
//! | `PointerReleased`  | selection snapshot shown in the popup, or popup hidden         |
//! | `PopupDismissed`   | popup hidden                                                   |
//! | `ActionChosen`     | panel opens; prompt prefilled or sent (deferred if streaming)  |
//! | `Submit`           | non-empty input sent, unless a stream is in flight             |
//! | `Open` / `Close`   | visibility only; an in-flight stream keeps running             |
//! | `DocumentChanged`  | popup hidden; the stream and transcript carry on               |
//!
//! Stream completion is observed by [`PanelController::tick`], which also
//! dispatches a trigger that arrived while the previous answer was streaming.

use crate::conversation::Conversation;
use crate::popup::ActionPopup;
use crate::prompt::{route, Action, PendingPrompt, PromptRoute};
use crate::selection::{SelectionRead, SelectionSnapshot, SelectionTracker};
use crate::stream::{StreamConsumer, StreamOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    OpenIdle,
    OpenPrefilled,
    OpenStreaming,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PanelEvent {
    PointerReleased(SelectionRead),
    PopupDismissed,
    ActionChosen(Action),
    Submit,
    Open,
    Close,
    DocumentChanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Prefilled,
    Streaming,
}

pub struct PanelController {
    open: bool,
    focus_requested: bool,
    phase: Phase,
    input: String,
    tracker: SelectionTracker,
    popup: ActionPopup,
    /// Latest trigger that arrived while an answer was streaming
    deferred: Option<PendingPrompt>,
    /// Input was prefilled while an answer was streaming
    prefill_held: bool,
    conversation: Conversation,
    consumer: StreamConsumer,
}

impl PanelController {
    pub fn new(consumer: StreamConsumer) -> Self {
        Self {
            open: false,
            focus_requested: false,
            phase: Phase::Idle,
            input: String::new(),
            tracker: SelectionTracker::new(),
            popup: ActionPopup::new(),
            deferred: None,
            prefill_held: false,
            conversation: Conversation::new(),
            consumer,
        }
    }

    pub fn handle(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::PointerReleased(read) => match self.tracker.on_pointer_release(&read) {
                Some(snapshot) => self.popup.show(snapshot),
                None => self.popup.hide(),
            },
            PanelEvent::PopupDismissed => self.popup.hide(),
            PanelEvent::ActionChosen(action) => {
                if let Some(pending) = self.popup.choose(action) {
                    self.trigger(pending);
                }
            }
            PanelEvent::Submit => {
                self.submit();
            }
            PanelEvent::Open => {
                self.open = true;
                self.focus_requested = true;
            }
            PanelEvent::Close => {
                self.open = false;
                self.focus_requested = false;
            }
            PanelEvent::DocumentChanged => self.popup.hide(),
        }
    }

    /// Apply streamed chunks; call once per frame. Returns the outcome when a
    /// stream ends during this tick.
    pub fn tick(&mut self) -> Option<StreamOutcome> {
        let outcome = self.consumer.poll(&mut self.conversation)?;
        self.phase = if std::mem::take(&mut self.prefill_held) {
            Phase::Prefilled
        } else {
            Phase::Idle
        };

        if let Some(next) = self.deferred.take() {
            tracing::info!("dispatching deferred trigger {}", next.id);
            self.dispatch(next);
        }
        Some(outcome)
    }

    fn trigger(&mut self, pending: PendingPrompt) {
        self.open = true;
        self.focus_requested = true;
        tracing::info!("action {:?} triggered ({})", pending.action, pending.id);

        let prompt = pending.prompt();
        if self.consumer.is_sending() && matches!(route(&prompt), PromptRoute::Send(_)) {
            if let Some(superseded) = self.deferred.replace(pending) {
                tracing::debug!("trigger {} superseded before dispatch", superseded.id);
            }
            return;
        }
        self.dispatch(pending);
    }

    fn dispatch(&mut self, pending: PendingPrompt) {
        match route(&pending.prompt()) {
            PromptRoute::Prefill(text) => {
                self.input = text;
                self.focus_requested = true;
                if self.consumer.is_sending() {
                    self.prefill_held = true;
                } else {
                    self.phase = Phase::Prefilled;
                }
            }
            PromptRoute::Send(prompt) => {
                if self.consumer.send(&prompt, &mut self.conversation) {
                    self.phase = Phase::Streaming;
                }
            }
        }
    }

    fn submit(&mut self) -> bool {
        if self.consumer.is_sending() {
            tracing::debug!("submission rejected while streaming");
            return false;
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return false;
        }
        self.prefill_held = false;

        self.input.clear();
        let sent = self.consumer.send(&text, &mut self.conversation);
        if sent {
            self.phase = Phase::Streaming;
        }
        sent
    }

    pub fn state(&self) -> PanelState {
        if !self.open {
            return PanelState::Closed;
        }
        match self.phase {
            Phase::Idle => PanelState::OpenIdle,
            Phase::Prefilled => PanelState::OpenPrefilled,
            Phase::Streaming => PanelState::OpenStreaming,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_streaming(&self) -> bool {
        self.consumer.is_sending()
    }

    /// The input form is disabled while an answer streams
    pub fn input_enabled(&self) -> bool {
        !self.consumer.is_sending()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// True once after the panel asked for the input field to be focused.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub fn popup(&self) -> Option<&SelectionSnapshot> {
        self.popup.visible()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}
