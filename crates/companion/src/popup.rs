use crate::prompt::{Action, PendingPrompt, RequestId};
use crate::selection::SelectionSnapshot;

/// The Explain / Example / Ask popup shown next to a selection.
///
/// Holds at most one snapshot; a new selection replaces the old one.
#[derive(Debug, Default)]
pub struct ActionPopup {
    snapshot: Option<SelectionSnapshot>,
    next_request: u64,
}

impl ActionPopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, snapshot: SelectionSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn hide(&mut self) {
        self.snapshot = None;
    }

    /// The snapshot currently offered, if the popup is visible
    pub fn visible(&self) -> Option<&SelectionSnapshot> {
        self.snapshot.as_ref()
    }

    /// Take an action on the visible selection. Hides the popup.
    ///
    /// Every call yields a fresh [`RequestId`], even for the same text and action.
    pub fn choose(&mut self, action: Action) -> Option<PendingPrompt> {
        let snapshot = self.snapshot.take()?;
        self.next_request += 1;
        Some(PendingPrompt {
            id: RequestId(self.next_request),
            text: snapshot.text,
            action,
        })
    }
}
