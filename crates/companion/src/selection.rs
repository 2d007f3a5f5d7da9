//! Turns a pointer release over the document into a selection snapshot.

/// Gap between the selection and the popup, vertical
pub const POPUP_MARGIN_TOP: f32 = 10.0;
/// Gap between the selection and the popup, horizontal
pub const POPUP_MARGIN_LEFT: f32 = 5.0;

/// Bounding box of a selection, in viewport coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// What the view reports when the pointer is released
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionRead {
    pub text: String,
    pub bounds: SelectionRect,
    /// Scroll offset of the document viewport at release time
    pub scroll: (f32, f32),
}

/// Immutable capture of a selection and where its popup goes, in page coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSnapshot {
    pub text: String,
    pub anchor_top: f32,
    pub anchor_left: f32,
}

impl SelectionSnapshot {
    /// Popup position inside the viewport for the given scroll offset, as (left, top)
    pub fn to_viewport(&self, scroll: (f32, f32)) -> (f32, f32) {
        (self.anchor_left - scroll.0, self.anchor_top - scroll.1)
    }
}

#[derive(Clone, Debug)]
pub struct SelectionTracker {
    margin_top: f32,
    margin_left: f32,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::with_margins(POPUP_MARGIN_TOP, POPUP_MARGIN_LEFT)
    }

    pub fn with_margins(margin_top: f32, margin_left: f32) -> Self {
        Self {
            margin_top,
            margin_left,
        }
    }

    /// `None` means "no selection": the popup should hide.
    ///
    /// The anchor sits just past the bottom-right corner of the selection,
    /// where the pointer usually ends a drag.
    pub fn on_pointer_release(&self, read: &SelectionRead) -> Option<SelectionSnapshot> {
        let text = read.text.trim();
        if text.is_empty() {
            return None;
        }

        let bounds = read.bounds;
        Some(SelectionSnapshot {
            text: text.to_string(),
            anchor_top: bounds.top + bounds.height + read.scroll.1 + self.margin_top,
            anchor_left: bounds.left + bounds.width + read.scroll.0 + self.margin_left,
        })
    }
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str, scroll: (f32, f32)) -> SelectionRead {
        SelectionRead {
            text: text.to_string(),
            bounds: SelectionRect {
                left: 100.0,
                top: 40.0,
                width: 80.0,
                height: 18.0,
            },
            scroll,
        }
    }

    #[test]
    fn test_snapshot_geometry() {
        let tracker = SelectionTracker::new();
        let snap = tracker.on_pointer_release(&read("obviousness", (0.0, 0.0))).unwrap();
        assert_eq!(snap.text, "obviousness");
        assert_eq!(snap.anchor_top, 40.0 + 18.0 + POPUP_MARGIN_TOP);
        assert_eq!(snap.anchor_left, 100.0 + 80.0 + POPUP_MARGIN_LEFT);
    }

    #[test]
    fn test_anchor_in_page_coordinates() {
        let tracker = SelectionTracker::new();
        let snap = tracker.on_pointer_release(&read("obviousness", (0.0, 300.0))).unwrap();
        assert_eq!(snap.anchor_top, 368.0);

        // Scrolling further keeps the popup glued to the text
        assert_eq!(snap.to_viewport((0.0, 300.0)), (185.0, 68.0));
        assert_eq!(snap.to_viewport((0.0, 350.0)), (185.0, 18.0));
    }

    #[test]
    fn test_text_is_trimmed() {
        let tracker = SelectionTracker::new();
        let snap = tracker.on_pointer_release(&read("  \nprior art\t ", (0.0, 0.0))).unwrap();
        assert_eq!(snap.text, "prior art");
    }

    #[test]
    fn test_empty_selection_hides() {
        let tracker = SelectionTracker::new();
        assert!(tracker.on_pointer_release(&read("", (0.0, 0.0))).is_none());
        assert!(tracker.on_pointer_release(&read(" \n ", (0.0, 0.0))).is_none());
    }
}
