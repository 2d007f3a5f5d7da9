//! Prompt templates for the selection actions.
//!
//! This is the only place that branches on [`Action`]. Adding an action means
//! one template arm here and one entry in [`Action::ALL`].

/// Marks a prompt that should populate the input field instead of being sent.
pub const PREFILL_MARKER: &str = "PREFILL:";

/// What the user asked for on a selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Explain the selected concept
    Explain,
    /// Generate a simple example
    Example,
    /// Prefill a free-form question
    Ask,
}

impl Action {
    /// Popup triggers in display order
    pub const ALL: [Action; 3] = [Action::Explain, Action::Example, Action::Ask];

    pub fn label(&self) -> &'static str {
        match self {
            Action::Explain => "Explain",
            Action::Example => "Example",
            Action::Ask => "Ask",
        }
    }
}

/// Build the prompt for a selected passage. Pure: same input, same output.
pub fn compose(text: &str, action: Action) -> String {
    match action {
        Action::Explain => format!("Explain the following concept: \"{}\"", text),
        Action::Example => format!("Generate a simple example of: \"{}\"", text),
        Action::Ask => format!("{}{}", PREFILL_MARKER, text),
    }
}

/// Where a composed prompt goes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptRoute {
    /// Put this text in the input field and wait for the user
    Prefill(String),
    /// Send this prompt to the backend right away
    Send(String),
}

pub fn route(prompt: &str) -> PromptRoute {
    match prompt.strip_prefix(PREFILL_MARKER) {
        Some(rest) => PromptRoute::Prefill(rest.trim().to_string()),
        None => PromptRoute::Send(prompt.to_string()),
    }
}

/// Identifies one triggering event, so two identical prompts stay distinct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An action taken on a selection, waiting to be handled by the panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingPrompt {
    pub id: RequestId,
    pub text: String,
    pub action: Action,
}

impl PendingPrompt {
    pub fn prompt(&self) -> String {
        compose(&self.text, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates() {
        assert_eq!(
            compose("obviousness", Action::Explain),
            "Explain the following concept: \"obviousness\""
        );
        assert_eq!(
            compose("prima facie case", Action::Example),
            "Generate a simple example of: \"prima facie case\""
        );
        assert_eq!(compose("Graham factors", Action::Ask), "PREFILL:Graham factors");
    }

    #[test]
    fn test_compose_is_pure() {
        for action in Action::ALL {
            assert_eq!(compose("KSR", action), compose("KSR", action));
        }
    }

    #[test]
    fn test_only_ask_prefills() {
        for action in Action::ALL {
            let prefill = compose("KSR", action).starts_with(PREFILL_MARKER);
            assert_eq!(prefill, action == Action::Ask);
        }
    }

    #[test]
    fn test_route_strips_marker() {
        assert_eq!(
            route(&compose("Graham factors", Action::Ask)),
            PromptRoute::Prefill("Graham factors".into())
        );
        assert_eq!(route("PREFILL:  padded  "), PromptRoute::Prefill("padded".into()));
    }

    #[test]
    fn test_route_sends_everything_else() {
        let prompt = compose("obviousness", Action::Explain);
        assert_eq!(route(&prompt), PromptRoute::Send(prompt.clone()));
    }

    #[test]
    fn test_identical_prompts_distinct_requests() {
        let a = PendingPrompt {
            id: RequestId(1),
            text: "KSR".into(),
            action: Action::Explain,
        };
        let b = PendingPrompt {
            id: RequestId(2),
            ..a.clone()
        };
        assert_eq!(a.prompt(), b.prompt());
        assert_ne!(a, b);
    }

    #[test]
    fn test_labels_in_display_order() {
        let labels: Vec<_> = Action::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels, ["Explain", "Example", "Ask"]);
    }
}
