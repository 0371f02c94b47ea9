//! Command dispatch
//!
//! Classifies a transcript against wake words and an ordered command rule
//! set, producing a [`DispatchResult`] that describes what to speak and what
//! to send. Pure: no I/O happens here, so both the autonomous loop and the
//! HTTP control surface reuse the same logic.
//!
//! Wake-word and command matching are independent checks over the same text.
//! A transcript containing both a wake word and a command produces the
//! greeting *and* the command response in one cycle; there is no gate that
//! requires a wake word before commands act. That mirrors the always-listening
//! behavior of the deployed assistant and is intentional.

use crate::config::AssistantProfile;

/// What the loop should do after a command rule fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// Speak the response and keep listening
    Continue,
    /// Speak the response and notify the device endpoint
    Notify(String),
    /// Speak the response and end the session
    Terminate,
}

/// A trigger-phrase set paired with a spoken response and an action
#[derive(Debug, Clone)]
pub struct CommandRule {
    triggers: Vec<String>,
    response: String,
    action: RuleAction,
}

impl CommandRule {
    /// Create a rule matching any of `triggers` as a substring
    #[must_use]
    pub fn new(triggers: Vec<String>, response: String, action: RuleAction) -> Self {
        Self {
            triggers,
            response,
            action,
        }
    }

    /// Whether the transcript contains any trigger phrase (case-sensitive)
    fn matches(&self, text: &str) -> bool {
        self.triggers.iter().any(|t| text.contains(t.as_str()))
    }
}

/// Outcome of dispatching one transcript
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Utterances to speak, in order
    pub utterances: Vec<String>,
    /// Command to send to the device endpoint, if any
    pub device_command: Option<String>,
    /// Whether the session should end after responding
    pub terminate: bool,
}

impl DispatchResult {
    /// True when nothing should be spoken or sent
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.utterances.is_empty() && self.device_command.is_none() && !self.terminate
    }
}

/// Matches transcripts against wake words and command rules
pub struct Dispatcher {
    wake_words: Vec<String>,
    greeting: String,
    rules: Vec<CommandRule>,
    fallback: String,
}

impl Dispatcher {
    /// Wake words recognized by the assistant
    pub const WAKE_WORDS: [&'static str; 4] = ["ഹായ്", "അസിസ്റ്റന്റ്", "പോൾ", "സഹായി"];

    /// Build the standard rule set for a profile
    #[must_use]
    pub fn from_profile(profile: &AssistantProfile) -> Self {
        let rules = vec![
            CommandRule::new(
                vec!["ലൈറ്റ് ഓൺ".to_string()],
                profile.light_on_ack.clone(),
                RuleAction::Notify("light_on".to_string()),
            ),
            CommandRule::new(
                vec!["ലൈറ്റ് ഓഫ്".to_string()],
                profile.light_off_ack.clone(),
                RuleAction::Notify("light_off".to_string()),
            ),
            CommandRule::new(
                vec!["നിർത്തൂ".to_string(), "വിട".to_string()],
                profile.farewell.clone(),
                RuleAction::Terminate,
            ),
        ];

        Self {
            wake_words: Self::WAKE_WORDS.iter().map(ToString::to_string).collect(),
            greeting: profile.greeting.clone(),
            rules,
            fallback: profile.not_understood.clone(),
        }
    }

    /// Build a dispatcher with a custom rule set
    #[must_use]
    pub fn new(
        wake_words: Vec<String>,
        greeting: String,
        rules: Vec<CommandRule>,
        fallback: String,
    ) -> Self {
        Self {
            wake_words,
            greeting,
            rules,
            fallback,
        }
    }

    /// Classify a transcript
    ///
    /// Empty (or whitespace-only) transcripts yield a no-op result. Wake-word
    /// and command checks both run; the first matching command rule wins and
    /// later rules are not evaluated. The fallback response fires only when
    /// neither a wake word nor a command matched.
    #[must_use]
    pub fn dispatch(&self, transcript: &str) -> DispatchResult {
        let text = transcript.trim();
        if text.is_empty() {
            return DispatchResult::default();
        }

        let mut result = DispatchResult::default();

        let woke = self.wake_words.iter().any(|w| text.contains(w.as_str()));
        if woke {
            tracing::info!("wake word matched");
            result.utterances.push(self.greeting.clone());
        }

        if let Some(rule) = self.rules.iter().find(|r| r.matches(text)) {
            result.utterances.push(rule.response.clone());
            match &rule.action {
                RuleAction::Continue => {}
                RuleAction::Notify(command) => {
                    tracing::info!(command = %command, "command rule matched");
                    result.device_command = Some(command.clone());
                }
                RuleAction::Terminate => {
                    tracing::info!("termination rule matched");
                    result.terminate = true;
                }
            }
        } else if !woke {
            result.utterances.push(self.fallback.clone());
        }

        result
    }

    /// The greeting utterance for this dispatcher's profile
    #[must_use]
    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// The configured wake words
    #[must_use]
    pub fn wake_words(&self) -> &[String] {
        &self.wake_words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssistantProfile;

    fn dispatcher() -> Dispatcher {
        Dispatcher::from_profile(&AssistantProfile::sobhana())
    }

    #[test]
    fn empty_transcript_is_noop() {
        let d = dispatcher();
        assert!(d.dispatch("").is_noop());
        assert!(d.dispatch("   ").is_noop());
    }

    #[test]
    fn light_on_emits_device_command() {
        let result = dispatcher().dispatch("ലൈറ്റ് ഓൺ ചെയ്യ്");
        assert_eq!(result.device_command.as_deref(), Some("light_on"));
        assert!(!result.terminate);
        assert_eq!(result.utterances.len(), 1);
    }

    #[test]
    fn stop_terminates() {
        let result = dispatcher().dispatch("നിർത്തൂ");
        assert!(result.terminate);
        assert!(result.device_command.is_none());
    }

    #[test]
    fn wake_and_command_both_fire() {
        let result = dispatcher().dispatch("ഹായ് ലൈറ്റ് ഓൺ");
        assert_eq!(result.utterances.len(), 2);
        assert_eq!(result.device_command.as_deref(), Some("light_on"));
        assert!(!result.terminate);
    }

    #[test]
    fn unmatched_text_gets_fallback() {
        let profile = AssistantProfile::sobhana();
        let result = dispatcher().dispatch("എന്തെങ്കിലും പറയുന്നു");
        assert_eq!(result.utterances, vec![profile.not_understood]);
        assert!(result.device_command.is_none());
        assert!(!result.terminate);
    }

    #[test]
    fn pure_wake_word_skips_fallback() {
        let profile = AssistantProfile::sobhana();
        let result = dispatcher().dispatch("ഹായ്");
        assert_eq!(result.utterances, vec![profile.greeting]);
        assert!(result.device_command.is_none());
    }
}
