//! Command dispatch integration tests
//!
//! Exercise the pure dispatch contract with the built-in profiles; no audio
//! hardware or network needed.

use mozhi_assistant::{AssistantProfile, CommandRule, Dispatcher, RuleAction};

fn sobhana() -> Dispatcher {
    Dispatcher::from_profile(&AssistantProfile::sobhana())
}

#[test]
fn empty_transcript_yields_noop() {
    let result = sobhana().dispatch("");
    assert!(result.is_noop());
    assert!(result.utterances.is_empty());
    assert!(result.device_command.is_none());
    assert!(!result.terminate);
}

#[test]
fn whitespace_transcript_yields_noop() {
    assert!(sobhana().dispatch(" \n\t ").is_noop());
}

#[test]
fn light_on_phrase_emits_light_on() {
    let result = sobhana().dispatch("ലൈറ്റ് ഓൺ");
    assert_eq!(result.device_command.as_deref(), Some("light_on"));
    assert!(!result.terminate);
}

#[test]
fn light_off_sentence_emits_light_off_with_confirmation() {
    let profile = AssistantProfile::sobhana();
    let result = sobhana().dispatch("ലൈറ്റ് ഓഫ് ചെയ്യ്");

    assert_eq!(result.device_command.as_deref(), Some("light_off"));
    assert_eq!(result.utterances, vec![profile.light_off_ack]);
    assert!(!result.terminate);
}

#[test]
fn stop_phrase_terminates() {
    let result = sobhana().dispatch("നിർത്തൂ");
    assert!(result.terminate);
    assert!(result.device_command.is_none());
    assert_eq!(result.utterances.len(), 1);
}

#[test]
fn farewell_phrase_terminates() {
    assert!(sobhana().dispatch("വിട").terminate);
}

#[test]
fn each_wake_word_triggers_greeting() {
    let profile = AssistantProfile::sobhana();
    for wake in Dispatcher::WAKE_WORDS {
        let result = sobhana().dispatch(wake);
        assert_eq!(result.utterances, vec![profile.greeting.clone()], "{wake}");
        assert!(!result.terminate);
    }
}

#[test]
fn wake_word_inside_sentence_matches() {
    let result = sobhana().dispatch("ഹായ് അസിസ്റ്റന്റ് എന്തുണ്ട് വിശേഷം");
    assert!(!result.utterances.is_empty());
    assert!(result.device_command.is_none());
}

#[test]
fn wake_and_command_fire_independently() {
    let profile = AssistantProfile::sobhana();
    let result = sobhana().dispatch("ഹായ് അസിസ്റ്റന്റ് ലൈറ്റ് ഓൺ ചെയ്യ്");

    // Greeting first, then the command confirmation, rule-list order
    assert_eq!(
        result.utterances,
        vec![profile.greeting, profile.light_on_ack]
    );
    assert_eq!(result.device_command.as_deref(), Some("light_on"));
    assert!(!result.terminate);
}

#[test]
fn first_matching_rule_wins() {
    // Contains both light-on and stop phrases; light-on is earlier in the
    // rule list so termination must not fire
    let result = sobhana().dispatch("ലൈറ്റ് ഓൺ എന്നിട്ട് നിർത്തൂ");
    assert_eq!(result.device_command.as_deref(), Some("light_on"));
    assert!(!result.terminate);
}

#[test]
fn unmatched_text_gets_fixed_fallback() {
    let profile = AssistantProfile::sobhana();
    let result = sobhana().dispatch("ഇന്ന് മഴ പെയ്യുമോ");

    assert_eq!(result.utterances, vec![profile.not_understood]);
    assert!(result.device_command.is_none());
    assert!(!result.terminate);
}

#[test]
fn dispatch_is_deterministic() {
    let d = sobhana();
    let first = d.dispatch("ലൈറ്റ് ഓഫ് ചെയ്യ്");
    let second = d.dispatch("ലൈറ്റ് ഓഫ് ചെയ്യ്");
    assert_eq!(first, second);
}

#[test]
fn midhun_profile_uses_its_own_texts() {
    let profile = AssistantProfile::midhun();
    let dispatcher = Dispatcher::from_profile(&profile);

    let result = dispatcher.dispatch("ലൈറ്റ് ഓൺ");
    assert_eq!(result.utterances, vec![profile.light_on_ack]);

    let result = dispatcher.dispatch("വിട");
    assert_eq!(result.utterances, vec![profile.farewell]);
}

#[test]
fn custom_rules_accept_arbitrary_commands() {
    let dispatcher = Dispatcher::new(
        vec!["hello".to_string()],
        "hi there".to_string(),
        vec![CommandRule::new(
            vec!["fan on".to_string()],
            "fan is on".to_string(),
            RuleAction::Notify("fan_on".to_string()),
        )],
        "did not catch that".to_string(),
    );

    let result = dispatcher.dispatch("turn the fan on please... fan on");
    assert_eq!(result.device_command.as_deref(), Some("fan_on"));
}
