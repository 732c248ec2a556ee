//! Tests for strict-ordering classification.

use roci_ordering::ordering::{requires_strict_ordering, OrderingPolicy, OrderingRule};

#[test]
fn reference_verdicts() {
    assert!(requires_strict_ordering("mistral-large-2512", None));
    assert!(requires_strict_ordering(
        "watsonx/mistral-large-2512",
        Some("watsonx")
    ));
    assert!(!requires_strict_ordering("gpt-4", None));
    assert!(!requires_strict_ordering("watsonx/granite-13b", Some("watsonx")));
}

#[test]
fn provider_does_not_change_mistral_verdict() {
    for provider in [None, Some("watsonx"), Some("mistral"), Some("bedrock")] {
        assert!(requires_strict_ordering("mistral-small", provider));
    }
}

#[test]
fn builtin_policy_matches_free_function() {
    let policy = OrderingPolicy::builtin();
    for (model, provider) in [
        ("mistral-large-2512", None),
        ("watsonx/mistral-large-2512", Some("watsonx")),
        ("gpt-4", None),
        ("watsonx/granite-13b", Some("watsonx")),
        ("claude-3-opus", Some("anthropic")),
    ] {
        assert_eq!(
            policy.requires_strict_ordering(model, provider),
            requires_strict_ordering(model, provider),
            "{model} / {provider:?}"
        );
    }
}

#[test]
fn registered_rules_add_backends_without_touching_callers() {
    let mut policy = OrderingPolicy::builtin();
    policy.push(
        OrderingRule::builder()
            .provider("watsonx")
            .model("granite")
            .build(),
    );

    assert!(policy.requires_strict_ordering("watsonx/granite-13b", Some("watsonx")));
    assert!(!policy.requires_strict_ordering("granite-13b", Some("ollama")));
    assert!(policy.requires_strict_ordering("mistral-large", None));
}

#[test]
fn prepended_exception_overrides_builtin() {
    let mut policy = OrderingPolicy::builtin();
    policy.prepend(
        OrderingRule::builder()
            .provider("ollama")
            .model("mistral")
            .strict(false)
            .build(),
    );

    assert!(!policy.requires_strict_ordering("mistral:7b", Some("ollama")));
    assert!(policy.requires_strict_ordering("mistral:7b", None));
}
