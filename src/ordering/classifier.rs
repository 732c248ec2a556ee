//! Strict-ordering classification.
//!
//! An [`OrderingPolicy`] is an ordered list of [`OrderingRule`]s. The first
//! rule that matches a model (and, optionally, a provider) decides; when no
//! rule matches the backend is treated as lenient.

use std::path::Path;
use std::sync::OnceLock;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{OrderingError, Result};

static BUILTIN_POLICY: OnceLock<OrderingPolicy> = OnceLock::new();

/// Decide whether `model_id` (served by `provider_id`) rejects illegal role adjacency.
///
/// Uses the built-in rule table. Matching is case-insensitive.
///
/// ```
/// use roci_ordering::ordering::requires_strict_ordering;
///
/// assert!(requires_strict_ordering("mistral-large-2512", None));
/// assert!(requires_strict_ordering("watsonx/mistral-large-2512", Some("watsonx")));
/// assert!(!requires_strict_ordering("gpt-4", None));
/// ```
pub fn requires_strict_ordering(model_id: &str, provider_id: Option<&str>) -> bool {
    BUILTIN_POLICY
        .get_or_init(OrderingPolicy::builtin)
        .requires_strict_ordering(model_id, provider_id)
}

/// One `(provider?, model substring) -> strict` entry.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct OrderingRule {
    /// Provider the rule is gated on. `None` matches any provider.
    #[builder(into)]
    #[serde(default)]
    pub provider: Option<String>,
    /// Case-insensitive substring of the model id.
    #[builder(into)]
    pub model: String,
    /// Verdict returned when the rule matches.
    #[builder(default = true)]
    #[serde(default = "default_strict")]
    pub strict: bool,
}

impl OrderingRule {
    /// A rule that applies to the model regardless of provider.
    pub fn model(pattern: impl Into<String>, strict: bool) -> Self {
        Self {
            provider: None,
            model: pattern.into(),
            strict,
        }
    }

    /// A rule gated on a specific provider.
    pub fn provider_model(
        provider: impl Into<String>,
        pattern: impl Into<String>,
        strict: bool,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            model: pattern.into(),
            strict,
        }
    }

    pub fn matches(&self, model_id: &str, provider_id: Option<&str>) -> bool {
        if let Some(ref provider) = self.provider {
            match provider_id {
                Some(id) if id.eq_ignore_ascii_case(provider) => {}
                _ => return false,
            }
        }
        model_id
            .to_lowercase()
            .contains(&self.model.to_lowercase())
    }

    fn check(&self, index: usize) -> Result<()> {
        let provider_blank = self
            .provider
            .as_deref()
            .is_some_and(|provider| provider.trim().is_empty());
        if provider_blank {
            return Err(OrderingError::InvalidRule {
                index,
                reason: "provider must not be blank; omit it to match any provider".into(),
            });
        }
        if self.model.trim().is_empty() && self.provider.is_none() {
            return Err(OrderingError::InvalidRule {
                index,
                reason: "a rule without a provider needs a model pattern".into(),
            });
        }
        Ok(())
    }
}

fn default_strict() -> bool {
    true
}

/// Ordered rule table, first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingPolicy {
    rules: Vec<OrderingRule>,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OrderingPolicy {
    /// The built-in table: every Mistral model, including Mistral deployments on watsonx.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                OrderingRule::model("mistral", true),
                OrderingRule::provider_model("watsonx", "mistral", true),
            ],
        }
    }

    /// A policy with no rules; every backend is lenient.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: OrderingRule) -> Self {
        self.push(rule);
        self
    }

    /// Append a rule; it only applies when no earlier rule matches.
    pub fn push(&mut self, rule: OrderingRule) {
        self.rules.push(rule);
    }

    /// Insert a rule ahead of all others, so it overrides existing entries.
    pub fn prepend(&mut self, rule: OrderingRule) {
        self.rules.insert(0, rule);
    }

    pub fn rules(&self) -> &[OrderingRule] {
        &self.rules
    }

    /// Verdict of the first matching rule, if any.
    pub fn verdict(&self, model_id: &str, provider_id: Option<&str>) -> Option<bool> {
        self.rules
            .iter()
            .find(|rule| rule.matches(model_id, provider_id))
            .map(|rule| rule.strict)
    }

    pub fn requires_strict_ordering(&self, model_id: &str, provider_id: Option<&str>) -> bool {
        self.verdict(model_id, provider_id).unwrap_or(false)
    }

    /// Parse a TOML rule file.
    ///
    /// ```toml
    /// replace_builtin = false
    ///
    /// [[rule]]
    /// provider = "watsonx"
    /// model = "granite"
    /// strict = true
    /// ```
    ///
    /// File rules are placed ahead of the built-in table unless
    /// `replace_builtin` is set.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(raw)?;
        for (index, rule) in file.rules.iter().enumerate() {
            rule.check(index)?;
        }
        let mut rules = file.rules;
        if !file.replace_builtin {
            rules.extend(Self::builtin().rules);
        }
        Ok(Self { rules })
    }

    /// Load a TOML rule file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    replace_builtin: bool,
    #[serde(default, rename = "rule")]
    rules: Vec<OrderingRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mistral_models_require_ordering() {
        assert!(requires_strict_ordering("mistral-large-2512", None));
        assert!(requires_strict_ordering("mistral-medium", None));
        assert!(requires_strict_ordering("mistral-small", None));
        assert!(requires_strict_ordering("Mistral-Large-2512", None));
    }

    #[test]
    fn watsonx_mistral_deployments_require_ordering() {
        assert!(requires_strict_ordering(
            "watsonx/mistral-large-2512",
            Some("watsonx")
        ));
        assert!(requires_strict_ordering(
            "watsonx/mistralai/mistral-large-2512",
            Some("watsonx")
        ));
        assert!(requires_strict_ordering("WatsonX/Mistral-Large", Some("WATSONX")));
    }

    #[test]
    fn other_models_are_lenient() {
        assert!(!requires_strict_ordering("gpt-4", None));
        assert!(!requires_strict_ordering("gpt-4-turbo", None));
        assert!(!requires_strict_ordering("claude-3-opus", None));
        assert!(!requires_strict_ordering("watsonx/granite-13b", Some("watsonx")));
        assert!(!requires_strict_ordering("watsonx/llama-3-70b", Some("watsonx")));
    }

    #[test]
    fn provider_gated_rule_needs_matching_provider() {
        let rule = OrderingRule::provider_model("watsonx", "granite", true);
        assert!(rule.matches("ibm/granite-13b", Some("WatsonX")));
        assert!(!rule.matches("ibm/granite-13b", None));
        assert!(!rule.matches("ibm/granite-13b", Some("ollama")));
    }

    #[test]
    fn first_matching_rule_wins() {
        let mut policy = OrderingPolicy::builtin();
        policy.prepend(OrderingRule::provider_model("ollama", "mistral", false));

        assert!(!policy.requires_strict_ordering("mistral:7b", Some("ollama")));
        assert!(policy.requires_strict_ordering("mistral:7b", Some("mistral")));
    }

    #[test]
    fn appended_rules_extend_the_table() {
        let policy = OrderingPolicy::builtin()
            .with_rule(OrderingRule::provider_model("watsonx", "granite", true));
        assert!(policy.requires_strict_ordering("watsonx/granite-13b", Some("watsonx")));
        assert!(!policy.requires_strict_ordering("granite-13b", Some("ollama")));
    }

    #[test]
    fn empty_policy_is_always_lenient() {
        let policy = OrderingPolicy::empty();
        assert_eq!(policy.verdict("mistral-large", None), None);
        assert!(!policy.requires_strict_ordering("mistral-large", None));
    }

    #[test]
    fn builder_defaults_to_strict() {
        let rule = OrderingRule::builder()
            .provider("bedrock")
            .model("mistral")
            .build();
        assert!(rule.strict);
        assert_eq!(rule.provider.as_deref(), Some("bedrock"));
    }

    #[test]
    fn rule_file_rules_go_ahead_of_builtins() {
        let policy = OrderingPolicy::from_toml_str(
            r#"
            [[rule]]
            provider = "watsonx"
            model = "mistral-small"
            strict = false

            [[rule]]
            model = "codestral"
            "#,
        )
        .unwrap();

        assert_eq!(policy.rules().len(), 4);
        assert!(!policy.requires_strict_ordering("watsonx/mistral-small", Some("watsonx")));
        assert!(policy.requires_strict_ordering("codestral-latest", None));
        assert!(policy.requires_strict_ordering("mistral-large", None));
    }

    #[test]
    fn rule_file_can_replace_builtins() {
        let policy = OrderingPolicy::from_toml_str(
            r#"
            replace_builtin = true

            [[rule]]
            model = "granite"
            "#,
        )
        .unwrap();

        assert!(!policy.requires_strict_ordering("mistral-large", None));
        assert!(policy.requires_strict_ordering("granite-13b", None));
    }

    #[test]
    fn catch_all_rule_without_provider_is_rejected() {
        let err = OrderingPolicy::from_toml_str(
            r#"
            [[rule]]
            model = "  "
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, OrderingError::InvalidRule { index: 0, .. }));
    }

    #[test]
    fn blank_provider_is_rejected() {
        let err = OrderingPolicy::from_toml_str(
            r#"
            [[rule]]
            model = "granite"

            [[rule]]
            provider = ""
            model = "mistral"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, OrderingError::InvalidRule { index: 1, .. }));
    }

    #[test]
    fn malformed_rule_file_is_a_rule_file_error() {
        let err = OrderingPolicy::from_toml_str("[[rule]]\nstrict = true\n").unwrap_err();
        assert!(matches!(err, OrderingError::RuleFile(_)));
    }
}
