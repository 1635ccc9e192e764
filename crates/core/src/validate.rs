//! Validator chain
//!
//! Rules are registered under `<Field>.<Rule>` keys. Validating a field runs
//! every rule whose key starts with `<Field>.`, in registration order, and
//! feeds the output of one rule into the next. A rule may transform the
//! value (trim, upper-case) as well as reject it.

use crate::console::Console;
use crate::error::ValidationError;

/// Result of a single rule
pub type RuleResult = std::result::Result<String, ValidationError>;

/// A single validation rule
pub trait Rule {
    /// Accept (and possibly transform) a value, or reject it
    ///
    /// Rules may print extra context through the console before rejecting.
    fn validate(&self, value: String, console: &mut dyn Console) -> RuleResult;
}

/// Implement `Rule` for closures
impl<F> Rule for F
where
    F: Fn(String, &mut dyn Console) -> RuleResult,
{
    fn validate(&self, value: String, console: &mut dyn Console) -> RuleResult {
        self(value, console)
    }
}

struct Entry {
    field: String,
    name: String,
    rule: Box<dyn Rule>,
}

/// Ordered set of rules keyed by `<Field>.<Rule>`
#[derive(Default)]
pub struct ValidatorChain {
    entries: Vec<Entry>,
}

impl std::fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

impl ValidatorChain {
    /// Create an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule under a `<Field>.<Rule>` key
    ///
    /// Registering a key that already exists replaces the rule but keeps
    /// its original position.
    ///
    /// # Panics
    ///
    /// Panics if `key` has no `.` separating the field from the rule name.
    pub fn register(&mut self, key: &str, rule: impl Rule + 'static) -> &mut Self {
        let (field, name) = key
            .split_once('.')
            .unwrap_or_else(|| panic!("validator key '{key}' must look like <Field>.<Rule>"));

        let rule: Box<dyn Rule> = Box::new(rule);
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.field == field && e.name == name)
        {
            existing.rule = rule;
        } else {
            self.entries.push(Entry {
                field: field.to_string(),
                name: name.to_string(),
                rule,
            });
        }
        self
    }

    /// Register a closure as a rule
    pub fn register_fn<F>(&mut self, key: &str, rule: F) -> &mut Self
    where
        F: Fn(String, &mut dyn Console) -> RuleResult + 'static,
    {
        self.register(key, rule)
    }

    /// Append all rules of `other` after the rules of this chain
    #[must_use]
    pub fn merge(mut self, other: ValidatorChain) -> Self {
        for entry in other.entries {
            let key = format!("{}.{}", entry.field, entry.name);
            self.register(&key, BoxedRule(entry.rule));
        }
        self
    }

    /// All registered keys, in order
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(|e| format!("{}.{}", e.field, e.name))
    }

    /// Whether any rule is registered for `field`
    #[must_use]
    pub fn has_rules(&self, field: &str) -> bool {
        self.entries.iter().any(|e| e.field == field)
    }

    /// Run every rule registered for `field` against `raw`
    ///
    /// Returns the value produced by the last rule, or the first rejection.
    pub fn validate(&self, field: &str, raw: &str, console: &mut dyn Console) -> RuleResult {
        let mut value = raw.to_string();
        for entry in self.entries.iter().filter(|e| e.field == field) {
            tracing::debug!(field, rule = %entry.name, "Running validator");
            value = entry.rule.validate(value, console)?;
        }
        Ok(value)
    }
}

struct BoxedRule(Box<dyn Rule>);

impl Rule for BoxedRule {
    fn validate(&self, value: String, console: &mut dyn Console) -> RuleResult {
        self.0.validate(value, console)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::console::ScriptedConsole;

    fn uppercase(value: String, _: &mut dyn Console) -> RuleResult {
        Ok(value.to_uppercase())
    }

    #[test]
    fn test_rules_compose_in_declaration_order() {
        let mut chain = ValidatorChain::new();
        chain.register("Issue.Upper", uppercase);
        chain.register_fn("Issue.Pattern", |value, _| {
            if value.starts_with("ABC") {
                Ok(value)
            } else {
                Err(ValidationError::new(format!("bad issue: {value}")))
            }
        });

        let mut console = ScriptedConsole::new();
        // Pattern sees the upper-cased value
        assert_eq!(
            chain.validate("Issue", "abc-1", &mut console).unwrap(),
            "ABC-1"
        );
    }

    #[test]
    fn test_reversed_order_changes_outcome() {
        let mut chain = ValidatorChain::new();
        chain.register_fn("Issue.Pattern", |value, _| {
            if value.starts_with("ABC") {
                Ok(value)
            } else {
                Err(ValidationError::new("bad issue"))
            }
        });
        chain.register("Issue.Upper", uppercase);

        let mut console = ScriptedConsole::new();
        assert!(chain.validate("Issue", "abc-1", &mut console).is_err());
    }

    #[test]
    fn test_only_matching_field_rules_run() {
        let mut chain = ValidatorChain::new();
        chain.register_fn("Message.Reject", |_, _| Err(ValidationError::new("no")));
        chain.register("Issue.Upper", uppercase);

        let mut console = ScriptedConsole::new();
        assert_eq!(chain.validate("Issue", "x-1", &mut console).unwrap(), "X-1");
        assert!(chain.validate("Message", "hello", &mut console).is_err());
        // Prefix match is on the whole field name
        assert_eq!(
            chain.validate("Mess", "hello", &mut console).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_field_without_rules_passes_through() {
        let chain = ValidatorChain::new();
        let mut console = ScriptedConsole::new();
        assert_eq!(
            chain.validate("Details", "  spaced  ", &mut console).unwrap(),
            "  spaced  "
        );
        assert!(!chain.has_rules("Details"));
    }

    #[test]
    fn test_merge_appends_after_existing_rules() {
        let mut base = ValidatorChain::new();
        base.register("Message.Length", uppercase);
        let mut extra = ValidatorChain::new();
        extra.register("Message.ImperativeMood", uppercase);
        extra.register("Issue.Number", uppercase);

        let chain = base.merge(extra);
        let keys: Vec<String> = chain.keys().collect();
        assert_eq!(
            keys,
            vec!["Message.Length", "Message.ImperativeMood", "Issue.Number"]
        );
    }

    #[test]
    fn test_reregistering_key_keeps_position() {
        let mut chain = ValidatorChain::new();
        chain.register("Message.Length", uppercase);
        chain.register("Message.Other", uppercase);
        chain.register_fn("Message.Length", |v, _| Ok(v));

        let keys: Vec<String> = chain.keys().collect();
        assert_eq!(keys, vec!["Message.Length", "Message.Other"]);

        let mut console = ScriptedConsole::new();
        assert_eq!(chain.validate("Message", "ab", &mut console).unwrap(), "AB");
    }

    #[test]
    #[should_panic(expected = "<Field>.<Rule>")]
    fn test_key_without_separator_panics() {
        let mut chain = ValidatorChain::new();
        chain.register("Message", uppercase);
    }
}
