//! Categorised commit style
//!
//! Messages are structured as
//!
//! ```text
//! Type: short message
//!
//! ISSUE-123
//! Optional details...
//! ```

use super::style::{CommitField, CommitStyle, FieldInput, Shortcut};
use indexmap::IndexMap;
use moo_core::validate::RuleResult;
use moo_core::{
    Console, ResolvedArguments, Result, Rule, ShellCommand, Step, ValidationError, ValidatorChain,
};
use std::collections::BTreeMap;

/// Categories every project has; they win over configured ones
const DEFAULT_CATEGORIES: [(&str, &str); 6] = [
    ("Change", "Implemented a change to source code."),
    ("Misc", "Generic change."),
    ("Bug", "Fixed a bug."),
    ("Update", "Update site core code or installed/update modules"),
    ("Build", "build CSS & Javascript"),
    ("Feature", "Implemented a new feature."),
];

/// Index of the category preselected in the type question
const DEFAULT_CHOICE: usize = 1;

/// Type, message, issue number and details
pub struct CategorisedStyle {
    categories: BTreeMap<String, String>,
}

impl CategorisedStyle {
    /// Create the style with `extra` categories next to the defaults
    #[must_use]
    pub fn new(extra: &IndexMap<String, String>) -> Self {
        let mut categories: BTreeMap<String, String> = extra
            .iter()
            .map(|(name, description)| (name.clone(), description.clone()))
            .collect();
        for (name, description) in DEFAULT_CATEGORIES {
            categories.insert(name.to_string(), description.to_string());
        }
        Self { categories }
    }

    /// Category names, sorted
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    fn choice_labels(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|(name, description)| format!("{name}: {description}"))
            .collect()
    }
}

impl CommitStyle for CategorisedStyle {
    fn display_name(&self) -> &'static str {
        "Categorised"
    }

    fn fields(&self) -> &'static [CommitField] {
        &[
            CommitField::Type,
            CommitField::Message,
            CommitField::Issue,
            CommitField::Details,
        ]
    }

    fn shortcut_message(&self, shortcut: Shortcut) -> Option<&str> {
        match shortcut {
            Shortcut::Dependencies => Some("Misc: update Composer dependencies"),
            Shortcut::Gitignore => Some("Misc: update .gitignore"),
            Shortcut::CsFixes => Some("Misc: apply CS fixes"),
            Shortcut::Style(_) => None,
        }
    }

    fn validators(&self) -> ValidatorChain {
        let mut chain = ValidatorChain::new();
        chain.register("Issue.Number", IssueNumber);
        chain
    }

    fn before_input(&mut self, field: CommitField, console: &mut dyn Console) {
        if field != CommitField::Type {
            return;
        }
        console.info("Message structured as,");
        console.comment("Type: short message\n-- empty line --\nIssue number\nOptional details...");
    }

    fn collect(
        &mut self,
        field: CommitField,
        input: &mut FieldInput<'_, '_>,
    ) -> Result<Option<Step>> {
        match field {
            CommitField::Type => {
                let labels = self.choice_labels();
                let index = input.engine.ask_choice(
                    "Please select the commit type:",
                    &labels,
                    DEFAULT_CHOICE,
                )?;
                let name = self
                    .categories
                    .keys()
                    .nth(index)
                    .cloned()
                    .unwrap_or_default();
                Ok(Some(Step::Value(name)))
            }
            CommitField::Issue if input.oneline => Ok(Some(Step::Skip)),
            CommitField::Issue => {
                let suggestion = input.issue_from_branch();
                let validators = input.validators;
                let issue = input.engine.ask_validated(
                    field.as_str(),
                    "Enter Commit Issue No.:",
                    suggestion.as_deref(),
                    |value, console| validators.validate(field.as_str(), value, console),
                )?;
                Ok(Some(Step::Value(issue)))
            }
            CommitField::Message | CommitField::Details => Ok(None),
        }
    }

    fn commit_command(
        &self,
        message: &str,
        details: &str,
        resolved: &ResolvedArguments,
    ) -> ShellCommand {
        let subject = match resolved.get(CommitField::Type.as_str()) {
            Some(kind) => format!("{kind}: {message}"),
            None => message.to_string(),
        };
        let issue = resolved.get(CommitField::Issue.as_str()).unwrap_or_default();
        let text = format!("{subject}\n\n{issue}\n{details}");
        ShellCommand::new("git commit -m %s").arg(text.trim_end())
    }
}

/// `KEY-123` style ticket reference, upper-cased
struct IssueNumber;

impl Rule for IssueNumber {
    fn validate(&self, value: String, _console: &mut dyn Console) -> RuleResult {
        let issue = value.trim().to_uppercase();
        let mut segments = issue.split('-');
        if segments.next().is_none_or(str::is_empty) {
            return Err(ValidationError::new(
                "Project key is missing from your issue no.",
            ));
        }
        if segments.next().is_none_or(str::is_empty) {
            return Err(ValidationError::new("Issue number is in incorrect format."));
        }
        Ok(issue)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use moo_core::{PromptEngine, ScriptedConsole, ScriptedShell, Tone};
    use moo_engine::LookupCache;

    fn style() -> CategorisedStyle {
        let mut extra = IndexMap::new();
        extra.insert("Docs".to_string(), "Documentation only.".to_string());
        extra.insert("Bug".to_string(), "Overridden.".to_string());
        CategorisedStyle::new(&extra)
    }

    #[test]
    fn test_defaults_win_over_configured_categories() {
        let style = style();
        assert_eq!(
            style.category_names().collect::<Vec<_>>(),
            vec!["Bug", "Build", "Change", "Docs", "Feature", "Misc", "Update"]
        );
        assert_eq!(style.choice_labels()[0], "Bug: Fixed a bug.");
    }

    #[test]
    fn test_issue_validation() {
        let chain = style().validators();
        let mut console = ScriptedConsole::new();

        assert_eq!(
            chain.validate("Issue", " abc-123 ", &mut console).unwrap(),
            "ABC-123"
        );
        assert_eq!(
            chain.validate("Issue", "-123", &mut console).unwrap_err().message,
            "Project key is missing from your issue no."
        );
        assert_eq!(
            chain.validate("Issue", "ABC", &mut console).unwrap_err().message,
            "Issue number is in incorrect format."
        );
        assert_eq!(
            chain.validate("Issue", "ABC-", &mut console).unwrap_err().message,
            "Issue number is in incorrect format."
        );
    }

    #[test]
    fn test_type_is_chosen_from_sorted_categories() {
        let mut style = style();
        let shell = ScriptedShell::new();
        let mut console = ScriptedConsole::new().choose(3);
        let mut engine = PromptEngine::new(&mut console);
        let validators = style.validators();
        let mut cache = LookupCache::new();
        let mut input = FieldInput::new(&mut engine, &validators, false, &shell, &mut cache);

        let step = style.collect(CommitField::Type, &mut input).unwrap();
        assert_eq!(step, Some(Step::Value("Docs".into())));
    }

    #[test]
    fn test_issue_defaults_to_branch_ticket() {
        let mut style = style();
        let shell = ScriptedShell::new().respond("git branch", 0, "feature/PRJ-88_search\n");
        let console = ScriptedConsole::new().answer("");
        let mut handle = console.clone();
        let mut engine = PromptEngine::new(&mut handle);
        let validators = style.validators();
        let mut cache = LookupCache::new();
        let mut input = FieldInput::new(&mut engine, &validators, false, &shell, &mut cache);

        let step = style.collect(CommitField::Issue, &mut input).unwrap();
        assert_eq!(step, Some(Step::Value("PRJ-88".into())));
        assert_eq!(
            console.lines_with(Tone::Question),
            vec!["Enter Commit Issue No.:"]
        );
    }

    #[test]
    fn test_oneline_skips_issue() {
        let mut style = style();
        let shell = ScriptedShell::new();
        let mut console = ScriptedConsole::new();
        let mut engine = PromptEngine::new(&mut console);
        let validators = style.validators();
        let mut cache = LookupCache::new();
        let mut input = FieldInput::new(&mut engine, &validators, true, &shell, &mut cache);

        let step = style.collect(CommitField::Issue, &mut input).unwrap();
        assert_eq!(step, Some(Step::Skip));
        assert!(shell.executed().is_empty());
    }

    #[test]
    fn test_commit_command_layout() {
        let style = style();
        let mut resolved = ResolvedArguments::new();
        resolved.insert("Type", "Bug");
        resolved.insert("Issue", "ABC-123");

        let command = style.commit_command("Null pointer on save", "Guard the handler.", &resolved);
        assert_eq!(
            command.args(),
            ["Bug: Null pointer on save\n\nABC-123\nGuard the handler."]
        );
    }

    #[test]
    fn test_shortcut_messages_are_misc() {
        let style = style();
        assert_eq!(
            style.shortcut_message(Shortcut::Gitignore),
            Some("Misc: update .gitignore")
        );
        assert_eq!(style.shortcut_message(Shortcut::Style("wip")), None);
    }

    #[test]
    fn test_commit_command_without_type_or_issue() {
        let style = style();
        let command =
            style.commit_command("Misc: update .gitignore", "", &ResolvedArguments::new());
        assert_eq!(command.args(), ["Misc: update .gitignore"]);
    }
}
