//! Imperative mood commit style
//!
//! The subject must start with one of the configured verbs, so that it
//! completes the sentence "If applied, this commit will ...".

use super::style::{CommitField, CommitStyle, Shortcut};
use moo_core::validate::RuleResult;
use moo_core::{
    Console, ResolvedArguments, Rule, ShellCommand, Tone, ValidationError, ValidatorChain,
};

/// Words shown per row of the accepted word table
const WORDS_PER_ROW: usize = 7;

/// Subject must start with an approved verb
pub struct ImperativeMoodStyle {
    words: Vec<String>,
}

impl ImperativeMoodStyle {
    /// Create the style accepting `words`
    ///
    /// Words differing only in case are kept once.
    #[must_use]
    pub fn new(mut words: Vec<String>) -> Self {
        words.sort_by_key(|word| word.to_lowercase());
        words.dedup_by_key(|word| word.to_lowercase());
        Self { words }
    }

    /// Accepted words, sorted
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl CommitStyle for ImperativeMoodStyle {
    fn display_name(&self) -> &'static str {
        "Imperative Mood"
    }

    fn fields(&self) -> &'static [CommitField] {
        &[CommitField::Message, CommitField::Details]
    }

    fn shortcut_message(&self, shortcut: Shortcut) -> Option<&str> {
        match shortcut {
            Shortcut::Dependencies => Some("Update Composer dependencies"),
            Shortcut::Gitignore => Some("Update .gitignore"),
            Shortcut::CsFixes => Some("Apply CS fixes"),
            Shortcut::Style(_) => None,
        }
    }

    fn validators(&self) -> ValidatorChain {
        let mut chain = ValidatorChain::new();
        chain.register(
            "Message.ImperativeMood",
            StartsWithWord {
                words: self.words.clone(),
            },
        );
        chain
    }

    fn before_input(&mut self, field: CommitField, console: &mut dyn Console) {
        if field != CommitField::Message {
            return;
        }
        console.info("Acceptable words to start commit with:");
        console.comment("If applied, this commit will ....your commit....");
        let rows: Vec<Vec<String>> = self
            .words
            .chunks(WORDS_PER_ROW)
            .map(<[String]>::to_vec)
            .collect();
        console.table(&[], &rows);
    }

    fn commit_command(
        &self,
        message: &str,
        details: &str,
        _resolved: &ResolvedArguments,
    ) -> ShellCommand {
        let text = format!("{}\n\n{details}", capitalize(message));
        ShellCommand::new("git commit -m %s").arg(text.trim_end())
    }
}

/// Upper-case the first character
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct StartsWithWord {
    words: Vec<String>,
}

impl Rule for StartsWithWord {
    fn validate(&self, value: String, console: &mut dyn Console) -> RuleResult {
        let lowered = value.to_lowercase();
        let accepted = self
            .words
            .iter()
            .any(|word| lowered.starts_with(&format!("{} ", word.to_lowercase())));
        if accepted {
            return Ok(value);
        }

        console.write(
            Tone::Error,
            "Commit message should start with an imperative mood.\n\
             It should be able to complete the following sentence:",
        );
        console.emphasis(Tone::Error, "If applied, this commit will ", &value);
        console.write(
            Tone::Note,
            "If you think you are correct, then ask the developer to fix it.",
        );
        Err(ValidationError::new("Please try again"))
    }
}
