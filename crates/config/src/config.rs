//! Configuration management
//!
//! This module handles loading the moo configuration. The user file is read
//! first; keys from the core file override it table by table, except `faqs`
//! which always belongs to the user.

use crate::{Error, Result};
use indexmap::IndexMap;
use moo_core::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Top-level keys the core configuration never overrides
const USER_OWNED_KEYS: [&str; 1] = ["faqs"];

/// Known commit message conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStyleName {
    /// Messages start with an approved imperative verb
    ImperativeMood,
    /// Messages carry a category, an issue number and the message
    Categorised,
}

impl CommitStyleName {
    /// Resolve a configured style name
    ///
    /// Matching ignores case and punctuation, and accepts a trailing
    /// `Style` (`imperative-mood`, `ImperativeMood`, `ImperativeMoodStyle`).
    pub fn parse(name: &str) -> Result<Self> {
        let lowered: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        let normalized = lowered.strip_suffix("style").unwrap_or(&lowered);

        match normalized {
            "imperativemood" | "imperative" => Ok(Self::ImperativeMood),
            "categorised" | "categorized" => Ok(Self::Categorised),
            _ => Err(Error::UnknownStyle(name.to_string())),
        }
    }

    /// Canonical configuration name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImperativeMood => "imperative-mood",
            Self::Categorised => "categorised",
        }
    }
}

impl fmt::Display for CommitStyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commit section
///
/// ```toml
/// [commit]
/// style = "imperative-mood"
/// words = ["Add", "Fix", "Update"]
///
/// [commit.categories]
/// Docs = "Documentation only."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
    /// Active commit style name
    #[serde(default)]
    pub style: Option<String>,

    /// Words an imperative-mood message may start with
    #[serde(default)]
    pub words: Option<Vec<String>>,

    /// Extra categories for the categorised style (name to description)
    #[serde(default)]
    pub categories: IndexMap<String, String>,

    /// Longest accepted commit message, in characters
    #[serde(default = "default_message_max_length")]
    pub message_max_length: usize,

    /// Column at which commit details are wrapped
    #[serde(default = "default_details_width")]
    pub details_width: usize,
}

fn default_message_max_length() -> usize {
    60
}

fn default_details_width() -> usize {
    70
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            style: None,
            words: None,
            categories: IndexMap::new(),
            message_max_length: default_message_max_length(),
            details_width: default_details_width(),
        }
    }
}

impl CommitConfig {
    /// The configured style
    ///
    /// # Errors
    ///
    /// `Config` naming `commit.style` when unset, `UnknownStyle` when the
    /// name matches no style.
    pub fn style_name(&self) -> Result<CommitStyleName> {
        let name = self
            .style
            .as_deref()
            .ok_or_else(|| Error::config("commit.style", "no commit style is configured"))?;
        CommitStyleName::parse(name)
    }

    /// Accepted leading words, required by the imperative-mood style
    pub fn require_words(&self) -> Result<&[String]> {
        match self.words.as_deref() {
            Some(words) if !words.is_empty() => Ok(words),
            _ => Err(Error::config(
                "commit.words",
                "the imperative-mood style needs a list of accepted leading words",
            )),
        }
    }
}

/// Prompt section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Answers accepted for one question before the command aborts
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// One question and answer shown by `moo faq`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Question shown in the list
    pub question: String,
    /// Answer printed once the question is picked
    pub answer: String,
}

/// Code style fixer section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsFixerConfig {
    /// Rules forwarded to php-cs-fixer
    #[serde(default)]
    pub rules: toml::Table,
}

impl CsFixerConfig {
    /// Rules as the JSON document php-cs-fixer expects
    ///
    /// Falls back to the PSR-12 rule set when nothing is configured.
    pub fn rules_json(&self) -> Result<String> {
        if self.rules.is_empty() {
            return Ok(r#"{"@PSR12":true}"#.to_string());
        }
        serde_json::to_string(&self.rules)
            .map_err(|e| Error::config("csfixer.rules", format!("cannot encode rules: {e}")))
    }
}

/// Code quality section
///
/// ```toml
/// [qcode.phpstan]
/// laravel = "{site_root}vendor/bin/phpstan analyse {path} --level 5"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QcodeConfig {
    /// phpstan command per code base, replacing the built-in one
    ///
    /// `{path}` and `{site_root}` are substituted before running. An empty
    /// command disables the analysis for that code base.
    #[serde(default)]
    pub phpstan: IndexMap<String, String>,
}

/// moo configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Commit section
    #[serde(default)]
    pub commit: CommitConfig,

    /// Prompt section
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Frequently asked questions
    #[serde(default)]
    pub faqs: Vec<FaqEntry>,

    /// Code style fixer section
    #[serde(default)]
    pub csfixer: CsFixerConfig,

    /// Code quality section
    #[serde(default)]
    pub qcode: QcodeConfig,

    /// Merged document, kept for dotted lookups (not serialized)
    #[serde(skip)]
    document: toml::Table,
}

impl Config {
    /// Load configuration from a single file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_table(read_table(path.as_ref())?)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        let table = toml::from_str(toml_content)
            .map_err(|e| Error::Message(format!("Failed to parse config TOML: {e}")))?;
        Self::from_table(table)
    }

    /// Load the user file and apply the core file on top of it
    ///
    /// A `None` user path starts from an empty document. The core file is
    /// optional and skipped when it does not exist.
    pub fn load_layered(user: Option<&Path>, core: Option<&Path>) -> Result<Self> {
        let mut document = match user {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading user config");
                read_table(path)?
            }
            None => toml::Table::new(),
        };

        if let Some(core_path) = core.filter(|p| p.is_file()) {
            tracing::debug!(path = %core_path.display(), "Applying core config");
            let mut overrides = read_table(core_path)?;
            for key in USER_OWNED_KEYS {
                overrides.remove(key);
            }
            merge_tables(&mut document, overrides);
        }

        Self::from_table(document)
    }

    fn from_table(document: toml::Table) -> Result<Self> {
        let mut config: Self = toml::Value::Table(document.clone())
            .try_into()
            .map_err(|e| Error::Message(format!("Invalid configuration: {e}")))?;
        config.document = document;
        Ok(config)
    }

    /// Look up a value by dotted key (`commit.words`)
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&toml::Value> {
        let mut segments = key.split('.');
        let mut current = self.document.get(segments.next()?)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    /// Look up a value that must be present
    pub fn require_value(&self, key: &str) -> Result<&toml::Value> {
        self.value(key)
            .ok_or_else(|| Error::config(key, "is required but not set"))
    }

    /// Look up a string that must be present
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.require_value(key)?
            .as_str()
            .ok_or_else(|| Error::config(key, "must be a string"))
    }

    /// Attempt ceiling for validated prompts (at least 1)
    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.prompt.max_attempts.max(1)
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Message(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::Message(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

/// Merge `overrides` into `base`, recursing into tables present in both
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}
