//! Terminal implementation of the console
//!
//! Messages are printed as padded blocks: the first line carries the tone's
//! label, continuation lines are indented to the same column. Questions are
//! asked with dialoguer.

use comfy_table::{ContentArrangement, Table, presets};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use moo_core::{Console, Error, Result, Tone};
use owo_colors::OwoColorize;

/// Widest block printed, regardless of the terminal
const MAX_LINE_WIDTH: usize = 120;

/// Column where message text starts after the label
const LABEL_WIDTH: usize = 10;

/// [`Console`] writing to stdout/stderr and reading from the terminal
pub struct TerminalConsole {
    theme: ColorfulTheme,
    width: usize,
}

impl TerminalConsole {
    /// Create a console sized to the current terminal
    #[must_use]
    pub fn new() -> Self {
        let width = terminal_size::terminal_size()
            .map_or(MAX_LINE_WIDTH, |(terminal_size::Width(w), _)| w as usize)
            .min(MAX_LINE_WIDTH);
        Self {
            theme: ColorfulTheme::default(),
            width,
        }
    }

    /// Format one block line: optional label, text padded to the width
    fn format_line(&self, label: Option<&str>, text: &str) -> String {
        let label = label.map(|l| format!("{l}:")).unwrap_or_default();
        let text_width = self.width.saturating_sub(LABEL_WIDTH + 2);
        format!(" {label:<LABEL_WIDTH$}{text:<text_width$} ")
    }

    fn render(&self, tone: Tone, text: &str) -> Vec<String> {
        if tone == Tone::Plain {
            return text.lines().map(ToString::to_string).collect();
        }

        text.lines()
            .enumerate()
            .map(|(index, line)| {
                let label = if index == 0 { tone.label() } else { None };
                paint(tone, &self.format_line(label, line.trim_end()))
            })
            .collect()
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

fn paint(tone: Tone, line: &str) -> String {
    match tone {
        Tone::Plain => line.to_string(),
        Tone::Title => line.bold().to_string(),
        Tone::Info => line.cyan().to_string(),
        Tone::Comment => line.yellow().to_string(),
        Tone::Question => line.black().on_cyan().to_string(),
        Tone::Success => line.black().on_green().to_string(),
        Tone::Warning => line.black().on_yellow().to_string(),
        Tone::Error => line.white().on_red().to_string(),
        Tone::Note => line.yellow().bold().to_string(),
        Tone::Debug => line.dimmed().to_string(),
    }
}

fn prompt_error(err: dialoguer::Error) -> Error {
    Error::Prompt(err.to_string())
}

impl Console for TerminalConsole {
    fn write(&mut self, tone: Tone, text: &str) {
        for line in self.render(tone, text) {
            println!("{line}");
        }
    }

    fn read_line(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn table(&mut self, header: &[String], rows: &[Vec<String>]) {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !header.is_empty() {
            table.set_header(header);
        }
        for row in rows {
            table.add_row(row);
        }
        println!("{table}");
    }

    fn emphasis(&mut self, tone: Tone, text: &str, emphasized: &str) {
        let label = tone.label().map(|l| format!("{l}:")).unwrap_or_default();
        println!(
            "{}{}{}",
            paint(tone, &format!(" {label:<LABEL_WIDTH$}{text}")),
            emphasized.white().on_red().bold(),
            paint(tone, " ")
        );
    }

    fn separator(&mut self, tone: Tone) {
        println!("{}", paint(tone, &"_".repeat(self.width)));
    }

    fn report_error(&mut self, text: &str) {
        for line in self.render(Tone::Error, text) {
            eprintln!("{line}");
        }
    }
}
