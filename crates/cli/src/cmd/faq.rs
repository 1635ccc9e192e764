//! `moo faq`: answers to frequently asked questions

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::descriptor::CommandDescriptor;
use crate::error::Result;
use moo_core::{Error, Tone};

/// Pick a configured question and show its answer
#[derive(Debug, Default)]
pub struct FaqCommand;

impl Command for FaqCommand {
    fn descriptor() -> CommandDescriptor {
        CommandDescriptor::new("faq", "Display answers to frequently asked questions.")
    }

    fn execute(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let config = std::sync::Arc::clone(&ctx.config);
        if config.faqs.is_empty() {
            return Err(Error::config("faqs", "no questions are configured").into());
        }

        let questions: Vec<String> = config.faqs.iter().map(|f| f.question.clone()).collect();
        let index = ctx
            .prompt()
            .ask_choice("Please select a question", &questions, 0)?;

        let faq = config
            .faqs
            .get(index)
            .ok_or_else(|| Error::Message(format!("No question at position {index}")))?;
        ctx.console.write(Tone::Title, &faq.question);
        ctx.console.info(&faq.answer);
        Ok(())
    }
}
