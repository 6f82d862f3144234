use crate::domain::ports::Prompt;
use crate::utils::error::Result;
use inquire::Text;
use tokio::task::block_in_place;

/// Terminal prompts backed by `inquire`. Needs the multi-threaded runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct InquirePrompt;

impl Prompt for InquirePrompt {
    fn text(&self, message: &str, default: Option<&str>) -> Result<String> {
        let mut question = Text::new(message);
        if let Some(default) = default {
            question = question.with_default(default);
        }
        Ok(block_in_place(|| question.prompt())?)
    }

    fn show(&self, text: &str) {
        println!("{}", text);
    }
}
