use anyhow::{Context, Result};
use inquire::Select;
use sage::{KnowledgeState, PendingQuestion};

const DONT_KNOW: &str = "I don't know";

/// Put a pending question to the user
///
/// Returns the index of the chosen option, or `None` when the user does not
/// know and the question can be skipped.
pub fn ask(pending: &PendingQuestion, state: &KnowledgeState) -> Result<Option<usize>> {
    let question = &pending.question;
    if question.options.is_empty() {
        anyhow::bail!("Question '{}' has no options", question.description);
    }

    let mut options: Vec<String> = question
        .options
        .iter()
        .map(|option| state.substitute_variables(&option.description))
        .collect();
    if pending.skippable {
        options.push(DONT_KNOW.to_string());
    }

    let message = state.substitute_variables(&question.description);
    let selected = Select::new(&message, options)
        .with_help_message("Use arrow keys to navigate, Enter to select")
        .raw_prompt()
        .with_context(|| format!("Failed to get an answer to '{}'", question.description))?;

    if selected.index < question.options.len() {
        Ok(Some(selected.index))
    } else {
        Ok(None)
    }
}
