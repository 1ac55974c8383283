//! Prompt rendering for the interactive form

use std::borrow::Cow;

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

use super::{InputKind, Question};

/// Prompt for one question of the form
pub struct FormPrompt {
    /// Question label
    label: String,
    /// Value used when the answer is empty
    default: Option<String>,
    /// Expected answer
    kind: InputKind,
}

impl FormPrompt {
    /// Create a new form prompt
    ///
    /// # Arguments
    /// * `question` - Question to render
    ///
    /// # Returns
    /// * `Self` - New prompt
    pub fn new(question: &Question<'_>) -> Self {
        Self {
            label: question.label.to_string(),
            default: question.default.map(String::from),
            kind: question.kind,
        }
    }
}

impl Prompt for FormPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        match (&self.kind, &self.default) {
            (InputKind::Confirm, _) => format!("{} [y/N] ", self.label).into(),
            (_, Some(default)) => format!("{} [{}]: ", self.label, default).into(),
            (_, None) => format!("{}: ", self.label).into(),
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        match self.kind {
            InputKind::OpenFile | InputKind::SaveFile => "Tab: complete, empty: cancel".into(),
            _ => "".into(),
        }
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}
