//! Reedline-backed prompter for the interactive form

use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Emacs, KeyCode, KeyModifiers, MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu,
    Signal, default_emacs_keybindings,
};

use crate::error::{ExtractorError, Result};

use super::completer::PathCompleter;
use super::prompt::FormPrompt;
use super::{InputKind, Notice, Prompter, Question};

const COMPLETION_MENU: &str = "completion_menu";

/// Terminal prompter with line editing and path completion
pub struct ReedlinePrompter {
    /// Editor for free text and confirmations
    text_editor: Reedline,
    /// Editor with file path completion
    path_editor: Reedline,
    /// Whether messages are colored
    color: bool,
}

impl ReedlinePrompter {
    /// Create a new prompter
    ///
    /// # Arguments
    /// * `color` - Enable colored messages
    pub fn new(color: bool) -> Self {
        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let menu = ColumnarMenu::default().with_name(COMPLETION_MENU);
        let path_editor = Reedline::create()
            .with_completer(Box::new(PathCompleter::new(&["db", "txt"])))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_edit_mode(Box::new(Emacs::new(keybindings)));

        Self {
            text_editor: Reedline::create(),
            path_editor,
            color,
        }
    }
}

fn paint(color: bool, style: Style, text: &str) -> String {
    if color {
        style.paint(text).to_string()
    } else {
        text.to_string()
    }
}

impl Prompter for ReedlinePrompter {
    fn ask(&mut self, question: &Question<'_>) -> Result<Option<String>> {
        let prompt = FormPrompt::new(question);
        let editor = match question.kind {
            InputKind::OpenFile | InputKind::SaveFile => &mut self.path_editor,
            InputKind::Text | InputKind::Confirm => &mut self.text_editor,
        };

        match editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => Ok(Some(line)),
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => Ok(None),
            #[allow(unreachable_patterns)]
            Ok(_) => Ok(None),
            Err(e) => Err(ExtractorError::Generic(format!("Read error: {}", e))),
        }
    }

    fn notify(&mut self, notice: Notice, title: &str, message: &str) -> Result<()> {
        let title_style = match notice {
            Notice::Info => Color::Green.bold(),
            Notice::Error => Color::Red.bold(),
        };
        let title = paint(self.color, title_style, title);

        match notice {
            Notice::Info => println!("{}: {}", title, message),
            Notice::Error => eprintln!("{}: {}", title, message),
        }
        Ok(())
    }
}
