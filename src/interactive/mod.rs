//! Interactive terminal form
//!
//! A short sequence of prompts collects one export:
//! - TABLE and FIELD, pre-filled with the configured defaults
//! - the database to read (must exist, Tab completes paths)
//! - the output file (`.txt` appended when no extension is given)
//!
//! Leaving a file prompt empty, or pressing Ctrl-C / Ctrl-D there, aborts the
//! run with "Nothing to do". Aborting at TABLE or FIELD leaves the form.
//! Export failures are reported as a message and the form stays open.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::AppInfo;
use crate::config::Config;
use crate::error::Result;
use crate::export::{ExportOptions, export_to_file};
use crate::reader::ColumnQuery;

pub mod completer;
pub mod editor;
pub mod prompt;

pub use completer::PathCompleter;
pub use editor::ReedlinePrompter;
pub use prompt::FormPrompt;

/// What kind of answer a question expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Free text
    Text,
    /// Existing file to read
    OpenFile,
    /// File to write
    SaveFile,
    /// Yes/no answer
    Confirm,
}

/// One prompt of the form
#[derive(Debug, Clone, Copy)]
pub struct Question<'a> {
    pub label: &'a str,
    pub default: Option<&'a str>,
    pub kind: InputKind,
}

/// Severity of a message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Error,
}

/// Input/output surface of the form
pub trait Prompter {
    /// Ask a question
    ///
    /// # Returns
    /// * `Result<Option<String>>` - The answer, or None when the user aborted
    fn ask(&mut self, question: &Question<'_>) -> Result<Option<String>>;

    /// Show a message
    fn notify(&mut self, notice: Notice, title: &str, message: &str) -> Result<()>;
}

/// Everything the form collected for one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub db: PathBuf,
    pub out: PathBuf,
    pub query: ColumnQuery,
}

/// Result of filling in the form once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// All fields filled in
    Submitted(FormRequest),
    /// A file prompt was dismissed
    Cancelled,
    /// The user left the form
    Quit,
}

/// Form state, kept between runs so edited TABLE/FIELD values stick
pub struct InteractiveForm {
    table: String,
    field: String,
}

impl InteractiveForm {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Current TABLE value
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Current FIELD value
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Walk through the prompts once
    pub fn collect(&mut self, prompter: &mut dyn Prompter) -> Result<FormOutcome> {
        let Some(table) = ask_text(prompter, "TABLE", &self.table)? else {
            return Ok(FormOutcome::Quit);
        };
        self.table = table;

        let Some(field) = ask_text(prompter, "FIELD", &self.field)? else {
            return Ok(FormOutcome::Quit);
        };
        self.field = field;

        let Some(db) = ask_database(prompter)? else {
            return Ok(FormOutcome::Cancelled);
        };
        let Some(out) = ask_output(prompter)? else {
            return Ok(FormOutcome::Cancelled);
        };

        Ok(FormOutcome::Submitted(FormRequest {
            db,
            out,
            query: ColumnQuery::new(self.table.as_str(), self.field.as_str()),
        }))
    }
}

/// Run the form until the user leaves it
pub fn run(info: &AppInfo, config: &Config, prompter: &mut dyn Prompter) -> Result<()> {
    prompter.notify(Notice::Info, info.title, &info.banner())?;

    let options = ExportOptions::from_config(config);
    let mut form = InteractiveForm::new(
        config.defaults.table.as_str(),
        config.defaults.field.as_str(),
    );

    loop {
        match form.collect(prompter)? {
            FormOutcome::Quit => break,
            FormOutcome::Cancelled => {
                prompter.notify(Notice::Info, info.title, "Nothing to do")?;
            }
            FormOutcome::Submitted(request) => {
                info!(
                    "Interactive export of {}.{} from {}",
                    request.query.table,
                    request.query.field,
                    request.db.display()
                );
                match export_to_file(&request.db, &request.out, request.query, &options) {
                    Ok(summary) => {
                        let message = format!(
                            "All done\n{} values written to {}",
                            summary.rows_exported,
                            request.out.display()
                        );
                        prompter.notify(Notice::Info, info.title, &message)?;
                    }
                    Err(e) => {
                        warn!("Interactive export failed: {}", e);
                        prompter.notify(Notice::Error, info.title, &e.to_string())?;
                    }
                }
            }
        }

        if !confirm(prompter, "Start another export?")? {
            break;
        }
    }

    Ok(())
}

fn ask_text(prompter: &mut dyn Prompter, label: &str, current: &str) -> Result<Option<String>> {
    let answer = prompter.ask(&Question {
        label,
        default: Some(current),
        kind: InputKind::Text,
    })?;

    Ok(answer.map(|a| {
        if a.trim().is_empty() {
            current.to_string()
        } else {
            a
        }
    }))
}

fn ask_database(prompter: &mut dyn Prompter) -> Result<Option<PathBuf>> {
    loop {
        let answer = prompter.ask(&Question {
            label: "Select SQLite database file to read (*.db)",
            default: None,
            kind: InputKind::OpenFile,
        })?;
        let Some(path) = answer.as_deref().and_then(non_blank).map(expand_tilde) else {
            return Ok(None);
        };

        if path.is_file() {
            return Ok(Some(path));
        }
        prompter.notify(
            Notice::Error,
            "Database",
            &format!("File not found: {}", path.display()),
        )?;
    }
}

fn ask_output(prompter: &mut dyn Prompter) -> Result<Option<PathBuf>> {
    loop {
        let answer = prompter.ask(&Question {
            label: "File to write list/field values (*.txt)",
            default: None,
            kind: InputKind::SaveFile,
        })?;
        let Some(path) = answer
            .as_deref()
            .and_then(non_blank)
            .map(expand_tilde)
            .map(|p| with_default_extension(p, "txt"))
        else {
            return Ok(None);
        };

        if path.is_dir() {
            prompter.notify(
                Notice::Error,
                "Output",
                &format!("{} is a directory", path.display()),
            )?;
            continue;
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                prompter.notify(
                    Notice::Error,
                    "Output",
                    &format!("Directory does not exist: {}", parent.display()),
                )?;
                continue;
            }
        }
        if path.exists() && !confirm(prompter, &format!("{} already exists. Replace it?", path.display()))? {
            continue;
        }
        return Ok(Some(path));
    }
}

fn confirm(prompter: &mut dyn Prompter, label: &str) -> Result<bool> {
    let answer = prompter.ask(&Question {
        label,
        default: Some("n"),
        kind: InputKind::Confirm,
    })?;
    Ok(matches!(
        answer.as_deref().map(|a| a.trim().to_lowercase()).as_deref(),
        Some("y") | Some("yes")
    ))
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(input: &str) -> PathBuf {
    if input == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}

/// Append `.ext` when `path` has no extension
pub fn with_default_extension(path: PathBuf, ext: &str) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    }
}

/// Whether `path` carries one of `extensions` (case-insensitive)
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::tests::create_rds;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// Prompter answering from a script and recording what it was told
    struct ScriptedPrompter {
        answers: VecDeque<Option<String>>,
        asked: Vec<(String, InputKind)>,
        notices: Vec<(Notice, String)>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[Option<&str>]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.map(String::from)).collect(),
                asked: Vec::new(),
                notices: Vec::new(),
            }
        }

        fn messages(&self) -> Vec<&str> {
            self.notices.iter().map(|(_, m)| m.as_str()).collect()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, question: &Question<'_>) -> Result<Option<String>> {
            self.asked.push((question.label.to_string(), question.kind));
            Ok(self.answers.pop_front().unwrap_or(None))
        }

        fn notify(&mut self, notice: Notice, _title: &str, message: &str) -> Result<()> {
            self.notices.push((notice, message.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_defaults_are_kept_on_empty_answers() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &[]);
        let out = dir.path().join("list");

        let mut prompter = ScriptedPrompter::new(&[
            Some(""),
            Some("  "),
            Some(db.to_str().unwrap()),
            Some(out.to_str().unwrap()),
        ]);
        let mut form = InteractiveForm::new("FILE", "md5");

        let outcome = form.collect(&mut prompter).unwrap();
        assert_eq!(
            outcome,
            FormOutcome::Submitted(FormRequest {
                db,
                out: dir.path().join("list.txt"),
                query: ColumnQuery::new("FILE", "md5"),
            })
        );
    }

    #[test]
    fn test_edited_values_stick() {
        let mut prompter = ScriptedPrompter::new(&[Some("PKG"), Some("sha1"), Some("")]);
        let mut form = InteractiveForm::new("FILE", "md5");

        assert_eq!(form.collect(&mut prompter).unwrap(), FormOutcome::Cancelled);
        assert_eq!(form.table(), "PKG");
        assert_eq!(form.field(), "sha1");
    }

    #[test]
    fn test_abort_at_table_quits() {
        let mut prompter = ScriptedPrompter::new(&[None]);
        let mut form = InteractiveForm::new("FILE", "md5");
        assert_eq!(form.collect(&mut prompter).unwrap(), FormOutcome::Quit);
    }

    #[test]
    fn test_missing_database_is_asked_again() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.db");

        let mut prompter =
            ScriptedPrompter::new(&[Some(""), Some(""), Some(missing.to_str().unwrap()), None]);
        let mut form = InteractiveForm::new("FILE", "md5");

        assert_eq!(form.collect(&mut prompter).unwrap(), FormOutcome::Cancelled);
        assert_eq!(prompter.notices.len(), 1);
        assert_eq!(prompter.notices[0].0, Notice::Error);
        let open_prompts = prompter
            .asked
            .iter()
            .filter(|(_, kind)| *kind == InputKind::OpenFile)
            .count();
        assert_eq!(open_prompts, 2);
    }

    #[test]
    fn test_existing_output_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &[]);
        let out = dir.path().join("list.txt");
        std::fs::write(&out, "keep me").unwrap();

        let mut prompter = ScriptedPrompter::new(&[
            Some(""),
            Some(""),
            Some(db.to_str().unwrap()),
            Some(out.to_str().unwrap()),
            Some("n"),
            Some(out.to_str().unwrap()),
            Some("y"),
        ]);
        let mut form = InteractiveForm::new("FILE", "md5");

        let outcome = form.collect(&mut prompter).unwrap();
        assert!(matches!(outcome, FormOutcome::Submitted(ref r) if r.out == out));
    }

    #[test]
    fn test_run_exports_and_reports() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &["a1b2", "c3d4"]);
        let out = dir.path().join("md5.txt");

        let mut config = Config::default();
        config.display.progress = false;

        let mut prompter = ScriptedPrompter::new(&[
            Some(""),
            Some(""),
            Some(db.to_str().unwrap()),
            Some(out.to_str().unwrap()),
            Some("n"),
        ]);
        run(&AppInfo::current(), &config, &mut prompter).unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec!["MD5", "a1b2", "c3d4"]);
        assert!(prompter.messages().iter().any(|m| m.starts_with("All done")));
    }

    #[test]
    fn test_run_reports_nothing_to_do_and_errors() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &["a1b2"]);
        let out = dir.path().join("out.txt");

        let mut config = Config::default();
        config.display.progress = false;

        let mut prompter = ScriptedPrompter::new(&[
            // first run: database prompt dismissed
            Some(""),
            Some(""),
            None,
            Some("yes"),
            // second run: unknown field
            Some(""),
            Some("sha256"),
            Some(db.to_str().unwrap()),
            Some(out.to_str().unwrap()),
            Some("no"),
        ]);
        run(&AppInfo::current(), &config, &mut prompter).unwrap();

        assert!(prompter.messages().contains(&"Nothing to do"));
        let errors: Vec<_> = prompter
            .notices
            .iter()
            .filter(|(n, _)| *n == Notice::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].1.contains("sha256"));
    }

    #[test]
    fn test_with_default_extension() {
        assert_eq!(
            with_default_extension(PathBuf::from("out"), "txt"),
            PathBuf::from("out.txt")
        );
        assert_eq!(
            with_default_extension(PathBuf::from("out.lst"), "txt"),
            PathBuf::from("out.lst")
        );
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("RDS.DB"), &["db"]));
        assert!(!has_extension(Path::new("rds.sqlite"), &["db"]));
        assert!(!has_extension(Path::new("rds"), &["db"]));
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("rds.db"), PathBuf::from("rds.db"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/rds.db"), home.join("rds.db"));
        }
    }
}
