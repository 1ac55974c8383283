//! File path completion for the database and output prompts

use std::fs;
use std::path::Path;

use reedline::{Completer, Span, Suggestion};

use super::has_extension;

/// Completes file system paths, listing preferred extensions first
pub struct PathCompleter {
    /// Extensions listed before other files (e.g. `db`)
    preferred: Vec<String>,
}

impl PathCompleter {
    /// Create a new path completer
    ///
    /// # Arguments
    /// * `preferred` - Extensions shown first, without the dot
    pub fn new(preferred: &[&str]) -> Self {
        Self {
            preferred: preferred.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Candidate names in `dir` starting with `prefix`, directories with a
    /// trailing separator
    fn candidates(&self, dir: &Path, prefix: &str) -> Vec<(String, bool)> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };

        let preferred: Vec<&str> = self.preferred.iter().map(String::as_str).collect();
        let mut found: Vec<(String, bool, u8)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                if !name.starts_with(prefix) || (name.starts_with('.') && !prefix.starts_with('.')) {
                    return None;
                }
                let is_dir = entry.file_type().ok()?.is_dir();
                let rank = if is_dir {
                    0
                } else if has_extension(Path::new(&name), &preferred) {
                    1
                } else {
                    2
                };
                Some((name, is_dir, rank))
            })
            .collect();

        found.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(&b.0)));
        found
            .into_iter()
            .map(|(name, is_dir, _)| (name, is_dir))
            .collect()
    }
}

impl Completer for PathCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let typed = &line[..pos.min(line.len())];

        // Split into directory part and the file name prefix being typed
        let split = typed.rfind(['/', std::path::MAIN_SEPARATOR]).map(|i| i + 1).unwrap_or(0);
        let (dir_part, prefix) = typed.split_at(split);

        let dir = if dir_part.is_empty() {
            Path::new(".").to_path_buf()
        } else {
            super::expand_tilde(dir_part)
        };

        self.candidates(&dir, prefix)
            .into_iter()
            .map(|(name, is_dir)| Suggestion {
                value: if is_dir { format!("{}/", name) } else { name },
                description: None,
                style: None,
                extra: None,
                span: Span::new(split, pos),
                append_whitespace: false,
                match_indices: None,
            })
            .collect()
    }
}
