//! Terminal implementations of the session shell.
//!
//! [`FlagShell`] answers every question from command-line flags, while
//! [`PromptShell`] asks on the terminal with a line editor.

use crate::preview::{self, OutputFormat};
use anyhow::{Context, Result};
use colored::Colorize;
use csvtidy_sheet::session::labels;
use csvtidy_sheet::{Artifact, Choice, Sheet, Shell, Upload};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Where and how results are shown.
#[derive(Debug, Clone)]
pub struct Output {
    pub format: OutputFormat,
    pub output_dir: PathBuf,
}

impl Output {
    fn table(&self, title: &str, sheet: &Sheet) {
        println!(
            "{} {}",
            title.cyan().bold(),
            format!("({} rows, {} columns)", sheet.row_count(), sheet.col_count()).dimmed()
        );
        match preview::render(sheet, self.format) {
            Ok(text) => println!("{text}"),
            Err(e) => self.error(&format!("Error: {e}")),
        }
    }

    fn error(&self, message: &str) {
        eprintln!("{}", message.red().bold());
    }

    fn warning(&self, message: &str) {
        eprintln!("{}", message.yellow());
    }

    fn download(&self, artifact: &Artifact) -> Option<PathBuf> {
        let saved = std::fs::create_dir_all(&self.output_dir)
            .map_err(csvtidy_sheet::SheetError::from)
            .and_then(|()| artifact.write_to(&self.output_dir));
        match saved {
            Ok(path) => {
                println!("{} {}", "Saved".green().bold(), path.display());
                Some(path)
            }
            Err(e) => {
                self.error(&format!("Error: could not save {}: {e}", artifact.file_name));
                None
            }
        }
    }
}

/// Answers given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Answers {
    pub drop_first_row: bool,
    pub drop_duplicates: bool,
    pub drop_empty_rows: bool,
    pub merge: bool,
    pub promote_header: bool,
    pub show_data: bool,
    pub download: bool,
}

/// A shell that never asks: every option comes from [`Answers`].
pub struct FlagShell {
    uploads: Vec<Upload>,
    answers: Answers,
    download_pending: bool,
    output: Output,
    saved: Vec<PathBuf>,
}

impl FlagShell {
    pub fn new(uploads: Vec<Upload>, answers: Answers, output: Output) -> Self {
        let download_pending = answers.download;
        FlagShell {
            uploads,
            answers,
            download_pending,
            output,
            saved: Vec::new(),
        }
    }

    /// Paths of the artifacts written so far
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl Shell for FlagShell {
    fn upload_files(&mut self) -> Vec<Upload> {
        std::mem::take(&mut self.uploads)
    }

    fn get_option(&mut self, prompt: &str, choices: &[Choice]) -> Choice {
        let yes = match prompt {
            labels::REMOVE_FIRST_ROW => self.answers.drop_first_row,
            labels::REMOVE_DUPLICATES => self.answers.drop_duplicates,
            labels::REMOVE_EMPTY_ROWS => self.answers.drop_empty_rows,
            labels::PROMOTE_HEADER => self.answers.promote_header,
            _ => false,
        };
        let wanted = if yes { Choice::Yes } else { Choice::No };
        tracing::debug!(prompt, choice = %wanted, "answered from flags");
        if choices.contains(&wanted) {
            wanted
        } else {
            choices.first().copied().unwrap_or(wanted)
        }
    }

    fn get_toggle(&mut self, label: &str, default: bool) -> bool {
        match label {
            labels::MERGE_FILES => self.answers.merge,
            labels::SHOW_DATA => self.answers.show_data,
            _ => default,
        }
    }

    fn button_pressed(&mut self, label: &str) -> bool {
        label == labels::DOWNLOAD && std::mem::take(&mut self.download_pending)
    }

    fn render_table(&mut self, title: &str, sheet: &Sheet) {
        self.output.table(title, sheet);
    }

    fn render_error(&mut self, message: &str) {
        self.output.error(message);
    }

    fn render_warning(&mut self, message: &str) {
        self.output.warning(message);
    }

    fn offer_download(&mut self, artifact: &Artifact) {
        if let Some(path) = self.output.download(artifact) {
            self.saved.push(path);
        }
    }
}

/// A shell that asks every question on the terminal.
pub struct PromptShell {
    uploads: Vec<Upload>,
    editor: DefaultEditor,
    output: Output,
    history_path: Option<PathBuf>,
}

impl PromptShell {
    pub fn new(uploads: Vec<Upload>, output: Output) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = dirs_history_path();

        // Load history if available
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }

        Ok(PromptShell {
            uploads,
            editor,
            output,
            history_path,
        })
    }

    /// Save the line-editor history
    pub fn finish(mut self) {
        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }
    }

    /// Ask whether to start over with a new upload
    pub fn another_round(&mut self) -> bool {
        self.confirm("Start over with new files?", false)
    }

    /// Read one line; `None` on Ctrl-C, Ctrl-D or a terminal error
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Some(line)
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => None,
            Err(e) => {
                self.output.error(&format!("Error: {e}"));
                None
            }
        }
    }

    /// Ask a yes/no question, falling back to `default` on an empty answer
    fn confirm(&mut self, label: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let prompt = format!("{} {} ", label.bold(), hint.dimmed());
        loop {
            let Some(line) = self.read_line(&prompt) else {
                return default;
            };
            if line.is_empty() {
                return default;
            }
            match Choice::from_label(&line) {
                Some(choice) => return choice.is_yes(),
                None => println!("{} Please answer yes or no", "?".yellow()),
            }
        }
    }
}

impl Shell for PromptShell {
    fn upload_files(&mut self) -> Vec<Upload> {
        if !self.uploads.is_empty() {
            return std::mem::take(&mut self.uploads);
        }

        let prompt = format!("{} ", "Upload CSV files (space-separated paths):".bold());
        let Some(line) = self.read_line(&prompt) else {
            return Vec::new();
        };

        let mut uploads = Vec::new();
        for path in line.split_whitespace() {
            match Upload::from_path(path) {
                Ok(upload) => uploads.push(upload),
                Err(e) => self
                    .output
                    .error(&format!("Error: failed to read file {path}: {e}")),
            }
        }
        uploads
    }

    fn get_option(&mut self, prompt: &str, choices: &[Choice]) -> Choice {
        let Some(&default) = choices.first() else {
            return Choice::No;
        };
        let names: Vec<String> = choices.iter().map(ToString::to_string).collect();
        let text = format!("{} [{}] ", prompt.bold(), names.join("/").dimmed());

        loop {
            let Some(line) = self.read_line(&text) else {
                return default;
            };
            if line.is_empty() {
                return default;
            }
            match Choice::from_label(&line) {
                Some(choice) if choices.contains(&choice) => return choice,
                _ => println!("{} Choose one of: {}", "?".yellow(), names.join(", ")),
            }
        }
    }

    fn get_toggle(&mut self, label: &str, default: bool) -> bool {
        self.confirm(label, default)
    }

    fn button_pressed(&mut self, label: &str) -> bool {
        self.confirm(label, false)
    }

    fn render_table(&mut self, title: &str, sheet: &Sheet) {
        self.output.table(title, sheet);
    }

    fn render_error(&mut self, message: &str) {
        self.output.error(message);
    }

    fn render_warning(&mut self, message: &str) {
        self.output.warning(message);
    }

    fn offer_download(&mut self, artifact: &Artifact) {
        self.output.download(artifact);
    }
}

/// Get the history file path.
fn dirs_history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|mut p| {
        p.push("csvtidy");
        let _ = std::fs::create_dir_all(&p);
        p.push("history.txt");
        p
    })
}

/// Read the files given on the command line as uploads.
pub fn read_uploads(paths: &[PathBuf]) -> Result<Vec<Upload>> {
    paths
        .iter()
        .map(|path| {
            Upload::from_path(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))
        })
        .collect()
}
