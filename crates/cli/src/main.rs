//! # csvtidy-cli
//!
//! Command-line interface for cleaning, merging and exporting CSV files.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use csvtidy_sheet::Session;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod preview;
mod shell;

use preview::OutputFormat;
use shell::{read_uploads, Answers, FlagShell, Output, PromptShell};

/// csvtidy - clean, merge and export CSV files
#[derive(Parser)]
#[command(name = "csvtidy")]
#[command(author, version, about = "Clean, merge and export CSV files", long_about = None)]
struct Cli {
    /// CSV files to upload (comma- or semicolon-separated, UTF-8)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Ask every option on the terminal instead of reading flags
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Remove the first data row (single file only)
    #[arg(long)]
    drop_first_row: bool,

    /// Remove duplicate rows
    #[arg(long)]
    drop_duplicates: bool,

    /// Remove rows where every cell is empty
    #[arg(long)]
    drop_empty_rows: bool,

    /// Merge all files into one (several files only)
    #[arg(short = 'm', long)]
    merge: bool,

    /// Use the first row of each file as its header when merging
    #[arg(long, requires = "merge")]
    promote_header: bool,

    /// Do not print the cleaned data
    #[arg(long)]
    no_preview: bool,

    /// Write cleaned_data_<n>.csv for every result
    #[arg(short = 'd', long)]
    download: bool,

    /// Directory for downloaded files
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Preview format (json, csv, table)
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn answers(&self) -> Answers {
        Answers {
            drop_first_row: self.drop_first_row,
            drop_duplicates: self.drop_duplicates,
            drop_empty_rows: self.drop_empty_rows,
            merge: self.merge,
            promote_header: self.promote_header,
            show_data: !self.no_preview,
            download: self.download,
        }
    }

    fn output(&self) -> Output {
        Output {
            format: self.format,
            output_dir: self.output_dir.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let uploads = read_uploads(&cli.files)?;
    let mut session = Session::new();

    if cli.interactive {
        run_interactive(&mut session, &cli, uploads)
    } else if uploads.is_empty() {
        // No arguments - show help
        Cli::parse_from(["csvtidy", "--help"]);
        Ok(())
    } else {
        let mut shell = FlagShell::new(uploads, cli.answers(), cli.output());
        session.run_turn(&mut shell);
        tracing::info!(saved = shell.saved().len(), "finished");
        Ok(())
    }
}

/// Run turns on the terminal until the user stops.
fn run_interactive(
    session: &mut Session,
    cli: &Cli,
    uploads: Vec<csvtidy_sheet::Upload>,
) -> Result<()> {
    println!(
        "{} {} - Interactive Mode",
        "csvtidy".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Press {} to accept the default answer\n", "Enter".yellow());

    let mut shell = PromptShell::new(uploads, cli.output())?;
    loop {
        session.run_turn(&mut shell);
        if !shell.another_round() {
            break;
        }
        session.clear();
    }
    shell.finish();

    println!("Goodbye!");
    Ok(())
}
