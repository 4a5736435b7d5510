//! Lab Entry CLI
//!
//! Command-line front end for the lab entry views:
//! - List and filter entries
//! - Submit entries (one, or a CSV of them)
//! - Delete an entry after confirmation
//! - Export entries to CSV

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use labentry::bulk::read_submissions;
use labentry::config::{generate_default_config, Config};
use labentry::datetime::{local_now, long_date, FormDefaults};
use labentry::remote::ScriptClient;
use labentry::views::{
    AlwaysConfirm, BrowserView, Confirmation, DeleteOutcome, Notice, SubmissionView,
    TerminalConfirm,
};

#[derive(Parser)]
#[command(name = "labentry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Record and browse lab entries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Script endpoint URL, overriding the config
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entries
    List {
        /// Match name or USN (case-insensitive)
        #[arg(short, long, default_value = "")]
        search: String,
        /// Exact semester
        #[arg(long, default_value = "")]
        semester: String,
        /// Show times on a 12-hour clock
        #[arg(long)]
        twelve_hour: bool,
    },

    /// Submit an entry
    Submit {
        #[arg(long, required_unless_present = "from")]
        name: Option<String>,
        #[arg(long, required_unless_present = "from")]
        usn: Option<String>,
        #[arg(long, required_unless_present = "from")]
        semester: Option<String>,
        /// Entry date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Entry time, HH:MM (default: now)
        #[arg(long)]
        time: Option<String>,
        /// Extra form fields in key=value format
        #[arg(short = 'F', long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Submit every row of a CSV file instead
        #[arg(long, conflicts_with_all = ["name", "usn", "semester", "date", "time", "fields"])]
        from: Option<PathBuf>,
    },

    /// Delete an entry by row
    Delete {
        row: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export all entries to CSV
    Export {
        /// Output directory (default: from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "dir")]
        stdout: bool,
    },

    /// Show today's date and the form defaults
    Today,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default()?,
    };
    if let Some(url) = cli.endpoint {
        config.endpoint.url = url;
    }

    labentry::logging::init(&config.logging);

    match cli.command {
        Commands::List {
            search,
            semester,
            twelve_hour,
        } => {
            let mut browser = BrowserView::new(connect(&config)?);
            if let Err(notice) = browser.load().await {
                report(&notice);
                return Ok(ExitCode::FAILURE);
            }

            browser.set_search(search);
            browser.set_semester(semester);

            print!("{}", browser.render(twelve_hour));
            println!();
            println!(
                "Showing {} of {} entries",
                browser.visible().len(),
                browser.total()
            );
        }

        Commands::Submit {
            name,
            usn,
            semester,
            date,
            time,
            fields,
            from,
        } => {
            let mut view = SubmissionView::new(connect(&config)?, config.views.recent_limit);
            let mut failed = 0;

            let batch = match from {
                Some(path) => {
                    let defaults = FormDefaults::at(local_now());
                    let result = read_submissions(&path, &defaults)
                        .with_context(|| format!("Failed to read {:?}", path))?;

                    for error in result.errors.iter().take(10) {
                        eprintln!("  {}", error);
                    }
                    if result.rows_failed > 0 {
                        eprintln!(
                            "Skipped {} of {} rows",
                            result.rows_failed, result.rows_processed
                        );
                        failed += result.rows_failed;
                    }
                    result.entries
                }
                None => {
                    let form = view.form_mut();
                    form.name = name.unwrap_or_default();
                    form.usn = usn.unwrap_or_default();
                    form.semester = semester.unwrap_or_default();
                    if let Some(date) = date {
                        form.entry_date = date;
                    }
                    if let Some(time) = time {
                        form.entry_time = time;
                    }
                    form.extra.extend(fields);
                    vec![form.clone()]
                }
            };

            for entry in batch {
                *view.form_mut() = entry;
                let notice = view.submit().await;
                if notice.is_error() {
                    failed += 1;
                }
                report(&notice);
            }

            println!();
            println!("Recent entries:");
            print!("{}", view.recent().render());

            if failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Delete { row, yes } => {
            let mut browser = BrowserView::new(connect(&config)?);
            if let Err(notice) = browser.load().await {
                report(&notice);
                return Ok(ExitCode::FAILURE);
            }

            let confirmation: Box<dyn Confirmation> = if yes {
                Box::new(AlwaysConfirm)
            } else {
                Box::new(TerminalConfirm::stdin())
            };

            match browser.delete(row, confirmation.as_ref()).await {
                DeleteOutcome::Cancelled | DeleteOutcome::Dismissed => {
                    println!("Delete cancelled.");
                }
                DeleteOutcome::Deleted(notice) => {
                    report(&notice);
                    println!("Total entries: {}", browser.total());
                }
                DeleteOutcome::Failed(notice) => {
                    report(&notice);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Export { dir, stdout } => {
            let mut browser = BrowserView::new(connect(&config)?);
            if let Err(notice) = browser.load().await {
                report(&notice);
                return Ok(ExitCode::FAILURE);
            }

            if stdout {
                if let Some(csv) = browser.export_csv() {
                    println!("{}", csv);
                }
            } else {
                let dir = dir.unwrap_or_else(|| PathBuf::from(&config.views.export_dir));
                match browser.export_to(&dir)? {
                    Some(path) => println!("Exported {} entries to {:?}", browser.total(), path),
                    None => println!("No entries to export."),
                }
            }
        }

        Commands::Today => {
            let now = local_now();
            let defaults = FormDefaults::at(now);
            println!("{}", long_date(now));
            println!("Date: {}", defaults.date);
            println!("Time: {}", defaults.time);
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn connect(config: &Config) -> anyhow::Result<ScriptClient> {
    ScriptClient::new(config.endpoint.script_config()).context("Failed to create HTTP client")
}

/// Parse a `key=value` form field
fn parse_field(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid field {:?}: expected key=value", s))?;
    if key.is_empty() {
        return Err(format!("invalid field {:?}: empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn report(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{}", notice);
    } else {
        println!("{}", notice);
    }
}
