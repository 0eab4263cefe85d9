//! Command-line interface for the harvester.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{list_records_url, FetcherConfig, ListRecordsQuery, DEFAULT_METADATA_PREFIX};
use crate::error::{HarvesterError, Result};
use crate::fetch::HttpFetcher;
use crate::harvester::{HarvestSummary, Harvester};

/// Number of links buffered between the harvest thread and the writer.
const LINK_BUFFER: usize = 1024;

/// OAI-PMH Harvester - Stream Dublin Core identifier URLs from an OAI-PMH endpoint.
#[derive(Parser)]
#[command(name = "oaipmh-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest all records of an endpoint and print their identifier URLs.
    Harvest {
        /// OAI-PMH base URL (e.g., https://repo.example/oai)
        endpoint: String,

        /// Metadata format to request
        #[arg(short, long, default_value = DEFAULT_METADATA_PREFIX)]
        metadata_prefix: String,

        /// Restrict the harvest to one set
        #[arg(short, long)]
        set: Option<String>,

        /// Lower datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
        #[arg(long)]
        from: Option<String>,

        /// Upper datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
        #[arg(long)]
        until: Option<String>,

        /// Per-request timeout in seconds (default: 600)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Write URLs to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            endpoint,
            metadata_prefix,
            set,
            from,
            until,
            timeout,
            output,
        } => {
            let query = ListRecordsQuery {
                metadata_prefix,
                set,
                from,
                until,
            };
            let config = FetcherConfig {
                timeout: timeout.map(Duration::from_secs),
            };
            harvest_command(&endpoint, &query, &config, output.as_deref())
        }
    }
}

/// Execute the harvest command.
fn harvest_command(
    endpoint: &str,
    query: &ListRecordsQuery,
    config: &FetcherConfig,
    output: Option<&Path>,
) -> Result<()> {
    // Validate everything before making HTTP requests
    let source = list_records_url(endpoint, query)?;
    let fetcher = HttpFetcher::new(config)?;

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    eprintln!("{} {}", style("Harvesting").bold(), style(&source).cyan());

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let (tx, rx) = mpsc::sync_channel::<String>(LINK_BUFFER);
    let worker = thread::spawn(move || {
        let mut tx = tx;
        Harvester::new(fetcher).process(&source, &mut tx)
    });

    let written = write_links(rx, &mut out, &pb);
    let outcome = worker
        .join()
        .map_err(|_| HarvesterError::Io(io::Error::other("harvest thread panicked")))?;
    pb.finish_and_clear();

    let written = written?;
    match outcome {
        Ok(summary) => {
            print_summary(&summary, output);
            Ok(())
        }
        Err(e) if e.is_no_records_match() && written == 0 => {
            eprintln!("{}", style("No records match the request.").yellow());
            Ok(())
        }
        Err(e) => {
            if written > 0 {
                eprintln!(
                    "{} {} links written before the harvest stopped",
                    style("Partial:").yellow().bold(),
                    written
                );
            }
            Err(e)
        }
    }
}

/// Write links to `out` as they arrive, one per line.
///
/// Returns when the sending side hangs up. A write failure drops the
/// receiver, which stops the harvest at its next send.
fn write_links(rx: Receiver<String>, out: &mut dyn Write, pb: &ProgressBar) -> io::Result<usize> {
    let mut written = 0;
    for link in rx {
        writeln!(out, "{link}")?;
        written += 1;
        pb.set_message(format!("{written} links"));
    }
    out.flush()?;
    Ok(written)
}

fn print_summary(summary: &HarvestSummary, output: Option<&Path>) {
    eprintln!(
        "  Pages: {}  Records: {}  Links: {}",
        summary.pages,
        summary.records,
        style(summary.links).green()
    );
    if let Some(path) = output {
        eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
    }
}
