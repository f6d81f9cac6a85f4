//! dirscope: a classified, aggregated listing of a directory.
//!
//! Thin binary entry point standing in for the folder picker and table view.
//! All scanning logic lives in the `dirscope-core` crate.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dirscope_core::analysis::{analyse_file_types, FileCategory};
use dirscope_core::model::size::{format_count, format_size, format_timestamp};
use dirscope_core::{scan_with, Entry, ScanOptions, ScanOutcome, ScanResult};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

/// List a directory's contents with types, sizes, and totals
#[derive(Parser, Debug)]
#[command(name = "dirscope", version, about)]
struct Args {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Descend through symlinked directories (cycles are detected)
    #[arg(long)]
    follow_links: bool,

    /// Worker threads for the walk (defaults to the number of CPUs)
    #[arg(short = 't', long, value_name = "NUM")]
    threads: Option<usize>,

    /// Append a per-type size breakdown to the table
    #[arg(long)]
    by_type: bool,

    /// Leave out the per-type icon column in the table
    #[arg(long)]
    no_icons: bool,

    /// Log skipped entries and other debug detail to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(io::stderr)
        .init();

    let mut options = ScanOptions::default().follow_links(args.follow_links);
    if let Some(threads) = args.threads {
        options = options.threads(threads);
    }

    let cancel_flag = AtomicBool::new(false);
    let outcome = scan_with(&args.path, &options, &cancel_flag)
        .with_context(|| format!("could not scan {}", args.path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Table => write_table(&mut out, &outcome, args.by_type, !args.no_icons)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &outcome.result)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_csv(&mut out, &outcome.result)?,
    }
    out.flush()?;
    Ok(())
}

fn write_table(
    out: &mut impl Write,
    outcome: &ScanOutcome,
    by_type: bool,
    icons: bool,
) -> Result<()> {
    let result = &outcome.result;
    // Icons are two cells wide; the header pads to match.
    let icon_header = if icons { "   " } else { "" };
    writeln!(
        out,
        "{icon_header}{:<40} {:>10} {:<11} {:<19}",
        "Name", "Size", "Type", "Modified"
    )?;
    for entry in result.sorted_for_display() {
        let size = if entry.is_directory {
            "-".to_string()
        } else {
            format_size(entry.size)
        };
        let name = if entry.is_directory {
            format!("{}/", entry.name)
        } else {
            entry.name.to_string()
        };
        let icon = if icons {
            format!("{} ", icon_for(entry))
        } else {
            String::new()
        };
        writeln!(
            out,
            "{icon}{:<40} {:>10} {:<11} {:<19}",
            name,
            size,
            entry.file_type,
            format_timestamp(&entry.modified)
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} items ({} files, {} folders), {}",
        format_count(result.total_count as u64),
        format_count(result.file_count() as u64),
        format_count(result.directory_count() as u64),
        format_size(result.total_size)
    )?;
    if !outcome.skipped.is_empty() {
        writeln!(
            out,
            "{} entries could not be read (run with --verbose for details)",
            format_count(outcome.skipped.len() as u64)
        )?;
    }

    if by_type {
        writeln!(out)?;
        for stats in analyse_file_types(result) {
            writeln!(
                out,
                "{:<11} {:>8} files {:>10}",
                stats.category.label(),
                format_count(stats.file_count),
                format_size(stats.total_size)
            )?;
        }
    }
    Ok(())
}

/// Icon for an entry's stored type label.
fn icon_for(entry: &Entry) -> &'static str {
    FileCategory::from_label(&entry.file_type)
        .unwrap_or(FileCategory::Other)
        .icon()
}

fn write_csv(out: &mut impl Write, result: &ScanResult) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "name",
        "path",
        "size",
        "file_type",
        "extension",
        "modified",
        "is_directory",
    ])?;
    for entry in &result.files {
        writer.write_record([
            entry.name.as_str(),
            entry.path.as_str(),
            entry.size.to_string().as_str(),
            entry.file_type.as_str(),
            entry.extension.as_deref().unwrap_or(""),
            entry.modified.to_rfc3339().as_str(),
            if entry.is_directory { "true" } else { "false" },
        ])?;
    }
    writer.flush()?;
    Ok(())
}
