// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfmerge — Merge PDFs and images into a single PDF/A-1b document.
//
// Entry point. Initialises logging, collects sources from the command line
// and/or a JSON upload payload, normalises and merges them, and writes the
// result.

mod payload;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use pdfmerge_core::{DEFAULT_OUTPUT_FILENAME, MergeConfig, SourceItem};
use pdfmerge_document::{merge, normalize_sources};

#[derive(Debug, Parser)]
#[command(name = "pdfmerge", version)]
#[command(about = "Merge PDFs and images into one PDF/A-1b document", long_about = None)]
struct Cli {
    /// Input PDF or image files, merged in the order given
    files: Vec<PathBuf>,

    /// JSON upload payload: {"key": {"filename": ..., "content": <base64>}}
    #[arg(long, value_name = "FILE")]
    payload: Option<PathBuf>,

    /// JSON merge configuration (title, creator, subject)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Document creator
    #[arg(long)]
    creator: Option<String>,

    /// Document subject
    #[arg(long)]
    subject: Option<String>,

    /// Output PDF file path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILENAME)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("pdfmerge starting");
    let summary = run(&cli)?;
    println!(
        "✓ Wrote {} pages from {} sources to {}",
        summary.pages,
        summary.sources,
        cli.output.display()
    );
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct Summary {
    pages: usize,
    sources: usize,
}

fn run(cli: &Cli) -> Result<Summary> {
    let config = load_config(cli)?;
    let sources = collect_sources(cli)?;
    if sources.is_empty() {
        anyhow::bail!("No input files or payload entries given");
    }

    let pdfs = normalize_sources(sources, &config);
    let merged = merge(pdfs, &config).context("Merge failed")?;

    std::fs::write(&cli.output, merged.bytes())
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    tracing::info!(output = %cli.output.display(), bytes = merged.len(), "Merged PDF written");

    Ok(Summary {
        pages: merged.page_count(),
        sources: merged.source_count(),
    })
}

/// Defaults, then the config file, then individual flags.
fn load_config(cli: &Cli) -> Result<MergeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = read_text(path)?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => MergeConfig::default(),
    };
    if let Some(title) = &cli.title {
        config.title = title.clone();
    }
    if let Some(creator) = &cli.creator {
        config.creator = creator.clone();
    }
    if let Some(subject) = &cli.subject {
        config.subject = subject.clone();
    }
    Ok(config)
}

/// Positional files first, then payload entries.
fn collect_sources(cli: &Cli) -> Result<Vec<SourceItem>> {
    let mut sources = cli
        .files
        .iter()
        .map(|path| {
            SourceItem::open(path).with_context(|| format!("Cannot open {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(path) = &cli.payload {
        let text = read_text(path)?;
        let entries = payload::sources_from_json(&text)
            .with_context(|| format!("Invalid payload {}", path.display()))?;
        sources.extend(entries);
    }
    Ok(sources)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}
