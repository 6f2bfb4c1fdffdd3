use anyhow::{Context, Result};
use log::{error, info, warn};
use pulldown_cmark::{Event, Parser};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::Document;

/// File-type patterns loaded by default, in load order.
pub const DEFAULT_PATTERNS: [&str; 4] = ["*.pdf", "*.csv", "*.md", "*.txt"];

/// Outcome of loading one file-type pattern.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(usize),
    Failed(String),
}

/// Per-pattern load outcomes for one `load` call, so individual failures
/// stay visible instead of disappearing into a log line.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub outcomes: Vec<(String, LoadOutcome)>,
}

impl LoadReport {
    pub fn documents_loaded(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                LoadOutcome::Loaded(count) => *count,
                LoadOutcome::Failed(_) => 0,
            })
            .sum()
    }
}

/// Reads raw files from the data directory into `Document`s.
///
/// Each pattern maps to a content-specific parser; `*.txt` (and any pattern
/// with no registered parser) falls back to a generic UTF-8 read.
pub struct DocumentLoader {
    data_dir: PathBuf,
}

impl DocumentLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load every file matching the given glob-style patterns.
    ///
    /// A failing pattern is recorded in the report and does not abort the
    /// remaining patterns. Zero documents overall is a warning, not an
    /// error; the caller decides what an empty corpus means.
    pub fn load(&self, patterns: &[&str]) -> (Vec<Document>, LoadReport) {
        let mut documents = Vec::new();
        let mut report = LoadReport::default();

        for pattern in patterns {
            match self.load_pattern(pattern) {
                Ok(docs) => {
                    info!("Loaded {} {} documents", docs.len(), pattern);
                    report
                        .outcomes
                        .push((pattern.to_string(), LoadOutcome::Loaded(docs.len())));
                    documents.extend(docs);
                }
                Err(e) => {
                    error!("Error loading {}: {:#}", pattern, e);
                    report
                        .outcomes
                        .push((pattern.to_string(), LoadOutcome::Failed(format!("{:#}", e))));
                }
            }
        }

        if documents.is_empty() {
            warn!("No documents found in {}", self.data_dir.display());
        }

        (documents, report)
    }

    fn load_pattern(&self, pattern: &str) -> Result<Vec<Document>> {
        let extension = pattern.trim_start_matches("*.").to_ascii_lowercase();

        let mut documents = Vec::new();
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.data_dir)
            .with_context(|| format!("cannot read data directory {}", self.data_dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .map(|ext| ext.to_string_lossy().to_ascii_lowercase() == extension)
                        .unwrap_or(false)
            })
            .collect();
        paths.sort();

        for path in paths {
            let source = path.display().to_string();
            let docs = match extension.as_str() {
                "pdf" => vec![load_pdf(&path, &source)?],
                "csv" => load_csv(&path, &source)?,
                "md" => vec![load_markdown(&path, &source)?],
                // No parser registered for this suffix; read it as text.
                _ => vec![load_plain_text(&path, &source)?],
            };
            documents.extend(docs);
        }

        Ok(documents)
    }
}

fn load_pdf(path: &Path, source: &str) -> Result<Document> {
    let text = pdf_extract::extract_text(path)
        .with_context(|| format!("failed to extract text from {}", source))?;
    Ok(Document::new(text, source))
}

/// One `Document` per row, rendered as `header: value` lines the way
/// tabular sources usually flow into a text pipeline.
fn load_csv(path: &Path, source: &str) -> Result<Vec<Document>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open CSV {}", source))?;
    let headers = reader.headers()?.clone();

    let mut documents = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("bad CSV row in {}", source))?;
        let text = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| format!("{}: {}", header, value))
            .collect::<Vec<_>>()
            .join("\n");
        documents.push(
            Document::new(text, source).with_metadata("row", row_index.to_string()),
        );
    }
    Ok(documents)
}

fn load_markdown(path: &Path, source: &str) -> Result<Document> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", source))?;

    let mut text = String::new();
    for event in Parser::new(&raw) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(_) => {
                if !text.ends_with('\n') && !text.is_empty() {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }
    Ok(Document::new(text, source))
}

fn load_plain_text(path: &Path, source: &str) -> Result<Document> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", source))?;
    Ok(Document::new(text, source))
}
