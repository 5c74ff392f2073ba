use crate::classifier;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot open input log {path}: {source}")]
    OpenInput {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot read input log: {0}")]
    ReadInput(#[from] std::io::Error),
    #[error("cannot write classified output: {0}")]
    WriteOutput(#[from] csv::Error),
    #[error("cannot flush classified output: {0}")]
    Flush(std::io::Error),
}

pub const CSV_HEADER: [&str; 6] = [
    "LineId",
    "Time",
    "Level",
    "Content",
    "EventId",
    "EventTemplate",
];

/// One classified log line as it appears in the CSV table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(rename = "LineId")]
    pub line_id: u64,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "EventId")]
    pub event_id: String,
    #[serde(rename = "EventTemplate")]
    pub event_template: String,
}

impl ClassifiedRecord {
    pub fn from_classification(line_id: u64, c: classifier::Classification) -> Self {
        Self {
            line_id,
            time: c.time,
            level: c.level,
            content: c.content,
            event_id: c.event_id,
            event_template: c.event_template,
        }
    }
}

/// Classify every line of `input` and write the tabular result to `output`.
/// The output is created (or truncated) only after the input opens, so a
/// missing input leaves no partial file behind. Returns the number of data
/// rows written.
pub fn classify_file(input: &Path, output: &Path) -> Result<u64, DriverError> {
    let f = File::open(input).map_err(|source| DriverError::OpenInput {
        path: input.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(f);

    // Header is written up front so even an empty log yields a headed table.
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(output)?;
    wtr.write_record(CSV_HEADER)?;
    let mut line_id: u64 = 0;
    for line in reader.lines() {
        let line = line?;
        line_id += 1;
        let rec = ClassifiedRecord::from_classification(line_id, classifier::classify(line.trim()));
        wtr.serialize(rec)?;
    }
    wtr.flush().map_err(DriverError::Flush)?;
    info!(lines = line_id, output = %output.display(), "classified log written");
    Ok(line_id)
}
