use crate::classifier::UNKNOWN_EVENT_ID;
use csv::StringRecord;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filtering classified table failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("cannot flush filtered table: {0}")]
    Flush(std::io::Error),
}

// EventId is the 5th column of the classified table.
const EVENT_ID_FIELD: usize = 4;

/// Extract the rows still classified as unknown (`E0`) from a classified
/// table. The header row is always kept; data rows with fewer than five
/// fields are skipped. A missing input file is reported and yields an empty
/// result rather than an error.
pub fn filter_unknown(
    input: &Path,
    output: Option<&Path>,
) -> Result<Vec<StringRecord>, FilterError> {
    let mut rdr = match csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(input)
    {
        Ok(r) => r,
        Err(e) => {
            warn!(input = %input.display(), error = %e, "classified table not found");
            return Ok(Vec::new());
        }
    };

    let mut kept: Vec<StringRecord> = Vec::new();
    for (idx, row) in rdr.records().enumerate() {
        let row = row?;
        if idx == 0 {
            kept.push(row);
            continue;
        }
        if row.len() <= EVENT_ID_FIELD {
            continue;
        }
        if row.get(EVENT_ID_FIELD).map(str::trim) == Some(UNKNOWN_EVENT_ID) {
            kept.push(row);
        }
    }

    if let Some(path) = output {
        let mut wtr = csv::Writer::from_path(path)?;
        for row in &kept {
            wtr.write_record(row)?;
        }
        wtr.flush().map_err(FilterError::Flush)?;
        info!(
            rows = kept.len().saturating_sub(1),
            output = %path.display(),
            "unknown-event rows written"
        );
    }
    Ok(kept)
}
