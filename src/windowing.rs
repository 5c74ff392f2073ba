use crate::driver::ClassifiedRecord;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("cannot read classified table {path}: {source}")]
    Read { path: String, source: csv::Error },
    #[error("malformed classified row: {0}")]
    Row(#[from] csv::Error),
}

/// One fixed-duration bucket of event ids, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSequence {
    pub start: DateTime<Utc>,
    pub event_ids: Vec<String>,
}

pub const DEFAULT_WINDOW_MINUTES: i64 = 5;

/// Load the classified table written by the batch driver.
pub fn read_records(path: &Path) -> Result<Vec<ClassifiedRecord>, WindowError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|source| WindowError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut out = Vec::new();
    for rec in rdr.deserialize::<ClassifiedRecord>() {
        out.push(rec?);
    }
    Ok(out)
}

/// Parse an Apache error-log timestamp, e.g. `Sun Jul 20 02:10:07 2025`.
/// Apache pads the day of month with a space; zero-padded variants are
/// accepted as well.
pub fn parse_apache_time(s: &str) -> Option<DateTime<Utc>> {
    let fmts = ["%a %b %e %H:%M:%S %Y", "%a %b %d %H:%M:%S %Y"];
    for f in fmts.iter() {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s.trim(), f) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    None
}

fn floor_time(t: DateTime<Utc>, bucket: Duration) -> DateTime<Utc> {
    let secs = bucket.num_seconds();
    if secs <= 0 {
        return t;
    }
    let ts = t.timestamp();
    let floored = ts - ts.rem_euclid(secs);
    Utc.timestamp_opt(floored, 0).unwrap()
}

/// Group records into non-overlapping fixed-duration windows keyed by the
/// floored timestamp. Within a window event ids keep arrival order; windows
/// come back in ascending time order. Empty windows do not exist by
/// construction; records whose timestamp does not parse are skipped.
pub fn build_window_sequences(
    records: &[ClassifiedRecord],
    window: Duration,
) -> Vec<WindowSequence> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<String>> = BTreeMap::new();
    for rec in records {
        let Some(t) = parse_apache_time(&rec.time) else {
            warn!(line_id = rec.line_id, time = %rec.time, "unparseable timestamp, record skipped");
            continue;
        };
        buckets
            .entry(floor_time(t, window))
            .or_default()
            .push(rec.event_id.clone());
    }
    buckets
        .into_iter()
        .map(|(start, event_ids)| WindowSequence { start, event_ids })
        .collect()
}
