//! Loading recordings from header-bearing `timestamp,x,y,z` CSV files.

use crate::error::{ConditioningError, Result};
use crate::recording::types::{Axes, SampleStream};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Number of columns in a recording row.
const COLUMNS: usize = 4;

/// Load a recording from disk.
///
/// The stream name is derived from the file name: the part between the
/// first `_` and the first `.` (`acc_walk.csv` becomes `walk`).
pub fn load_csv_file(path: &Path) -> Result<SampleStream> {
    let file = File::open(path).map_err(|e| ConditioningError::io(path, e))?;
    let stream = read_csv(BufReader::new(file), stream_name(path))?;

    tracing::info!(
        path = %path.display(),
        samples = stream.len(),
        "loaded recording"
    );
    Ok(stream)
}

/// Parse a recording from any reader. The first line is treated as a header.
pub fn read_csv<R: Read>(reader: R, name: impl Into<String>) -> Result<SampleStream> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut timestamp = Vec::new();
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut z = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| ConditioningError::Parse {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != COLUMNS {
            return Err(ConditioningError::Parse {
                line,
                message: format!("expected {COLUMNS} columns, found {}", record.len()),
            });
        }

        timestamp.push(parse_timestamp(&record[0], line)?);
        x.push(parse_axis(&record[1], "x", line)?);
        y.push(parse_axis(&record[2], "y", line)?);
        z.push(parse_axis(&record[3], "z", line)?);
    }

    SampleStream::new(name, timestamp, Axes::new(x, y, z)?)
}

fn parse_timestamp(field: &str, line: u64) -> Result<i64> {
    field.parse::<i64>().map_err(|e| ConditioningError::Parse {
        line,
        message: format!("timestamp {field:?}: {e}"),
    })
}

fn parse_axis(field: &str, axis: &str, line: u64) -> Result<f64> {
    let value = field.parse::<f64>().map_err(|e| ConditioningError::Parse {
        line,
        message: format!("{axis} value {field:?}: {e}"),
    })?;

    // "nan" and "inf" parse successfully but must not reach the filters.
    if !value.is_finite() {
        return Err(ConditioningError::Parse {
            line,
            message: format!("{axis} value {field:?} is not finite"),
        });
    }
    Ok(value)
}

/// Derive a display name from a recording path.
pub fn stream_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let start = file_name.find('_').map(|i| i + 1).unwrap_or(0);
    let end = file_name.find('.').unwrap_or(file_name.len());

    if start < end {
        file_name[start..end].to_string()
    } else {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(file_name)
    }
}
