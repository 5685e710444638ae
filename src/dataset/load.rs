//! Dataset loading from a delimited file

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::{Dataset, SchemaError};

/// Maximum number of skipped rows listed individually in the load log.
const MAX_LOGGED_SKIPPED_ROWS: usize = 10;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Could not read dataset file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Parses CSV text into a header row and string rows.
pub fn read_csv<R: std::io::Read>(
    reader: R,
) -> Result<(Vec<String>, Vec<Vec<String>>), csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.iter().map(str::to_owned).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_owned).collect());
    }
    Ok((headers, rows))
}

pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset, DatasetError> {
    let path = path.as_ref();
    info!("Loading dataset from {:?}...", path);

    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_owned(),
        source,
    })?;
    let (headers, rows) = read_csv(file).map_err(|source| DatasetError::Csv {
        path: path.to_owned(),
        source,
    })?;
    let dataset = Dataset::from_rows(headers, rows)?;

    let report = dataset.report();
    if report.skipped_rows() > 0 {
        warn!(
            "{} of {} rows were skipped and are excluded from aggregates:",
            report.skipped_rows(),
            report.total_rows
        );
        for skipped in report.skipped.iter().take(MAX_LOGGED_SKIPPED_ROWS) {
            warn!("- row {}: {}", skipped.row, skipped.reason);
        }
        if report.skipped_rows() > MAX_LOGGED_SKIPPED_ROWS {
            warn!(
                "- ... and {} more",
                report.skipped_rows() - MAX_LOGGED_SKIPPED_ROWS
            );
        }
    } else {
        info!("Dataset checked, no issues found.");
    }
    info!(
        "Dataset has:\n{} rows\n{} valid rows\n{} columns",
        report.total_rows,
        report.valid_rows,
        dataset.columns().len()
    );

    Ok(dataset)
}
