// src/dataset/mod.rs
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info, trace};

pub mod overview;
pub mod summary;

pub use overview::DatasetOverview;
pub use summary::{gender_distribution, value_counts, ValueCounts};

/// Columns projected out of the input file, in output order.
pub const COLUMNS: [&str; 3] = ["gender", "findings", "human_impression"];

/// Cell values the CSV reader of the original tool treated as missing.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One cleaned row of the ground-truth dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub gender: String,
    pub findings: String,
    pub human_impression: String,
}

#[derive(Debug)]
pub struct LoadedDataset {
    /// Complete rows, in file order.
    pub records: Vec<Record>,
    /// Data rows seen in the file, before dropping incomplete ones.
    pub total_rows: usize,
}

impl LoadedDataset {
    pub fn dropped(&self) -> usize {
        self.total_rows - self.records.len()
    }
}

pub fn is_null(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// Positions of the projected columns inside the file's header row.
fn column_positions(headers: &StringRecord) -> Result<[usize; 3]> {
    let mut positions = [0usize; 3];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("missing required column '{}'", name))?;
    }
    Ok(positions)
}

/// Read the CSV at `path`, keep the three dataset columns and drop every row
/// that has a missing value in any of them.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<LoadedDataset> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    let loaded = read_records(file)
        .with_context(|| format!("Failed to read CSV file: {:?}", path.as_ref()))?;
    info!(
        total_rows = loaded.total_rows,
        kept = loaded.records.len(),
        dropped = loaded.dropped(),
        "loaded dataset"
    );
    Ok(loaded)
}

/// Same as [`load_records`] over any reader.
pub fn read_records<R: Read>(reader: R) -> Result<LoadedDataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short rows count as missing cells
        .from_reader(reader);

    let headers = rdr.headers().context("reading CSV header row")?.clone();
    let [g, f, h] = column_positions(&headers)?;
    debug!(?headers, "resolved column positions");

    let mut records = Vec::new();
    let mut total_rows = 0;
    for (idx, result) in rdr.records().enumerate() {
        let row = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        total_rows += 1;

        let cell = |i: usize| row.get(i).filter(|v| !is_null(v));
        match (cell(g), cell(f), cell(h)) {
            (Some(gender), Some(findings), Some(human_impression)) => records.push(Record {
                gender: gender.to_string(),
                findings: findings.to_string(),
                human_impression: human_impression.to_string(),
            }),
            _ => trace!(record = idx, "dropping incomplete row"),
        }
    }

    Ok(LoadedDataset {
        records,
        total_rows,
    })
}
