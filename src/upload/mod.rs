// src/upload/mod.rs
use anyhow::Result;
use std::{collections::BTreeSet, io::Write, path::Path, time::Instant};
use tracing::{debug, error, info};

use crate::{
    dataset::{self, gender_distribution, ValueCounts},
    store::TableStore,
};

pub const SETUP_HINT: &str =
    "Please run the SQL in database/create_gt_dataset.sql in Supabase SQL editor first";

/// What one upload run did, as observed by this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub loaded: usize,
    pub dropped: usize,
    pub distribution: ValueCounts,
    pub uploaded: usize,
    /// Row count read back after the insert. Not authoritative: other
    /// writers may have touched the table in between.
    pub total_in_table: u64,
    pub unique_genders: BTreeSet<String>,
}

/// Load `csv_path`, insert the complete rows into `table`, then read the
/// table back. Status lines go to `out`; on failure the error and the setup
/// hint are written there too and the error is returned unchanged.
pub async fn run_upload<S, W>(
    store: &S,
    table: &str,
    csv_path: &Path,
    out: &mut W,
) -> Result<UploadReport>
where
    S: TableStore,
    W: Write,
{
    let start = Instant::now();
    match upload(store, table, csv_path, out).await {
        Ok(report) => {
            info!(
                uploaded = report.uploaded,
                total = report.total_in_table,
                elapsed = ?start.elapsed(),
                "upload finished"
            );
            Ok(report)
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "upload failed");
            let printed = writeln!(out, "❌ Error uploading dataset: {:#}", e)
                .and_then(|_| writeln!(out, "💡 {}", SETUP_HINT));
            if let Err(write_err) = printed {
                debug!(error = %write_err, "could not print failure to output");
            }
            Err(e)
        }
    }
}

async fn upload<S: TableStore, W: Write>(
    store: &S,
    table: &str,
    csv_path: &Path,
    out: &mut W,
) -> Result<UploadReport> {
    // ─── 1) load + clean ────────────────────────────────────────────
    writeln!(out, "Loading GT dataset...")?;
    let loaded = dataset::load_records(csv_path)?;
    let dropped = loaded.dropped();
    let records = loaded.records;

    // ─── 2) summarize ───────────────────────────────────────────────
    let distribution = gender_distribution(&records);
    writeln!(out, "Dataset loaded: {} records", records.len())?;
    writeln!(out, "Gender distribution:")?;
    writeln!(out, "{}", distribution)?;

    // ─── 3) upload, all rows in one call ───────────────────────────
    writeln!(out, "Uploading to Supabase...")?;
    info!(table, rows = records.len(), "inserting");
    store.insert(table, &records).await?;
    writeln!(
        out,
        "✅ Successfully uploaded {} records to Supabase",
        records.len()
    )?;

    // ─── 4) verify ──────────────────────────────────────────────────
    let total_in_table = store.count(table).await?;
    writeln!(out, "📊 Total records in database: {}", total_in_table)?;

    let unique_genders: BTreeSet<String> = store
        .select_column(table, "gender")
        .await?
        .into_iter()
        .flatten()
        .collect();
    writeln!(out, "🎯 Unique gender values: {}", format_list(&unique_genders))?;

    Ok(UploadReport {
        loaded: records.len(),
        dropped,
        distribution,
        uploaded: records.len(),
        total_in_table,
        unique_genders,
    })
}

/// `['a', 'b']`
fn format_list(values: &BTreeSet<String>) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
    format!("[{}]", quoted.join(", "))
}
