// src/config.rs
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

use crate::store::rest::parse_project_url;

pub const DEFAULT_TABLE: &str = "gt_dataset";
pub const DEFAULT_CSV: &str = "GT_dataset_gender_mismatch.csv";

/// Upload the ground-truth gender mismatch dataset to Supabase.
#[derive(Parser, Debug)]
#[command(name = "gt_uploader", version)]
pub struct Args {
    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL", global = true)]
    pub supabase_url: Option<String>,

    /// Service role key, sent as both `apikey` and bearer token
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true, global = true)]
    pub supabase_key: Option<String>,

    /// Target table
    #[arg(long, default_value = DEFAULT_TABLE, global = true)]
    pub table: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load, clean and insert the CSV, then read the table back (default)
    Upload {
        /// CSV with gender, findings and human_impression columns
        #[arg(long, default_value = DEFAULT_CSV)]
        csv: PathBuf,
    },
    /// Print every uploaded record as dropdown options, in JSON
    Overview,
}

/// Validated settings, ready to build a store from.
#[derive(Debug, Clone)]
pub struct Settings {
    pub supabase_url: Url,
    pub supabase_key: String,
    pub table: String,
    pub command: Command,
}

impl Args {
    pub fn into_settings(self) -> Result<Settings> {
        let Some(raw_url) = self.supabase_url.filter(|u| !u.trim().is_empty()) else {
            bail!("no Supabase URL: pass --supabase-url or set SUPABASE_URL");
        };
        let Some(key) = self
            .supabase_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
        else {
            bail!("no Supabase key: pass --supabase-key or set SUPABASE_SERVICE_ROLE_KEY");
        };
        if self.table.trim().is_empty() {
            bail!("table name must not be empty");
        }
        Ok(Settings {
            supabase_url: parse_project_url(&raw_url)?,
            supabase_key: key,
            table: self.table,
            command: self.command.unwrap_or(Command::Upload {
                csv: PathBuf::from(DEFAULT_CSV),
            }),
        })
    }
}
