use anyhow::{Context, Result};
use clap::Parser;
use gt_uploader::{
    config::{Args, Command},
    dataset::DatasetOverview,
    store::{RestStore, TableStore},
    upload::run_upload,
};
use reqwest::Client;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) env + logging ────────────────────────────────────────────
    dotenvy::dotenv().ok();
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    // ─── 2) configure store ──────────────────────────────────────────
    let settings = Args::parse().into_settings()?;
    info!(url = %settings.supabase_url, table = %settings.table, "startup");
    let client = Client::builder()
        .user_agent(concat!("gt_uploader/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;
    let store = RestStore::new(client, &settings.supabase_url, &settings.supabase_key)?;

    // ─── 3) run ──────────────────────────────────────────────────────
    match settings.command {
        Command::Upload { csv } => {
            run_upload(&store, &settings.table, &csv, &mut io::stdout()).await?;
        }
        Command::Overview => {
            let records = store.fetch_records(&settings.table).await?;
            info!(records = records.len(), "fetched dataset");
            let overview = DatasetOverview::from_records(&records);
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
    }

    Ok(())
}
