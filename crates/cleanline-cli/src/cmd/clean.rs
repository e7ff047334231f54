//! `cleanline clean` - fetch a raw dataset, clean it, publish the result

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use cleanline_clean::{CleanStats, Cleaner, Columns, Dataset};
use cleanline_store::artifact::validate_name;
use cleanline_store::{Artifact, ArtifactHandle, Run, Store};

pub const JOB_TYPE: &str = "basic_cleaning";

/// Staging dirs younger than this may belong to a publish still in flight.
const STALE_TMP_AGE: Duration = Duration::from_secs(60 * 60);

#[derive(Args, Debug, Clone, Serialize)]
pub struct CleanArgs {
    /// Temporary directory locally
    #[arg(long = "tmp_directory")]
    pub tmp_directory: PathBuf,

    /// Input artifact name
    #[arg(long = "input_artifact")]
    pub input_artifact: String,

    /// Output artifact name
    #[arg(long = "output_artifact")]
    pub output_artifact: String,

    /// Output artifact type
    #[arg(long = "output_type")]
    pub output_type: String,

    /// Output artifact description
    #[arg(long = "output_description")]
    pub output_description: String,

    /// Minimum price limit
    #[arg(long = "min_price", allow_negative_numbers = true)]
    pub min_price: i64,

    /// Maximum price limit
    #[arg(long = "max_price", allow_negative_numbers = true)]
    pub max_price: i64,
}

#[derive(Debug)]
pub struct Summary {
    pub run_id: String,
    pub output: ArtifactHandle,
    pub tmp_path: PathBuf,
    pub stats: CleanStats,
}

pub fn run(args: CleanArgs, columns: &Columns, store_dir: &Path) -> Result<()> {
    let store = Store::open(store_dir)?;
    store
        .cleanup_tmp(STALE_TMP_AGE)
        .context("Failed to clean stale tmp objects")?;
    let summary = execute(&args, &store, columns)?;

    println!();
    println!("=== Basic Cleaning ===");
    println!("Run:     {}", summary.run_id);
    println!(
        "Rows:    {} of {} kept",
        summary.stats.rows_out, summary.stats.rows_in
    );
    println!(
        "Dates:   {} parsed, {} null",
        summary.stats.dates_parsed, summary.stats.dates_null
    );
    println!("Temp:    {}", summary.tmp_path.display());
    println!(
        "Output:  {} ({})",
        summary.output,
        summary.output.object_hash()
    );
    Ok(())
}

/// Fetch → clean → write to the temp dir → publish, recorded as one run.
pub fn execute(args: &CleanArgs, store: &Store, columns: &Columns) -> Result<Summary> {
    // The output name doubles as the temp file name.
    validate_name(&args.output_artifact)?;

    let mut run = Run::init(store, JOB_TYPE);
    run.update_config(args)?;

    let input_path = run.use_artifact(&args.input_artifact)?;
    let dataset = Dataset::read_csv(&input_path, &columns.index)?;
    log::info!("Loaded {} rows from {}", dataset.len(), args.input_artifact);

    let cleaner = Cleaner::new(columns.clone());
    let (cleaned, stats) =
        cleaner.clean_with_stats(&dataset, args.min_price as f64, args.max_price as f64)?;

    std::fs::create_dir_all(&args.tmp_directory).with_context(|| {
        format!(
            "failed to create tmp directory {}",
            args.tmp_directory.display()
        )
    })?;
    let tmp_path = args.tmp_directory.join(&args.output_artifact);
    cleaned.write_csv(&tmp_path)?;
    log::info!("Temporary artifact saved to {}", tmp_path.display());

    let mut artifact = Artifact::new(
        &args.output_artifact,
        &args.output_type,
        &args.output_description,
    );
    artifact.add_file(&tmp_path);
    let output = run.log_artifact(&artifact)?;
    log::info!("Cleaned dataset uploaded as {output}");

    let record = run.finish()?;
    Ok(Summary {
        run_id: record.run_id,
        output,
        tmp_path,
        stats,
    })
}
