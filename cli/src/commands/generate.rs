use anyhow::Context;
use tracing::debug;
use ztpinv_common::config::Config;
use ztpinv_core::pipeline::{Pipeline, RunSummary};

use crate::commands::GenerateArgs;
use crate::terminal::print;
use crate::terminal::spinner::RetrySpinner;

pub async fn generate(args: &GenerateArgs, quiet: u8) -> anyhow::Result<()> {
    let cfg = Config::from(args);
    debug!("Leases: {}, OUI table: {}", cfg.leases_path.display(), cfg.oui_path.display());

    let summary = tokio::task::spawn_blocking(move || {
        let spinner = RetrySpinner::new();
        let result = Pipeline::new(cfg).run(&spinner);
        spinner.finish();
        result
    })
    .await
    .context("generation task panicked")??;

    if quiet == 0 {
        print_summary(&summary, &args.inventory.display().to_string());
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, inventory: &str) {
    print::header("inventory written", 0);
    print::aligned_line("Inventory", inventory);
    print::aligned_line("Devices", summary.devices);
    print::aligned_line("Rows read", summary.rows_seen);
    print::aligned_line("Rows admitted", summary.admitted);
    print::aligned_line("Rows skipped", summary.skipped);
    print::aligned_line("Attempts", summary.attempts);
    print::aligned_line("Vendors", summary.vendors.len());
    let vendors: Vec<(String, String)> = summary
        .vendors
        .iter()
        .map(|(vendor, count)| (vendor.clone(), count.to_string()))
        .collect();
    print::as_tree_one_level(&vendors);
    print::fat_separator();
}
