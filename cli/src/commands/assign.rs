use anyhow::Context;
use ztpinv_common::config::Config;
use ztpinv_core::pipeline::Pipeline;
use ztpinv_core::ztp;

use crate::commands::AssignArgs;
use crate::terminal::print;

pub async fn assign(args: &AssignArgs, quiet: u8) -> anyhow::Result<()> {
    let cfg = Config::from(args);
    let assignment = tokio::task::spawn_blocking(move || ztp::assign_latest(&Pipeline::new(cfg)))
        .await
        .context("assignment task panicked")??;

    print::header("ztp assignment", quiet);
    println!("{assignment}");
    Ok(())
}
