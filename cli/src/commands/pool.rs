use anyhow::Context;
use tracing::info;
use ztpinv_common::network::{interface, range};

use crate::commands::PoolArgs;

pub fn pool(args: &PoolArgs) -> anyhow::Result<()> {
    let (ip, netmask) = match (args.ip, args.netmask) {
        (Some(ip), Some(netmask)) => (ip, netmask),
        _ => interface::ipv4_of(&args.interface)
            .with_context(|| format!("reading the address of {}", args.interface))?,
    };

    let pool = range::plan_pool(ip, netmask)?;
    info!(
        "Pool {} - {} on {}/{}",
        pool.range_start, pool.range_end, pool.network, pool.prefix
    );

    for (key, value) in pool.exports() {
        println!("export {key}={value}");
    }
    Ok(())
}
