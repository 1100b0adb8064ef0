use anyhow::Context;
use blockplan_core::{logging, render_storage, PartitionPlanner};
use blockplan_hal::{ProcMounts, SysfsSizeResolver};
use clap::Parser;
use std::sync::Arc;

mod cli;

fn main() -> anyhow::Result<()> {
    logging::init();
    let args = cli::Cli::parse();

    let size = args
        .size
        .as_deref()
        .map(cli::parse_size)
        .transpose()
        .context("invalid --size")?;

    let resolver = SysfsSizeResolver::new();
    let probe = Arc::new(ProcMounts::at(&args.mounts_file));
    let mut planner = PartitionPlanner::new(
        &args.device,
        &args.serial,
        &args.model,
        &args.ptable,
        size,
        &resolver,
        probe,
    )
    .with_context(|| format!("cannot plan device {}", args.device))?;

    for raw in &args.parts {
        let part = cli::parse_part_spec(raw)?;
        planner
            .add_partition(
                part.number,
                part.size,
                part.fstype.as_deref(),
                part.mountpoint.as_deref(),
                part.flag.as_deref(),
            )
            .with_context(|| format!("cannot add partition {raw:?}"))?;
    }

    if args.fs_table {
        for entry in planner.get_fs_table() {
            println!(
                "{}\t{}\t{}\t{}",
                entry.mountpoint, entry.size, entry.fstype, entry.devpath
            );
        }
        return Ok(());
    }

    if planner.is_mounted()? {
        log::warn!("{} has mounted filesystems; emitting an empty plan", args.device);
    }

    let plan = render_storage(&[&planner])?;
    println!("{}", plan.to_json_pretty()?);
    Ok(())
}
