//! Replays an inventory script against a configured grid and prints the result.

use std::{env, path::PathBuf};

use anyhow::Context;
use satchel::{SatchelDriver, logger};
use satchel_core::SatchelConfig;

const DEFAULT_CONFIG_PATH: &str = "config/satchel_config.json5";

fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let config_path = args
        .next()
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let script_path = args.next().map(PathBuf::from);

    let config = SatchelConfig::load_or_create(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    logger::init(&config.log_level)?;

    let mut driver = SatchelDriver::new(&config)?;
    if let Some(script_path) = script_path {
        let commands = SatchelDriver::load_script(&script_path)?;
        let report = driver.run(&commands);
        log::info!(
            "Ran {} commands, {} failed",
            report.succeeded + report.failed,
            report.failed
        );
    } else {
        log::info!("No script given, showing the empty grid");
    }

    print!("{}", driver.render());
    println!("{}", driver.snapshot_json()?);
    Ok(())
}
