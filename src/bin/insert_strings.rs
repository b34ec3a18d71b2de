use std::process;
use std::sync::Arc;

use colored::Colorize;
use insert_strings::{logger, run, Config, Result, Stdout};

fn try_main() -> Result<()> {
    let config = Config::from_env()?;
    logger::init(config.level()?);

    let report = run(&config, Arc::new(Stdout))?;
    log::info!(
        "{} item(s) added, {} fetched, per producer {:?}",
        report.added,
        report.fetched,
        report.per_producer
    );
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{} {err}", "error:".red().bold());
        process::exit(1);
    }
}
