//! Nightly minor-planet observation planner.
//!
//! Usage:
//!   obsplan --config obsplan.toml              # full planning run
//!   obsplan --config obsplan.toml 433          # single-target check

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use obsplan::config::PlannerConfig;
use obsplan::ephemeris::HorizonsTransport;
use obsplan::planner;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "obsplan",
    about = "Plan which minor planets are observable tonight from one site"
)]
struct Args {
    /// Designation to check instead of running the full planner
    target: Option<String>,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "obsplan.toml")]
    config: Utf8PathBuf,

    /// Override the configured output artifact path
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = PlannerConfig::from_file(&args.config)?;
    if let Some(output) = args.output {
        config.output_path = Some(output);
    }

    let transport = HorizonsTransport::new(config.request_timeout())?;

    match args.target {
        Some(designation) => {
            let report = planner::run_check(&designation, &config, transport).await?;
            println!("{report}");
        }
        None => {
            let (list, summary) = planner::run_plan(&config, transport).await?;
            println!("{}", list.formatted_report(config.observer.utc_offset));
            println!("{summary}");

            let path = config.output_file();
            list.write_csv(&path, config.observer.utc_offset)?;
            info!("saved {} targets to {path}", list.records.len());
        }
    }

    Ok(())
}
