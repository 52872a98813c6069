use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bikeshare_explorer::execution::{
    AnalysisEngine, AnalysisObserver, LogAnalysisObserver, StdErrAnalysisObserver,
};
use bikeshare_explorer::ingestion::{
    CompositeObserver, LoadObserver, LoadOptions, LogObserver, StdErrObserver,
};
use bikeshare_explorer::session::{Session, SessionConfig};
use clap::Parser;

/// Explore US bike-share trip data by month and day of week.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding the city CSV files.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
    /// City file to analyse once without prompting (e.g. `chicago` or `new_york_city.csv`).
    #[arg(long)]
    city: Option<String>,
    /// Month filter for `--city` runs.
    #[arg(long, default_value = "all")]
    month: String,
    /// Day-of-week filter for `--city` runs.
    #[arg(long, default_value = "all")]
    day: String,
    /// Directory for the figure JSON and PNG files.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Do not write figure files.
    #[arg(long)]
    no_save: bool,
    /// Echo load and analysis events to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::debug!("{args:?}");

    let config = SessionConfig {
        data_dir: args.data_dir,
        output_dir: args.output_dir,
        save_figures: !args.no_save,
        ..SessionConfig::default()
    };
    let load_observer: Arc<dyn LoadObserver> = if args.verbose {
        let observers: Vec<Arc<dyn LoadObserver>> = vec![Arc::new(LogObserver), Arc::new(StdErrObserver)];
        Arc::new(CompositeObserver::new(observers))
    } else {
        Arc::new(LogObserver)
    };
    let analysis_observer: Arc<dyn AnalysisObserver> = if args.verbose {
        Arc::new(StdErrAnalysisObserver)
    } else {
        Arc::new(LogAnalysisObserver)
    };
    let load_options = LoadOptions {
        observer: Some(load_observer),
        ..LoadOptions::default()
    };
    let engine = AnalysisEngine::default().with_observer(analysis_observer);

    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout().lock(), config)
        .with_load_options(load_options)
        .with_engine(engine);

    match args.city {
        Some(city) => {
            session
                .run_once(&city, &args.month, &args.day)
                .with_context(|| format!("analysing {city} (month={}, day={})", args.month, args.day))?;
        }
        None => session.run().context("interactive session failed")?,
    }
    Ok(())
}
