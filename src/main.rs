use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use sentiment_pnl::chart::{ChartSurface, HeadlessSurface};
use sentiment_pnl::config::Config;
use sentiment_pnl::data::loader::load_file;
use sentiment_pnl::report::{run_report, ReportKind};
use sentiment_pnl::ui::{panels, WindowSurface};

/// Trader PnL by market sentiment.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Trade table (.csv, .json, .parquet). A file dialog opens when omitted.
    data: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report to run; repeat for several. Overrides the config's list.
    #[arg(long = "report", value_enum)]
    reports: Vec<ReportKind>,

    /// Sentiment label column.
    #[arg(long)]
    label_column: Option<String>,

    /// Closed PnL column.
    #[arg(long)]
    value_column: Option<String>,

    /// Trade direction column for the long/short report.
    #[arg(long)]
    side_column: Option<String>,

    /// Print the tables only; do not open the chart window.
    #[arg(long)]
    no_window: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if !cli.reports.is_empty() {
        config.reports = cli.reports.clone();
    }
    if let Some(col) = cli.label_column {
        config.label_column = col;
    }
    if let Some(col) = cli.value_column {
        config.value_column = col;
    }

    if let Some(col) = cli.side_column {
        config.side_column = col;
    }

    let Some(path) = cli.data.or_else(panels::open_file_dialog) else {
        log::info!("no input selected");
        return Ok(());
    };

    let mut dataset =
        load_file(&path).with_context(|| format!("loading {}", path.display()))?;
    dataset.rename_columns(&config.rename);
    log::info!(
        "Loaded {} trades with columns {:?}",
        dataset.len(),
        dataset.columns()
    );

    let mut window = WindowSurface::default();
    let mut headless = HeadlessSurface::default();
    let surface: &mut dyn ChartSurface = if cli.no_window {
        &mut headless
    } else {
        &mut window
    };

    let mut stdout = std::io::stdout().lock();
    for spec in config.report_specs() {
        run_report(&dataset, &spec, &mut stdout, &mut *surface)
            .with_context(|| format!("report {}", spec.frame_name))?;
    }
    drop(stdout);

    window
        .run()
        .map_err(|e| anyhow!("chart window failed: {e}"))
}
