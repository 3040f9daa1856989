//! # sentiment-pnl
//!
//! Groups trades by their market-sentiment label and reports one number per
//! label: average closed PnL, win rate or trade count. Each report
//!
//! 1. drops trades without a sentiment label,
//! 2. groups the rest by label (ascending) and aggregates,
//! 3. prints the grouped table and draws a bar chart, or prints
//!    `"No data to plot or columns missing."` when there is nothing to draw.
//!
//! ```no_run
//! use sentiment_pnl::chart::HeadlessSurface;
//! use sentiment_pnl::data::loader::load_file;
//! use sentiment_pnl::report::{run_report, ReportKind, ReportSpec};
//!
//! fn main() -> anyhow::Result<()> {
//!     let trades = load_file("trades.csv".as_ref())?;
//!     let spec = ReportSpec::new(ReportKind::AveragePnl, "Classification", "closedPnL");
//!     let table = run_report(&trades, &spec, &mut std::io::stdout(), &mut HeadlessSurface::default())?;
//!     println!("{} groups", table.len());
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;
pub mod ui;
