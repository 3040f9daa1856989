pub mod panels;
pub mod plot;

use eframe::egui;

use crate::app::SentimentApp;
use crate::chart::{ChartSurface, Figure};
use crate::error::Result;
use crate::state::AppState;

/// Collects figures during the run, then shows them all in one native window.
#[derive(Default)]
pub struct WindowSurface {
    figures: Vec<Figure>,
}

impl WindowSurface {
    /// Open the viewer and block until it is closed. Does nothing without figures.
    pub fn run(self) -> eframe::Result {
        if self.figures.is_empty() {
            return Ok(());
        }

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1100.0, 700.0])
                .with_min_inner_size([600.0, 400.0]),
            ..Default::default()
        };

        let state = AppState::new(self.figures);
        eframe::run_native(
            "Sentiment PnL – Market Sentiment Viewer",
            options,
            Box::new(move |_cc| Ok(Box::new(SentimentApp::new(state)))),
        )
    }
}

impl ChartSurface for WindowSurface {
    fn display(&mut self, figure: Figure) -> Result<()> {
        log::debug!("queued figure '{}'", figure.title);
        self.figures.push(figure);
        Ok(())
    }
}
