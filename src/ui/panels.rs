use std::path::PathBuf;

use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – result rows
// ---------------------------------------------------------------------------

/// Render the grouped values behind the selected figure.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Result");
    ui.separator();

    let Some(view) = state.current() else {
        ui.label("No result.");
        return;
    };
    let figure = &view.figure;

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(40.0))
        .column(Column::auto().at_least(100.0))
        .columns(Column::auto().at_least(80.0), figure.series.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong(figure.x_label.as_str());
            });
            for series in &figure.series {
                header.col(|ui| {
                    ui.strong(series.name.as_str());
                });
            }
        })
        .body(|mut body| {
            for (i, category) in figure.categories.iter().enumerate() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(i.to_string());
                    });
                    row.col(|ui| {
                        let text = RichText::new(category.to_string());
                        if figure.is_stacked() {
                            ui.label(text);
                        } else {
                            ui.label(text.color(view.bar_color(0, i)));
                        }
                    });
                    for series in &figure.series {
                        row.col(|ui| {
                            let text = series
                                .heights
                                .get(i)
                                .copied()
                                .flatten()
                                .map(|h| format!("{h:.4}"))
                                .unwrap_or_else(|| "<null>".to_string());
                            ui.label(text);
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the figure selector.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        let mut clicked = None;
        for (i, view) in state.figures.iter().enumerate() {
            if ui
                .selectable_label(state.selected == i, view.figure.title.as_str())
                .clicked()
            {
                clicked = Some(i);
            }
        }
        if let Some(i) = clicked {
            state.select(i);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Ask for a trade table when none was given on the command line.
pub fn open_file_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open trade data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file()
}
