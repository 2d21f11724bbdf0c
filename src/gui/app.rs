use std::sync::Arc;

use eframe::egui;
use egui::{CentralPanel, Context, RichText, TopBottomPanel, Ui};
use egui_extras::{Column, TableBody, TableBuilder};
use tokio::runtime::Runtime;
use tracing::{error, info};

use crate::{
    config::MeshStatusConfig,
    data_aquisition::{PollTransport, TelnetClient},
    gui::poller::Poller,
    topology::{CycleHealth, LinkColumn, LinkRow, MeshStatus, PollReason, RowRenderer},
};

pub fn main(rt: Arc<Runtime>, config: MeshStatusConfig) {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([460.0, 380.0]),
        ..Default::default()
    };
    let result = eframe::run_native(
        "Mesh Status",
        native_options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, rt, &config)) as Box<dyn eframe::App>)),
    );

    if let Err(e) = result {
        error!(error = %e, "window closed with an error");
    }
}

struct App {
    status: MeshStatus,
    poller: Poller,
    // keeps the runtime the poller spawns onto alive for as long as the window
    _runtime: Arc<Runtime>,
}

impl App {
    fn new(cc: &eframe::CreationContext<'_>, runtime: Arc<Runtime>, config: &MeshStatusConfig) -> Self {
        let _ = cc;

        let transport: Arc<dyn PollTransport> = Arc::new(
            TelnetClient::new(config.host.clone(), config.port).with_idle_cutoff(config.idle_cutoff),
        );
        let poller = Poller::new(runtime.handle().clone(), transport);
        info!(peer = %poller.target(), auto_update = config.auto_update, "polling mesh status");

        Self {
            status: MeshStatus::from_config(config),
            poller,
            _runtime: runtime,
        }
    }

    /// Apply whatever the poll tasks delivered since the last frame.
    fn read_data(&mut self) {
        for result in self.poller.drain() {
            match result {
                Ok(text) => {
                    self.status.on_message(&text);
                }
                Err(e) => self.status.on_failure(&e),
            }
        }
    }

    fn drive_polls(&mut self, ctx: &Context) {
        if let Some(reason) = self.status.take_due_poll() {
            let repaint = ctx.clone();
            let on_done = move || repaint.request_repaint();
            match reason {
                PollReason::Manual => self.poller.request(on_done),
                PollReason::Tick => {
                    self.poller.request_tick(on_done);
                }
            }
        }
        if let Some(wait) = self.status.time_until_next_poll() {
            ctx.request_repaint_after(wait);
        }
    }

    fn render_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if ui.button("Update").clicked() {
                info!("update button pressed");
                self.status.update_clicked();
            }

            let mut auto = self.status.is_auto_update();
            if ui.checkbox(&mut auto, "Auto update").changed() {
                self.status.auto_update_changed(auto);
            }

            ui.separator();

            if ui.small_button("Clear").on_hover_text("Remove all rows from the table").clicked() {
                info!("clear button pressed");
                self.status.clear_table();
            }
            if ui
                .small_button("Print")
                .on_hover_text("Serialize the table and print it to stdout")
                .clicked()
            {
                match self.status.table().to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!(error = %e, "could not serialize table"),
                }
            }
        });
    }

    fn render_status_line(&self, ui: &mut Ui) {
        let text = match self.status.health() {
            CycleHealth::NeverPolled => "Not polled yet".to_string(),
            CycleHealth::Ok { links, at } => format!(
                "{} link(s) at {}",
                links,
                humantime::format_rfc3339_seconds(*at)
            ),
            CycleHealth::Failed { reason, at } => format!(
                "Poll failed at {}: {}",
                humantime::format_rfc3339_seconds(*at),
                reason
            ),
        };
        ui.horizontal(|ui| {
            ui.small(text);
            if self.poller.in_flight() > 0 {
                ui.spinner();
            }
        });
    }

    fn render_table(&self, ui: &mut Ui) {
        let table = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .column(Column::auto().at_least(130.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::remainder().at_least(130.0));

        table
            .header(20.0, |mut header| {
                for column in LinkColumn::ALL {
                    header.col(|ui| {
                        ui.strong(column.title());
                    });
                }
            })
            .body(|mut body| {
                self.status.render_into(&mut BodyRenderer { body: &mut body });
            });
    }

    fn render(&mut self, ctx: &Context) {
        TopBottomPanel::top("controls").show(ctx, |ui| {
            self.render_controls(ui);
        });
        TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.render_status_line(ui);
        });
        CentralPanel::default().show(ctx, |ui| {
            self.render_table(ui);
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        self.read_data();
        self.render(ctx);
        self.drive_polls(ctx);
    }
}

/// Draws link rows into an `egui_extras` table body. Stale rows are dimmed.
struct BodyRenderer<'a, 'b> {
    body: &'a mut TableBody<'b>,
}

impl RowRenderer for BodyRenderer<'_, '_> {
    fn render_row(&mut self, _index: usize, row: &LinkRow) {
        self.body.row(22.0, |mut table_row| {
            for cell in row.cells() {
                table_row.col(|ui| {
                    let text = RichText::new(cell);
                    let text = if row.stale { text.weak() } else { text };
                    ui.label(text).on_hover_text(format!(
                        "last seen {}",
                        humantime::format_rfc3339_seconds(row.last_seen)
                    ));
                });
            }
        });
    }
}
