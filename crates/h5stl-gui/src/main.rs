mod view;
mod worker;

use anyhow::Result;
use eframe::egui;
use h5stl_client::suggested_file_name;
use h5stl_core::input::{FileKind, LocalFile};
use h5stl_core::report::ModelReport;
use h5stl_core::scene::{AttachOutcome, Viewport};
use std::path::PathBuf;
use tracing::Level;
use view::{OrbitCamera, PaintScene};
use worker::{Done, Job, Settings, ShowKind, Source, Worker};

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "h5stl",
        native_options,
        Box::new(|cc| Ok(Box::new(H5StlApp::new(cc)?))),
    )
}

struct Download {
    source: String,
    url: String,
}

struct H5StlApp {
    viewport: Viewport<PaintScene>,
    camera: OrbitCamera,
    worker: Worker,

    settings: Settings,
    sent_settings: Settings,

    report: Option<ModelReport>,
    download: Option<Download>,
    saved_path: Option<PathBuf>,
    in_flight: usize,

    status: String,
}

impl H5StlApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Result<Self> {
        let settings = Settings::default();
        let worker = Worker::spawn(cc.egui_ctx.clone(), settings)?;
        Ok(Self {
            viewport: Viewport::new(PaintScene::new()),
            camera: OrbitCamera::default(),
            worker,
            settings,
            sent_settings: settings,
            report: None,
            download: None,
            saved_path: None,
            in_flight: 0,
            status: "Upload an STL file or pick an h5 file to convert.".to_string(),
        })
    }

    fn submit(&mut self, job: Job) {
        if self.settings != self.sent_settings {
            self.worker.configure(self.settings);
            self.sent_settings = self.settings;
        }
        self.in_flight += 1;
        self.worker.send(job);
    }

    fn show(&mut self, source: Source, kind: ShowKind) {
        self.status = "Working…".to_string();
        let ticket = self.viewport.ticket();
        self.submit(Job::Show {
            source,
            kind,
            ticket,
        });
    }

    fn pick_stl(&mut self) {
        let file = rfd::FileDialog::new()
            .add_filter("STL meshes", &["stl"])
            .pick_file();
        if let Some(path) = file {
            self.show(Source::Path(path), ShowKind::Stl);
        }
    }

    fn pick_h5(&mut self, visualize: bool) {
        let file = rfd::FileDialog::new()
            .add_filter("h5 models", &[FileKind::H5.extension()])
            .pick_file();
        let Some(path) = file else {
            return;
        };
        if visualize {
            self.show(Source::Path(path), ShowKind::H5);
        } else {
            self.status = format!("Converting {}…", path.display());
            self.download = None;
            self.submit(Job::Convert {
                source: Source::Path(path),
            });
        }
    }

    fn save_download(&mut self) {
        let Some(download) = &self.download else {
            return;
        };
        let dest = rfd::FileDialog::new()
            .add_filter("STL meshes", &["stl"])
            .set_file_name(suggested_file_name(&download.url))
            .save_file();
        if let Some(dest) = dest {
            let url = download.url.clone();
            self.status = format!("Saving {}…", dest.display());
            self.submit(Job::Save { url, dest });
        }
    }

    fn handle_file_drop(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        let source = match (file.path, file.bytes) {
            (Some(path), _) => Source::Path(path),
            (None, Some(bytes)) => {
                let mime = (!file.mime.is_empty()).then_some(file.mime);
                Source::Loaded(LocalFile::new(file.name, mime, bytes.to_vec()))
            }
            (None, None) => return,
        };
        self.show(source, ShowKind::Dropped);
    }

    fn drain_results(&mut self) {
        while let Some(done) = self.worker.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match done {
                Done::Shown(prepared) => {
                    let label = prepared.label.clone();
                    let report = ModelReport::new(label.clone(), &prepared.model);
                    match self.viewport.apply(prepared) {
                        AttachOutcome::Applied => {
                            self.status = format!(
                                "Showing {label} ({} triangles, {} edges)",
                                report.triangles, report.edge_segments
                            );
                            self.report = Some(report);
                            self.camera.reset();
                        }
                        AttachOutcome::Superseded { .. } => {
                            self.status = format!("Skipped {label}: a newer request is shown");
                        }
                    }
                }
                Done::DownloadReady { source, url } => {
                    self.status = format!("Converted {source}");
                    self.download = Some(Download { source, url });
                }
                Done::Saved { path, bytes } => {
                    self.status = format!("Saved {} ({bytes} bytes)", path.display());
                    self.saved_path = Some(path);
                }
                Done::Failed { what, error } => {
                    self.status = format!("Failed {what}: {error}");
                }
            }
        }
    }
}

impl eframe::App for H5StlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_results();
        self.handle_file_drop(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Upload STL…").clicked() {
                    self.pick_stl();
                }
                if ui.button("H5 → STL…").clicked() {
                    self.pick_h5(false);
                }
                if ui.button("Visualize H5…").clicked() {
                    self.pick_h5(true);
                }
                ui.separator();
                ui.add(
                    egui::DragValue::new(&mut self.settings.deflection)
                        .speed(0.01)
                        .range(0.001..=10.0)
                        .prefix("deflection="),
                );
                ui.add(
                    egui::DragValue::new(&mut self.settings.edge_threshold_deg)
                        .speed(0.1)
                        .range(0.0..=180.0)
                        .prefix("edge angle=")
                        .suffix("°"),
                );
                if ui.button("Reset view").clicked() {
                    self.camera.reset();
                }
            });

            if let Some(download) = &self.download {
                let mut save = false;
                ui.horizontal(|ui| {
                    ui.label(format!("Converted {}:", download.source));
                    ui.monospace(&download.url);
                    save = ui.button("Save generated STL…").clicked();
                });
                if save {
                    self.save_download();
                }
            }
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.in_flight > 0 {
                    ui.spinner();
                }
                ui.label(&self.status);
                if let Some(dir) = self.saved_path.as_ref().and_then(|p| p.parent()) {
                    if ui.button("Open folder").clicked() {
                        let _ = open::that(dir);
                    }
                }
            });
        });

        egui::SidePanel::right("report").show(ctx, |ui| {
            ui.heading("Model");
            ui.separator();
            draw_report(ui, self.report.as_ref());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            view::show(ui, self.viewport.scene(), &mut self.camera);
        });
    }
}

fn draw_report(ui: &mut egui::Ui, report: Option<&ModelReport>) {
    let Some(report) = report else {
        ui.label("Nothing shown yet.");
        return;
    };
    ui.label(format!("Source: {}", report.source));
    ui.label(format!("Triangles: {}", report.triangles));
    ui.label(format!("Edge segments: {}", report.edge_segments));
    let size = report.bounds.size();
    ui.label(format!("Size: {:.3} × {:.3} × {:.3}", size.x, size.y, size.z));

    ui.separator();
    ui.collapsing("Raw report", |ui| {
        if let Ok(json) = serde_json::to_string_pretty(report) {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.monospace(json);
            });
        }
    });
}
