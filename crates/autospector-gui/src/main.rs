mod canvas;
mod worker;

use anyhow::{Context, Result};
use autospector_core::history::HistoryStore;
use autospector_core::media::EncodedImage;
use autospector_core::model::{Condition, DamageReport};
use autospector_core::overlay::{build_overlay, confidence_percent, tier_style, Highlight, Overlay};
use autospector_core::report_text::render_text;
use autospector_core::session::{boot, AnalysisState, AppState, View};
use autospector_core::store::FileStore;
use autospector_core::users::{authenticate, clear_user, save_user, AuthForm, AuthMode};
use autospector_image::camera::{CameraSession, NativeCamera};
use autospector_image::export::export_png;
use autospector_image::thumbnail::JpegThumbnailer;
use autospector_image::AcquisitionError;
use autospector_inference::InferenceClient;
use canvas::ImageTexture;
use eframe::egui;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use worker::{AnalysisWorker, Outcome};

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "gif", "bmp"];

const HOW_IT_WORKS: [(&str, &str); 3] = [
    ("1. Upload", "Drop in or pick a clear photo of the vehicle."),
    (
        "2. AI analysis",
        "Every visible dent, scratch, crack and broken part is located and rated.",
    ),
    (
        "3. Report",
        "Review the marked-up photo, severity score and damage list, then export it.",
    ),
];

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "AutoSpector",
        native_options,
        Box::new(|cc| Ok(Box::new(AutoSpectorApp::new(cc)?))),
    )
}

struct AutoSpectorApp {
    state: AppState,
    history: HistoryStore<FileStore>,
    worker: AnalysisWorker,

    overlay: Option<Overlay>,
    texture: ImageTexture,
    highlight: Highlight,

    camera: Option<CameraSession<NativeCamera>>,
    preview: Option<egui::TextureHandle>,

    form: AuthForm,
    auth_error: Option<String>,

    last_export: Option<PathBuf>,
    status: String,
}

impl AutoSpectorApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Result<Self> {
        let dir = data_dir();
        tracing::info!(dir = %dir.display(), "using data directory");
        let (state, history) = boot(FileStore::new(dir), Box::new(JpegThumbnailer::default()));

        let client = InferenceClient::from_env().context("build inference client")?;
        let worker = AnalysisWorker::new(client)?;
        let status = if worker.is_demo() {
            "Demo mode: no API key configured, results are simulated.".to_string()
        } else {
            "Ready.".to_string()
        };

        Ok(Self {
            state,
            history,
            worker,
            overlay: None,
            texture: ImageTexture::default(),
            highlight: Highlight::default(),
            camera: None,
            preview: None,
            form: AuthForm::default(),
            auth_error: None,
            last_export: None,
            status,
        })
    }

    fn go(&mut self, view: View) {
        let landed = self.state.navigate(view);
        if landed == View::Home {
            self.forget_report();
        }
        if matches!(landed, View::Login | View::Register) {
            self.auth_error = None;
        }
    }

    fn forget_report(&mut self) {
        self.overlay = None;
        self.texture.clear();
        self.highlight.clear();
        self.last_export = None;
    }

    fn pick_image(&mut self, ctx: &egui::Context) {
        let file = rfd::FileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file();
        if let Some(path) = file {
            let loaded = autospector_image::acquire::load_file(&path);
            self.accept(ctx, loaded);
        }
    }

    fn handle_file_drop(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        let loaded = if let Some(path) = &file.path {
            autospector_image::acquire::load_file(path)
        } else if let Some(bytes) = &file.bytes {
            let mime = (!file.mime.is_empty()).then_some(file.mime.as_str());
            autospector_image::acquire::from_bytes(bytes, mime)
        } else {
            return;
        };
        self.accept(ctx, loaded);
    }

    fn accept(&mut self, ctx: &egui::Context, loaded: Result<EncodedImage, AcquisitionError>) {
        match loaded {
            Ok(image) => self.start(ctx, image),
            Err(err) => {
                tracing::warn!(error = %err, "image rejected");
                self.state.acquisition_failed(err.to_string());
                self.forget_report();
            }
        }
    }

    fn open_camera(&mut self) {
        match CameraSession::start(NativeCamera::new(0)) {
            Ok(session) => {
                self.camera = Some(session);
                self.go(View::Camera);
            }
            Err(err) => self.state.acquisition_failed(err.to_string()),
        }
    }

    fn capture(&mut self, ctx: &egui::Context) {
        let Some(session) = self.camera.take() else {
            return;
        };
        self.preview = None;
        self.accept(ctx, session.capture());
    }

    fn close_camera(&mut self) {
        if let Some(session) = self.camera.take() {
            session.cancel();
        }
        self.preview = None;
    }

    fn camera_failed(&mut self, err: AcquisitionError) {
        tracing::warn!(error = %err, "camera stopped");
        self.close_camera();
        self.state.acquisition_failed(err.to_string());
    }

    fn start(&mut self, ctx: &egui::Context, image: EncodedImage) {
        self.forget_report();
        let generation = self.state.start_analysis(image.to_data_uri());
        self.worker.submit(generation, image, ctx);
        self.status = "Analyzing vehicle…".to_string();
    }

    fn retry(&mut self, ctx: &egui::Context) {
        let Some((generation, uri)) = self.state.retry() else {
            return;
        };
        match EncodedImage::parse_data_uri(&uri) {
            Ok(image) => {
                self.worker.submit(generation, image, ctx);
                self.status = "Analyzing vehicle…".to_string();
            }
            Err(err) => {
                self.state.fail_analysis(generation, format!("The image can no longer be read: {err}"));
            }
        }
    }

    fn collect_results(&mut self) {
        for outcome in self.worker.poll() {
            match outcome {
                Outcome::Finished { generation, report } => {
                    let to_save = report.clone();
                    if !self.state.complete_analysis(generation, report) {
                        continue;
                    }
                    self.overlay = self.state.report.as_ref().map(|r| build_overlay(&r.damages));
                    self.status = match self.state.report.as_ref() {
                        Some(r) if r.is_demo() => "Analysis complete (simulated).".to_string(),
                        _ => "Analysis complete.".to_string(),
                    };
                    if self.state.is_signed_in() && !self.history.record(&to_save) {
                        self.status = "Analysis complete, but it could not be saved to history.".to_string();
                    }
                }
                Outcome::Died { generation } => {
                    if self.state.fail_analysis(generation, "The analysis stopped unexpectedly.") {
                        tracing::error!(generation, "analysis task ended without a report");
                        self.status = "Analysis failed.".to_string();
                    }
                }
            }
        }
    }

    fn open_report(&mut self, report: DamageReport) {
        self.forget_report();
        self.overlay = Some(build_overlay(&report.damages));
        self.state.open_from_history(report);
    }

    fn submit_auth(&mut self, mode: AuthMode) {
        match authenticate(mode, &self.form) {
            Ok(user) => {
                if let Err(err) = save_user(self.history.store(), &user) {
                    tracing::warn!(error = %err, "could not persist user");
                }
                self.status = format!("Signed in as {}.", user.name);
                self.state.sign_in(user);
                self.form = AuthForm::default();
                self.auth_error = None;
                self.forget_report();
            }
            Err(err) => self.auth_error = Some(err.to_string()),
        }
    }

    fn sign_out(&mut self) {
        if let Err(err) = clear_user(self.history.store()) {
            tracing::warn!(error = %err, "could not clear saved user");
        }
        self.state.sign_out();
        self.state.reset();
        self.forget_report();
        self.status = "Signed out.".to_string();
    }

    fn export(&mut self) {
        let (Some(report), Some(uri)) = (self.state.report.as_ref(), self.state.current_image.as_deref()) else {
            return;
        };
        let name = format!("inspection-{}.png", report.short_ref().unwrap_or("report"));
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .set_file_name(name)
            .save_file()
        else {
            return;
        };

        let overlay = self.overlay.clone().unwrap_or_else(|| build_overlay(&report.damages));
        match write_export(&path, uri, &overlay, report) {
            Ok(()) => {
                self.status = format!("Exported {}", path.display());
                self.last_export = Some(path);
            }
            Err(err) => {
                tracing::warn!(error = %err, "export failed");
                self.status = format!("Export failed: {err:#}");
            }
        }
    }
}

impl eframe::App for AutoSpectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.collect_results();
        if matches!(self.state.view, View::Home) {
            self.handle_file_drop(ctx);
        }
        if self.state.view != View::Camera && self.camera.is_some() {
            self.close_camera();
        }
        if self.worker.busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(egui::RichText::new("AutoSpector").strong()).clicked() {
                    self.go(View::Home);
                }
                if self.worker.is_demo() {
                    ui.label(egui::RichText::new("DEMO").color(egui::Color32::from_rgb(0xF9, 0x73, 0x16)));
                }
                ui.separator();
                if ui.button("History").clicked() {
                    self.go(View::History);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match self.state.session.clone() {
                        Some(user) => {
                            if ui.button("Sign out").clicked() {
                                self.sign_out();
                            }
                            ui.label(format!("{} ({})", user.name, user.email));
                        }
                        None => {
                            if ui.button("Register").clicked() {
                                self.go(View::Register);
                            }
                            if ui.button("Sign in").clicked() {
                                self.go(View::Login);
                            }
                        }
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                if let Some(p) = &self.last_export {
                    if ui.button("Open export").clicked() {
                        let _ = open::that(p);
                    }
                    if let Some(dir) = p.parent() {
                        if ui.button("Open folder").clicked() {
                            let _ = open::that(dir);
                        }
                    }
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Home => draw_home(ui, self),
            View::Dashboard => draw_dashboard(ui, self),
            View::Login => draw_auth(ui, self, AuthMode::Login),
            View::Register => draw_auth(ui, self, AuthMode::Register),
            View::History => draw_history(ui, self),
            View::Camera => draw_camera(ui, self),
        });
        self.highlight.end_frame();
    }
}

fn draw_home(ui: &mut egui::Ui, app: &mut AutoSpectorApp) {
    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.heading("Instant vehicle damage inspection");
        ui.label("Upload a photo of a car to locate and rate every visible damage.");
        ui.add_space(16.0);

        if ui.button("Upload photo…").clicked() {
            let ctx = ui.ctx().clone();
            app.pick_image(&ctx);
        }
        if ui.button("Use camera").clicked() {
            app.open_camera();
        }
        ui.label(egui::RichText::new("or drop an image anywhere in this window").weak());

        if let Some(notice) = &app.state.notice {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::from_rgb(0xDC, 0x26, 0x26), notice);
        }

        ui.add_space(32.0);
        ui.heading("How it works");
        ui.add_space(8.0);
    });
    ui.columns(HOW_IT_WORKS.len(), |cols| {
        for (col, (title, body)) in cols.iter_mut().zip(HOW_IT_WORKS) {
            col.group(|ui| {
                ui.strong(title);
                ui.label(body);
            });
        }
    });
}

fn draw_camera(ui: &mut egui::Ui, app: &mut AutoSpectorApp) {
    let ctx = ui.ctx().clone();
    ui.horizontal(|ui| {
        if ui.button("Capture").clicked() {
            app.capture(&ctx);
        }
        if ui.button("Cancel").clicked() {
            app.close_camera();
            app.go(View::Home);
        }
    });
    ui.separator();

    let Some(session) = app.camera.as_mut() else {
        return;
    };
    match session.preview() {
        Ok(frame) => canvas::update_frame(&ctx, &mut app.preview, &frame),
        Err(err) => {
            app.camera_failed(err);
            return;
        }
    }
    if let Some(tex) = &app.preview {
        canvas::show(ui, tex, None, None);
    }
    ctx.request_repaint();
}

fn draw_dashboard(ui: &mut egui::Ui, app: &mut AutoSpectorApp) {
    ui.horizontal(|ui| {
        if ui.button("New inspection").clicked() {
            app.go(View::Home);
        }
        let ready = app.state.report.is_some() && app.state.current_image.is_some();
        if ui.add_enabled(ready, egui::Button::new("Export…")).clicked() {
            app.export();
        }
    });
    ui.separator();

    let ctx = ui.ctx().clone();
    ui.columns(2, |cols| {
        let image = app.state.current_image.clone();
        match image.as_deref().and_then(|uri| app.texture.get(&ctx, uri)) {
            Some(tex) => {
                let tex = tex.clone();
                let highlight = app.highlight.current().map(str::to_string);
                let overlay = if app.state.is_analyzing() { None } else { app.overlay.as_ref() };
                let hovered = canvas::show(&mut cols[0], &tex, overlay, highlight.as_deref());
                app.highlight.hover(hovered.as_deref());
            }
            None => {
                cols[0].label("No image to display.");
            }
        }

        draw_report_panel(&mut cols[1], app);
    });
}

fn draw_report_panel(ui: &mut egui::Ui, app: &mut AutoSpectorApp) {
    match app.state.analysis.clone() {
        AnalysisState::Analyzing { .. } => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Analyzing vehicle…");
            });
            return;
        }
        AnalysisState::Failed { message } => {
            ui.colored_label(egui::Color32::from_rgb(0xDC, 0x26, 0x26), message);
            if ui.button("Retry").clicked() {
                let ctx = ui.ctx().clone();
                app.retry(&ctx);
            }
            return;
        }
        AnalysisState::Idle | AnalysisState::Ready => {}
    }

    let Some(report) = app.state.report.clone() else {
        ui.label("No report.");
        return;
    };

    ui.horizontal(|ui| {
        ui.heading("Inspection Report");
        if report.is_demo() {
            ui.label(egui::RichText::new("DEMO").color(egui::Color32::from_rgb(0xF9, 0x73, 0x16)));
        }
    });
    ui.horizontal(|ui| {
        if let Some(r) = report.short_ref() {
            ui.label(format!("ID #{r}"));
        }
        if let Some(d) = report.date {
            ui.label(d.format("%Y-%m-%d %H:%M").to_string());
        }
    });

    ui.add_space(6.0);
    let condition = report.condition();
    ui.label(
        egui::RichText::new(format!("Severity score {}/100 · {}", report.score(), condition.as_str()))
            .color(condition_color(condition))
            .strong(),
    );
    ui.label(&report.summary);
    ui.separator();

    if report.damages.is_empty() {
        ui.strong("Inspection Results: Passed");
        ui.label("No visible damage detected.");
    } else {
        ui.strong(format!("Inspection Results: {} Issues Found", report.issue_count()));
        egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
            let mut hovered = None;
            for d in &report.damages {
                let style = tier_style(d.severity);
                let resp = ui
                    .group(|ui| {
                        ui.horizontal(|ui| {
                            ui.strong(&d.label);
                            ui.colored_label(canvas::color(style.stroke), d.severity.as_str());
                            ui.label(confidence_percent(d.confidence, 1));
                        });
                        if !d.description.is_empty() {
                            ui.label(&d.description);
                        }
                    })
                    .response;
                if resp.hovered() {
                    hovered = Some(d.id.clone());
                }
            }
            app.highlight.hover(hovered.as_deref());
        });
        if let Some(overlay) = &app.overlay {
            if !overlay.skipped.is_empty() {
                ui.label(
                    egui::RichText::new(format!("{} item(s) could not be placed on the photo.", overlay.skipped.len()))
                        .weak(),
                );
            }
        }
    }

    ui.separator();
    ui.strong("Parts Inspected");
    if report.vehicle_parts_visible.is_empty() {
        ui.label("(none listed)");
    } else {
        ui.label(report.vehicle_parts_visible.join(", "));
    }
}

fn draw_auth(ui: &mut egui::Ui, app: &mut AutoSpectorApp, mode: AuthMode) {
    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.heading(match mode {
            AuthMode::Login => "Sign in",
            AuthMode::Register => "Create an account",
        });
        ui.add_space(12.0);
    });

    egui::Grid::new("auth").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
        if mode == AuthMode::Register {
            ui.label("Name");
            ui.text_edit_singleline(&mut app.form.name);
            ui.end_row();
        }
        ui.label("Email");
        ui.text_edit_singleline(&mut app.form.email);
        ui.end_row();
        ui.label("Password");
        ui.add(egui::TextEdit::singleline(&mut app.form.password).password(true));
        ui.end_row();
    });

    if let Some(err) = &app.auth_error {
        ui.colored_label(egui::Color32::from_rgb(0xDC, 0x26, 0x26), err);
    }

    ui.horizontal(|ui| {
        let submit = match mode {
            AuthMode::Login => "Sign in",
            AuthMode::Register => "Register",
        };
        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button(submit).clicked() || enter {
            app.submit_auth(mode);
        }
        let (other, target) = match mode {
            AuthMode::Login => ("Need an account? Register", View::Register),
            AuthMode::Register => ("Already registered? Sign in", View::Login),
        };
        if ui.link(other).clicked() {
            app.go(target);
        }
    });
}

fn draw_history(ui: &mut egui::Ui, app: &mut AutoSpectorApp) {
    ui.horizontal(|ui| {
        ui.heading("Inspection History");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(!app.history.is_empty(), egui::Button::new("Clear history"))
                .clicked()
            {
                match app.history.clear() {
                    Ok(()) => app.status = "History cleared.".to_string(),
                    Err(err) => app.status = format!("Could not clear history: {err}"),
                }
            }
        });
    });
    ui.separator();

    if app.history.is_empty() {
        ui.label("No inspections yet. Analyze a photo while signed in to keep it here.");
        return;
    }

    let mut selected = None;
    egui::ScrollArea::vertical().show(ui, |ui| {
        for r in app.history.list() {
            let resp = ui
                .group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        if let Some(d) = r.date {
                            ui.label(d.format("%Y-%m-%d %H:%M").to_string());
                        }
                        ui.label(
                            egui::RichText::new(format!("{}/100", r.score()))
                                .color(condition_color(r.condition()))
                                .strong(),
                        );
                        if r.is_demo() {
                            ui.label(egui::RichText::new("DEMO").weak());
                        }
                        let issues = match r.issue_count() {
                            0 => "Passed".to_string(),
                            n => format!("{n} Issues"),
                        };
                        ui.label(issues);
                    });
                    ui.label(&r.summary);
                    let parts = r.parts_preview(3);
                    if !parts.is_empty() {
                        ui.label(egui::RichText::new(parts).weak());
                    }
                })
                .response
                .interact(egui::Sense::click());
            if resp.clicked() {
                selected = Some(r.clone());
            }
        }
    });

    if let Some(report) = selected {
        app.open_report(report);
    }
}

fn condition_color(c: Condition) -> egui::Color32 {
    match c {
        Condition::Excellent => egui::Color32::from_rgb(0x16, 0xA3, 0x4A),
        Condition::Fair => egui::Color32::from_rgb(0xF9, 0x73, 0x16),
        Condition::Critical => egui::Color32::from_rgb(0xDC, 0x26, 0x26),
    }
}

/// Writes the annotated PNG and a `.txt` report next to it.
fn write_export(path: &Path, data_uri: &str, overlay: &Overlay, report: &DamageReport) -> Result<()> {
    let image = EncodedImage::parse_data_uri(data_uri).context("read current image")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    export_png(&image, overlay, path).with_context(|| format!("write image: {path:?}"))?;
    let text_path = path.with_extension("txt");
    std::fs::write(&text_path, render_text(report)).with_context(|| format!("write report: {text_path:?}"))?;
    Ok(())
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("autospector"))
        .unwrap_or_else(|| PathBuf::from(".autospector"))
}
