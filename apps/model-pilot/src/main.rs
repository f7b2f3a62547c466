use std::path::PathBuf;

use eframe::egui;
use game_pilot::config::{PilotConfig, PilotMode};
use game_pilot::SessionEvent;
use pilot_prep::plan::InputPreset;
use pilot_prep::tensor::Layout;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};

struct ModelPilotApp {
    config: PilotConfig,
    model_path: String,
    running: bool,
    stopping: bool,
    status_log: Vec<String>,
    runtime: Option<Runtime>,
    events_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    session_shutdown: Option<watch::Sender<bool>>,
}

impl ModelPilotApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = PilotConfig {
            mode: PilotMode::Model,
            ..PilotConfig::default()
        };
        Self {
            config,
            model_path: "policy.onnx".to_string(),
            running: false,
            stopping: false,
            status_log: vec!["Ready. Point at an ONNX action model and press Start.".to_string()],
            runtime: Some(Runtime::new().unwrap()),
            events_rx: None,
            session_shutdown: None,
        }
    }

    fn push_log(&mut self, line: String) {
        self.status_log.push(line);
    }

    fn drain_events(&mut self) {
        let mut lines = Vec::new();
        let mut finished = false;
        if let Some(rx) = &mut self.events_rx {
            while let Ok(event) = rx.try_recv() {
                match event {
                    SessionEvent::Started { policy, interval_ms, .. } => {
                        lines.push(format!("AI started... ({policy}, {interval_ms}ms)"));
                    }
                    SessionEvent::Step { action: Some(action), .. } => {
                        lines.push(format!("AI action: {action}"));
                    }
                    SessionEvent::Step { action: None, step } => {
                        lines.push(format!("AI action: (none) at tick {step}"));
                    }
                    SessionEvent::Skipped { reason, .. } => {
                        lines.push(format!("Tick skipped: {reason}"));
                    }
                    SessionEvent::Finished { report } => {
                        lines.push(format!(
                            "Session finished: {} ticks, {} presses, {} skipped",
                            report.steps,
                            report.total_presses(),
                            report.skipped
                        ));
                        finished = true;
                    }
                    SessionEvent::Failed { error } => {
                        lines.push(format!("Error: {error}"));
                        finished = true;
                    }
                }
            }
        }
        for line in lines {
            self.push_log(line);
        }
        if finished {
            self.running = false;
            self.stopping = false;
            self.session_shutdown = None;
        }
    }

    fn start(&mut self) {
        if self.running {
            return;
        }
        self.config.model = Some(PathBuf::from(self.model_path.trim()));
        if let Err(e) = self.config.validate() {
            self.push_log(format!("Configuration error: {e}"));
            return;
        }
        let options = self.config.to_pilot_options();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        // Model load and capture setup happen here, so a bad path or a
        // Wayland session shows up in the log before anything runs.
        match game_pilot::build_session(&options, Some(events_tx)) {
            Ok(session) => {
                self.session_shutdown = Some(session.shutdown_sender());
                self.events_rx = Some(events_rx);
                self.running = true;
                self.stopping = false;
                let runtime = self.runtime.as_ref().unwrap();
                runtime.spawn(async move {
                    let _ = session.run().await;
                });
            }
            Err(e) => self.push_log(format!("Error: {e}")),
        }
    }

    fn stop(&mut self) {
        if let Some(tx) = &self.session_shutdown {
            let _ = tx.send(true);
            self.stopping = true;
            self.push_log("AI stopped.".to_string());
        }
    }
}

impl eframe::App for ModelPilotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("🧠 Model Pilot");
            ui.label("Captures the screen each tick and lets the model pick the WASD key.");

            ui.horizontal(|ui| {
                ui.label("Model file:");
                ui.text_edit_singleline(&mut self.model_path);
            });

            ui.horizontal(|ui| {
                ui.label("Interval (ms):");
                ui.add(egui::DragValue::new(&mut self.config.interval_ms).clamp_range(50..=2000));
            });

            ui.horizontal(|ui| {
                ui.label("Input preset:");
                egui::ComboBox::from_id_source("preset")
                    .selected_text(format!("{}px", self.config.preset.side()))
                    .show_ui(ui, |ui| {
                        for preset in [
                            InputPreset::S64_Square,
                            InputPreset::S128_Square,
                            InputPreset::S224_Square,
                            InputPreset::S299_Square,
                        ] {
                            if ui
                                .selectable_label(
                                    self.config.preset == preset,
                                    format!("{}px", preset.side()),
                                )
                                .clicked()
                            {
                                self.config.preset = preset;
                            }
                        }
                    });

                ui.label("Layout:");
                egui::ComboBox::from_id_source("layout")
                    .selected_text(match self.config.layout {
                        Layout::Nhwc => "NHWC",
                        Layout::Nchw => "NCHW",
                    })
                    .show_ui(ui, |ui| {
                        for (layout, label) in [(Layout::Nhwc, "NHWC"), (Layout::Nchw, "NCHW")] {
                            if ui
                                .selectable_label(self.config.layout == layout, label)
                                .clicked()
                            {
                                self.config.layout = layout;
                            }
                        }
                    });
            });

            ui.checkbox(&mut self.config.dry_run, "Dry run (count instead of pressing keys)");

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!self.running, egui::Button::new("Start AI"))
                    .clicked()
                {
                    self.start();
                }
                if ui
                    .add_enabled(self.running && !self.stopping, egui::Button::new("Stop AI"))
                    .clicked()
                {
                    self.stop();
                }
            });

            ui.separator();
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for line in &self.status_log {
                        ui.label(line);
                    }
                });
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([640.0, 440.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Model Pilot",
        options,
        Box::new(|cc| Box::new(ModelPilotApp::new(cc))),
    )
}
