use eframe::egui;
use game_pilot::config::PilotConfig;
use game_pilot::SessionEvent;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};

struct RandomPilotApp {
    config: PilotConfig,
    running: bool,
    stopping: bool,
    status_log: Vec<String>,
    runtime: Option<Runtime>,
    events_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    session_shutdown: Option<watch::Sender<bool>>,
}

impl RandomPilotApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            config: PilotConfig::default(),
            running: false,
            stopping: false,
            status_log: vec!["Ready.".to_string()],
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
                            "Session finished: {} ticks, {} presses",
                            report.steps,
                            report.total_presses()
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
        if let Err(e) = self.config.validate() {
            self.push_log(format!("Configuration error: {e}"));
            return;
        }
        let options = self.config.to_pilot_options();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        match game_pilot::build_session(&options, Some(events_tx)) {
            Ok(session) => {
                self.session_shutdown = Some(session.shutdown_sender());
                self.events_rx = Some(events_rx);
                self.running = true;
                self.stopping = false;
                let runtime = self.runtime.as_ref().unwrap();
                // Failures surface through the event channel as well.
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

impl eframe::App for RandomPilotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("🎲 Random Pilot");
            ui.label("Presses a random WASD key each tick while running.");

            ui.horizontal(|ui| {
                ui.label("Interval (ms):");
                ui.add(egui::DragValue::new(&mut self.config.interval_ms).clamp_range(50..=2000));
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

        // Keep the log moving while the loop runs in the background.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Random Pilot",
        options,
        Box::new(|cc| Box::new(RandomPilotApp::new(cc))),
    )
}
