use eframe::egui::{self, Align, Context, Layout};

use super::super::Viewer;

impl Viewer {
    pub(in crate::app) fn update_fps_counter(&mut self, ctx: &Context) {
        const FPS_SAMPLE_WINDOW: usize = 120;

        let dt = ctx.input(|input| input.stable_dt);
        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > FPS_SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    fn fps_text(&self) -> Option<String> {
        if self.fps_samples.is_empty() {
            return None;
        }
        let average = self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32;
        Some(format!("FPS {:.0} | avg {:.1}", self.fps_current, average))
    }

    pub(in crate::app) fn draw_status_bar(
        &mut self,
        ctx: &Context,
        dataset_path: &str,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::TopBottomPanel::top("status_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("linkview");
                    ui.separator();
                    ui.label(format!("dataset: {dataset_path}"));
                    ui.label(format!("nodes: {}", self.engine.node_count()));
                    ui.label(format!("edges: {}", self.engine.link_count()));
                    if self.engine.dropped_link_count() > 0 {
                        ui.label(format!("dropped links: {}", self.engine.dropped_link_count()));
                    }

                    let reload_button = ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_reloading {
                        ui.spinner();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_text() {
                            ui.label(fps_text);
                        }
                        ui.label(format!(
                            "zoom {:.2}x | alpha {:.2}",
                            self.engine.zoom(),
                            self.engine.alpha()
                        ));
                        if let Some(last_click) = &self.events.last_click {
                            ui.label(last_click.as_str());
                        }
                        if let Some(hovered) = &self.events.hovered {
                            ui.label(format!("hover: {hovered}"));
                        }
                    });
                });
            });
    }
}
