use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2};

use crate::dataset::{Dataset, load_dataset};
use crate::util::truncated;

mod engine;
mod ui;

use engine::{Engine, EngineEvents, SimNode, SimulationConfig, ViewOptions};

pub struct LinkViewApp {
    dataset_path: String,
    state: AppState,
    reload_rx: Option<Receiver<Result<Dataset, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<Viewer>),
    Error(String),
}

struct Viewer {
    base: Dataset,
    engine: Engine,
    events: StatusEvents,
    multiplier: usize,
    applied_multiplier: usize,
    search: String,
    search_cache: Option<SearchCache>,
    show_grid: bool,
    show_labels: bool,
    live_physics: bool,
    repulsion: f32,
    link_distance: f32,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

struct SearchCache {
    query: String,
    revision: u64,
    matches: Arc<HashSet<String>>,
}

#[derive(Default)]
struct StatusEvents {
    last_click: Option<String>,
    hovered: Option<String>,
}

impl EngineEvents for StatusEvents {
    fn node_clicked(&mut self, _pointer: Pos2, node: Option<&SimNode>) {
        self.last_click = Some(match node {
            Some(node) => format!("clicked {}", truncated(&node.id, 32)),
            None => "clicked background".to_owned(),
        });
    }

    fn node_hovered(&mut self, _pointer: Pos2, node: Option<&SimNode>) {
        self.hovered = node.map(|node| truncated(&node.id, 32).to_owned());
    }
}

impl Viewer {
    fn new(base: Dataset) -> Self {
        let mut engine = Engine::new();
        engine.set_data(&base);
        engine.redraw();

        let defaults = SimulationConfig::default();
        Self {
            base,
            engine,
            events: StatusEvents::default(),
            multiplier: 1,
            applied_multiplier: 1,
            search: String::new(),
            search_cache: None,
            show_grid: true,
            show_labels: true,
            live_physics: true,
            repulsion: defaults.repulsion,
            link_distance: defaults.link_distance,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    fn show(
        &mut self,
        ctx: &Context,
        dataset_path: &str,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.update_fps_counter(ctx);
        self.draw_status_bar(ctx, dataset_path, reload_requested, is_reloading);

        let now = ctx.input(|input| input.time);
        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(270.0)
            .show(ctx, |ui| self.draw_controls(ui, now));

        let config = SimulationConfig {
            repulsion: self.repulsion,
            link_distance: self.link_distance,
        };
        let options = ViewOptions {
            show_grid: self.show_grid,
            show_labels: self.show_labels,
            live_physics: self.live_physics,
        };
        let matches = self.cached_search_matches();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.engine
                .show(ui, &config, options, matches.as_deref(), &mut self.events);
        });
    }
}

impl LinkViewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dataset_path: String) -> Self {
        let state = Self::start_load(dataset_path.clone());
        Self {
            dataset_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(dataset_path: String) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            log::info!("loading dataset from {dataset_path}");
            let result = load_dataset(&dataset_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(dataset_path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(dataset_path),
        }
    }
}

impl eframe::App for LinkViewApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(dataset) => AppState::Ready(Box::new(Viewer::new(dataset))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph dataset...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load graph dataset");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.dataset_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.dataset_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.dataset_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(dataset) => AppState::Ready(Box::new(Viewer::new(dataset))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
