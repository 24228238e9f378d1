use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Slider, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::truncated;

use super::super::{SearchCache, Viewer};

const SELECTION_LIST_ROWS: usize = 40;

fn fuzzy_matches(matcher: &SkimMatcherV2, text: &str, query: &str) -> bool {
    matcher.fuzzy_match(text, query).is_some()
        || matcher
            .fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase())
            .is_some()
}

impl Viewer {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, now: f64) {
        ui.add_space(6.0);
        ui.heading("Dataset");
        ui.label(format!(
            "base: {} nodes / {} links",
            self.base.node_count(),
            self.base.link_count()
        ));
        ui.add(Slider::new(&mut self.multiplier, 1..=8).text("copies"));
        if self.multiplier != self.applied_multiplier {
            self.apply_multiplier();
        }
        if ui.button("Relayout").clicked() {
            self.engine.redraw();
        }

        ui.separator();
        ui.heading("Search");
        ui.text_edit_singleline(&mut self.search);
        if let Some(matches) = self.cached_search_matches() {
            ui.label(format!("{} matching nodes", matches.len()));
        }

        ui.separator();
        ui.heading("Physics");
        ui.add(Slider::new(&mut self.repulsion, 200.0..=6000.0).text("repulsion"));
        ui.add(Slider::new(&mut self.link_distance, 20.0..=200.0).text("link distance"));
        ui.checkbox(&mut self.live_physics, "live layout");

        ui.separator();
        ui.heading("View");
        ui.checkbox(&mut self.show_grid, "grid");
        ui.checkbox(&mut self.show_labels, "labels");
        if ui.button("Reset view").clicked() {
            self.engine.reset_view(now);
        }

        ui.separator();
        ui.heading("Selection");
        ui.label(format!("{} selected", self.engine.selection().len()));
        if !self.engine.selection().is_empty() && ui.button("Clear selection").clicked() {
            self.engine.clear_selection();
        }

        let mut ids = self
            .engine
            .selection()
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        ids.sort();
        egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
            for id in ids.iter().take(SELECTION_LIST_ROWS) {
                ui.label(truncated(id, 36));
            }
            if ids.len() > SELECTION_LIST_ROWS {
                ui.label(format!("... and {} more", ids.len() - SELECTION_LIST_ROWS));
            }
        });
    }

    fn apply_multiplier(&mut self) {
        self.applied_multiplier = self.multiplier;
        self.engine.set_data(&self.base.multiplied(self.multiplier));
        self.engine.redraw();
    }

    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<String>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cache) = &self.search_cache
            && cache.revision == self.engine.revision()
            && cache.query == query
        {
            return Some(Arc::clone(&cache.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .engine
            .node_ids()
            .filter(|id| fuzzy_matches(&matcher, id, query))
            .map(str::to_owned)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_cache = Some(SearchCache {
            query: query.to_owned(),
            revision: self.engine.revision(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }
}
