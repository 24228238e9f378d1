use std::collections::{HashMap, HashSet};

use eframe::egui::{self, CursorIcon, Pos2, Rect, Sense, Ui, Vec2};

use crate::dataset::Dataset;

mod input;
mod quadtree;
mod render;
mod selection;
mod simulation;
mod transform;

use input::{ClickArm, Gesture, PointerFrame};
use render::NodeVisual;
use selection::SelectionSet;
pub(in crate::app) use simulation::{SimNode, SimulationConfig};
use simulation::Simulation;
use transform::{ViewTransform, ViewTween};

const DRAG_ALPHA_TARGET: f32 = 0.3;

pub(in crate::app) trait EngineEvents {
    fn node_clicked(&mut self, pointer: Pos2, node: Option<&SimNode>);
    fn node_hovered(&mut self, pointer: Pos2, node: Option<&SimNode>);
}

#[derive(Clone, Copy)]
pub(in crate::app) struct ViewOptions {
    pub show_grid: bool,
    pub show_labels: bool,
    pub live_physics: bool,
}

pub(in crate::app) struct Engine {
    dataset: Dataset,
    sim: Simulation,
    transform: ViewTransform,
    tween: Option<ViewTween>,
    gesture: Gesture,
    click_arm: ClickArm,
    hover: Option<usize>,
    pointer_was_inside: bool,
    selection: SelectionSet,
    preview: HashSet<String>,
    visuals: HashMap<String, NodeVisual>,
    revision: u64,
}

impl Engine {
    pub(in crate::app) fn new() -> Self {
        Self {
            dataset: Dataset::default(),
            sim: Simulation::empty(),
            transform: ViewTransform::IDENTITY,
            tween: None,
            gesture: Gesture::Idle,
            click_arm: ClickArm::default(),
            hover: None,
            pointer_was_inside: false,
            selection: SelectionSet::default(),
            preview: HashSet::new(),
            visuals: HashMap::new(),
            revision: 0,
        }
    }

    pub(in crate::app) fn set_data(&mut self, dataset: &Dataset) {
        self.dataset = dataset.clone();
    }

    pub(in crate::app) fn redraw(&mut self) {
        self.sim = Simulation::seed(&self.dataset);
        self.visuals = render::build_visuals(self.sim.nodes());
        self.selection.clear();
        self.preview.clear();
        self.gesture = Gesture::Idle;
        self.hover = None;
        self.click_arm.disarm();
        self.revision = self.revision.wrapping_add(1);
    }

    pub(in crate::app) fn reset_view(&mut self, now: f64) {
        let target = ViewTransform {
            translation: -self.sim.centroid(),
            scale: 1.0,
        };
        self.tween = Some(ViewTween::new(self.transform, target, now));
    }

    pub(in crate::app) fn revision(&self) -> u64 {
        self.revision
    }

    pub(in crate::app) fn node_count(&self) -> usize {
        self.sim.nodes().len()
    }

    pub(in crate::app) fn link_count(&self) -> usize {
        self.sim.links().len()
    }

    pub(in crate::app) fn dropped_link_count(&self) -> usize {
        self.sim.dropped_links()
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.sim.alpha()
    }

    pub(in crate::app) fn zoom(&self) -> f32 {
        self.transform.scale
    }

    pub(in crate::app) fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.sim.nodes().iter().map(|node| node.id.as_str())
    }

    pub(in crate::app) fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub(in crate::app) fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub(in crate::app) fn show(
        &mut self,
        ui: &mut Ui,
        config: &SimulationConfig,
        options: ViewOptions,
        search_matches: Option<&HashSet<String>>,
        events: &mut dyn EngineEvents,
    ) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        let frame = ui.input(|input| PointerFrame {
            time: input.time,
            pos: input.pointer.hover_pos(),
            delta: input.pointer.delta(),
            primary_pressed: input.pointer.primary_pressed(),
            primary_released: input.pointer.primary_released(),
            modifier: input.modifiers.command || input.modifiers.shift,
            scroll: input.raw_scroll_delta.y,
        });
        let now = frame.time;

        if let Some(tween) = &self.tween {
            let (value, finished) = tween.sample(now);
            self.transform = value;
            if finished {
                self.tween = None;
            }
        }

        if response.hovered() && frame.scroll.abs() > f32::EPSILON {
            self.tween = None;
            let pointer = frame.pos.unwrap_or_else(|| rect.center());
            let factor = (1.0 + (frame.scroll * 0.0018)).clamp(0.85, 1.15);
            self.transform.zoom_about(rect, pointer, factor);
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.tween = None;
            self.transform.pan_by(response.drag_delta());
        }

        let pointer_inside = frame.pos.is_some_and(|pos| rect.contains(pos));
        if pointer_inside && !self.pointer_was_inside {
            self.click_arm.disarm();
        }
        self.pointer_was_inside = pointer_inside;
        self.click_arm.expire(now);

        if !self.click_arm.is_armed() && self.gesture.is_idle() {
            self.update_hover(rect, frame.pos.filter(|_| pointer_inside), events);
        }

        if frame.primary_pressed
            && pointer_inside
            && let Some(pointer) = frame.pos
        {
            self.tween = None;
            self.click_arm.arm(now);
            let layout = self.transform.screen_to_layout(rect, pointer);
            self.begin_gesture(frame.modifier, layout);
        }

        if !self.gesture.is_idle()
            && let Some(pointer) = frame.pos
        {
            let layout = self.transform.screen_to_layout(rect, pointer);
            self.drag_to(layout, frame.delta);
        }

        if frame.primary_released {
            let pointer = frame.pos.unwrap_or_else(|| rect.center());
            self.finish_gesture(now, pointer, frame.modifier, events);
        }

        let sim_active = if options.live_physics {
            self.sim.tick(config)
        } else {
            false
        };

        render::draw_structural_layer(&painter, rect, self.transform, options.show_grid);
        let brush = match &self.gesture {
            Gesture::Brush { anchor, current } => Some((*anchor, *current)),
            _ => None,
        };
        render::draw_content_layer(
            &painter,
            rect,
            self.transform,
            &render::ContentState {
                nodes: self.sim.nodes(),
                links: self.sim.links(),
                visuals: &self.visuals,
                selection: &self.selection,
                preview: &self.preview,
                search_matches,
                hover: self.hover,
                brush,
                show_labels: options.show_labels,
            },
        );

        if let Some(index) = self.hover
            && let Some(node) = self.sim.nodes().get(index)
        {
            ui.output_mut(|output| {
                output.cursor_icon = CursorIcon::PointingHand;
            });
            if let Some(visual) = self.visuals.get(&node.id) {
                render::draw_hover_readout(&painter, rect, node, visual);
            }
        }

        if sim_active || self.tween.is_some() || !self.gesture.is_idle() {
            ui.ctx().request_repaint();
        }
    }

    fn update_hover(&mut self, rect: Rect, pointer: Option<Pos2>, events: &mut dyn EngineEvents) {
        let next = pointer.and_then(|pos| self.hit_test(rect, pos));
        if next == self.hover {
            return;
        }

        self.hover = next;
        let node = next.and_then(|index| self.sim.nodes().get(index));
        events.node_hovered(pointer.unwrap_or_else(|| rect.center()), node);
    }

    fn hit_test(&self, rect: Rect, pointer: Pos2) -> Option<usize> {
        let radius = render::marker_radius(self.transform.scale) + 2.0;
        self.sim
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let screen = self.transform.layout_to_screen(rect, node.pos);
                let distance = screen.distance(pointer);
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    fn begin_gesture(&mut self, modifier: bool, layout: Vec2) {
        self.gesture = match self.hover {
            Some(index) if index < self.sim.nodes().len() => {
                let id = self.sim.nodes()[index].id.clone();
                self.sim.pin(index, layout);
                if self.sim.alpha_target() <= 0.0 {
                    self.sim.set_alpha_target(DRAG_ALPHA_TARGET);
                }
                Gesture::DragNode { id }
            }
            _ if modifier => Gesture::Brush {
                anchor: layout,
                current: layout,
            },
            _ => Gesture::Pan,
        };
        self.refresh_preview();
    }

    fn drag_to(&mut self, layout: Vec2, screen_delta: Vec2) {
        if matches!(self.gesture, Gesture::Pan) {
            self.transform.pan_by(screen_delta);
            return;
        }

        if let Gesture::DragNode { id } = &self.gesture {
            let id = id.clone();
            match self.sim.index_of(&id) {
                Some(index) => self.sim.pin(index, layout),
                None => self.abandon_gesture(),
            }
            return;
        }

        let mut brushed = false;
        if let Gesture::Brush { current, .. } = &mut self.gesture {
            *current = layout;
            brushed = true;
        }
        if brushed {
            self.refresh_preview();
        }
    }

    fn finish_gesture(
        &mut self,
        now: f64,
        pointer: Pos2,
        modifier: bool,
        events: &mut dyn EngineEvents,
    ) {
        let clicked = self.click_arm.release(now);
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);

        let mut subject = None;
        match gesture {
            Gesture::Idle | Gesture::Pan => {}
            Gesture::DragNode { id } => {
                if let Some(index) = self.sim.index_of(&id) {
                    self.sim.unpin(index);
                }
                self.sim.set_alpha_target(0.0);
                subject = Some(id);
            }
            Gesture::Brush { .. } => {
                self.selection.union_with(self.preview.drain());
            }
        }
        self.preview.clear();

        if !clicked {
            return;
        }

        match subject {
            Some(id) => {
                if modifier {
                    self.selection.toggle(&id);
                } else {
                    self.selection.replace_with(&id);
                }
                let node = self.sim.index_of(&id).and_then(|index| self.sim.nodes().get(index));
                events.node_clicked(pointer, node);
            }
            None => {
                if !modifier {
                    self.selection.clear();
                }
                events.node_clicked(pointer, None);
            }
        }
    }

    fn abandon_gesture(&mut self) {
        self.gesture = Gesture::Idle;
        self.preview.clear();
        self.sim.set_alpha_target(0.0);
    }

    fn refresh_preview(&mut self) {
        self.preview.clear();
        if let Gesture::Brush { anchor, current } = &self.gesture {
            selection::collect_in_rect(self.sim.nodes(), *anchor, *current, &mut self.preview);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{LinkSpec, NodeSpec};
    use eframe::egui::{pos2, vec2};

    #[derive(Default)]
    struct RecordedEvents {
        clicks: Vec<Option<String>>,
        hovers: Vec<Option<String>>,
    }

    impl EngineEvents for RecordedEvents {
        fn node_clicked(&mut self, _pointer: Pos2, node: Option<&SimNode>) {
            self.clicks.push(node.map(|node| node.id.clone()));
        }

        fn node_hovered(&mut self, _pointer: Pos2, node: Option<&SimNode>) {
            self.hovers.push(node.map(|node| node.id.clone()));
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            nodes: vec![
                NodeSpec {
                    id: "a".to_owned(),
                    group: 1,
                },
                NodeSpec {
                    id: "b".to_owned(),
                    group: 1,
                },
                NodeSpec {
                    id: "c".to_owned(),
                    group: 2,
                },
            ],
            links: vec![LinkSpec {
                source: "a".to_owned(),
                target: "b".to_owned(),
                value: 1.0,
            }],
        }
    }

    fn engine() -> Engine {
        let mut engine = Engine::new();
        engine.set_data(&dataset());
        engine.redraw();
        engine
    }

    #[test]
    fn redraw_rebuilds_one_visual_per_node_and_clears_state() {
        let mut engine = engine();
        engine.selection.replace_with("a");
        engine.hover = Some(1);
        engine.gesture = Gesture::Pan;

        engine.redraw();
        assert_eq!(engine.visuals.len(), 3);
        for id in ["a", "b", "c"] {
            assert!(engine.visuals.contains_key(id));
        }
        assert!(engine.selection.is_empty());
        assert!(engine.hover.is_none());
        assert!(engine.gesture.is_idle());
        assert_eq!(engine.alpha(), 1.0);
    }

    #[test]
    fn redraw_does_not_mutate_the_callers_dataset() {
        let data = dataset();
        let mut engine = Engine::new();
        engine.set_data(&data);
        engine.redraw();
        engine.redraw();
        assert_eq!(data, dataset());
    }

    #[test]
    fn reset_view_tweens_to_centered_content_at_scale_one() {
        let mut engine = engine();
        engine.transform = ViewTransform {
            translation: vec2(300.0, -200.0),
            scale: 2.5,
        };
        engine.reset_view(50.0);

        let tween = engine.tween.as_ref().unwrap();
        let (end, finished) = tween.sample(50.0 + transform::TWEEN_SECS);
        assert!(finished);
        assert_eq!(end.scale, 1.0);
        assert_eq!(end.translation, -engine.sim.centroid());
    }

    #[test]
    fn background_click_without_modifier_clears_selection_and_reports_null() {
        let mut engine = engine();
        let mut events = RecordedEvents::default();
        engine.selection.replace_with("a");

        engine.click_arm.arm(10.0);
        engine.gesture = Gesture::Pan;
        engine.finish_gesture(10.1, pos2(5.0, 5.0), false, &mut events);

        assert!(engine.selection.is_empty());
        assert_eq!(events.clicks, vec![None]);
    }

    #[test]
    fn node_click_replaces_selection_and_modifier_click_toggles() {
        let mut engine = engine();
        let mut events = RecordedEvents::default();
        engine.selection.replace_with("b");

        engine.click_arm.arm(10.0);
        engine.gesture = Gesture::DragNode { id: "a".to_owned() };
        engine.finish_gesture(10.1, pos2(5.0, 5.0), false, &mut events);
        assert_eq!(engine.selection.len(), 1);
        assert!(engine.selection.contains("a"));
        assert_eq!(events.clicks, vec![Some("a".to_owned())]);

        engine.click_arm.arm(20.0);
        engine.gesture = Gesture::DragNode { id: "c".to_owned() };
        engine.finish_gesture(20.1, pos2(5.0, 5.0), true, &mut events);
        assert!(engine.selection.contains("a"));
        assert!(engine.selection.contains("c"));

        engine.click_arm.arm(30.0);
        engine.gesture = Gesture::DragNode { id: "c".to_owned() };
        engine.finish_gesture(30.1, pos2(5.0, 5.0), true, &mut events);
        assert!(engine.selection.contains("a"));
        assert!(!engine.selection.contains("c"), "toggle removes it again");
    }

    #[test]
    fn slow_release_is_a_drag_not_a_click() {
        let mut engine = engine();
        let mut events = RecordedEvents::default();
        engine.selection.replace_with("a");

        engine.click_arm.arm(10.0);
        engine.gesture = Gesture::Pan;
        engine.finish_gesture(10.5, pos2(5.0, 5.0), false, &mut events);

        assert!(engine.selection.contains("a"), "selection untouched");
        assert!(events.clicks.is_empty());
    }

    #[test]
    fn brush_release_unions_into_existing_selection() {
        let mut engine = engine();
        let mut events = RecordedEvents::default();
        engine.selection.replace_with("c");

        let a_pos = engine.sim.nodes()[0].pos;
        engine.click_arm.arm(10.0);
        engine.gesture = Gesture::Brush {
            anchor: a_pos - vec2(1.0, 1.0),
            current: a_pos - vec2(1.0, 1.0),
        };
        engine.drag_to(a_pos + vec2(1.0, 1.0), Vec2::ZERO);
        assert!(engine.preview.contains("a"), "preview tracks the brush");

        engine.finish_gesture(11.0, pos2(5.0, 5.0), true, &mut events);
        assert!(engine.selection.contains("a"), "brushed node added");
        assert!(engine.selection.contains("c"), "existing selection kept");
        assert!(engine.preview.is_empty(), "overlay preview cleared");
    }

    #[test]
    fn node_drag_pins_and_release_restores_cooling() {
        let mut engine = engine();
        engine.hover = engine.sim.index_of("a");
        engine.begin_gesture(false, vec2(25.0, 25.0));

        assert!(matches!(&engine.gesture, Gesture::DragNode { id } if id == "a"));
        assert_eq!(engine.sim.alpha_target(), DRAG_ALPHA_TARGET);
        let index = engine.sim.index_of("a").unwrap();
        assert_eq!(engine.sim.nodes()[index].pos, vec2(25.0, 25.0));

        engine.drag_to(vec2(40.0, -10.0), Vec2::ZERO);
        assert_eq!(engine.sim.nodes()[index].pos, vec2(40.0, -10.0));

        let mut events = RecordedEvents::default();
        engine.finish_gesture(99.0, pos2(0.0, 0.0), false, &mut events);
        assert!(engine.gesture.is_idle());
        assert_eq!(engine.sim.alpha_target(), 0.0);
        assert!(engine.sim.nodes()[index].pin.is_none());
    }

    #[test]
    fn drag_whose_subject_vanished_is_abandoned_cleanly() {
        let mut engine = engine();
        engine.gesture = Gesture::DragNode {
            id: "ghost".to_owned(),
        };
        engine.sim.set_alpha_target(DRAG_ALPHA_TARGET);

        engine.drag_to(vec2(1.0, 1.0), Vec2::ZERO);
        assert!(engine.gesture.is_idle());
        assert_eq!(engine.sim.alpha_target(), 0.0);
        assert!(engine.preview.is_empty());
    }

    #[test]
    fn hover_changes_fire_the_hover_hook_once_per_change() {
        let mut engine = engine();
        let mut events = RecordedEvents::default();
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let index = engine.sim.index_of("b").unwrap();
        engine.sim.pin(index, vec2(10.0, 10.0));

        let over = engine.transform.layout_to_screen(rect, vec2(10.0, 10.0));
        engine.update_hover(rect, Some(over), &mut events);
        assert_eq!(engine.hover, Some(index));
        assert_eq!(events.hovers, vec![Some("b".to_owned())]);

        engine.update_hover(rect, Some(over), &mut events);
        assert_eq!(events.hovers.len(), 1, "no event while hover is unchanged");

        engine.update_hover(rect, None, &mut events);
        assert_eq!(engine.hover, None);
        assert_eq!(events.hovers.last(), Some(&None));
    }

    #[test]
    fn hit_test_finds_the_nearest_marker_under_the_pointer() {
        let mut engine = engine();
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let index = engine.sim.index_of("b").unwrap();
        engine.sim.pin(index, vec2(10.0, 10.0));

        let screen = engine.transform.layout_to_screen(rect, vec2(10.0, 10.0));
        assert_eq!(engine.hit_test(rect, screen), Some(index));
        assert_eq!(
            engine.hit_test(rect, screen + vec2(200.0, 200.0)),
            None,
            "far away pointer hits nothing"
        );
    }
}
