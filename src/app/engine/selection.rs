use std::collections::HashSet;

use eframe::egui::Vec2;

use super::simulation::SimNode;

#[derive(Clone, Debug, Default)]
pub(in crate::app) struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    pub(in crate::app) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(in crate::app) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(in crate::app) fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub(in crate::app) fn clear(&mut self) {
        self.ids.clear();
    }

    pub(in crate::app) fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_owned());
        }
    }

    pub(in crate::app) fn replace_with(&mut self, id: &str) {
        self.ids.clear();
        self.ids.insert(id.to_owned());
    }

    pub(in crate::app) fn union_with(&mut self, ids: impl IntoIterator<Item = String>) {
        self.ids.extend(ids);
    }

    pub(in crate::app) fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

// closed bounds: nodes exactly on the rectangle edge are included
pub(in crate::app) fn collect_in_rect(
    nodes: &[SimNode],
    anchor: Vec2,
    current: Vec2,
    out: &mut HashSet<String>,
) {
    let min_x = anchor.x.min(current.x);
    let max_x = anchor.x.max(current.x);
    let min_y = anchor.y.min(current.y);
    let max_y = anchor.y.max(current.y);

    for node in nodes {
        if node.pos.x >= min_x && node.pos.x <= max_x && node.pos.y >= min_y && node.pos.y <= max_y
        {
            out.insert(node.id.clone());
        }
    }
}
