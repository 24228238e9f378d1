use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::dataset::Dataset;
use crate::util::stable_unit_pair;

use super::quadtree::QuadCell;

pub(in crate::app) const ALPHA_MIN: f32 = 0.001;
// 1 - ALPHA_MIN^(1/300): the layout settles in roughly 300 ticks
const ALPHA_DECAY: f32 = 0.022_763_8;
const BARNES_HUT_THETA: f32 = 0.8;
const LINK_STRENGTH: f32 = 0.08;
const CENTER_STRENGTH_X: f32 = 0.05;
const CENTER_STRENGTH_Y: f32 = 0.05;
const VELOCITY_DECAY: f32 = 0.4;
const MAX_FORCE: f32 = 80.0;
const MAX_SPEED: f32 = 24.0;
const SEED_SPREAD: f32 = 28.0;

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct SimulationConfig {
    pub repulsion: f32,
    pub link_distance: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            repulsion: 1600.0,
            link_distance: 60.0,
        }
    }
}

#[derive(Clone, Debug)]
pub(in crate::app) struct SimNode {
    pub id: String,
    pub group: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub pin: Option<Vec2>,
}

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct SimLink {
    pub source: usize,
    pub target: usize,
    #[allow(dead_code)]
    pub weight: f32,
}

pub(in crate::app) struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    index_by_id: HashMap<String, usize>,
    alpha: f32,
    alpha_target: f32,
    dropped_links: usize,
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
}

impl Simulation {
    pub(in crate::app) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            index_by_id: HashMap::new(),
            alpha: 0.0,
            alpha_target: 0.0,
            dropped_links: 0,
            forces: Vec::new(),
            positions: Vec::new(),
        }
    }

    pub(in crate::app) fn seed(dataset: &Dataset) -> Self {
        let mut nodes = Vec::with_capacity(dataset.nodes.len());
        let mut index_by_id = HashMap::with_capacity(dataset.nodes.len());
        let spread = (dataset.nodes.len().max(1) as f32).sqrt() * SEED_SPREAD;

        for (index, spec) in dataset.nodes.iter().enumerate() {
            let (jx, jy) = stable_unit_pair(&spec.id);
            let mut offset = vec2(jx, jy);
            if offset.length_sq() <= 0.0001 {
                let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
                offset = vec2(angle.cos(), angle.sin());
            }

            nodes.push(SimNode {
                id: spec.id.clone(),
                group: spec.group,
                pos: offset * spread,
                vel: Vec2::ZERO,
                pin: None,
            });
            index_by_id.insert(spec.id.clone(), index);
        }

        let mut links = Vec::with_capacity(dataset.links.len());
        let mut dropped_links = 0usize;
        for spec in &dataset.links {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&spec.source),
                index_by_id.get(&spec.target),
            ) else {
                dropped_links += 1;
                log::warn!(
                    "dropping link {} -> {}: endpoint not in node set",
                    spec.source,
                    spec.target
                );
                continue;
            };
            if source == target {
                dropped_links += 1;
                continue;
            }
            links.push(SimLink {
                source,
                target,
                weight: spec.value,
            });
        }

        Self {
            nodes,
            links,
            index_by_id,
            alpha: 1.0,
            alpha_target: 0.0,
            dropped_links,
            forces: Vec::new(),
            positions: Vec::new(),
        }
    }

    pub(in crate::app) fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub(in crate::app) fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub(in crate::app) fn dropped_links(&self) -> usize {
        self.dropped_links
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub(in crate::app) fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub(in crate::app) fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub(in crate::app) fn pin(&mut self, index: usize, pos: Vec2) {
        let Some(node) = self.nodes.get_mut(index) else {
            return;
        };
        node.pin = Some(pos);
        node.pos = pos;
        node.vel = Vec2::ZERO;
    }

    pub(in crate::app) fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = None;
        }
    }

    pub(in crate::app) fn centroid(&self) -> Vec2 {
        if self.nodes.is_empty() {
            return Vec2::ZERO;
        }
        let mut sum = Vec2::ZERO;
        for node in &self.nodes {
            sum += node.pos;
        }
        sum / self.nodes.len() as f32
    }

    pub(in crate::app) fn tick(&mut self, config: &SimulationConfig) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        if self.alpha < ALPHA_MIN && self.alpha_target <= 0.0 {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;

        let count = self.nodes.len();
        self.forces.resize(count, Vec2::ZERO);
        self.forces.fill(Vec2::ZERO);
        self.positions.clear();
        self.positions.extend(self.nodes.iter().map(|node| node.pos));

        if let Some(tree) = QuadCell::build(&self.positions) {
            let strength = config.repulsion.max(0.0) * self.alpha;
            for (index, force) in self.forces.iter_mut().enumerate() {
                tree.accumulate_repulsion(index, &self.positions, strength, BARNES_HUT_THETA, force);
            }
        }

        let rest = config.link_distance.max(1.0);
        for link in &self.links {
            let delta = self.positions[link.source] - self.positions[link.target];
            let distance_sq = delta.length_sq();
            if distance_sq <= 0.0001 {
                continue;
            }
            let distance = distance_sq.sqrt();
            let direction = delta / distance;
            let correction = direction * ((distance - rest) * LINK_STRENGTH * self.alpha);
            self.forces[link.source] -= correction;
            self.forces[link.target] += correction;
        }

        for (force, position) in self.forces.iter_mut().zip(&self.positions) {
            force.x -= position.x * CENTER_STRENGTH_X * self.alpha;
            force.y -= position.y * CENTER_STRENGTH_Y * self.alpha;
        }

        for (index, node) in self.nodes.iter_mut().enumerate() {
            if let Some(pin) = node.pin {
                node.pos = pin;
                node.vel = Vec2::ZERO;
                continue;
            }

            let mut force = self.forces[index];
            let force_sq = force.length_sq();
            if force_sq > MAX_FORCE * MAX_FORCE {
                force *= MAX_FORCE / force_sq.sqrt();
            }

            let mut velocity = (node.vel + force) * (1.0 - VELOCITY_DECAY);
            let speed_sq = velocity.length_sq();
            if speed_sq > MAX_SPEED * MAX_SPEED {
                velocity *= MAX_SPEED / speed_sq.sqrt();
            }

            node.vel = velocity;
            node.pos += velocity;
        }

        true
    }
}
