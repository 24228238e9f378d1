use std::collections::{HashMap, HashSet};

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2, pos2, vec2};

use crate::util::truncated;

use super::selection::SelectionSet;
use super::simulation::{SimLink, SimNode};
use super::transform::{MIN_SCALE, ViewTransform};

pub(in crate::app) const NODE_RADIUS: f32 = 7.0;
const LABEL_CHARS: usize = 24;

const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
const GRID_LABEL: Color32 = Color32::from_rgb(120, 130, 142);
const SELECTED_OUTLINE: Color32 = Color32::from_rgb(245, 206, 93);
const SEARCH_RING: Color32 = Color32::from_rgb(103, 196, 255);

const GROUP_PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

pub(in crate::app) struct NodeVisual {
    pub color: Color32,
    pub label: String,
}

pub(in crate::app) fn group_color(group: u32) -> Color32 {
    GROUP_PALETTE[(group as usize) % GROUP_PALETTE.len()]
}

pub(in crate::app) fn build_visuals(nodes: &[SimNode]) -> HashMap<String, NodeVisual> {
    nodes
        .iter()
        .map(|node| {
            (
                node.id.clone(),
                NodeVisual {
                    color: group_color(node.group),
                    label: truncated(&node.id, LABEL_CHARS).to_owned(),
                },
            )
        })
        .collect()
}

pub(in crate::app) fn marker_radius(scale: f32) -> f32 {
    (NODE_RADIUS * scale).clamp(2.0, 40.0)
}

fn lighten(color: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    Color32::from_rgb(
        ((color.r() as f32 * inverse) + (255.0 * amount)) as u8,
        ((color.g() as f32 * inverse) + (255.0 * amount)) as u8,
        ((color.b() as f32 * inverse) + (255.0 * amount)) as u8,
    )
}

fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;
    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

// layout-space grid spacing that lands between roughly 56 and 140 screen
// pixels at the given scale, snapped to a 1/2/5 ladder
pub(in crate::app) fn grid_step(scale: f32) -> f32 {
    let target = 56.0 / scale.max(MIN_SCALE);
    let magnitude = 10.0_f32.powf(target.log10().floor());
    let normalized = target / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

pub(in crate::app) fn draw_structural_layer(
    painter: &Painter,
    rect: Rect,
    transform: ViewTransform,
    show_grid: bool,
) {
    painter.rect_filled(rect, 0.0, BACKGROUND);
    if !show_grid {
        return;
    }

    let step = grid_step(transform.scale);
    let top_left = transform.screen_to_layout(rect, rect.left_top());
    let bottom_right = transform.screen_to_layout(rect, rect.right_bottom());
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));
    let font = FontId::proportional(10.0);

    let mut x = (top_left.x / step).floor() * step;
    while x <= bottom_right.x {
        let screen_x = transform.layout_to_screen(rect, vec2(x, 0.0)).x;
        painter.line_segment(
            [pos2(screen_x, rect.top()), pos2(screen_x, rect.bottom())],
            stroke,
        );
        painter.text(
            pos2(screen_x + 3.0, rect.bottom() - 3.0),
            Align2::LEFT_BOTTOM,
            format!("{x:.0}"),
            font.clone(),
            GRID_LABEL,
        );
        x += step;
    }

    let mut y = (top_left.y / step).floor() * step;
    while y <= bottom_right.y {
        let screen_y = transform.layout_to_screen(rect, vec2(0.0, y)).y;
        painter.line_segment(
            [pos2(rect.left(), screen_y), pos2(rect.right(), screen_y)],
            stroke,
        );
        painter.text(
            pos2(rect.left() + 4.0, screen_y + 2.0),
            Align2::LEFT_TOP,
            format!("{y:.0}"),
            font.clone(),
            GRID_LABEL,
        );
        y += step;
    }
}

pub(in crate::app) struct ContentState<'a> {
    pub nodes: &'a [SimNode],
    pub links: &'a [SimLink],
    pub visuals: &'a HashMap<String, NodeVisual>,
    pub selection: &'a SelectionSet,
    pub preview: &'a HashSet<String>,
    pub search_matches: Option<&'a HashSet<String>>,
    pub hover: Option<usize>,
    pub brush: Option<(Vec2, Vec2)>,
    pub show_labels: bool,
}

pub(in crate::app) fn draw_content_layer(
    painter: &Painter,
    rect: Rect,
    transform: ViewTransform,
    state: &ContentState<'_>,
) {
    let radius = marker_radius(transform.scale);
    let edge_stroke = Stroke::new(
        (1.1 * transform.scale.sqrt()).clamp(0.5, 3.0),
        Color32::from_rgba_unmultiplied(96, 104, 114, 150),
    );

    for link in state.links {
        let start = transform.layout_to_screen(rect, state.nodes[link.source].pos);
        let end = transform.layout_to_screen(rect, state.nodes[link.target].pos);
        if !segment_visible(rect, start, end, 2.0) {
            continue;
        }
        painter.line_segment([start, end], edge_stroke);
    }

    for (index, node) in state.nodes.iter().enumerate() {
        let position = transform.layout_to_screen(rect, node.pos);
        if !circle_visible(rect, position, radius + 4.0) {
            continue;
        }
        let Some(visual) = state.visuals.get(&node.id) else {
            continue;
        };

        let selected = state.selection.contains(&node.id) || state.preview.contains(&node.id);
        let hovered = state.hover == Some(index);
        let matched = state
            .search_matches
            .is_some_and(|matches| matches.contains(&node.id));

        let fill = if hovered {
            lighten(visual.color, 0.25)
        } else {
            visual.color
        };
        painter.circle_filled(position, radius, fill);

        let outline = if selected {
            Stroke::new(2.2, SELECTED_OUTLINE)
        } else {
            Stroke::new(1.2, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
        };
        painter.circle_stroke(position, radius, outline);

        if matched {
            painter.circle_stroke(position, radius + 3.0, Stroke::new(1.4, SEARCH_RING));
        }

        if state.show_labels && (hovered || selected || radius > 4.0) {
            painter.text(
                position + vec2(radius + 4.0, 0.0),
                Align2::LEFT_CENTER,
                &visual.label,
                FontId::proportional(12.0),
                Color32::from_gray(225),
            );
        }
    }

    if let Some((anchor, current)) = state.brush {
        let a = transform.layout_to_screen(rect, anchor);
        let b = transform.layout_to_screen(rect, current);
        let brush_rect = Rect::from_two_pos(a, b);
        painter.rect_filled(
            brush_rect,
            0.0,
            Color32::from_rgba_unmultiplied(106, 198, 255, 26),
        );

        let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(106, 198, 255, 180));
        painter.line_segment([brush_rect.left_top(), brush_rect.right_top()], stroke);
        painter.line_segment([brush_rect.right_top(), brush_rect.right_bottom()], stroke);
        painter.line_segment([brush_rect.right_bottom(), brush_rect.left_bottom()], stroke);
        painter.line_segment([brush_rect.left_bottom(), brush_rect.left_top()], stroke);
    }
}

pub(in crate::app) fn draw_hover_readout(
    painter: &Painter,
    rect: Rect,
    node: &SimNode,
    visual: &NodeVisual,
) {
    let readout = format!(
        "{}  |  group {}  |  ({:.0}, {:.0})",
        visual.label, node.group, node.pos.x, node.pos.y
    );
    painter.text(
        rect.left_top() + vec2(10.0, 10.0),
        Align2::LEFT_TOP,
        readout,
        FontId::proportional(13.0),
        Color32::from_gray(240),
    );
}
