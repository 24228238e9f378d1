use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 4;
const MAX_DEPTH: usize = 12;
const SOFTENING: f32 = 400.0;

pub(super) struct QuadCell {
    center: Vec2,
    half_extent: f32,
    center_of_mass: Vec2,
    mass: f32,
    points: Vec<usize>,
    children: [Option<Box<QuadCell>>; 4],
}

impl QuadCell {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        if positions.is_empty() {
            return None;
        }

        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for position in positions {
            min.x = min.x.min(position.x);
            min.y = min.y.min(position.y);
            max.x = max.x.max(position.x);
            max.y = max.y.max(position.y);
        }
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let center = (min + max) * 0.5;
        let half_extent = ((max.x - min.x).max(max.y - min.y) * 0.5).max(1.0) + 1.0;
        let points = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_cell(center, half_extent, points, positions, 0))
    }

    fn build_cell(
        center: Vec2,
        half_extent: f32,
        points: Vec<usize>,
        positions: &[Vec2],
        depth: usize,
    ) -> Self {
        let mass = points.len() as f32;
        let mut center_of_mass = Vec2::ZERO;
        for &point in &points {
            center_of_mass += positions[point];
        }
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut cell = Self {
            center,
            half_extent,
            center_of_mass,
            mass,
            points,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || cell.points.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &point in &cell.points {
            buckets[cell.quadrant(positions[point])].push(point);
        }
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        let quarter = half_extent * 0.5;
        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let offset = match quadrant {
                0 => vec2(-quarter, -quarter),
                1 => vec2(quarter, -quarter),
                2 => vec2(-quarter, quarter),
                _ => vec2(quarter, quarter),
            };
            cell.children[quadrant] = Some(Box::new(Self::build_cell(
                center + offset,
                quarter,
                bucket,
                positions,
                depth + 1,
            )));
        }
        cell.points.clear();
        cell
    }

    fn quadrant(&self, point: Vec2) -> usize {
        ((point.x >= self.center.x) as usize) | (((point.y >= self.center.y) as usize) << 1)
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }

    fn contains(&self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    pub(super) fn accumulate_repulsion(
        &self,
        index: usize,
        positions: &[Vec2],
        strength: f32,
        theta: f32,
        force: &mut Vec2,
    ) {
        if self.mass <= 0.0 {
            return;
        }
        let point = positions[index];

        if self.is_leaf() {
            for &other in &self.points {
                if other == index {
                    continue;
                }
                *force += repulsion_kernel(point, positions[other], 1.0, strength, other);
            }
            return;
        }

        let delta = point - self.center_of_mass;
        let distance_sq = delta.length_sq().max(0.0001);
        let distance = distance_sq.sqrt();
        if !self.contains(point) && (self.half_extent * 2.0) / distance < theta {
            *force += (delta / distance) * (strength * self.mass / (distance_sq + SOFTENING));
            return;
        }

        for child in self.children.iter().flatten() {
            child.accumulate_repulsion(index, positions, strength, theta, force);
        }
    }
}

fn repulsion_kernel(point: Vec2, other: Vec2, mass: f32, strength: f32, other_index: usize) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq();
    let direction = if distance_sq > 0.0001 {
        delta / distance_sq.sqrt()
    } else {
        // coincident points get a deterministic spread direction
        let angle = ((other_index as f32) * 0.618_034 + 0.29) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    };
    direction * (strength * mass / (distance_sq + SOFTENING))
}
