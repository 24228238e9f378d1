use eframe::egui::{Pos2, Rect, Vec2};

pub(in crate::app) const MIN_SCALE: f32 = 0.05;
pub(in crate::app) const MAX_SCALE: f32 = 6.0;
pub(in crate::app) const TWEEN_SECS: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ViewTransform {
    pub translation: Vec2,
    pub scale: f32,
}

impl ViewTransform {
    pub(in crate::app) const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        scale: 1.0,
    };

    pub(in crate::app) fn layout_to_screen(self, rect: Rect, layout: Vec2) -> Pos2 {
        rect.center() + self.translation + layout * self.scale
    }

    pub(in crate::app) fn screen_to_layout(self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.translation) / self.scale
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.translation += delta;
    }

    pub(in crate::app) fn zoom_about(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        let anchor = self.screen_to_layout(rect, pointer);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.translation = pointer - rect.center() - anchor * self.scale;
    }

    fn lerp(start: Self, end: Self, t: f32) -> Self {
        Self {
            translation: start.translation + (end.translation - start.translation) * t,
            scale: start.scale + (end.scale - start.scale) * t,
        }
    }
}

pub(in crate::app) struct ViewTween {
    start: ViewTransform,
    target: ViewTransform,
    started_at: f64,
}

impl ViewTween {
    pub(in crate::app) fn new(start: ViewTransform, target: ViewTransform, now: f64) -> Self {
        Self {
            start,
            target,
            started_at: now,
        }
    }

    pub(in crate::app) fn target(&self) -> ViewTransform {
        self.target
    }

    // snaps to the exact target value on the final frame
    pub(in crate::app) fn sample(&self, now: f64) -> (ViewTransform, bool) {
        let t = ((now - self.started_at) / TWEEN_SECS).clamp(0.0, 1.0);
        if t >= 1.0 {
            (self.target, true)
        } else {
            (ViewTransform::lerp(self.start, self.target, t as f32), false)
        }
    }
}
