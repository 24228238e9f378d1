use eframe::egui::{Pos2, Vec2};

pub(in crate::app) const CLICK_WINDOW_SECS: f64 = 0.2;

// Pointer-down timestamp used to tell clicks from drags. Movement does not
// disarm it; only release, canvas re-entry, or the window elapsing do.
#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct ClickArm {
    armed_at: Option<f64>,
}

impl ClickArm {
    pub(in crate::app) fn arm(&mut self, now: f64) {
        self.armed_at = Some(now);
    }

    pub(in crate::app) fn disarm(&mut self) {
        self.armed_at = None;
    }

    pub(in crate::app) fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    pub(in crate::app) fn expire(&mut self, now: f64) {
        if self.armed_at.is_some_and(|at| now - at >= CLICK_WINDOW_SECS) {
            self.armed_at = None;
        }
    }

    pub(in crate::app) fn release(&mut self, now: f64) -> bool {
        self.armed_at
            .take()
            .is_some_and(|at| now - at < CLICK_WINDOW_SECS)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum Gesture {
    Idle,
    DragNode { id: String },
    Pan,
    Brush { anchor: Vec2, current: Vec2 },
}

impl Gesture {
    pub(in crate::app) fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

pub(in crate::app) struct PointerFrame {
    pub time: f64,
    pub pos: Option<Pos2>,
    pub delta: Vec2,
    pub primary_pressed: bool,
    pub primary_released: bool,
    pub modifier: bool,
    pub scroll: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_inside_the_window_is_a_click() {
        let mut arm = ClickArm::default();
        arm.arm(5.0);
        assert!(arm.release(5.0 + 0.199));
        assert!(!arm.is_armed());
    }

    #[test]
    fn release_at_or_past_the_window_is_not_a_click() {
        let mut arm = ClickArm::default();
        arm.arm(5.0);
        assert!(!arm.release(5.0 + CLICK_WINDOW_SECS));

        arm.arm(8.0);
        assert!(!arm.release(9.0));
    }

    #[test]
    fn release_without_an_armed_press_is_not_a_click() {
        let mut arm = ClickArm::default();
        assert!(!arm.release(1.0));
    }

    #[test]
    fn disarm_clears_the_pending_click() {
        let mut arm = ClickArm::default();
        arm.arm(5.0);
        arm.disarm();
        assert!(!arm.is_armed());
        assert!(!arm.release(5.05));
    }

    #[test]
    fn expire_only_fires_after_the_window() {
        let mut arm = ClickArm::default();
        arm.arm(5.0);
        arm.expire(5.1);
        assert!(arm.is_armed());
        arm.expire(5.0 + CLICK_WINDOW_SECS);
        assert!(!arm.is_armed());
    }

    #[test]
    fn rearming_restarts_the_window() {
        let mut arm = ClickArm::default();
        arm.arm(5.0);
        arm.arm(5.5);
        assert!(arm.release(5.6));
    }
}
