//! Reset / fit / zoom / pan / fullscreen on top of a [`ViewBox`].

use crate::config::ViewerConfig;
use crate::geometry::{Bounds, Point};
use crate::viewport::{DragState, ScreenSize, ViewBox, ZoomDirection};

#[derive(Debug, Clone)]
pub struct ViewControls {
    config: ViewerConfig,
    view: ViewBox,
    /// Window produced by the last fit; `reset` returns here.
    fitted: ViewBox,
    screen: ScreenSize,
    /// Screen size to restore when leaving fullscreen.
    windowed_screen: Option<ScreenSize>,
    content: Option<Bounds>,
    drag: DragState,
}

impl ViewControls {
    pub fn new(config: ViewerConfig, screen: ScreenSize) -> Self {
        let view = ViewBox::new(0.0, 0.0, screen.width, screen.height);
        Self {
            config,
            view,
            fitted: view,
            screen,
            windowed_screen: None,
            content: None,
            drag: DragState::default(),
        }
    }

    pub fn view(&self) -> ViewBox {
        self.view
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn is_fullscreen(&self) -> bool {
        self.windowed_screen.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active
    }

    /// New content bounds; refits the view.
    pub fn set_content(&mut self, bounds: Bounds) {
        self.content = Some(bounds);
        self.fit();
    }

    pub fn clear_content(&mut self) {
        self.content = None;
        self.drag = DragState::default();
        self.view = ViewBox::new(0.0, 0.0, self.screen.width, self.screen.height);
        self.fitted = self.view;
    }

    pub fn fit(&mut self) {
        let Some(bounds) = self.content else {
            return;
        };
        self.view = ViewBox::fit(&bounds, self.screen, self.config.fit_margin);
        self.fitted = self.view;
    }

    pub fn reset(&mut self) {
        self.drag = DragState::default();
        self.view = self.fitted;
    }

    /// A step may end outside `[min_view_width, max_view_width]` only when it moves back toward
    /// that range, so content fitted wider than the limit can still be zoomed into.
    fn accepts(&self, candidate: &ViewBox) -> bool {
        if !(candidate.w.is_finite() && candidate.w > 0.0) {
            return false;
        }
        if candidate.w < self.config.min_view_width {
            return candidate.w > self.view.w;
        }
        if candidate.w > self.config.max_view_width {
            return candidate.w < self.view.w;
        }
        true
    }

    /// Applies `candidate` unless it leaves the zoom limits. Returns whether the view changed.
    fn apply_zoom(&mut self, candidate: ViewBox) -> bool {
        if !self.accepts(&candidate) {
            tracing::debug!(width = candidate.w, "zoom outside limits ignored");
            return false;
        }
        self.view = candidate;
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.apply_zoom(self.view.zoom_in())
    }

    pub fn zoom_out(&mut self) -> bool {
        self.apply_zoom(self.view.zoom_out())
    }

    pub fn zoom_about(&mut self, direction: ZoomDirection, focus: Point) -> bool {
        self.apply_zoom(self.view.zoom_about(direction.scale(), focus))
    }

    /// Wheel event at screen position `(sx, sy)`.
    pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) -> bool {
        let Some(direction) = ZoomDirection::from_wheel_delta(delta_y) else {
            return false;
        };
        self.apply_zoom(self.view.zoom_at_screen(direction, sx, sy, self.screen))
    }

    pub fn pointer_down(&mut self, sx: f64, sy: f64) {
        self.drag.begin(sx, sy, self.view);
    }

    pub fn pointer_move(&mut self, sx: f64, sy: f64) -> bool {
        match self.drag.update(sx, sy, self.screen) {
            Some(view) => {
                self.view = view;
                true
            }
            None => false,
        }
    }

    /// Ends a drag. Returns `true` when the press never travelled past the click slop, i.e. the
    /// gesture was a click rather than a pan.
    pub fn pointer_up(&mut self) -> bool {
        if !self.drag.active {
            return false;
        }
        let view_start = self.drag.view_start;
        let is_click = self.drag.end() <= self.config.click_slop;
        // A click leaves the canvas where it was before the press.
        if let Some(view) = view_start.filter(|_| is_click) {
            self.view = view;
        }
        is_click
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
        self.view.screen_to_world(sx, sy, self.screen)
    }

    pub fn resize(&mut self, screen: ScreenSize) {
        self.screen = screen;
        self.fit();
    }

    /// Enters fullscreen with the given display size, or leaves it. Either way the view refits.
    pub fn toggle_fullscreen(&mut self, fullscreen_screen: ScreenSize) {
        if self.is_fullscreen() {
            self.exit_fullscreen();
        } else {
            self.windowed_screen = Some(self.screen);
            self.resize(fullscreen_screen);
        }
    }

    /// Also used when fullscreen ends outside the controls (e.g. the Escape key).
    pub fn exit_fullscreen(&mut self) {
        if let Some(screen) = self.windowed_screen.take() {
            self.resize(screen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> ViewControls {
        let mut c = ViewControls::new(ViewerConfig::default(), ScreenSize::new(800.0, 600.0));
        c.set_content(Bounds::from_rect(0.0, 0.0, 1000.0, 500.0));
        c
    }

    #[test]
    fn reset_returns_to_the_last_fit() {
        let mut c = controls();
        let fitted = c.view();
        assert!(c.zoom_in());
        c.pointer_down(10.0, 10.0);
        c.pointer_move(60.0, 10.0);
        assert!(!c.pointer_up());
        assert_ne!(c.view(), fitted);
        c.reset();
        assert_eq!(c.view(), fitted);
    }

    #[test]
    fn zoom_is_limited() {
        let mut c = controls();
        let mut steps = 0;
        while c.zoom_in() {
            steps += 1;
            assert!(steps < 1000);
        }
        assert!(c.view().w >= c.config().min_view_width);
        while c.zoom_out() {
            steps += 1;
            assert!(steps < 2000);
        }
        assert!(c.view().w <= c.config().max_view_width);
    }

    #[test]
    fn short_press_is_a_click() {
        let mut c = controls();
        let before = c.view();
        c.pointer_down(100.0, 100.0);
        c.pointer_move(101.0, 101.0);
        assert!(c.pointer_up());
        assert!(!c.is_dragging());
        assert_eq!(c.view(), before);
    }

    #[test]
    fn oversized_content_can_still_be_zoomed_into() {
        let mut c = ViewControls::new(ViewerConfig::default(), ScreenSize::new(800.0, 600.0));
        c.set_content(Bounds::from_rect(0.0, 0.0, 60_000.0, 400.0));
        let fitted = c.view();
        assert!(fitted.w > c.config().max_view_width);

        assert!(c.zoom_in());
        let zoomed = c.view();
        assert!(zoomed.w < fitted.w);
        assert!(!c.zoom_out());
        assert_eq!(c.view(), zoomed);

        while c.view().w > c.config().max_view_width {
            assert!(c.zoom_in());
        }
        assert!(c.view().w <= c.config().max_view_width);
    }

    #[test]
    fn fullscreen_toggle_refits_and_restores() {
        let mut c = controls();
        let windowed = c.view();
        c.toggle_fullscreen(ScreenSize::new(1920.0, 1080.0));
        assert!(c.is_fullscreen());
        let full = c.view();
        assert!((full.w / full.h - 1920.0 / 1080.0).abs() < 1e-9);

        c.toggle_fullscreen(ScreenSize::new(1920.0, 1080.0));
        assert!(!c.is_fullscreen());
        assert_eq!(c.screen(), ScreenSize::new(800.0, 600.0));
        assert_eq!(c.view(), windowed);
    }

    #[test]
    fn wheel_without_delta_does_nothing() {
        let mut c = controls();
        let before = c.view();
        assert!(!c.wheel(0.0, 10.0, 10.0));
        assert!(c.wheel(-120.0, 10.0, 10.0));
        assert!(c.view().w < before.w);
    }
}
