//! The SVG viewBox window and the transforms that move it.

use crate::geometry::{Bounds, Point, finite_or};
use serde::{Deserialize, Serialize};

/// Scale step for one zoom click or wheel notch.
pub const ZOOM_FACTOR: f64 = 1.1;
/// Applied to fitted content larger than the screen.
pub const FIT_SLACK: f64 = 1.1;
/// Applied to fitted content smaller than the screen.
pub const FIT_PADDING: f64 = 1.25;

/// Pixel size of the element the schematic is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect(&self) -> Option<f64> {
        self.is_usable().then(|| self.width / self.height)
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Multiplier applied to the viewBox size.
    pub fn scale(self) -> f64 {
        match self {
            Self::In => 1.0 / ZOOM_FACTOR,
            Self::Out => ZOOM_FACTOR,
        }
    }

    /// Wheel convention: scrolling down (positive delta) zooms out.
    pub fn from_wheel_delta(delta_y: f64) -> Option<Self> {
        if delta_y > 0.0 {
            Some(Self::Out)
        } else if delta_y < 0.0 {
            Some(Self::In)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Default for ViewBox {
    fn default() -> Self {
        Self::new(0.0, 0.0, 800.0, 600.0)
    }
}

impl ViewBox {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Encloses `bounds` plus `margin`, matched to the screen's aspect ratio and centred on the
    /// content.
    pub fn fit(bounds: &Bounds, screen: ScreenSize, margin: f64) -> Self {
        let margin = finite_or(margin, 0.0).max(0.0);
        let mut w = finite_or(bounds.width(), 0.0).max(0.0) + margin * 2.0;
        let mut h = finite_or(bounds.height(), 0.0).max(0.0) + margin * 2.0;

        if screen.is_usable() {
            if w > screen.width || h > screen.height {
                w *= FIT_SLACK;
                h *= FIT_SLACK;
            } else {
                w *= FIT_PADDING;
                h *= FIT_PADDING;
            }
        }
        w = w.max(1.0);
        h = h.max(1.0);

        if let Some(aspect) = screen.aspect() {
            if w / h < aspect {
                w = h * aspect;
            } else {
                h = w / aspect;
            }
        }

        let c = bounds.center().or(Point::new(0.0, 0.0));
        Self::new(c.x - w / 2.0, c.y - h / 2.0, w, h)
    }

    /// Scales the window by `scale` keeping `focus` at the same place on screen.
    pub fn zoom_about(&self, scale: f64, focus: Point) -> Self {
        if !(scale.is_finite() && scale > 0.0) {
            return *self;
        }
        let focus = focus.or(self.center());
        Self::new(
            focus.x - (focus.x - self.x) * scale,
            focus.y - (focus.y - self.y) * scale,
            self.w * scale,
            self.h * scale,
        )
    }

    pub fn zoom(&self, direction: ZoomDirection) -> Self {
        self.zoom_about(direction.scale(), self.center())
    }

    pub fn zoom_in(&self) -> Self {
        self.zoom(ZoomDirection::In)
    }

    pub fn zoom_out(&self) -> Self {
        self.zoom(ZoomDirection::Out)
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64, screen: ScreenSize) -> Point {
        if !screen.is_usable() {
            return self.center();
        }
        Point::new(
            self.x + sx / screen.width * self.w,
            self.y + sy / screen.height * self.h,
        )
    }

    /// Wheel zoom: the world point under the pointer stays under the pointer.
    pub fn zoom_at_screen(
        &self,
        direction: ZoomDirection,
        sx: f64,
        sy: f64,
        screen: ScreenSize,
    ) -> Self {
        let focus = self.screen_to_world(sx, sy, screen);
        self.zoom_about(direction.scale(), focus)
    }

    /// Moves the window so content follows a pointer moved by `(dx, dy)` screen pixels.
    pub fn pan_by_screen(&self, dx: f64, dy: f64, screen: ScreenSize) -> Self {
        if !screen.is_usable() {
            return *self;
        }
        let dx = finite_or(dx, 0.0) * self.w / screen.width;
        let dy = finite_or(dy, 0.0) * self.h / screen.height;
        Self::new(self.x - dx, self.y - dy, self.w, self.h)
    }

    pub fn to_attr(&self) -> String {
        use crate::svg::fmt;
        format!(
            "{} {} {} {}",
            fmt(self.x),
            fmt(self.y),
            fmt(self.w),
            fmt(self.h)
        )
    }
}

/// Pointer-held panning. Positions are screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    pub active: bool,
    pub start_x: f64,
    pub start_y: f64,
    pub view_start: Option<ViewBox>,
    /// Largest distance the pointer has travelled from the press point.
    pub travel: f64,
}

impl DragState {
    pub fn begin(&mut self, sx: f64, sy: f64, view: ViewBox) {
        *self = Self {
            active: true,
            start_x: sx,
            start_y: sy,
            view_start: Some(view),
            travel: 0.0,
        };
    }

    /// The viewBox for the pointer now at `(sx, sy)`, or `None` when no drag is in progress.
    pub fn update(&mut self, sx: f64, sy: f64, screen: ScreenSize) -> Option<ViewBox> {
        if !self.active {
            return None;
        }
        let view = self.view_start?;
        let (dx, dy) = (sx - self.start_x, sy - self.start_y);
        self.travel = self.travel.max(finite_or((dx * dx + dy * dy).sqrt(), 0.0));
        Some(view.pan_by_screen(dx, dy, screen))
    }

    /// Ends the drag and returns how far the pointer travelled.
    pub fn end(&mut self) -> f64 {
        let travel = self.travel;
        *self = Self::default();
        travel
    }
}
