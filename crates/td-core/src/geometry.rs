//! Geometry and coordinate transforms.
//!
//! Pure functions that run on every pointer-move while a gesture is active:
//! screen ↔ canvas conversion under zoom/pan, bounding-box clamping, resize
//! handle math, and rotation bearings. Nothing here allocates.
//!
//! Screen space is the host's pixel space (y down). Canvas space is the
//! fixed `[0, width] × [0, height]` design surface elements live in.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum element width after any resize.
pub const MIN_WIDTH: f64 = 50.0;
/// Minimum element height after any resize.
pub const MIN_HEIGHT: f64 = 30.0;
/// Default minimum size (`50 × 30`).
pub const MIN_SIZE: Size = Size::new(MIN_WIDTH, MIN_HEIGHT);

/// Return `v` if finite, otherwise `fallback`.
#[inline]
pub fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

/// Zoom factors must be finite and positive; anything else reads as 1.
#[inline]
fn sane_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 {
        zoom
    } else {
        1.0
    }
}

/// Convert a pointer delta in screen pixels to canvas units.
#[inline]
pub fn screen_delta_to_canvas_delta(delta: Vec2, zoom: f64) -> Vec2 {
    let zoom = sane_zoom(zoom);
    Vec2::new(finite_or(delta.x, 0.0) / zoom, finite_or(delta.y, 0.0) / zoom)
}

#[inline]
fn clamp_axis(v: f64, extent: f64, bound: f64) -> f64 {
    // `max` discards NaN, so `hi` is always a finite, non-negative number here.
    let hi = (bound - extent).max(0.0);
    finite_or(v, 0.0).clamp(0.0, hi)
}

/// Clamp `pos` so a box of `size` stays inside `canvas`.
///
/// Each axis is clamped independently to `[0, canvas.dim - size.dim]`.
/// When the box is larger than the canvas the origin pins to 0.
#[inline]
pub fn clamp_position(pos: Point, size: Size, canvas: Size) -> Point {
    Point::new(
        clamp_axis(pos.x, size.width, canvas.width),
        clamp_axis(pos.y, size.height, canvas.height),
    )
}

/// Enforce a minimum size. Non-finite dimensions collapse to the minimum.
#[inline]
pub fn clamp_size(size: Size, min: Size) -> Size {
    Size::new(
        finite_or(size.width, min.width).max(min.width),
        finite_or(size.height, min.height).max(min.height),
    )
}

/// Enforce a minimum and a maximum size. The minimum wins when the
/// two disagree (a canvas smaller than the minimum element).
#[inline]
pub fn clamp_size_within(size: Size, min: Size, max: Size) -> Size {
    let size = clamp_size(size, min);
    Size::new(
        size.width.min(max.width.max(min.width)),
        size.height.min(max.height.max(min.height)),
    )
}

/// Bearing of `pointer` around `center`, in degrees.
///
/// `atan2(dy, dx)` shifted by −90°. In y-down screen space this reads 0°
/// when the pointer sits directly *below* the centre, which is where the
/// rotation grip is drawn.
#[inline]
pub fn angle_from_center(pointer: Point, center: Point) -> f64 {
    (pointer.y - center.y)
        .atan2(pointer.x - center.x)
        .to_degrees()
        - 90.0
}

/// Rotate `point` around `center` by `degrees` (clockwise on screen).
#[inline]
pub fn rotate_point(point: Point, center: Point, degrees: f64) -> Point {
    Affine::rotate_about(finite_or(degrees, 0.0).to_radians(), center) * point
}

/// Visual transform of a box: scale then rotate, both about its centre.
pub fn box_transform(rect: Rect, rotation_deg: f64, scale: f64) -> Affine {
    let c = rect.center().to_vec2();
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    Affine::translate(c)
        * Affine::rotate(finite_or(rotation_deg, 0.0).to_radians())
        * Affine::scale(scale)
        * Affine::translate(-c)
}

// ─── Resize handles ──────────────────────────────────────────────────────

/// One of the eight resize grips on a selection frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::E,
        ResizeHandle::Se,
        ResizeHandle::S,
        ResizeHandle::Sw,
        ResizeHandle::W,
    ];

    /// Position of the grip as a fraction of the box, `(0,0)` = top-left.
    pub fn anchor_fraction(self) -> (f64, f64) {
        match self {
            ResizeHandle::Nw => (0.0, 0.0),
            ResizeHandle::N => (0.5, 0.0),
            ResizeHandle::Ne => (1.0, 0.0),
            ResizeHandle::E => (1.0, 0.5),
            ResizeHandle::Se => (1.0, 1.0),
            ResizeHandle::S => (0.5, 1.0),
            ResizeHandle::Sw => (0.0, 1.0),
            ResizeHandle::W => (0.0, 0.5),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResizeHandle::Nw => "nw",
            ResizeHandle::N => "n",
            ResizeHandle::Ne => "ne",
            ResizeHandle::E => "e",
            ResizeHandle::Se => "se",
            ResizeHandle::S => "s",
            ResizeHandle::Sw => "sw",
            ResizeHandle::W => "w",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    fn moves_west(self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::W | ResizeHandle::Sw)
    }

    fn moves_east(self) -> bool {
        matches!(self, ResizeHandle::Ne | ResizeHandle::E | ResizeHandle::Se)
    }

    fn moves_north(self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::N | ResizeHandle::Ne)
    }

    fn moves_south(self) -> bool {
        matches!(self, ResizeHandle::Sw | ResizeHandle::S | ResizeHandle::Se)
    }
}

/// Recompute a box after dragging `handle` by `delta` (canvas units).
///
/// The edge or corner opposite the handle is the anchor. Size is clamped
/// first (`min`, and `canvas` as the maximum); the origin is then rebuilt
/// from the anchor so a clamped west/north drag does not slide the box,
/// and finally the position is clamped into the canvas.
pub fn resize_from_handle(
    start: Rect,
    handle: ResizeHandle,
    delta: Vec2,
    min: Size,
    canvas: Size,
) -> Rect {
    let dx = finite_or(delta.x, 0.0);
    let dy = finite_or(delta.y, 0.0);
    let (mut x, mut y) = (start.x0, start.y0);
    let (mut w, mut h) = (start.width(), start.height());

    if handle.moves_west() {
        x += dx;
        w -= dx;
    } else if handle.moves_east() {
        w += dx;
    }
    if handle.moves_north() {
        y += dy;
        h -= dy;
    } else if handle.moves_south() {
        h += dy;
    }

    let size = clamp_size_within(Size::new(w, h), min, canvas);
    if handle.moves_west() {
        x = start.x1 - size.width;
    }
    if handle.moves_north() {
        y = start.y1 - size.height;
    }
    let origin = clamp_position(Point::new(x, y), size, canvas);
    Rect::from_origin_size(origin, size)
}

/// [`resize_from_handle`] for a box drawn at `scale` about its centre.
///
/// The drag is applied to the drawn frame, so the opposite grip stays put
/// on screen and the dragged grip follows the pointer; the result is the
/// unscaled box with the same centre. `min` is in unscaled units.
pub fn resize_scaled_from_handle(
    start: Rect,
    scale: f64,
    handle: ResizeHandle,
    delta: Vec2,
    min: Size,
    canvas: Size,
) -> Rect {
    if !(scale.is_finite() && scale > 0.0) || scale == 1.0 {
        return resize_from_handle(start, handle, delta, min, canvas);
    }
    let drawn = Rect::from_center_size(start.center(), start.size() * scale);
    let floor = min * scale;
    let (dx, dy) = (finite_or(delta.x, 0.0), finite_or(delta.y, 0.0));
    let (mut x0, mut y0, mut x1, mut y1) = (drawn.x0, drawn.y0, drawn.x1, drawn.y1);

    if handle.moves_west() {
        x0 = (x0 + dx).min(x1 - floor.width);
    } else if handle.moves_east() {
        x1 = (x1 + dx).max(x0 + floor.width);
    }
    if handle.moves_north() {
        y0 = (y0 + dy).min(y1 - floor.height);
    } else if handle.moves_south() {
        y1 = (y1 + dy).max(y0 + floor.height);
    }

    let resized = Rect::new(x0, y0, x1, y1);
    let rect = Rect::from_center_size(resized.center(), resized.size() / scale);
    // Canvas bounds apply to the stored box.
    let size = clamp_size_within(rect.size(), min, canvas);
    Rect::from_center_size(rect.center(), size)
}

// ─── Viewport ────────────────────────────────────────────────────────────

/// Zoom and pan applied between canvas space and screen space.
///
/// `screen = canvas * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl Viewport {
    pub fn zoom(&self) -> f64 {
        sane_zoom(self.zoom)
    }

    pub fn screen_to_canvas(&self, p: Point) -> Point {
        ((p.to_vec2() - self.pan) / self.zoom()).to_point()
    }

    pub fn canvas_to_screen(&self, p: Point) -> Point {
        (p.to_vec2() * self.zoom() + self.pan).to_point()
    }

    /// Canvas → screen as an affine map.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom())
    }

    /// Set the zoom factor, clamped to `[min, max]`. Returns true if it changed.
    pub fn set_zoom(&mut self, zoom: f64, min: f64, max: f64) -> bool {
        let next = sane_zoom(finite_or(zoom, self.zoom())).clamp(min, max.max(min));
        if (next - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = next;
        true
    }

    /// Multiply the zoom by `factor`, keeping the canvas point under the
    /// screen `anchor` fixed. Returns true if the zoom changed.
    pub fn zoom_around(&mut self, factor: f64, anchor: Point, min: f64, max: f64) -> bool {
        let pinned = self.screen_to_canvas(anchor);
        if !self.set_zoom(self.zoom() * sane_zoom(factor), min, max) {
            return false;
        }
        self.pan = anchor.to_vec2() - pinned.to_vec2() * self.zoom;
        true
    }

    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        let delta = Vec2::new(finite_or(delta.x, 0.0), finite_or(delta.y, 0.0));
        if delta == Vec2::ZERO {
            return false;
        }
        self.pan += delta;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Size = Size::new(1920.0, 1080.0);

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn screen_delta_divides_by_zoom() {
        let d = screen_delta_to_canvas_delta(Vec2::new(50.0, 30.0), 2.0);
        assert_eq!(d, Vec2::new(25.0, 15.0));
    }

    #[test]
    fn screen_delta_survives_bad_zoom() {
        assert_eq!(
            screen_delta_to_canvas_delta(Vec2::new(10.0, 10.0), f64::NAN),
            Vec2::new(10.0, 10.0)
        );
        assert_eq!(
            screen_delta_to_canvas_delta(Vec2::new(10.0, 10.0), 0.0),
            Vec2::new(10.0, 10.0)
        );
        assert_eq!(
            screen_delta_to_canvas_delta(Vec2::new(f64::NAN, 4.0), 1.0),
            Vec2::new(0.0, 4.0)
        );
    }

    #[test]
    fn clamp_position_keeps_box_inside() {
        let size = Size::new(200.0, 80.0);
        assert_eq!(
            clamp_position(Point::new(-5.0, 2000.0), size, CANVAS),
            Point::new(0.0, 1000.0)
        );
        assert_eq!(
            clamp_position(Point::new(1800.0, 10.0), size, CANVAS),
            Point::new(1720.0, 10.0)
        );
    }

    #[test]
    fn clamp_position_oversized_box_pins_origin() {
        let p = clamp_position(Point::new(40.0, 40.0), Size::new(3000.0, 80.0), CANVAS);
        assert_eq!(p, Point::new(0.0, 40.0));
    }

    #[test]
    fn clamp_size_enforces_minimum() {
        assert_eq!(clamp_size(Size::new(10.0, 5.0), MIN_SIZE), MIN_SIZE);
        assert_eq!(
            clamp_size(Size::new(f64::NAN, 90.0), MIN_SIZE),
            Size::new(50.0, 90.0)
        );
        assert_eq!(
            clamp_size_within(Size::new(5000.0, 10.0), MIN_SIZE, CANVAS),
            Size::new(1920.0, 30.0)
        );
    }

    #[test]
    fn angle_is_zero_below_center() {
        let c = Point::new(100.0, 100.0);
        assert!(approx(angle_from_center(Point::new(100.0, 150.0), c), 0.0));
        assert!(approx(angle_from_center(Point::new(150.0, 100.0), c), -90.0));
        assert!(approx(angle_from_center(Point::new(50.0, 100.0), c), 90.0));
    }

    #[test]
    fn rotate_point_quarter_turn() {
        let p = rotate_point(Point::new(10.0, 0.0), Point::ORIGIN, 90.0);
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 10.0));
    }

    #[test]
    fn resize_se_clamps_to_minimum_and_keeps_origin() {
        let start = Rect::new(10.0, 10.0, 70.0, 50.0);
        let r = resize_from_handle(
            start,
            ResizeHandle::Se,
            Vec2::new(-50.0, -20.0),
            MIN_SIZE,
            CANVAS,
        );
        assert_eq!(r, Rect::new(10.0, 10.0, 60.0, 40.0));
    }

    #[test]
    fn resize_nw_keeps_se_corner_anchored() {
        let start = Rect::new(10.0, 10.0, 70.0, 50.0);
        let r = resize_from_handle(
            start,
            ResizeHandle::Nw,
            Vec2::new(50.0, 20.0),
            MIN_SIZE,
            CANVAS,
        );
        // Clamped to 50×30, right/bottom edges stay at 70/50.
        assert_eq!(r, Rect::new(20.0, 20.0, 70.0, 50.0));
    }

    #[test]
    fn resize_edge_handles_touch_one_axis() {
        let start = Rect::new(100.0, 100.0, 300.0, 180.0);
        let e = resize_from_handle(start, ResizeHandle::E, Vec2::new(40.0, 99.0), MIN_SIZE, CANVAS);
        assert_eq!(e, Rect::new(100.0, 100.0, 340.0, 180.0));
        let n = resize_from_handle(start, ResizeHandle::N, Vec2::new(99.0, -20.0), MIN_SIZE, CANVAS);
        assert_eq!(n, Rect::new(100.0, 80.0, 300.0, 180.0));
    }

    #[test]
    fn scaled_resize_tracks_the_drawn_frame() {
        let start = Rect::new(100.0, 100.0, 300.0, 200.0);
        // Drawn at 2× the frame is (0,50)-(400,250); the east grip moves 40.
        let r = resize_scaled_from_handle(start, 2.0, ResizeHandle::E, Vec2::new(40.0, 0.0), MIN_SIZE, CANVAS);
        assert_eq!(r, Rect::new(110.0, 100.0, 330.0, 200.0));
        let drawn = box_transform(r, 0.0, 2.0).transform_rect_bbox(r);
        assert!(approx(drawn.x0, 0.0) && approx(drawn.x1, 440.0));

        // Shrinking stops at the minimum with the west edge still at 0 on screen.
        let r = resize_scaled_from_handle(start, 2.0, ResizeHandle::Se, Vec2::new(-1000.0, -1000.0), MIN_SIZE, CANVAS);
        assert_eq!(r, Rect::new(25.0, 65.0, 75.0, 95.0));

        let plain = resize_from_handle(start, ResizeHandle::E, Vec2::new(40.0, 0.0), MIN_SIZE, CANVAS);
        assert_eq!(
            resize_scaled_from_handle(start, 1.0, ResizeHandle::E, Vec2::new(40.0, 0.0), MIN_SIZE, CANVAS),
            plain
        );
    }

    #[test]
    fn resize_west_past_canvas_edge_is_clamped() {
        let start = Rect::new(10.0, 10.0, 110.0, 60.0);
        let r = resize_from_handle(start, ResizeHandle::W, Vec2::new(-50.0, 0.0), MIN_SIZE, CANVAS);
        assert!(r.x0 >= 0.0);
        assert!(r.x1 <= CANVAS.width);
        assert_eq!(r.width(), 150.0);
    }

    #[test]
    fn handle_names_roundtrip() {
        for h in ResizeHandle::ALL {
            assert_eq!(ResizeHandle::from_name(h.name()), Some(h));
        }
        assert_eq!(ResizeHandle::from_name("x"), None);
    }

    #[test]
    fn viewport_conversions_are_inverse() {
        let vp = Viewport {
            zoom: 2.0,
            pan: Vec2::new(30.0, -10.0),
        };
        let p = Point::new(12.0, 34.0);
        let back = vp.screen_to_canvas(vp.canvas_to_screen(p));
        assert!(approx(back.x, p.x) && approx(back.y, p.y));
        assert_eq!(vp.to_affine() * p, vp.canvas_to_screen(p));
    }

    #[test]
    fn zoom_around_pins_anchor() {
        let mut vp = Viewport::default();
        let anchor = Point::new(400.0, 300.0);
        let before = vp.screen_to_canvas(anchor);
        assert!(vp.zoom_around(2.0, anchor, 0.1, 8.0));
        let after = vp.screen_to_canvas(anchor);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
        assert!(approx(vp.zoom, 2.0));
    }

    #[test]
    fn set_zoom_respects_bounds() {
        let mut vp = Viewport::default();
        assert!(vp.set_zoom(100.0, 0.1, 8.0));
        assert_eq!(vp.zoom, 8.0);
        assert!(!vp.set_zoom(8.0, 0.1, 8.0));
        assert!(!vp.pan_by(Vec2::new(f64::NAN, 0.0)));
    }
}
