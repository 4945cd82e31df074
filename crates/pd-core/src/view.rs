//! Zoom/pan transform between view (device pixel) space and project space.
//!
//! Project space is the space polygons live in. At zoom 1 the two coincide:
//! the view center sits at the middle of the content rect `(0,0)–view_size`.

use kurbo::{Affine, Point, Rect, Size, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    view_size: Size,
    zoom: f64,
    /// Project point shown at the middle of the view.
    center: Point,
}

impl ViewTransform {
    pub fn new(view_size: Size) -> Self {
        Self {
            view_size,
            zoom: 1.0,
            center: (view_size.to_vec2() / 2.0).to_point(),
        }
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Resize the view. Resets zoom and pan.
    pub fn set_view_size(&mut self, view_size: Size) {
        *self = Self::new(view_size);
    }

    /// Project-space rectangle currently visible.
    pub fn visible_bounds(&self) -> Rect {
        Rect::from_center_size(self.center, self.view_size / self.zoom)
    }

    /// Project → view affine.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.view_size.to_vec2() / 2.0)
            * Affine::scale(self.zoom)
            * Affine::translate(-self.center.to_vec2())
    }

    pub fn project_to_view(&self, point: Point) -> Point {
        self.affine() * point
    }

    pub fn view_to_project(&self, point: Point) -> Point {
        self.affine().inverse() * point
    }

    /// Hit tolerance in project units so it stays `base` pixels on screen.
    pub fn hit_tolerance(&self, base: f64) -> f64 {
        base / self.zoom
    }

    /// Zoom one wheel step anchored at `anchor` (view space).
    ///
    /// Zooming in keeps the project point under the anchor fixed; zooming
    /// out to 1 or below snaps back to the unzoomed, centred view. After a
    /// zoom the visible bounds are clamped inside the content rect so the
    /// content never leaves the viewport. Returns the new zoom.
    pub fn zoom_at(&mut self, anchor: Point, zoom_in: bool, factor: f64) -> f64 {
        let old_zoom = self.zoom;
        let new_zoom = if zoom_in {
            old_zoom * (1.0 + factor)
        } else {
            old_zoom * (1.0 - factor)
        };

        if new_zoom <= 1.0 {
            self.zoom = 1.0;
            self.center = (self.view_size.to_vec2() / 2.0).to_point();
            return self.zoom;
        }

        let beta = old_zoom / new_zoom;
        let under_cursor = self.view_to_project(anchor);
        let from_center = under_cursor - self.center;
        let offset = under_cursor - from_center * beta - self.center;

        self.zoom = new_zoom;
        self.center += offset;
        self.clamp_to_content();
        self.zoom
    }

    fn clamp_to_content(&mut self) {
        let bounds = self.visible_bounds();
        let mut correction = Vec2::ZERO;

        if bounds.x0 < 0.0 {
            correction.x = -bounds.x0;
        } else if bounds.x1 > self.view_size.width {
            correction.x = self.view_size.width - bounds.x1;
        }

        if bounds.y0 < 0.0 {
            correction.y = -bounds.y0;
        } else if bounds.y1 > self.view_size.height {
            correction.y = self.view_size.height - bounds.y1;
        }

        self.center += correction;
    }
}
