//! Zoom/pan behaviour over the map layers.
//!
//! Mirrors the usual web zoom semantics: the wheel scales by
//! `2^(-deltaY * 0.002)` about the pointer, drags translate, and every
//! transform keeps `k` within the scale extent.

use foundation::math::Vec2;
use scene::ZoomTransform;

pub const WHEEL_DELTA_FACTOR: f64 = 0.002;

/// Smallest scale the extent may reach. `k` must stay positive for
/// `ZoomTransform::invert`.
pub const MIN_SCALE_FLOOR: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    transform: ZoomTransform,
    min_scale: f64,
    max_scale: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(min_scale: f64, max_scale: f64, width: f64, height: f64) -> Self {
        let mut viewport = Self {
            transform: ZoomTransform::identity(),
            min_scale: 1.0,
            max_scale: 1.0,
            width,
            height,
        };
        viewport.rebuild(min_scale, max_scale);
        viewport
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn scale_extent(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Installs a new scale extent and re-clamps the current scale about the
    /// viewport center. Returns `true` if the transform changed.
    ///
    /// Reversed bounds are swapped and both are floored at
    /// [`MIN_SCALE_FLOOR`].
    pub fn rebuild(&mut self, min_scale: f64, max_scale: f64) -> bool {
        let (lo, hi) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        self.min_scale = lo.max(MIN_SCALE_FLOOR);
        self.max_scale = hi.max(MIN_SCALE_FLOOR);
        let k = self.transform.k;
        let clamped = self.clamp_scale(k);
        if clamped == k {
            return false;
        }
        self.transform = self.scaled_about(self.center(), clamped);
        true
    }

    pub fn clamp_scale(&self, k: f64) -> f64 {
        if !k.is_finite() {
            return self.transform.k;
        }
        k.clamp(self.min_scale, self.max_scale)
    }

    pub fn wheel(&mut self, delta_y: f64, anchor: Vec2) -> ZoomTransform {
        let k = self.transform.k * 2f64.powf(-delta_y * WHEEL_DELTA_FACTOR);
        self.transform = self.scaled_about(anchor, self.clamp_scale(k));
        self.transform
    }

    pub fn drag(&mut self, delta: Vec2) -> ZoomTransform {
        let t = self.transform;
        self.transform = ZoomTransform::new(t.x + delta.x, t.y + delta.y, t.k);
        self.transform
    }

    /// Accepts a transform computed elsewhere, clamping its scale about the
    /// viewport center.
    pub fn set_transform(&mut self, transform: ZoomTransform) -> ZoomTransform {
        self.transform = transform;
        let clamped = self.clamp_scale(transform.k);
        if clamped != transform.k {
            self.transform = self.scaled_about(self.center(), clamped);
        }
        self.transform
    }

    pub fn scale_to(&mut self, k: f64) -> ZoomTransform {
        let k = self.clamp_scale(k);
        self.transform = self.scaled_about(self.center(), k);
        self.transform
    }

    pub fn reset(&mut self) -> ZoomTransform {
        self.transform = ZoomTransform::identity();
        self.transform
    }

    /// Transform with scale `k` that keeps the content under `anchor` fixed.
    fn scaled_about(&self, anchor: Vec2, k: f64) -> ZoomTransform {
        let p = self.transform.invert(anchor);
        ZoomTransform::new(anchor.x - p.x * k, anchor.y - p.y * k, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn scale_to_clamps_to_extent() {
        let mut v = Viewport::new(0.5, 10.0, 800.0, 600.0);
        assert_eq!(v.scale_to(9.0).k, 9.0);
        assert_eq!(v.scale_to(15.0).k, 10.0);
        assert_eq!(v.scale_to(0.1).k, 0.5);
    }

    #[test]
    fn scale_to_keeps_center_fixed() {
        let mut v = Viewport::new(0.5, 10.0, 800.0, 600.0);
        let t = v.scale_to(4.0);
        let c = t.apply(Vec2::new(400.0, 300.0));
        assert!(approx(c.x, 400.0) && approx(c.y, 300.0));
    }

    #[test]
    fn wheel_zooms_about_anchor() {
        let mut v = Viewport::new(0.5, 10.0, 800.0, 600.0);
        let anchor = Vec2::new(100.0, 200.0);
        let before = v.transform().invert(anchor);
        let t = v.wheel(-500.0, anchor);
        assert!(approx(t.k, 2.0));
        let after = t.invert(anchor);
        assert!(approx(after.x, before.x) && approx(after.y, before.y));
    }

    #[test]
    fn drag_translates_and_reset_returns_identity() {
        let mut v = Viewport::new(0.5, 10.0, 800.0, 600.0);
        v.scale_to(2.0);
        let before = v.transform();
        let t = v.drag(Vec2::new(15.0, -5.0));
        assert_eq!(t, ZoomTransform::new(before.x + 15.0, before.y - 5.0, 2.0));
        assert_eq!(v.reset(), ZoomTransform::identity());
    }

    #[test]
    fn rebuild_reclamps_current_scale() {
        let mut v = Viewport::new(0.5, 10.0, 800.0, 600.0);
        v.scale_to(8.0);
        assert!(v.rebuild(0.5, 4.0));
        assert_eq!(v.transform().k, 4.0);
        assert!(!v.rebuild(0.5, 6.0));
        assert_eq!(v.transform().k, 4.0);
    }

    #[test]
    fn non_positive_min_scale_stays_invertible() {
        let mut v = Viewport::new(0.0, 10.0, 800.0, 600.0);
        assert_eq!(v.scale_extent(), (MIN_SCALE_FLOOR, 10.0));

        let t = v.wheel(1e6, Vec2::new(400.0, 300.0));
        assert_eq!(t.k, MIN_SCALE_FLOOR);
        let t = v.wheel(-500.0, Vec2::new(400.0, 300.0));
        assert!(t.x.is_finite() && t.y.is_finite() && t.k.is_finite());
        let t = v.scale_to(2.0);
        assert!(t.x.is_finite() && t.y.is_finite());
        assert_eq!(t.k, 2.0);

        v.rebuild(-4.0, -1.0);
        assert_eq!(v.scale_extent(), (MIN_SCALE_FLOOR, MIN_SCALE_FLOOR));
    }

    #[test]
    fn external_transform_is_clamped() {
        let mut v = Viewport::new(1.0, 3.0, 100.0, 100.0);
        assert_eq!(v.set_transform(ZoomTransform::new(5.0, 5.0, 2.0)), ZoomTransform::new(5.0, 5.0, 2.0));
        assert_eq!(v.set_transform(ZoomTransform::new(0.0, 0.0, 30.0)).k, 3.0);
    }
}
