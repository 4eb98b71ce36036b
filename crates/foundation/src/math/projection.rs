//! Spherical Mercator projection fit to a pixel viewport.
//!
//! Raw coordinates are unit-scale with y growing downwards (screen
//! convention), so `project(p) = scale * raw(p) + translate`.

use std::f64::consts::FRAC_PI_4;

use super::Vec2;
use crate::bounds::Aabb2;

/// Latitude where the Mercator square ends.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_59;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mercator {
    pub scale: f64,
    pub translate: Vec2,
}

impl Default for Mercator {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl Mercator {
    pub fn new(scale: f64, translate: Vec2) -> Self {
        Self { scale, translate }
    }

    pub fn raw(lon_deg: f64, lat_deg: f64) -> Vec2 {
        let lat = lat_deg.clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG);
        let x = lon_deg.to_radians();
        let y = (FRAC_PI_4 + lat.to_radians() * 0.5).tan().ln();
        Vec2::new(x, -y)
    }

    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Vec2 {
        Self::raw(lon_deg, lat_deg).scale(self.scale) + self.translate
    }

    /// Fits raw `bounds` into a `width` x `height` viewport, centred, keeping
    /// the aspect ratio.
    ///
    /// An empty extent yields the unit projection; a degenerate axis is
    /// ignored when choosing the scale.
    pub fn fit_size(width: f64, height: f64, bounds: Aabb2) -> Self {
        if bounds.is_empty() {
            return Self::default();
        }

        let dx = bounds.width();
        let dy = bounds.height();
        let kx = if dx > 0.0 { width / dx } else { f64::INFINITY };
        let ky = if dy > 0.0 { height / dy } else { f64::INFINITY };
        let mut k = kx.min(ky);
        if !k.is_finite() {
            k = 1.0;
        }

        let tx = (width - k * (bounds.max[0] + bounds.min[0])) * 0.5;
        let ty = (height - k * (bounds.max[1] + bounds.min[1])) * 0.5;
        Self::new(k, Vec2::new(tx, ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn raw_origin_and_orientation() {
        let o = Mercator::raw(0.0, 0.0);
        assert!(approx(o.x, 0.0) && approx(o.y, 0.0));
        // North is up on screen, so positive latitude has negative y.
        assert!(Mercator::raw(0.0, 10.0).y < 0.0);
        assert!(Mercator::raw(10.0, 0.0).x > 0.0);
    }

    #[test]
    fn fit_size_centres_extent() {
        let mut b = Aabb2::empty();
        b.extend(Mercator::raw(-50.0, -13.0));
        b.extend(Mercator::raw(-45.0, -5.0));

        let m = Mercator::fit_size(800.0, 600.0, b);
        let a = m.project(-50.0, -13.0);
        let c = m.project(-45.0, -5.0);

        // The taller axis fills the viewport exactly.
        assert!(approx((a.y - c.y).abs(), 600.0));
        assert!((c.x - a.x) <= 800.0 + 1e-9);
        let mid_x = (a.x + c.x) * 0.5;
        let mid_y = (a.y + c.y) * 0.5;
        assert!(approx(mid_x, 400.0));
        assert!(approx(mid_y, 300.0));
    }

    #[test]
    fn fit_size_on_empty_bounds_is_unit() {
        assert_eq!(Mercator::fit_size(10.0, 10.0, Aabb2::empty()), Mercator::default());
    }

    #[test]
    fn latitude_is_clamped() {
        assert!(Mercator::raw(0.0, 90.0).is_finite());
        assert_eq!(Mercator::raw(0.0, 90.0), Mercator::raw(0.0, MERCATOR_MAX_LAT_DEG));
    }
}
