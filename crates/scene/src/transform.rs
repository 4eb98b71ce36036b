use foundation::math::Vec2;

/// Pan/zoom transform: `screen = k * p + (x, y)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ZoomTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl ZoomTransform {
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            k: 1.0,
        }
    }

    pub fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    pub fn invert(&self, p: Vec2) -> Vec2 {
        Vec2::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    /// SVG `transform` attribute value.
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::ZoomTransform;
    use foundation::math::Vec2;

    #[test]
    fn identity_leaves_points_alone() {
        let t = ZoomTransform::identity();
        assert_eq!(t.apply(Vec2::new(3.0, -4.0)), Vec2::new(3.0, -4.0));
    }

    #[test]
    fn invert_undoes_apply() {
        let t = ZoomTransform::new(10.0, -5.0, 2.5);
        let p = Vec2::new(7.0, 9.0);
        assert_eq!(t.invert(t.apply(p)), p);
        assert_eq!(t.to_svg(), "translate(10,-5) scale(2.5)");
    }
}
