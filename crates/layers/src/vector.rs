use std::fmt::Write as _;

use formats::{GeoPoint, Geometry};
use foundation::ids::RegionId;
use foundation::math::{Mercator, Vec2};
use scene::RegionSet;

use crate::layer::{Layer, LayerId};

/// Radius of the circle drawn for point geometries, in pixels.
pub const POINT_RADIUS_PX: f64 = 4.5;

/// Projected outline of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionShape {
    pub id: RegionId,
    /// SVG path data; empty for features without geometry.
    pub path: String,
    /// Area-weighted centroid in projected pixels.
    pub centroid: Option<Vec2>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RegionLayer {
    id: LayerId,
}

impl RegionLayer {
    pub fn new(id: u64) -> Self {
        Self { id: LayerId(id) }
    }

    pub fn extract(&self, regions: &RegionSet, projection: &Mercator) -> Vec<RegionShape> {
        regions
            .iter()
            .map(|(region, feature)| {
                let rings = project_geometry(&feature.geometry, projection);
                RegionShape {
                    id: region.id(),
                    path: path_data(&rings),
                    centroid: centroid(&rings),
                }
            })
            .collect()
    }
}

impl Layer for RegionLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

/// Geometry flattened to projected parts.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedPart {
    Point(Vec2),
    Line(Vec<Vec2>),
    /// Exterior ring followed by holes, closing duplicates removed.
    Polygon(Vec<Vec<Vec2>>),
}

pub fn project_geometry(geometry: &Geometry, projection: &Mercator) -> Vec<ProjectedPart> {
    let project = |p: &GeoPoint| projection.project(p.lon_deg, p.lat_deg);
    let line = |ps: &[GeoPoint]| ps.iter().map(project).collect::<Vec<_>>();
    let polygon = |rings: &[Vec<GeoPoint>]| {
        rings
            .iter()
            .map(|r| {
                let mut ring = line(r);
                drop_closing_duplicate(&mut ring);
                ring
            })
            .collect::<Vec<_>>()
    };

    match geometry {
        Geometry::Empty => Vec::new(),
        Geometry::Point(p) => vec![ProjectedPart::Point(project(p))],
        Geometry::MultiPoint(ps) => ps.iter().map(|p| ProjectedPart::Point(project(p))).collect(),
        Geometry::LineString(ps) => vec![ProjectedPart::Line(line(ps))],
        Geometry::MultiLineString(ls) => ls.iter().map(|l| ProjectedPart::Line(line(l))).collect(),
        Geometry::Polygon(rings) => vec![ProjectedPart::Polygon(polygon(rings))],
        Geometry::MultiPolygon(polys) => polys
            .iter()
            .map(|rings| ProjectedPart::Polygon(polygon(rings)))
            .collect(),
    }
}

fn drop_closing_duplicate(points: &mut Vec<Vec2>) {
    if points.len() >= 2 && points.first() == points.last() {
        points.pop();
    }
}

pub fn path_data(parts: &[ProjectedPart]) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            ProjectedPart::Point(p) => {
                let r = POINT_RADIUS_PX;
                let _ = write!(
                    out,
                    "M{},{}m0,{r}a{r},{r} 0 1,1 0,{}a{r},{r} 0 1,1 0,{}z",
                    num(p.x),
                    num(p.y),
                    num(-2.0 * r),
                    num(2.0 * r)
                );
            }
            ProjectedPart::Line(points) => write_polyline(&mut out, points, false),
            ProjectedPart::Polygon(rings) => {
                for ring in rings {
                    write_polyline(&mut out, ring, true);
                }
            }
        }
    }
    out
}

fn write_polyline(out: &mut String, points: &[Vec2], close: bool) {
    let mut iter = points.iter().filter(|p| p.is_finite());
    let Some(first) = iter.next() else {
        return;
    };
    let _ = write!(out, "M{},{}", num(first.x), num(first.y));
    for p in iter {
        let _ = write!(out, "L{},{}", num(p.x), num(p.y));
    }
    if close {
        out.push('Z');
    }
}

/// Three decimals, trailing zeros dropped, no negative zero.
fn num(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 {
        "0".to_string()
    } else {
        format!("{r}")
    }
}

/// Planar centroid of the projected parts.
///
/// Polygons are weighted by area (exterior rings add, holes subtract).
/// Without any area the vertex mean of lines and points is used.
pub fn centroid(parts: &[ProjectedPart]) -> Option<Vec2> {
    let mut weighted = Vec2::ZERO;
    let mut total_area = 0.0;
    for part in parts {
        let ProjectedPart::Polygon(rings) = part else {
            continue;
        };
        for (i, ring) in rings.iter().enumerate() {
            let Some((area, c)) = ring_area_centroid(ring) else {
                continue;
            };
            let signed = if i == 0 { area } else { -area };
            weighted = weighted + c.scale(signed);
            total_area += signed;
        }
    }
    if total_area.abs() > 1e-12 {
        let c = weighted.scale(1.0 / total_area);
        if c.is_finite() {
            return Some(c);
        }
    }

    let mut sum = Vec2::ZERO;
    let mut count = 0.0_f64;
    let mut add = |p: &Vec2| {
        if p.is_finite() {
            sum = sum + *p;
            count += 1.0;
        }
    };
    for part in parts {
        match part {
            ProjectedPart::Point(p) => add(p),
            ProjectedPart::Line(points) => points.iter().for_each(&mut add),
            ProjectedPart::Polygon(rings) => rings.iter().flatten().for_each(&mut add),
        }
    }
    (count > 0.0).then(|| sum.scale(1.0 / count))
}

/// Unsigned area and centroid of a simple ring.
fn ring_area_centroid(ring: &[Vec2]) -> Option<(f64, Vec2)> {
    if ring.len() < 3 {
        return None;
    }
    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        let z = a.cross(b);
        twice_area += z;
        cx += (a.x + b.x) * z;
        cy += (a.y + b.y) * z;
    }
    if twice_area.abs() <= 1e-12 {
        return None;
    }
    let c = Vec2::new(cx / (3.0 * twice_area), cy / (3.0 * twice_area));
    Some(((twice_area * 0.5).abs(), c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::FeatureCollection;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = include_str!("../../apps/viewer_web/assets/tocantins-sample.geojson");

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Vec2> {
        vec![
            Vec2::new(x0, y0),
            Vec2::new(x0 + size, y0),
            Vec2::new(x0 + size, y0 + size),
            Vec2::new(x0, y0 + size),
        ]
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn path_data_for_polygon_with_hole() {
        let parts = vec![ProjectedPart::Polygon(vec![
            square(0.0, 0.0, 10.0),
            square(2.0, 2.0, 1.5),
        ])];
        assert_eq!(
            path_data(&parts),
            "M0,0L10,0L10,10L0,10ZM2,2L3.5,2L3.5,3.5L2,3.5Z"
        );
    }

    #[test]
    fn path_data_for_point_and_line() {
        let parts = vec![
            ProjectedPart::Point(Vec2::new(1.0, 2.0)),
            ProjectedPart::Line(vec![Vec2::new(0.0, 0.0), Vec2::new(1.23456, -0.0001)]),
        ];
        assert_eq!(
            path_data(&parts),
            "M1,2m0,4.5a4.5,4.5 0 1,1 0,-9a4.5,4.5 0 1,1 0,9zM0,0L1.235,0"
        );
    }

    #[test]
    fn centroid_is_area_weighted() {
        // A 10x10 square and a 2x2 square far to the right: the big one dominates.
        let parts = vec![
            ProjectedPart::Polygon(vec![square(0.0, 0.0, 10.0)]),
            ProjectedPart::Polygon(vec![square(100.0, 0.0, 2.0)]),
        ];
        let c = centroid(&parts).expect("centroid");
        let expected_x = (100.0 * 5.0 + 4.0 * 101.0) / 104.0;
        let expected_y = (100.0 * 5.0 + 4.0 * 1.0) / 104.0;
        assert!(approx(c, Vec2::new(expected_x, expected_y)), "{c:?}");
    }

    #[test]
    fn centroid_subtracts_holes_regardless_of_winding() {
        let mut hole = square(0.0, 0.0, 5.0);
        hole.reverse();
        let parts = vec![ProjectedPart::Polygon(vec![square(0.0, 0.0, 10.0), hole])];
        let c = centroid(&parts).expect("centroid");
        // 100 at (5,5) minus 25 at (2.5,2.5) over 75.
        let expected = (100.0 * 5.0 - 25.0 * 2.5) / 75.0;
        assert!(approx(c, Vec2::new(expected, expected)), "{c:?}");
    }

    #[test]
    fn centroid_falls_back_to_vertex_mean() {
        let parts = vec![ProjectedPart::Line(vec![Vec2::new(0.0, 0.0), Vec2::new(4.0, 2.0)])];
        assert_eq!(centroid(&parts), Some(Vec2::new(2.0, 1.0)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn extracts_one_shape_per_region() {
        let fc = FeatureCollection::from_geojson_str(SAMPLE).expect("sample");
        let bounds = fc.projected_bounds(|p| Mercator::raw(p.lon_deg, p.lat_deg));
        let projection = Mercator::fit_size(960.0, 600.0, bounds);
        let set = RegionSet::from_collection(fc);

        let shapes = RegionLayer::new(1).extract(&set, &projection);
        assert_eq!(shapes.len(), set.len());
        for shape in &shapes {
            assert!(shape.path.starts_with('M'));
            let c = shape.centroid.expect("centroid");
            assert!(c.x >= 0.0 && c.x <= 960.0 && c.y >= 0.0 && c.y <= 600.0);
        }
        // Palmas has a hole: two closed sub-paths.
        assert_eq!(shapes[0].path.matches('Z').count(), 2);
    }
}
