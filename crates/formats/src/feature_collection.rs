use foundation::bounds::Aabb2;
use foundation::math::Vec2;
use serde_json::{Map, Value};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// `"geometry": null` in the source document.
    Empty,
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Vec<Vec<GeoPoint>>),
    MultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
}

impl Geometry {
    pub fn for_each_point(&self, mut f: impl FnMut(&GeoPoint)) {
        match self {
            Geometry::Empty => {}
            Geometry::Point(p) => f(p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.iter().for_each(f),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().for_each(f)
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().for_each(f),
        }
    }
}

/// One feature record. `properties` are kept opaque apart from the
/// `name` / `id` accessors used for display and matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl Feature {
    /// `properties.name`, if present and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.properties
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// `properties.id` rendered as text (strings and numbers only).
    pub fn display_id(&self) -> Option<String> {
        match self.properties.get("id") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Case-insensitive substring match against the display name.
    /// Features without a name never match.
    pub fn name_contains(&self, needle: &str) -> bool {
        let Some(name) = self.name() else {
            return false;
        };
        name.to_lowercase().contains(&needle.to_lowercase())
    }

    pub fn to_geojson_value(&self) -> Value {
        let mut fobj = Map::new();
        fobj.insert("type".to_string(), Value::String("Feature".to_string()));
        if let Some(id) = &self.id {
            fobj.insert("id".to_string(), Value::String(id.clone()));
        }
        fobj.insert(
            "properties".to_string(),
            Value::Object(self.properties.clone()),
        );
        fobj.insert(
            "geometry".to_string(),
            geometry_to_geojson_value(&self.geometry),
        );
        Value::Object(fobj)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug)]
pub enum FeatureCollectionError {
    Syntax(serde_json::Error),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for FeatureCollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureCollectionError::Syntax(e) => write!(f, "JSON parse error: {e}"),
            FeatureCollectionError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            FeatureCollectionError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for FeatureCollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeatureCollectionError::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

impl FeatureCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, FeatureCollectionError> {
        let value: Value = serde_json::from_str(payload).map_err(FeatureCollectionError::Syntax)?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, FeatureCollectionError> {
        let obj = value
            .as_object()
            .ok_or(FeatureCollectionError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(FeatureCollectionError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(FeatureCollectionError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(FeatureCollectionError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            features.push(
                parse_feature(feat_val)
                    .map_err(|reason| FeatureCollectionError::InvalidFeature { index, reason })?,
            );
        }

        Ok(Self { features })
    }

    pub fn to_geojson_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );
        root.insert(
            "features".to_string(),
            Value::Array(self.features.iter().map(Feature::to_geojson_value).collect()),
        );
        Value::Object(root)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounding box of every coordinate after `project`.
    pub fn projected_bounds(&self, project: impl Fn(&GeoPoint) -> Vec2) -> Aabb2 {
        let mut bounds = Aabb2::empty();
        for feature in &self.features {
            feature.geometry.for_each_point(|p| bounds.extend(project(p)));
        }
        bounds
    }
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let feat_obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    let feat_type = feat_obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let id = match feat_obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let properties = feat_obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let geometry = match feat_obj.get("geometry") {
        None => return Err("feature missing geometry".to_string()),
        Some(Value::Null) => Geometry::Empty,
        Some(g) => parse_geometry(g)?,
    };

    Ok(Feature {
        id,
        properties,
        geometry,
    })
}

fn geometry_to_geojson_value(geom: &Geometry) -> Value {
    let (ty, coords) = match geom {
        Geometry::Empty => return Value::Null,
        Geometry::Point(p) => ("Point", point_coords(p)),
        Geometry::MultiPoint(ps) => ("MultiPoint", points_coords(ps)),
        Geometry::LineString(ps) => ("LineString", points_coords(ps)),
        Geometry::MultiLineString(lines) => (
            "MultiLineString",
            Value::Array(lines.iter().map(|l| points_coords(l)).collect()),
        ),
        Geometry::Polygon(rings) => (
            "Polygon",
            Value::Array(rings.iter().map(|r| points_coords(r)).collect()),
        ),
        Geometry::MultiPolygon(polys) => (
            "MultiPolygon",
            Value::Array(
                polys
                    .iter()
                    .map(|poly| Value::Array(poly.iter().map(|r| points_coords(r)).collect()))
                    .collect(),
            ),
        ),
    };

    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String(ty.to_string()));
    obj.insert("coordinates".to_string(), coords);
    Value::Object(obj)
}

fn point_coords(p: &GeoPoint) -> Value {
    Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)])
}

fn points_coords(ps: &[GeoPoint]) -> Value {
    Value::Array(ps.iter().map(point_coords).collect())
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(Geometry::Point(parse_point(coords)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(parse_points(coords)?)),
        "LineString" => Ok(Geometry::LineString(parse_points(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_rings(coords)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_rings(coords)?)),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                out.push(parse_rings(poly)?);
            }
            Ok(Geometry::MultiPolygon(out))
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_points(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(parse_point).collect()
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    let rings = coords
        .as_array()
        .ok_or("coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_points).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = include_str!("../../apps/viewer_web/assets/tocantins-sample.geojson");

    #[test]
    fn parses_sample_municipalities() {
        let fc = FeatureCollection::from_geojson_str(SAMPLE).expect("parse sample");
        assert_eq!(fc.len(), 5);
        assert_eq!(fc.features[0].name(), Some("Palmas"));
        assert!(matches!(fc.features[0].geometry, Geometry::Polygon(ref r) if r.len() == 2));
        assert!(matches!(fc.features[3].geometry, Geometry::MultiPolygon(ref p) if p.len() == 2));
    }

    #[test]
    fn display_id_accepts_strings_and_numbers() {
        let fc = FeatureCollection::from_geojson_str(SAMPLE).expect("parse sample");
        assert_eq!(fc.features[0].display_id().as_deref(), Some("1721000"));
        assert_eq!(fc.features[1].display_id().as_deref(), Some("1702109"));
        assert_eq!(fc.features[4].display_id(), None);
        assert_eq!(fc.features[4].name(), None);
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let fc = FeatureCollection::from_geojson_str(SAMPLE).expect("parse sample");
        let araguaina = &fc.features[1];
        assert!(araguaina.name_contains("aragua"));
        assert!(araguaina.name_contains("ARAGUAÍNA"));
        assert!(!araguaina.name_contains("palmas"));
        assert!(!fc.features[4].name_contains(""));
    }

    #[test]
    fn rejects_non_collections() {
        let err = FeatureCollection::from_geojson_str(r#"{"type":"Feature"}"#).unwrap_err();
        assert!(matches!(err, FeatureCollectionError::NotAFeatureCollection));

        let err = FeatureCollection::from_geojson_str("{not json").unwrap_err();
        assert!(matches!(err, FeatureCollectionError::Syntax(_)));
    }

    #[test]
    fn reports_offending_feature_index() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1,2]}},
            {"type":"Feature","properties":{},"geometry":{"type":"Circle","coordinates":[]}}
        ]}"#;
        let err = FeatureCollection::from_geojson_str(payload).unwrap_err();
        match err {
            FeatureCollectionError::InvalidFeature { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("Circle"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_geometry_is_empty() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"X"},"geometry":null}
        ]}"#;
        let fc = FeatureCollection::from_geojson_str(payload).expect("parse");
        assert_eq!(fc.features[0].geometry, Geometry::Empty);
        assert!(fc.projected_bounds(|p| Vec2::new(p.lon_deg, p.lat_deg)).is_empty());
    }

    #[test]
    fn geojson_export_reparses_to_same_collection() {
        let fc = FeatureCollection::from_geojson_str(SAMPLE).expect("parse sample");
        let again = FeatureCollection::from_geojson_value(fc.to_geojson_value()).expect("reparse");
        assert_eq!(fc, again);
    }

    #[test]
    fn projected_bounds_cover_all_coordinates() {
        let fc = FeatureCollection::from_geojson_str(SAMPLE).expect("parse sample");
        let b = fc.projected_bounds(|p| Vec2::new(p.lon_deg, p.lat_deg));
        assert_eq!(b.min, [-49.40, -12.00]);
        assert_eq!(b.max, [-47.20, -6.90]);
    }
}
