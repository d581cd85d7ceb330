//! GeoJSON envelopes for API responses.
//!
//! Geometries are produced by PostGIS (`ST_AsGeoJSON`) and carried through
//! as opaque JSON. Incoming geometries get a structural check only; no
//! geometry math happens in Rust.

use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize)]
pub struct Feature<P> {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub properties: P,
    pub geometry: Option<JsonValue>,
}

impl<P> Feature<P> {
    pub fn new(properties: P, geometry: Option<JsonValue>) -> Self {
        Self {
            type_: "Feature",
            properties,
            geometry,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            type_: "FeatureCollection",
            features,
        }
    }
}

impl<P> FromIterator<Feature<P>> for FeatureCollection<P> {
    fn from_iter<I: IntoIterator<Item = Feature<P>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Records that can be rendered as a GeoJSON feature.
pub trait ToFeature {
    type Properties: Serialize;

    fn to_feature(&self) -> Feature<Self::Properties>;
}

/// Build a collection from any slice of feature-capable records.
pub fn collect_features<T: ToFeature>(items: &[T]) -> FeatureCollection<T::Properties> {
    items.iter().map(ToFeature::to_feature).collect()
}

/// Check that `value` is a well-formed GeoJSON geometry of one of `allowed`
/// types.
///
/// PostGIS does the real parsing, but it reports malformed input as an
/// internal error. Positions, ring sizes and ring closure are checked here
/// so the client gets a validation error instead.
pub fn check_geometry(value: &JsonValue, allowed: &[&str]) -> Result<(), String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "geometry must be a GeoJSON object".to_string())?;
    let kind = obj
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| "geometry.type is required".to_string())?;
    if !allowed.contains(&kind) {
        return Err(format!(
            "geometry.type must be one of {} (got {kind})",
            allowed.join(", ")
        ));
    }
    let coordinates = obj
        .get("coordinates")
        .ok_or_else(|| "geometry.coordinates must be an array".to_string())?;

    match kind {
        "Point" => check_position(coordinates),
        "MultiPoint" => each(coordinates, 1, check_position),
        "LineString" => check_line(coordinates),
        "MultiLineString" => each(coordinates, 1, check_line),
        "Polygon" => check_polygon(coordinates),
        "MultiPolygon" => each(coordinates, 1, check_polygon),
        other => Err(format!("unsupported geometry type {other}")),
    }
}

fn as_array(value: &JsonValue) -> Result<&Vec<JsonValue>, String> {
    value
        .as_array()
        .ok_or_else(|| "geometry.coordinates must be nested arrays".to_string())
}

fn each(
    value: &JsonValue,
    min: usize,
    check: fn(&JsonValue) -> Result<(), String>,
) -> Result<(), String> {
    let items = as_array(value)?;
    if items.len() < min {
        return Err("geometry.coordinates is empty".to_string());
    }
    items.iter().try_for_each(check)
}

/// `[longitude, latitude]` with an optional elevation.
fn check_position(value: &JsonValue) -> Result<(), String> {
    let parts = as_array(value)?;
    if !(2..=3).contains(&parts.len()) {
        return Err("a position needs 2 or 3 numbers".to_string());
    }
    let numbers: Vec<f64> = parts.iter().filter_map(JsonValue::as_f64).collect();
    if numbers.len() != parts.len() {
        return Err("positions must contain only numbers".to_string());
    }
    if !(-180.0..=180.0).contains(&numbers[0]) || !(-90.0..=90.0).contains(&numbers[1]) {
        return Err(format!(
            "position [{}, {}] is outside longitude/latitude bounds",
            numbers[0], numbers[1]
        ));
    }
    Ok(())
}

fn check_line(value: &JsonValue) -> Result<(), String> {
    let positions = as_array(value)?;
    if positions.len() < 2 {
        return Err("a line needs at least 2 positions".to_string());
    }
    positions.iter().try_for_each(check_position)
}

fn check_ring(value: &JsonValue) -> Result<(), String> {
    let positions = as_array(value)?;
    if positions.len() < 4 {
        return Err("a polygon ring needs at least 4 positions".to_string());
    }
    positions.iter().try_for_each(check_position)?;
    let numbers = |p: Option<&JsonValue>| -> Vec<f64> {
        p.and_then(JsonValue::as_array)
            .map(|parts| parts.iter().filter_map(JsonValue::as_f64).collect())
            .unwrap_or_default()
    };
    if numbers(positions.first()) != numbers(positions.last()) {
        return Err("a polygon ring must end where it starts".to_string());
    }
    Ok(())
}

fn check_polygon(value: &JsonValue) -> Result<(), String> {
    each(value, 1, check_ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Props {
        name: &'static str,
    }

    #[test]
    fn feature_collection_shape() {
        let fc: FeatureCollection<Props> = vec![
            Feature::new(
                Props { name: "a" },
                Some(json!({"type": "Point", "coordinates": [-80.0, 40.0]})),
            ),
            Feature::new(Props { name: "b" }, None),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&fc).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["properties"]["name"], "a");
        assert_eq!(value["features"][0]["geometry"]["coordinates"][1], 40.0);
        assert!(value["features"][1]["geometry"].is_null());
    }

    #[test]
    fn geometry_check_accepts_allowed_types() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[-80.0, 40.0], [-80.1, 40.0], [-80.1, 40.1], [-80.0, 40.0]]]
        });
        assert!(check_geometry(&polygon, &["Polygon", "MultiPolygon"]).is_ok());
    }

    #[test]
    fn geometry_check_rejects_wrong_type_and_shape() {
        let point = json!({"type": "Point", "coordinates": [0.0, 0.0]});
        assert!(check_geometry(&point, &["Polygon"]).is_err());
        assert!(check_geometry(&json!({"type": "Polygon"}), &["Polygon"]).is_err());
        assert!(check_geometry(&json!("Polygon"), &["Polygon"]).is_err());
    }

    #[test]
    fn geometry_check_rejects_malformed_rings() {
        let allowed = &["Polygon", "MultiPolygon"];
        let empty = json!({"type": "Polygon", "coordinates": [[]]});
        assert!(check_geometry(&empty, allowed).is_err());
        assert!(check_geometry(&json!({"type": "Polygon", "coordinates": []}), allowed).is_err());

        let short = json!({
            "type": "Polygon",
            "coordinates": [[[-80.0, 40.0], [-80.1, 40.0], [-80.0, 40.0]]]
        });
        assert!(check_geometry(&short, allowed).unwrap_err().contains("4 positions"));

        let open = json!({
            "type": "Polygon",
            "coordinates": [[[-80.0, 40.0], [-80.1, 40.0], [-80.1, 40.1], [-80.0, 40.1]]]
        });
        assert!(check_geometry(&open, allowed).unwrap_err().contains("end where it starts"));

        let text = json!({
            "type": "MultiPolygon",
            "coordinates": [[[["a", 40.0], [-80.1, 40.0], [-80.1, 40.1], ["a", 40.0]]]]
        });
        assert!(check_geometry(&text, allowed).is_err());

        let off_globe = json!({
            "type": "Polygon",
            "coordinates": [[[-80.0, 95.0], [-80.1, 40.0], [-80.1, 40.1], [-80.0, 95.0]]]
        });
        assert!(check_geometry(&off_globe, allowed).is_err());
    }

    #[test]
    fn geometry_check_accepts_multipolygon_with_hole() {
        let outer = json!([[-80.0, 40.0], [-79.0, 40.0], [-79.0, 41.0], [-80.0, 41.0], [-80.0, 40.0]]);
        let hole = json!([[-79.6, 40.4], [-79.4, 40.4], [-79.4, 40.6], [-79.6, 40.4]]);
        let multi = json!({"type": "MultiPolygon", "coordinates": [[outer, hole]]});
        assert!(check_geometry(&multi, &["MultiPolygon"]).is_ok());
    }
}
