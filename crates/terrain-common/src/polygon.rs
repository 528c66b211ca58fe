//! Clip polygon: an optional boundary constraining which traced geometry
//! is retained.

use serde_json::Value;
use thiserror::Error;

/// Errors raised while parsing a clip polygon from GeoJSON.
#[derive(Debug, Error)]
pub enum PolygonParseError {
    #[error("invalid GeoJSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unsupported GeoJSON geometry type: {0}")]
    UnsupportedGeometry(String),

    #[error("polygon ring has fewer than 3 vertices")]
    DegenerateRing,
}

/// A clip polygon made of one or more rings of (lon, lat) vertices.
///
/// Point containment uses the even-odd rule, so interior rings (holes)
/// behave as expected without explicit hole bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPolygon {
    rings: Vec<Vec<(f64, f64)>>,
}

impl ClipPolygon {
    /// Build a polygon from raw rings. Rings need not repeat the first
    /// vertex at the end.
    pub fn new(rings: Vec<Vec<(f64, f64)>>) -> Result<Self, PolygonParseError> {
        for ring in &rings {
            if ring.len() < 3 {
                return Err(PolygonParseError::DegenerateRing);
            }
        }
        Ok(Self { rings })
    }

    /// Parse a GeoJSON `Polygon` or `MultiPolygon` geometry object.
    pub fn from_geojson(text: &str) -> Result<Self, PolygonParseError> {
        let value: Value = serde_json::from_str(text)?;
        let geom_type = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut rings = Vec::new();
        match geom_type.as_str() {
            "Polygon" => {
                collect_rings(value.get("coordinates"), &mut rings);
            }
            "MultiPolygon" => {
                if let Some(polys) = value.get("coordinates").and_then(Value::as_array) {
                    for poly in polys {
                        collect_rings(Some(poly), &mut rings);
                    }
                }
            }
            other => return Err(PolygonParseError::UnsupportedGeometry(other.to_string())),
        }

        Self::new(rings)
    }

    /// The polygon's rings.
    pub fn rings(&self) -> &[Vec<(f64, f64)>] {
        &self.rings
    }

    /// Even-odd point-in-polygon test across all rings.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            let n = ring.len();
            let mut j = n - 1;
            for i in 0..n {
                let (xi, yi) = ring[i];
                let (xj, yj) = ring[j];
                if ((yi > lat) != (yj > lat))
                    && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi
                {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

fn collect_rings(coords: Option<&Value>, rings: &mut Vec<Vec<(f64, f64)>>) {
    let Some(outer) = coords.and_then(Value::as_array) else {
        return;
    };
    for ring in outer {
        let Some(points) = ring.as_array() else {
            continue;
        };
        let mut parsed: Vec<(f64, f64)> = points
            .iter()
            .filter_map(|p| {
                let pair = p.as_array()?;
                Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
            })
            .collect();
        // GeoJSON rings repeat the first vertex; drop the duplicate.
        if parsed.len() > 1 && parsed.first() == parsed.last() {
            parsed.pop();
        }
        rings.push(parsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> ClipPolygon {
        ClipPolygon::new(vec![vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ]])
        .unwrap()
    }

    #[test]
    fn test_contains_inside_and_outside() {
        let poly = unit_square();
        assert!(poly.contains(0.5, 0.5));
        assert!(!poly.contains(1.5, 0.5));
        assert!(!poly.contains(0.5, -0.5));
    }

    #[test]
    fn test_hole_excluded() {
        // Outer square with an inner square hole (even-odd rule).
        let poly = ClipPolygon::new(vec![
            vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)],
            vec![(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)],
        ])
        .unwrap();
        assert!(poly.contains(0.5, 0.5));
        assert!(!poly.contains(2.0, 2.0));
    }

    #[test]
    fn test_from_geojson_polygon() {
        let text = r#"{
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        }"#;
        let poly = ClipPolygon::from_geojson(text).unwrap();
        assert_eq!(poly.rings().len(), 1);
        assert_eq!(poly.rings()[0].len(), 4);
        assert!(poly.contains(0.5, 0.5));
    }

    #[test]
    fn test_from_geojson_rejects_other_geometries() {
        let text = r#"{"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}"#;
        assert!(matches!(
            ClipPolygon::from_geojson(text),
            Err(PolygonParseError::UnsupportedGeometry(_))
        ));
    }

    #[test]
    fn test_degenerate_ring_rejected() {
        assert!(matches!(
            ClipPolygon::new(vec![vec![(0.0, 0.0), (1.0, 1.0)]]),
            Err(PolygonParseError::DegenerateRing)
        ));
    }
}
