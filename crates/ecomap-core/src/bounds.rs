//! Geographic coordinate types and the per-ecosystem bounds index.
//! All coordinate math uses f64 for precision.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A point in geographic coordinates, longitude first as the map expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    /// Longitude in degrees, -180 to +180.
    pub lng: f64,
    /// Latitude in degrees, -90 to +90.
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Axis-aligned bounding box, serialized as `[[minLng, minLat], [maxLng, maxLat]]`.
///
/// Also accepts the flat `[minLng, minLat, maxLng, maxLat]` form on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundsRepr", into = "[[f64; 2]; 2]")]
pub struct BoundingBox {
    pub min: LngLat,
    pub max: LngLat,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoundsRepr {
    Corners([[f64; 2]; 2]),
    Flat([f64; 4]),
}

impl TryFrom<BoundsRepr> for BoundingBox {
    type Error = String;

    fn try_from(repr: BoundsRepr) -> Result<Self, Self::Error> {
        let [a, b] = match repr {
            BoundsRepr::Corners(c) => c,
            BoundsRepr::Flat([w, s, e, n]) => [[w, s], [e, n]],
        };
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err("bounding box has non-finite coordinates".into());
        }
        Ok(Self::from_corners(LngLat::new(a[0], a[1]), LngLat::new(b[0], b[1])))
    }
}

impl From<BoundingBox> for [[f64; 2]; 2] {
    fn from(b: BoundingBox) -> Self {
        [[b.min.lng, b.min.lat], [b.max.lng, b.max.lat]]
    }
}

impl BoundingBox {
    /// Build from two opposite corners in any order.
    pub fn from_corners(a: LngLat, b: LngLat) -> Self {
        Self {
            min: LngLat::new(a.lng.min(b.lng), a.lat.min(b.lat)),
            max: LngLat::new(a.lng.max(b.lng), a.lat.max(b.lat)),
        }
    }
}

/// Ecosystem code → bounding box, used only for viewport framing.
#[derive(Debug, Clone, Default)]
pub struct BoundsIndex {
    entries: BTreeMap<String, BoundingBox>,
}

impl BoundsIndex {
    pub fn from_entries(entries: BTreeMap<String, BoundingBox>) -> Self {
        Self { entries }
    }

    /// Parse `bounds.json`. A malformed entry is skipped, not fatal: it only
    /// costs the viewport fit for that ecosystem.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut entries = BTreeMap::new();
        for (id, value) in raw {
            match serde_json::from_value::<BoundingBox>(value) {
                Ok(bbox) => {
                    entries.insert(id, bbox);
                }
                Err(e) => warn!(%id, error = %e, "skipping malformed bounds entry"),
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, ecosystem_id: &str) -> Option<&BoundingBox> {
        self.entries.get(ecosystem_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_corner_and_flat_forms() {
        let index = BoundsIndex::from_json(
            r#"{"E1": [[-72.5, -38.0], [-71.0, -36.5]], "E2": [-70.0, -30.0, -69.0, -29.0]}"#,
        )
        .unwrap();
        let e1 = index.get("E1").unwrap();
        assert_eq!(e1.min, LngLat::new(-72.5, -38.0));
        assert_eq!(e1.max, LngLat::new(-71.0, -36.5));
        let e2 = index.get("E2").unwrap();
        assert_eq!(e2.min, LngLat::new(-70.0, -30.0));
        assert_eq!(e2.max, LngLat::new(-69.0, -29.0));
    }

    #[test]
    fn swapped_corners_are_normalised() {
        let bbox = BoundingBox::from_corners(LngLat::new(-71.0, -36.5), LngLat::new(-72.5, -38.0));
        assert_eq!(bbox.min, LngLat::new(-72.5, -38.0));
        assert_eq!(bbox.max, LngLat::new(-71.0, -36.5));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let index = BoundsIndex::from_json(r#"{"E1": [[-72.5, -38.0], [-71.0, -36.5]], "E2": null, "E3": [1, 2]}"#)
            .unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get("E2").is_none());
    }

    #[test]
    fn serializes_as_corner_pair() {
        let bbox = BoundingBox::from_corners(LngLat::new(1.0, 2.0), LngLat::new(3.0, 4.0));
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[[1.0,2.0],[3.0,4.0]]");
    }
}
