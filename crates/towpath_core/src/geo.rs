//! Geographic value types and the Great Britain viewport defaults

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate, longitude first to match the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Axis-aligned geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    pub const fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lon >= self.south_west.lon
            && p.lon <= self.north_east.lon
            && p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
    }

    /// Clamp a point into the bounds, axis by axis.
    pub fn clamp(&self, p: GeoPoint) -> GeoPoint {
        GeoPoint {
            lon: p.lon.clamp(self.south_west.lon, self.north_east.lon),
            lat: p.lat.clamp(self.south_west.lat, self.north_east.lat),
        }
    }
}

/// Viewport state: where the map is looking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl MapView {
    pub const fn new(center: GeoPoint, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(FALLBACK_CENTER, DEFAULT_ZOOM)
    }
}

/// Where the map opens for a logged-out or boatless user: Bradford-on-Avon
/// Top Lock on the Kennet & Avon canal.
pub const FALLBACK_CENTER: GeoPoint = GeoPoint::new(-2.2517, 51.341);

pub const DEFAULT_ZOOM: f64 = 17.0;
pub const MIN_ZOOM: f64 = 6.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Panning is restricted to Great Britain; the waterway data covers nothing else.
pub const GB_BOUNDS: GeoBounds =
    GeoBounds::new(GeoPoint::new(-8.74, 49.84), GeoPoint::new(1.96, 60.9));

/// Clamp a requested zoom level into the supported range.
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}
