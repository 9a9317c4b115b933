//! Style and waterway layer definitions
//!
//! The canal geometry arrives as a custom vector tile layer drawn as three
//! stacked lines: two translucent glow passes under an opaque core line.
//! These definitions are re-added after every style swap.

use serde::{Deserialize, Serialize};

pub const WATERWAY_SOURCE_ID: &str = "canals";

const WATERWAY_COLOR: &str = "#2463EB";

/// A named base style and where to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDocument {
    pub name: String,
    pub url: String,
}

impl StyleDocument {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Vector tile source definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSource {
    pub id: String,
    /// Tile URL templates with {z}/{x}/{y} placeholders.
    pub tiles: Vec<String>,
    pub maxzoom: u8,
}

/// Line layer drawn from a vector source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineLayer {
    pub id: String,
    pub source: String,
    pub source_layer: String,
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

/// The canals source plus its three draw passes, widest first so the core
/// line lands on top.
pub fn waterway_layers(tile_url_template: &str) -> (VectorSource, Vec<LineLayer>) {
    let source = VectorSource {
        id: WATERWAY_SOURCE_ID.to_string(),
        tiles: vec![tile_url_template.to_string()],
        maxzoom: 14,
    };
    let line = |id: &str, width: f64, opacity: f64| LineLayer {
        id: id.to_string(),
        source: WATERWAY_SOURCE_ID.to_string(),
        source_layer: WATERWAY_SOURCE_ID.to_string(),
        color: WATERWAY_COLOR.to_string(),
        width,
        opacity,
    };
    let layers = vec![
        line("canals-glow-wide", 12.0, 0.3),
        line("canals-glow-medium", 8.0, 0.5),
        line("canals-line", 5.0, 1.0),
    ];
    (source, layers)
}
