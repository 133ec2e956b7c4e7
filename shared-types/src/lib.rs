use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct LatLong {
    pub lat: f64,
    pub long: f64,
}

impl LatLong {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Finite and inside the WGS84 degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.long.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.long)
    }

    /// Exact coordinate equality, no tolerance.
    pub fn same_position(&self, other: &LatLong) -> bool {
        self.lat == other.lat && self.long == other.long
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct MapBounds {
    pub north_east: LatLong,
    pub south_west: LatLong,
}

impl MapBounds {
    /// Tight bounds around every position, `None` for an empty slice.
    pub fn around(positions: &[LatLong]) -> Option<Self> {
        let first = positions.first()?;
        let mut bounds = MapBounds {
            north_east: *first,
            south_west: *first,
        };
        for pos in &positions[1..] {
            bounds.north_east.lat = bounds.north_east.lat.max(pos.lat);
            bounds.north_east.long = bounds.north_east.long.max(pos.long);
            bounds.south_west.lat = bounds.south_west.lat.min(pos.lat);
            bounds.south_west.long = bounds.south_west.long.min(pos.long);
        }
        Some(bounds)
    }

    pub fn padded(center: LatLong, degrees: f64) -> Self {
        MapBounds {
            north_east: LatLong::new(center.lat + degrees, center.long + degrees),
            south_west: LatLong::new(center.lat - degrees, center.long - degrees),
        }
    }

    pub fn contains(&self, pos: &LatLong) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&pos.lat)
            && (self.south_west.long..=self.north_east.long).contains(&pos.long)
    }
}

/// A geocoded place accepted from the place lookup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Point {
    pub id: Option<String>,
    pub coordinates: LatLong,
    pub label: String,
    pub title: Option<String>,
}

impl Point {
    pub fn new(lat: f64, long: f64, label: impl Into<String>) -> Self {
        Point {
            id: None,
            coordinates: LatLong::new(lat, long),
            label: label.into(),
            title: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn same_position(&self, other: &Point) -> bool {
        self.coordinates.same_position(&other.coordinates)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerRole {
    Address,
    Candidate,
    MostCentral,
    Centroid,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PinStyle {
    pub background: &'static str,
    pub border: &'static str,
    pub glyph: &'static str,
}

impl MarkerRole {
    pub const ALL: [MarkerRole; 4] = [
        MarkerRole::Address,
        MarkerRole::Candidate,
        MarkerRole::MostCentral,
        MarkerRole::Centroid,
    ];

    pub fn pin_style(&self) -> PinStyle {
        match self {
            MarkerRole::Address => PinStyle {
                background: "#ea4335",
                border: "#c5221f",
                glyph: "#b31412",
            },
            MarkerRole::Candidate => PinStyle {
                background: "#4285f4",
                border: "#357ae8",
                glyph: "#2a56c6",
            },
            MarkerRole::MostCentral => PinStyle {
                background: "#34a853",
                border: "#2c8f47",
                glyph: "#22733e",
            },
            MarkerRole::Centroid => PinStyle {
                background: "#fbbc05",
                border: "#e9ab04",
                glyph: "#c98f02",
            },
        }
    }

    pub fn legend(&self) -> &'static str {
        match self {
            MarkerRole::Address => "Addresses",
            MarkerRole::Candidate => "Potential Centrals",
            MarkerRole::MostCentral => "Most Central",
            MarkerRole::Centroid => "Geographical Center",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarkerInstruction {
    pub coordinates: LatLong,
    pub role: MarkerRole,
    pub title: String,
}

/// Where the renderer should fit the map after placing markers.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub bounds: MapBounds,
    pub padding_px: u32,
    pub max_zoom: Option<u8>,
}
