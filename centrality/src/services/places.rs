// Place lookup results -> Points
// Accepts both the Places API v1 shape and the legacy / Autocomplete shape

use serde_json::Value;
use shared_types::{LatLong, Point};

/// Convert a single place JSON object into a Point.
/// Returns None when the place has no usable geometry; nothing is built.
pub fn parse_place(val: &Value) -> Option<Point> {
    let coordinates = extract_location(val)?;
    if !coordinates.is_valid() {
        return None;
    }

    let id = extract_string(&val["id"]).or_else(|| extract_string(&val["place_id"]));
    let display_name = extract_string(&val["displayName"]["text"])
        .or_else(|| extract_string(&val["displayName"]))
        .or_else(|| extract_string(&val["name"]));
    let label = extract_string(&val["formattedAddress"])
        .or_else(|| extract_string(&val["formatted_address"]))
        .or_else(|| display_name.clone())
        .unwrap_or_default();

    Some(Point {
        id,
        coordinates,
        label,
        title: display_name,
    })
}

/// Parse a `places` array response, dropping entries without geometry.
pub fn parse_places(value: &Value) -> Vec<Point> {
    let places = match value.get("places").and_then(|p| p.as_array()) {
        Some(p) => p,
        None => return Vec::new(),
    };

    places.iter().filter_map(parse_place).collect()
}

fn extract_location(val: &Value) -> Option<LatLong> {
    if let (Some(lat), Some(long)) = (
        val["location"]["latitude"].as_f64(),
        val["location"]["longitude"].as_f64(),
    ) {
        return Some(LatLong::new(lat, long));
    }

    let location = &val["geometry"]["location"];
    Some(LatLong::new(
        location["lat"].as_f64()?,
        location["lng"].as_f64()?,
    ))
}

fn extract_string(val: &Value) -> Option<String> {
    val.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
