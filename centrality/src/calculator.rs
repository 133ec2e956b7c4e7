use std::collections::HashMap;

use shared_types::{LatLong, Point};

use crate::geo_math;

/// Picks the candidate with the smallest summed distance to every address.
///
/// Absent when either list is empty, and also when there is only one
/// candidate: a lone candidate has nothing to be compared against. Ties go
/// to the candidate listed first.
pub fn select_most_central<'a, F>(
    addresses: &[Point],
    candidates: &'a [Point],
    distance_fn: F,
) -> Option<&'a Point>
where
    F: Fn(&Point, &Point) -> f64,
{
    if addresses.is_empty() || candidates.len() < 2 {
        return None;
    }

    let mut best: Option<(&Point, f64)> = None;
    for candidate in candidates {
        let total: f64 = addresses
            .iter()
            .map(|address| distance_fn(address, candidate))
            .sum();

        match best {
            None if !total.is_nan() => best = Some((candidate, total)),
            Some((_, best_total)) if total < best_total => best = Some((candidate, total)),
            _ => {}
        }
    }

    best.map(|(candidate, _)| candidate)
}

pub fn straight_line<'a>(addresses: &[Point], candidates: &'a [Point]) -> Option<&'a Point> {
    select_most_central(addresses, candidates, geo_math::distance)
}

/// Bit-exact key for a coordinate pair; `-0.0` folds into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CoordKey(u64, u64);

impl From<&LatLong> for CoordKey {
    fn from(pos: &LatLong) -> Self {
        let bits = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
        CoordKey(bits(pos.lat), bits(pos.long))
    }
}

fn pair_key(origin: &LatLong, destination: &LatLong) -> (CoordKey, CoordKey) {
    (CoordKey::from(origin), CoordKey::from(destination))
}

/// Road distances or durations per (origin, destination) pair.
///
/// Pairs that were never answered read as infinitely far away.
#[derive(Debug, Clone, Default)]
pub struct RoadDistanceTable {
    values: HashMap<(CoordKey, CoordKey), f64>,
}

impl RoadDistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, origin: &LatLong, destination: &LatLong, value: f64) {
        self.values.insert(pair_key(origin, destination), value);
    }

    pub fn insert_unreachable(&mut self, origin: &LatLong, destination: &LatLong) {
        self.insert(origin, destination, f64::INFINITY);
    }

    pub fn get(&self, origin: &LatLong, destination: &LatLong) -> f64 {
        self.values
            .get(&pair_key(origin, destination))
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Number of pairs with a finite value.
    pub fn reachable_pairs(&self) -> usize {
        self.values.values().filter(|v| v.is_finite()).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn merge(&mut self, other: RoadDistanceTable) {
        self.values.extend(other.values);
    }

    /// Address-to-candidate lookup usable with [`select_most_central`].
    pub fn distance_fn(&self) -> impl Fn(&Point, &Point) -> f64 + '_ {
        move |address: &Point, candidate: &Point| {
            self.get(&address.coordinates, &candidate.coordinates)
        }
    }
}
