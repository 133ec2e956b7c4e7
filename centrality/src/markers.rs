//! Translation of the current point sets into map marker instructions.
//!
//! Markers are identified by position only, so every change rebuilds the
//! whole set instead of diffing it. The sets are small enough for that.

use std::collections::BTreeMap;

use serde::Serialize;
use shared_types::{LatLong, MapBounds, MarkerInstruction, MarkerRole, Point, Viewport};

pub const MOST_CENTRAL_TITLE: &str = "Most Central";

/// Half-width in degrees of the box fitted around a single point (about 5 km).
pub const SINGLE_POINT_PADDING_DEG: f64 = 0.05;
pub const FIT_PADDING_PX: u32 = 50;
pub const MAX_FIT_ZOOM: u8 = 14;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerPlan {
    pub markers: Vec<MarkerInstruction>,
    pub viewport: Option<Viewport>,
}

impl MarkerPlan {
    pub fn build(
        addresses: &[Point],
        candidates: &[Point],
        centroid: Option<&Point>,
        most_central: Option<&Point>,
    ) -> Self {
        let mut markers = Vec::with_capacity(addresses.len() + candidates.len() + 2);

        markers.extend(
            addresses
                .iter()
                .map(|a| instruction(a.coordinates, MarkerRole::Address, &a.label)),
        );

        let is_highlighted = |c: &Point| most_central.is_some_and(|m| m.same_position(c));
        markers.extend(
            candidates
                .iter()
                .filter(|c| !is_highlighted(*c))
                .map(|c| instruction(c.coordinates, MarkerRole::Candidate, &c.label)),
        );

        if let Some(best) = most_central {
            markers.push(instruction(
                best.coordinates,
                MarkerRole::MostCentral,
                MOST_CENTRAL_TITLE,
            ));
        }
        if let Some(center) = centroid {
            markers.push(instruction(
                center.coordinates,
                MarkerRole::Centroid,
                &center.label,
            ));
        }

        let positions: Vec<LatLong> = addresses
            .iter()
            .chain(candidates)
            .map(|p| p.coordinates)
            .collect();

        MarkerPlan {
            markers,
            viewport: fit_viewport(&positions),
        }
    }

    pub fn count(&self, role: MarkerRole) -> usize {
        self.markers.iter().filter(|m| m.role == role).count()
    }
}

fn instruction(coordinates: LatLong, role: MarkerRole, title: &str) -> MarkerInstruction {
    MarkerInstruction {
        coordinates,
        role,
        title: title.to_string(),
    }
}

fn fit_viewport(positions: &[LatLong]) -> Option<Viewport> {
    match positions {
        [] => None,
        [only] => Some(Viewport {
            bounds: MapBounds::padded(*only, SINGLE_POINT_PADDING_DEG),
            padding_px: 0,
            max_zoom: None,
        }),
        many => MapBounds::around(many).map(|bounds| Viewport {
            bounds,
            padding_px: FIT_PADDING_PX,
            max_zoom: Some(MAX_FIT_ZOOM),
        }),
    }
}

/// What the renderer has to do to match the latest plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerReconciliation {
    pub cleared: usize,
    pub placed: Vec<MarkerInstruction>,
    pub viewport: Option<Viewport>,
}

/// The live marker set, grouped by role.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    by_role: BTreeMap<MarkerRole, Vec<MarkerInstruction>>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, plan: &MarkerPlan) -> MarkerReconciliation {
        let cleared = self.len();
        self.by_role.clear();
        for marker in &plan.markers {
            self.by_role
                .entry(marker.role)
                .or_default()
                .push(marker.clone());
        }

        MarkerReconciliation {
            cleared,
            placed: plan.markers.clone(),
            viewport: plan.viewport,
        }
    }

    pub fn by_role(&self, role: MarkerRole) -> &[MarkerInstruction] {
        self.by_role.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_role.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_math;

    fn p(lat: f64, long: f64, label: &str) -> Point {
        Point::new(lat, long, label)
    }

    #[test]
    fn empty_sets_produce_nothing() {
        let plan = MarkerPlan::build(&[], &[], None, None);
        assert!(plan.markers.is_empty());
        assert!(plan.viewport.is_none());
    }

    #[test]
    fn most_central_replaces_its_candidate_pin() {
        let addresses = vec![p(0.0, 0.0, "home"), p(0.0, 2.0, "work")];
        let candidates = vec![p(0.0, 0.5, "cafe"), p(0.0, 3.0, "bar")];
        let centroid = geo_math::centroid(&addresses);

        let plan = MarkerPlan::build(
            &addresses,
            &candidates,
            centroid.as_ref(),
            Some(&candidates[0]),
        );

        assert_eq!(plan.count(MarkerRole::Address), 2);
        assert_eq!(plan.count(MarkerRole::Candidate), 1);
        assert_eq!(plan.count(MarkerRole::MostCentral), 1);
        assert_eq!(plan.count(MarkerRole::Centroid), 1);

        let roles: Vec<MarkerRole> = plan.markers.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MarkerRole::Address,
                MarkerRole::Address,
                MarkerRole::Candidate,
                MarkerRole::MostCentral,
                MarkerRole::Centroid,
            ]
        );
        assert_eq!(plan.markers[2].title, "bar");
        assert_eq!(plan.markers[3].title, MOST_CENTRAL_TITLE);
        assert_eq!(plan.markers[3].coordinates, LatLong::new(0.0, 0.5));
        assert_eq!(plan.markers[4].title, geo_math::CENTROID_LABEL);
    }

    #[test]
    fn single_point_gets_a_padded_box() {
        let plan = MarkerPlan::build(&[p(10.0, 20.0, "only")], &[], None, None);
        let viewport = plan.viewport.unwrap();
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(viewport.bounds.north_east.lat, 10.05));
        assert!(close(viewport.bounds.north_east.long, 20.05));
        assert!(close(viewport.bounds.south_west.lat, 9.95));
        assert!(close(viewport.bounds.south_west.long, 19.95));
        assert_eq!(viewport.max_zoom, None);
    }

    #[test]
    fn several_points_fit_with_zoom_cap() {
        let plan = MarkerPlan::build(&[p(1.0, 1.0, "a")], &[p(-1.0, 3.0, "b")], None, None);
        let viewport = plan.viewport.unwrap();
        assert_eq!(viewport.bounds.north_east, LatLong::new(1.0, 3.0));
        assert_eq!(viewport.bounds.south_west, LatLong::new(-1.0, 1.0));
        assert_eq!(viewport.padding_px, FIT_PADDING_PX);
        assert_eq!(viewport.max_zoom, Some(MAX_FIT_ZOOM));
    }

    #[test]
    fn store_rebuild_clears_previous_markers() {
        let mut store = MarkerStore::new();
        let first = MarkerPlan::build(&[p(0.0, 0.0, "a"), p(0.0, 2.0, "b")], &[], None, None);
        let reconciliation = store.rebuild(&first);
        assert_eq!(reconciliation.cleared, 0);
        assert_eq!(reconciliation.placed.len(), 2);
        assert_eq!(store.by_role(MarkerRole::Address).len(), 2);

        let second = MarkerPlan::build(&[], &[p(1.0, 1.0, "c")], None, None);
        let reconciliation = store.rebuild(&second);
        assert_eq!(reconciliation.cleared, 2);
        assert_eq!(store.len(), 1);
        assert!(store.by_role(MarkerRole::Address).is_empty());
        assert_eq!(store.by_role(MarkerRole::Candidate)[0].title, "c");
    }
}
