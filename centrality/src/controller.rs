//! Owner of the two point lists and everything derived from them.
//!
//! Every transition runs to completion and ends with a full recompute of the
//! centroid, the most central candidate and the marker set. Road lookups are
//! the only suspending step; they are tagged with the generation they were
//! started for and their results are dropped if the state moved on.

use serde::Serialize;
use shared_types::{LatLong, Point};
use tokio::sync::Mutex;

use crate::calculator::{self, RoadDistanceTable};
use crate::collection::PointCollection;
use crate::config::{DistanceMode, EngineConfig};
use crate::geo_math;
use crate::markers::{MarkerPlan, MarkerReconciliation, MarkerStore};
use crate::services::distance_matrix::DistanceMatrixSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Addresses,
    Candidates,
}

impl ListKind {
    pub fn from_candidates(from_candidates: bool) -> Self {
        if from_candidates {
            ListKind::Candidates
        } else {
            ListKind::Addresses
        }
    }

    pub fn other(self) -> Self {
        match self {
            ListKind::Addresses => ListKind::Candidates,
            ListKind::Candidates => ListKind::Addresses,
        }
    }
}

/// User-facing feedback from a transition. None of these are failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Notice {
    /// Move or remove was asked for without selecting anything.
    SelectionRequired,
    /// These points already exist in the target list and were not moved.
    DuplicateInTarget { target: ListKind, points: Vec<Point> },
    /// The list already holds a point at these coordinates.
    DuplicatePoint { target: ListKind, point: Point },
    InvalidCoordinates { point: Point },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    pub generation: u64,
    pub notices: Vec<Notice>,
}

impl TransitionOutcome {
    pub fn is_clean(&self) -> bool {
        self.notices.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub centroid: Option<Point>,
    pub most_central: Option<Point>,
    pub markers: MarkerPlan,
    pub road_lookup_pending: bool,
}

/// Work order for the road-distance collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadDistanceRequest {
    pub generation: u64,
    pub origins: Vec<LatLong>,
    pub destinations: Vec<LatLong>,
}

#[derive(Debug, Default)]
pub struct CentralityStateController {
    addresses: PointCollection,
    candidates: PointCollection,
    mode: DistanceMode,
    generation: u64,
    // Generation whose road lookup has been handed out and not yet applied.
    road_lookup_in_flight: Option<u64>,
    snapshot: Snapshot,
    store: MarkerStore,
    last_reconciliation: MarkerReconciliation,
}

impl CentralityStateController {
    pub fn new(mode: DistanceMode) -> Self {
        CentralityStateController {
            mode,
            ..Default::default()
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.distance_mode)
    }

    pub fn add_point(&mut self, target: ListKind, point: Point) -> TransitionOutcome {
        if !point.coordinates.is_valid() {
            tracing::debug!(coordinates = ?point.coordinates, "Dropping point with invalid coordinates");
            return self.unchanged(vec![Notice::InvalidCoordinates { point }]);
        }

        if !self.list_mut(target).add(point.clone()) {
            return self.unchanged(vec![Notice::DuplicatePoint { target, point }]);
        }

        self.commit(Vec::new())
    }

    /// Moves the selected points of one list to the other.
    pub fn move_points<I>(&mut self, indexes: I, from_candidates: bool) -> TransitionOutcome
    where
        I: IntoIterator<Item = usize>,
    {
        let indexes: Vec<usize> = indexes.into_iter().collect();
        if indexes.is_empty() {
            return self.unchanged(vec![Notice::SelectionRequired]);
        }

        let source = ListKind::from_candidates(from_candidates);
        let outcome = match source {
            ListKind::Candidates => self.candidates.move_to(indexes, &mut self.addresses),
            ListKind::Addresses => self.addresses.move_to(indexes, &mut self.candidates),
        };

        let mut notices = Vec::new();
        if !outcome.rejected.is_empty() {
            tracing::debug!(
                rejected = outcome.rejected.len(),
                "Points already present in the target list"
            );
            notices.push(Notice::DuplicateInTarget {
                target: source.other(),
                points: outcome.rejected,
            });
        }

        if outcome.moved.is_empty() {
            return self.unchanged(notices);
        }
        self.commit(notices)
    }

    pub fn remove_points<I>(&mut self, indexes: I, from_candidates: bool) -> TransitionOutcome
    where
        I: IntoIterator<Item = usize>,
    {
        let indexes: Vec<usize> = indexes.into_iter().collect();
        if indexes.is_empty() {
            return self.unchanged(vec![Notice::SelectionRequired]);
        }

        let removed = self
            .list_mut(ListKind::from_candidates(from_candidates))
            .remove_at(indexes);
        if removed.is_empty() {
            return self.unchanged(Vec::new());
        }
        self.commit(Vec::new())
    }

    pub fn set_distance_mode(&mut self, mode: DistanceMode) -> TransitionOutcome {
        if mode == self.mode {
            return self.unchanged(Vec::new());
        }
        self.mode = mode;
        self.commit(Vec::new())
    }

    /// The lookup the current state still needs, if any. None while the
    /// lookup for this generation is already running.
    pub fn road_request(&self) -> Option<RoadDistanceRequest> {
        if !self.snapshot.road_lookup_pending
            || self.road_lookup_in_flight == Some(self.generation)
        {
            return None;
        }

        Some(RoadDistanceRequest {
            generation: self.generation,
            origins: self.addresses.iter().map(|p| p.coordinates).collect(),
            destinations: self.candidates.iter().map(|p| p.coordinates).collect(),
        })
    }

    /// Hands out the pending lookup and marks it as running, so a second
    /// caller gets None until the result is applied or the state moves on.
    pub fn begin_road_lookup(&mut self) -> Option<RoadDistanceRequest> {
        let request = self.road_request()?;
        tracing::debug!(generation = request.generation, "Starting road distance lookup");
        self.road_lookup_in_flight = Some(request.generation);
        Some(request)
    }

    /// Applies road distances computed for `generation`. Returns false and
    /// leaves the state alone when the result belongs to an older state.
    pub fn apply_road_distances(&mut self, generation: u64, table: &RoadDistanceTable) -> bool {
        if generation != self.generation || !self.snapshot.road_lookup_pending {
            tracing::warn!(
                result_generation = generation,
                current_generation = self.generation,
                "Discarding stale road distance result"
            );
            return false;
        }

        let most_central = calculator::select_most_central(
            self.addresses.as_slice(),
            self.candidates.as_slice(),
            table.distance_fn(),
        )
        .cloned();

        tracing::info!(
            generation,
            reachable_pairs = table.reachable_pairs(),
            most_central = most_central.as_ref().map(|p| p.label.as_str()),
            "Applied road distances"
        );

        self.road_lookup_in_flight = None;
        self.publish(most_central, false);
        true
    }

    /// Runs the pending road lookup against `source` and applies it. A
    /// failed lookup counts as every pair being unreachable.
    pub async fn refresh_road_distances<S>(&mut self, source: &S) -> bool
    where
        S: DistanceMatrixSource + Sync,
    {
        let Some(request) = self.begin_road_lookup() else {
            return false;
        };
        let table = fetch_or_unreachable(source, &request).await;
        self.apply_road_distances(request.generation, &table)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn addresses(&self) -> &PointCollection {
        &self.addresses
    }

    pub fn candidates(&self) -> &PointCollection {
        &self.candidates
    }

    pub fn mode(&self) -> DistanceMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.store
    }

    /// Marker work produced by the latest recompute.
    pub fn last_reconciliation(&self) -> &MarkerReconciliation {
        &self.last_reconciliation
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut PointCollection {
        match kind {
            ListKind::Addresses => &mut self.addresses,
            ListKind::Candidates => &mut self.candidates,
        }
    }

    fn unchanged(&self, notices: Vec<Notice>) -> TransitionOutcome {
        TransitionOutcome {
            generation: self.generation,
            notices,
        }
    }

    fn commit(&mut self, notices: Vec<Notice>) -> TransitionOutcome {
        self.generation += 1;
        self.road_lookup_in_flight = None;
        self.recompute();
        TransitionOutcome {
            generation: self.generation,
            notices,
        }
    }

    fn recompute(&mut self) {
        let addresses = self.addresses.as_slice();
        let candidates = self.candidates.as_slice();
        let computable = !addresses.is_empty() && candidates.len() >= 2;

        let (most_central, pending) = match self.mode {
            DistanceMode::StraightLine => {
                (calculator::straight_line(addresses, candidates).cloned(), false)
            }
            DistanceMode::Roads => (None, computable),
        };

        tracing::debug!(
            generation = self.generation,
            addresses = addresses.len(),
            candidates = candidates.len(),
            road_lookup_pending = pending,
            "Recomputed centrality"
        );

        self.publish(most_central, pending);
    }

    fn publish(&mut self, most_central: Option<Point>, pending: bool) {
        let centroid = geo_math::centroid(self.addresses.as_slice());
        let markers = MarkerPlan::build(
            self.addresses.as_slice(),
            self.candidates.as_slice(),
            centroid.as_ref(),
            most_central.as_ref(),
        );

        self.last_reconciliation = self.store.rebuild(&markers);
        self.snapshot = Snapshot {
            generation: self.generation,
            centroid,
            most_central,
            markers,
            road_lookup_pending: pending,
        };
    }
}

async fn fetch_or_unreachable<S>(source: &S, request: &RoadDistanceRequest) -> RoadDistanceTable
where
    S: DistanceMatrixSource + Sync,
{
    match source.fetch(&request.origins, &request.destinations).await {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!(
                generation = request.generation,
                "Road distance lookup failed, treating every pair as unreachable: {}",
                e
            );
            RoadDistanceTable::new()
        }
    }
}

/// Road refresh for a controller shared between tasks.
///
/// The lock is released while the lookup is in flight; a mutation that lands
/// in the meantime bumps the generation and the late result is discarded.
pub async fn refresh_shared<S>(controller: &Mutex<CentralityStateController>, source: &S) -> bool
where
    S: DistanceMatrixSource + Sync,
{
    let Some(request) = controller.lock().await.begin_road_lookup() else {
        return false;
    };

    let table = fetch_or_unreachable(source, &request).await;
    controller
        .lock()
        .await
        .apply_road_distances(request.generation, &table)
}
