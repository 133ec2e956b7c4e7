//! Picks the most central of a set of candidate locations for a set of
//! addresses, and keeps the derived map markers in step with every edit of
//! the two lists.

pub mod calculator;
pub mod collection;
pub mod config;
pub mod controller;
pub mod error;
pub mod geo_math;
pub mod labels;
pub mod markers;
pub mod services;

pub use calculator::{select_most_central, RoadDistanceTable};
pub use collection::{MoveOutcome, PointCollection};
pub use config::{DistanceMode, EngineConfig, RoadMetric};
pub use controller::{
    refresh_shared, CentralityStateController, ListKind, Notice, RoadDistanceRequest, Snapshot,
    TransitionOutcome,
};
pub use error::{CentralityError, CentralityResult};
pub use markers::{MarkerPlan, MarkerReconciliation, MarkerStore};
pub use services::distance_matrix::{DistanceMatrixClient, DistanceMatrixSource};
pub use shared_types::{LatLong, MapBounds, MarkerInstruction, MarkerRole, Point, Viewport};
