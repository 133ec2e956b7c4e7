// Google Distance Matrix API service module
// Road distances / durations between addresses and candidate locations

use std::future::Future;
use std::ops::Range;

use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use shared_types::LatLong;

use crate::calculator::RoadDistanceTable;
use crate::config::{EngineConfig, RoadMetric};
use crate::error::{CentralityError, CentralityResult};

/// The API refuses more than 25 origins or 25 destinations per call.
pub const MAX_PLACES_PER_SIDE: usize = 25;

/// Anything that can answer road distances for origin/destination pairs.
pub trait DistanceMatrixSource {
    fn fetch(
        &self,
        origins: &[LatLong],
        destinations: &[LatLong],
    ) -> impl Future<Output = CentralityResult<RoadDistanceTable>> + Send;
}

#[derive(Debug, Clone)]
pub struct DistanceMatrixClient {
    client: Client,
    api_key: String,
    endpoint: String,
    metric: RoadMetric,
    max_elements: usize,
}

impl DistanceMatrixClient {
    /// Fails with `MissingApiKey` when the config carries no key.
    pub fn new(config: &EngineConfig) -> CentralityResult<Self> {
        let api_key = config.api_key()?.to_string();
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(DistanceMatrixClient {
            client,
            api_key,
            endpoint: config.distance_matrix_url.clone(),
            metric: config.road_metric,
            max_elements: config.max_elements_per_request.max(1),
        })
    }

    pub fn request_url(&self, origins: &[LatLong], destinations: &[LatLong]) -> String {
        format!(
            "{}?units=metric&origins={}&destinations={}&key={}",
            self.endpoint,
            encode_positions(origins),
            encode_positions(destinations),
            urlencoding::encode(&self.api_key)
        )
    }

    async fn fetch_chunk(
        &self,
        origins: &[LatLong],
        destinations: &[LatLong],
    ) -> CentralityResult<RoadDistanceTable> {
        let url = self.request_url(origins, destinations);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(CentralityError::Api {
                status: status.to_string(),
                message: error_text,
            });
        }

        let body: Value = response.json().await?;
        parse_distance_matrix(origins, destinations, &body, self.metric)
    }
}

impl DistanceMatrixSource for DistanceMatrixClient {
    async fn fetch(
        &self,
        origins: &[LatLong],
        destinations: &[LatLong],
    ) -> CentralityResult<RoadDistanceTable> {
        if origins.is_empty() || destinations.is_empty() {
            return Ok(RoadDistanceTable::new());
        }

        let chunks = plan_chunks(origins.len(), destinations.len(), self.max_elements);
        tracing::debug!(
            origins = origins.len(),
            destinations = destinations.len(),
            requests = chunks.len(),
            "Requesting road distances"
        );

        let results = join_all(chunks.iter().map(|(o, d)| {
            self.fetch_chunk(&origins[o.clone()], &destinations[d.clone()])
        }))
        .await;

        merge_chunks(results)
    }
}

/// Folds per-chunk results into one table. Pairs of a failed chunk stay
/// unreachable; the last error is returned only if no chunk answered.
pub fn merge_chunks(
    results: Vec<CentralityResult<RoadDistanceTable>>,
) -> CentralityResult<RoadDistanceTable> {
    let mut table = RoadDistanceTable::new();
    let mut last_error = None;
    let mut answered = 0;
    for result in results {
        match result {
            Ok(chunk) => {
                answered += 1;
                table.merge(chunk);
            }
            Err(e) => {
                tracing::warn!("Distance Matrix request failed, pairs left unreachable: {}", e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if answered == 0 => Err(e),
        _ => Ok(table),
    }
}

fn encode_positions(positions: &[LatLong]) -> String {
    let joined = positions
        .iter()
        .map(|p| format!("{},{}", p.lat, p.long))
        .collect::<Vec<_>>()
        .join("|");
    urlencoding::encode(&joined).into_owned()
}

/// Splits an origins x destinations matrix into requests of at most
/// `max_elements` elements and at most 25 places per side.
pub fn plan_chunks(
    origins: usize,
    destinations: usize,
    max_elements: usize,
) -> Vec<(Range<usize>, Range<usize>)> {
    if origins == 0 || destinations == 0 {
        return Vec::new();
    }

    let max_elements = max_elements.max(1);
    let origin_step = origins.min(MAX_PLACES_PER_SIDE).min(max_elements);
    let destination_step = (max_elements / origin_step).clamp(1, MAX_PLACES_PER_SIDE);

    let mut chunks = Vec::new();
    for o in (0..origins).step_by(origin_step) {
        for d in (0..destinations).step_by(destination_step) {
            chunks.push((
                o..(o + origin_step).min(origins),
                d..(d + destination_step).min(destinations),
            ));
        }
    }
    chunks
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
    duration: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: f64,
}

/// Turn a Distance Matrix JSON body into a table keyed by the requested
/// positions. Elements without an `OK` status are recorded as unreachable.
pub fn parse_distance_matrix(
    origins: &[LatLong],
    destinations: &[LatLong],
    body: &Value,
    metric: RoadMetric,
) -> CentralityResult<RoadDistanceTable> {
    let response: MatrixResponse = serde_json::from_value(body.clone())
        .map_err(|e| CentralityError::malformed(e.to_string()))?;

    if response.status != "OK" {
        return Err(CentralityError::Api {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }

    if response.rows.len() != origins.len() {
        return Err(CentralityError::malformed(format!(
            "expected {} rows, got {}",
            origins.len(),
            response.rows.len()
        )));
    }

    let mut table = RoadDistanceTable::new();
    for (origin, row) in origins.iter().zip(&response.rows) {
        if row.elements.len() != destinations.len() {
            return Err(CentralityError::malformed(format!(
                "expected {} elements per row, got {}",
                destinations.len(),
                row.elements.len()
            )));
        }

        for (destination, element) in destinations.iter().zip(&row.elements) {
            let value = match metric {
                RoadMetric::Distance => element.distance.as_ref(),
                RoadMetric::Duration => element.duration.as_ref(),
            };
            match value {
                Some(v) if element.status == "OK" => table.insert(origin, destination, v.value),
                _ => table.insert_unreachable(origin, destination),
            }
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn element(meters: f64, seconds: f64) -> Value {
        json!({
            "status": "OK",
            "distance": { "text": "", "value": meters },
            "duration": { "text": "", "value": seconds }
        })
    }

    #[test]
    fn parses_distance_and_duration() {
        let origins = [LatLong::new(0.0, 0.0), LatLong::new(0.0, 2.0)];
        let destinations = [LatLong::new(0.0, 1.0)];
        let body = json!({
            "status": "OK",
            "rows": [
                { "elements": [element(1200.0, 90.0)] },
                { "elements": [{ "status": "ZERO_RESULTS" }] }
            ]
        });

        let table =
            parse_distance_matrix(&origins, &destinations, &body, RoadMetric::Distance).unwrap();
        assert_eq!(table.get(&origins[0], &destinations[0]), 1200.0);
        assert!(table.get(&origins[1], &destinations[0]).is_infinite());

        let table =
            parse_distance_matrix(&origins, &destinations, &body, RoadMetric::Duration).unwrap();
        assert_eq!(table.get(&origins[0], &destinations[0]), 90.0);
    }

    #[test]
    fn top_level_failure_is_an_api_error() {
        let body = json!({ "status": "REQUEST_DENIED", "error_message": "bad key", "rows": [] });
        let err = parse_distance_matrix(
            &[LatLong::new(0.0, 0.0)],
            &[LatLong::new(1.0, 1.0)],
            &body,
            RoadMetric::Distance,
        )
        .unwrap_err();
        match err {
            CentralityError::Api { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "bad key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn shape_mismatch_is_malformed() {
        let body = json!({ "status": "OK", "rows": [{ "elements": [] }] });
        let err = parse_distance_matrix(
            &[LatLong::new(0.0, 0.0)],
            &[LatLong::new(1.0, 1.0)],
            &body,
            RoadMetric::Distance,
        )
        .unwrap_err();
        assert!(matches!(err, CentralityError::MalformedResponse { .. }));

        let err = parse_distance_matrix(
            &[LatLong::new(0.0, 0.0)],
            &[LatLong::new(1.0, 1.0)],
            &json!({ "rows": "nope" }),
            RoadMetric::Distance,
        )
        .unwrap_err();
        assert!(matches!(err, CentralityError::MalformedResponse { .. }));
    }

    #[test]
    fn chunks_respect_element_budget() {
        let chunks = plan_chunks(3, 70, 100);
        // 3 origins x 25 destinations, capped by the side limit
        assert_eq!(chunks.len(), 3);
        for (o, d) in &chunks {
            assert!(o.len() * d.len() <= 100);
            assert!(d.len() <= MAX_PLACES_PER_SIDE);
        }
        let covered: usize = chunks.iter().map(|(o, d)| o.len() * d.len()).sum();
        assert_eq!(covered, 3 * 70);
    }

    #[test]
    fn chunks_split_origins_past_the_side_limit() {
        let chunks = plan_chunks(30, 2, 100);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].0, 0..25);
        assert_eq!(chunks[1].0, 25..30);
        assert!(plan_chunks(0, 5, 100).is_empty());
        assert_eq!(plan_chunks(4, 4, 1).len(), 16);
    }

    fn chunk(
        origin: LatLong,
        destination: LatLong,
        meters: f64,
    ) -> CentralityResult<RoadDistanceTable> {
        let mut table = RoadDistanceTable::new();
        table.insert(&origin, &destination, meters);
        Ok(table)
    }

    fn denied() -> CentralityResult<RoadDistanceTable> {
        Err(CentralityError::Api {
            status: "OVER_QUERY_LIMIT".to_string(),
            message: String::new(),
        })
    }

    #[test]
    fn failed_chunk_leaves_its_pairs_unreachable() {
        let home = LatLong::new(0.0, 0.0);
        let (cafe, bar) = (LatLong::new(0.0, 1.0), LatLong::new(0.0, 2.0));

        let table = merge_chunks(vec![chunk(home, cafe, 1500.0), denied()]).unwrap();
        assert_eq!(table.get(&home, &cafe), 1500.0);
        assert!(table.get(&home, &bar).is_infinite());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn every_chunk_failing_is_an_error() {
        let err = merge_chunks(vec![denied(), denied()]).unwrap_err();
        assert!(matches!(err, CentralityError::Api { .. }));
    }

    #[test]
    fn answered_chunks_are_merged() {
        let home = LatLong::new(0.0, 0.0);
        let (cafe, bar) = (LatLong::new(0.0, 1.0), LatLong::new(0.0, 2.0));

        let table =
            merge_chunks(vec![chunk(home, cafe, 1500.0), chunk(home, bar, 2500.0)]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&home, &bar), 2500.0);
        assert!(merge_chunks(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn request_url_encodes_positions() {
        let config = EngineConfig {
            google_maps_api_key: Some("k".to_string()),
            ..EngineConfig::default()
        };
        let client = DistanceMatrixClient::new(&config).unwrap();
        let url = client.request_url(
            &[LatLong::new(1.5, -2.0), LatLong::new(3.0, 4.0)],
            &[LatLong::new(0.0, 0.25)],
        );
        assert_eq!(
            url,
            "https://maps.googleapis.com/maps/api/distancematrix/json?units=metric\
             &origins=1.5%2C-2%7C3%2C4&destinations=0%2C0.25&key=k"
        );
    }

    #[test]
    fn client_requires_api_key() {
        let err = DistanceMatrixClient::new(&EngineConfig::default()).unwrap_err();
        assert!(matches!(err, CentralityError::MissingApiKey));
    }
}
