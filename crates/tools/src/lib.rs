//! Helpers behind the `gottago` command-line tool.

use catalog::{
    InMemoryPlaceStore, ListedPlace, RankedPlace, format_distance, format_rating, load_places,
    sample_places,
};
use foundation::GeoPoint;
use runtime::{BoxFuture, LocationError, LocationSource};
use serde::Deserialize;
use viewport::{InputEvent, ViewportController, ViewportState};

pub const IP_LOOKUP_URL: &str = "http://ip-api.com/json";

/// Approximate observer location from the caller's public IP.
pub struct IpLocationSource {
    http: reqwest::Client,
    url: String,
}

impl IpLocationSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            url: IP_LOOKUP_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLookup {
    fn point(&self) -> Result<GeoPoint, LocationError> {
        match (self.status.as_str(), self.lat, self.lon) {
            ("success", Some(lat), Some(lon)) => {
                let p = GeoPoint::new(lat, lon);
                if p.is_valid() {
                    Ok(p)
                } else {
                    Err(LocationError::Unavailable)
                }
            }
            _ => Err(LocationError::Unavailable),
        }
    }
}

impl LocationSource for IpLocationSource {
    fn locate(&self) -> BoxFuture<'_, Result<GeoPoint, LocationError>> {
        Box::pin(async move {
            let resp = self
                .http
                .get(&self.url)
                .send()
                .await
                .map_err(|_| LocationError::Unavailable)?;
            let lookup: IpLookup = resp.json().await.map_err(|_| LocationError::Unavailable)?;
            lookup.point()
        })
    }
}

/// Reads place rows as exported from the backend (a JSON array).
pub fn parse_places(json: &str) -> Result<Vec<ListedPlace>, String> {
    serde_json::from_str(json).map_err(|e| format!("places json: {e}"))
}

/// Places to show for an optional backend export. Unapproved rows are
/// dropped and an export with nothing approved falls back to the samples.
pub async fn places_from_export(raw: Option<&str>) -> Result<Vec<ListedPlace>, String> {
    let Some(raw) = raw else {
        return Ok(sample_places());
    };
    let store = InMemoryPlaceStore::with_places(parse_places(raw)?);
    Ok(load_places(&store).await)
}

/// Replays recorded input events and returns the final viewport.
pub fn replay_events(start: ViewportState, events: &[InputEvent]) -> ViewportState {
    let mut ctrl = ViewportController::new(start);
    for e in events {
        ctrl.handle(e);
    }
    ctrl.view()
}

pub fn parse_events(json: &str) -> Result<Vec<InputEvent>, String> {
    serde_json::from_str(json).map_err(|e| format!("events json: {e}"))
}

/// One line of the text listing.
pub fn listing_line(rank: usize, entry: &RankedPlace) -> String {
    let distance = entry
        .distance_miles
        .map(format_distance)
        .unwrap_or_else(|| "-".to_string());
    let p = &entry.place;
    format!(
        "{rank:>2}. {:<40} {:>9}  overall {:>3}  clean {:>4}  safety {:>4}  supplies {:>4}  ({} reviews)",
        p.name,
        distance,
        format_rating(p.ratings.overall),
        format_rating(p.ratings.cleanliness),
        format_rating(p.ratings.safety),
        format_rating(p.ratings.supplies),
        p.review_count.unwrap_or(0),
    )
}
