//! Static map image requests.
//!
//! The map is rendered by an external static-image API. The request string
//! encodes the style, the markers, the camera (`lng,lat,zoom,bearing`) and the
//! image size. Building it is a pure function of its inputs.

use std::fmt;

use foundation::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::state::ViewportState;

pub const DEFAULT_API_BASE: &str = "https://api.mapbox.com/styles/v1";
pub const DEFAULT_STYLE: &str = "mapbox/dark-v11";

/// Placeholder token shipped in sample env files; treated as missing.
pub const UNSET_TOKEN_SENTINEL: &str = "your-mapbox-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewportError {
    /// No usable map credential; callers show a placeholder instead of a map.
    Unconfigured,
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportError::Unconfigured => write!(f, "map credential is not configured"),
        }
    }
}

impl std::error::Error for ViewportError {}

/// Access token for the static map API.
#[derive(Clone, PartialEq, Eq)]
pub struct MapCredential(String);

impl MapCredential {
    /// `None` for an absent, blank or placeholder token.
    pub fn from_token(token: Option<&str>) -> Option<Self> {
        let token = token?.trim();
        if token.is_empty() || token == UNSET_TOKEN_SENTINEL {
            return None;
        }
        Some(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MapCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MapCredential(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    /// Small blue pin for listed places.
    Place,
    /// Large red pin for the observer.
    Observer,
}

impl MarkerStyle {
    pub fn token(self) -> &'static str {
        match self {
            MarkerStyle::Place => "pin-s+3b82f6",
            MarkerStyle::Observer => "pin-l+ef4444",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub style: MarkerStyle,
    pub point: GeoPoint,
}

impl fmt::Display for MarkerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.style.token(), self.point.lng, self.point.lat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticMapConfig {
    pub api_base: String,
    pub style: String,
    pub width: u32,
    pub height: u32,
    /// Request a double-density image.
    pub retina: bool,
    pub credential: Option<MapCredential>,
}

impl Default for StaticMapConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            style: DEFAULT_STYLE.to_string(),
            width: 800,
            height: 600,
            retina: true,
            credential: None,
        }
    }
}

impl StaticMapConfig {
    pub fn with_credential(mut self, credential: Option<MapCredential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credential.is_some()
    }
}

/// Everything needed to fetch one map image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticMapRequest {
    /// Place markers in input order, followed by the observer marker if any.
    pub markers: Vec<MarkerSpec>,
    pub center: GeoPoint,
    pub zoom: f64,
    pub url: String,
}

/// Builds the image request for the given places, camera and observer.
///
/// Returns [`ViewportError::Unconfigured`] without building anything when the
/// config has no credential.
pub fn build_static_map_request<I>(
    config: &StaticMapConfig,
    places: I,
    view: &ViewportState,
    observer: Option<GeoPoint>,
) -> Result<StaticMapRequest, ViewportError>
where
    I: IntoIterator<Item = GeoPoint>,
{
    let Some(credential) = config.credential.as_ref() else {
        return Err(ViewportError::Unconfigured);
    };

    let mut markers: Vec<MarkerSpec> = places
        .into_iter()
        .map(|point| MarkerSpec {
            style: MarkerStyle::Place,
            point,
        })
        .collect();
    if let Some(point) = observer {
        markers.push(MarkerSpec {
            style: MarkerStyle::Observer,
            point,
        });
    }

    let overlay = markers
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let mut url = format!(
        "{}/{}/static/",
        config.api_base.trim_end_matches('/'),
        config.style
    );
    // An empty overlay segment is not accepted by the API; omit it.
    if !overlay.is_empty() {
        url.push_str(&overlay);
        url.push('/');
    }
    url.push_str(&format!(
        "{},{},{},0/{}x{}{}?access_token={}",
        view.center.lng,
        view.center.lat,
        view.zoom,
        config.width,
        config.height,
        if config.retina { "@2x" } else { "" },
        credential.as_str()
    ));

    Ok(StaticMapRequest {
        markers,
        center: view.center,
        zoom: view.zoom,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StaticMapConfig {
        StaticMapConfig::default().with_credential(MapCredential::from_token(Some("pk.test")))
    }

    #[test]
    fn sentinel_and_blank_tokens_are_unset() {
        assert!(MapCredential::from_token(None).is_none());
        assert!(MapCredential::from_token(Some("  ")).is_none());
        assert!(MapCredential::from_token(Some(UNSET_TOKEN_SENTINEL)).is_none());
        assert!(MapCredential::from_token(Some("pk.abc")).is_some());
    }

    #[test]
    fn unconfigured_builds_nothing() {
        let err = build_static_map_request(
            &StaticMapConfig::default(),
            [GeoPoint::new(1.0, 2.0)],
            &ViewportState::default(),
            None,
        )
        .unwrap_err();
        assert_eq!(err, ViewportError::Unconfigured);
    }

    #[test]
    fn encodes_markers_center_and_size() {
        let view = ViewportState::new(GeoPoint::new(40.7589, -73.9851), 12.0);
        let req = build_static_map_request(
            &config(),
            [GeoPoint::new(40.75, -73.98), GeoPoint::new(40.76, -73.99)],
            &view,
            Some(GeoPoint::new(40.7, -74.0)),
        )
        .unwrap();
        assert_eq!(
            req.url,
            "https://api.mapbox.com/styles/v1/mapbox/dark-v11/static/\
             pin-s+3b82f6(-73.98,40.75),pin-s+3b82f6(-73.99,40.76),pin-l+ef4444(-74,40.7)/\
             -73.9851,40.7589,12,0/800x600@2x?access_token=pk.test"
        );
        assert_eq!(req.markers.len(), 3);
        assert_eq!(req.markers[2].style, MarkerStyle::Observer);
    }

    #[test]
    fn half_zoom_and_no_markers() {
        let view = ViewportState::new(GeoPoint::new(0.5, 1.5), 12.5);
        let mut cfg = config();
        cfg.retina = false;
        let req = build_static_map_request(&cfg, Vec::<GeoPoint>::new(), &view, None).unwrap();
        assert_eq!(
            req.url,
            "https://api.mapbox.com/styles/v1/mapbox/dark-v11/static/1.5,0.5,12.5,0/800x600?access_token=pk.test"
        );
        assert!(req.markers.is_empty());
    }

    #[test]
    fn same_inputs_same_request() {
        let view = ViewportState::default();
        let places = [GeoPoint::new(40.75, -73.98)];
        let observer = Some(GeoPoint::new(40.7, -74.0));
        let a = build_static_map_request(&config(), places, &view, observer).unwrap();
        let b = build_static_map_request(&config(), places, &view, observer).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn credential_is_not_printed_by_debug() {
        let cfg = config();
        assert!(!format!("{cfg:?}").contains("pk.test"));
    }
}
