use std::env;
use std::net::SocketAddr;

use foundation::{GeoPoint, UserId};
use viewport::{DEFAULT_CENTER, DEFAULT_ZOOM, MapCredential, StaticMapConfig, ViewportState};

const UNSET_BACKEND_URL: &str = "your-supabase-url";
const UNSET_BACKEND_KEY: &str = "your-supabase-anon-key";

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub map: StaticMapConfig,
    /// `None` serves the built-in sample listing from memory.
    pub backend: Option<BackendConfig>,
    pub default_view: ViewportState,
    /// Users that start out with the admin role.
    pub admin_ids: Vec<UserId>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let raw_addr = lookup("GOTTAGO_ADDR").unwrap_or_else(|| "127.0.0.1:9200".to_string());
        let addr: SocketAddr = raw_addr
            .parse()
            .map_err(|e| format!("invalid GOTTAGO_ADDR {raw_addr:?}: {e}"))?;

        let defaults = StaticMapConfig::default();
        let map = StaticMapConfig {
            api_base: lookup("MAP_API_BASE").unwrap_or(defaults.api_base),
            style: lookup("MAP_STYLE").unwrap_or(defaults.style),
            width: parsed(&lookup, "MAP_WIDTH", defaults.width),
            height: parsed(&lookup, "MAP_HEIGHT", defaults.height),
            retina: parsed(&lookup, "MAP_RETINA", defaults.retina),
            credential: MapCredential::from_token(lookup("MAPBOX_TOKEN").as_deref()),
        };

        let backend = match (lookup("SUPABASE_URL"), lookup("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key))
                if !url.trim().is_empty()
                    && !anon_key.trim().is_empty()
                    && url != UNSET_BACKEND_URL
                    && anon_key != UNSET_BACKEND_KEY =>
            {
                Some(BackendConfig { url, anon_key })
            }
            _ => None,
        };

        let center = GeoPoint::new(
            parsed(&lookup, "DEFAULT_CENTER_LAT", DEFAULT_CENTER.lat),
            parsed(&lookup, "DEFAULT_CENTER_LNG", DEFAULT_CENTER.lng),
        );
        if !center.is_valid() {
            return Err(format!(
                "default center out of range: {}, {}",
                center.lat, center.lng
            ));
        }
        let default_view = ViewportState::new(center, parsed(&lookup, "DEFAULT_ZOOM", DEFAULT_ZOOM));

        let admin_ids = lookup("ADMIN_USER_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(UserId::new)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            addr,
            map,
            backend,
            default_view,
            admin_ids,
        })
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
