use std::fs;
use std::path::PathBuf;

use catalog::{SortKey, rank_places};
use clap::{Parser, Subcommand};
use foundation::GeoPoint;
use runtime::{FixedLocationSource, LocationSource, ObserverHandle};
use tools::{IpLocationSource, listing_line, parse_events, places_from_export, replay_events};
use tracing_subscriber::EnvFilter;
use viewport::{
    MapCredential, StaticMapConfig, ViewportError, ViewportState, build_static_map_request,
};

#[derive(Parser)]
#[command(name = "gottago", about = "Nearby restroom listing and map helper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct LocationArgs {
    /// Observer latitude in degrees.
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Observer longitude in degrees.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,
    /// Look the observer up from the public IP when no coordinates are given.
    #[arg(long)]
    locate_ip: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the ranked listing.
    List {
        #[arg(long, default_value = "distance")]
        sort: String,
        #[command(flatten)]
        location: LocationArgs,
        /// JSON array of place rows; the sample listing when omitted.
        #[arg(long)]
        places: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Print the static map request for a viewport.
    Map {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        zoom: Option<f64>,
        /// JSON array of recorded input events to replay before rendering.
        #[arg(long)]
        events: Option<PathBuf>,
        #[arg(long)]
        places: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::List {
            sort,
            location,
            places,
            json,
        } => cmd_list(&sort, &location, places, json).await,
        Command::Map {
            location,
            zoom,
            events,
            places,
        } => cmd_map(&location, zoom, events, places).await,
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn observer(args: &LocationArgs) -> Option<GeoPoint> {
    let handle = ObserverHandle::new();
    let fixed = args.lat.zip(args.lng).map(|(lat, lng)| GeoPoint::new(lat, lng));
    let source: Box<dyn LocationSource> = if fixed.is_none() && args.locate_ip {
        Box::new(IpLocationSource::new(reqwest::Client::new()))
    } else {
        Box::new(FixedLocationSource::from_option(fixed))
    };
    handle.acquire(source.as_ref()).await;
    let location = handle.location();
    handle.teardown();
    location
}

async fn load_places(path: Option<PathBuf>) -> Result<Vec<catalog::ListedPlace>, String> {
    let raw = match path {
        Some(path) => Some(fs::read_to_string(&path).map_err(|e| format!("read {path:?}: {e}"))?),
        None => None,
    };
    places_from_export(raw.as_deref()).await
}

async fn cmd_list(
    sort: &str,
    location: &LocationArgs,
    places: Option<PathBuf>,
    json: bool,
) -> Result<(), String> {
    let places = load_places(places).await?;
    let observer = observer(location).await;
    let ranking = rank_places(places, SortKey::parse(sort), observer);

    if json {
        let payload = serde_json::to_string_pretty(&ranking).map_err(|e| format!("json: {e}"))?;
        println!("{payload}");
        return Ok(());
    }

    if observer.is_none() && SortKey::parse(sort) == SortKey::Distance {
        eprintln!("no observer location; showing the listing unsorted");
    }
    for (i, entry) in ranking.entries.iter().enumerate() {
        println!("{}", listing_line(i + 1, entry));
    }
    Ok(())
}

async fn cmd_map(
    location: &LocationArgs,
    zoom: Option<f64>,
    events: Option<PathBuf>,
    places: Option<PathBuf>,
) -> Result<(), String> {
    let token = std::env::var("MAPBOX_TOKEN").ok();
    let config = StaticMapConfig::default().with_credential(MapCredential::from_token(token.as_deref()));

    let places = load_places(places).await?;
    let observer = observer(location).await;

    let mut view = ViewportState::default();
    if let Some(o) = observer {
        view = view.centered_on(o);
    }
    if let Some(z) = zoom {
        view = ViewportState::new(view.center, z);
    }
    if let Some(path) = events {
        let raw = fs::read_to_string(&path).map_err(|e| format!("read {path:?}: {e}"))?;
        view = replay_events(view, &parse_events(&raw)?);
    }

    match build_static_map_request(&config, places.iter().map(|p| p.location()), &view, observer) {
        Ok(req) => {
            println!("{}", req.url);
            Ok(())
        }
        Err(ViewportError::Unconfigured) => {
            eprintln!("map unavailable: add MAPBOX_TOKEN to the environment");
            std::process::exit(3);
        }
    }
}
