//! SafeWatch CLI
//!
//! Runs nearby lookups against a JSON snapshot of backend tables, and
//! measures distances between two points.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use safewatch_core::{
    format_distance, logging, CompassDirection, Config, GeoPoint, ProximityResult,
};
use safewatch_domain::{MemoryStore, NearbyService};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "safewatch", version, about = "Proximity lookups for SafeWatch records")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Distance, bearing and direction between two points
    Distance {
        /// Start point as LAT,LON
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: GeoPoint,
        /// End point as LAT,LON
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: GeoPoint,
    },
    /// Active SOS alerts near a point
    Alerts(LookupArgs),
    /// Communities near a point
    Communities(LookupArgs),
    /// Community posts near a point, newest first
    Posts(LookupArgs),
}

#[derive(Debug, Args)]
struct LookupArgs {
    /// JSON snapshot keyed by table name
    #[arg(long)]
    snapshot: PathBuf,

    /// Reference point as LAT,LON
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    at: GeoPoint,

    /// Search radius in kilometres (defaults from configuration)
    #[arg(long)]
    radius: Option<f64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {:?}", s))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("bad latitude {:?}: {}", lat, e))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("bad longitude {:?}: {}", lon, e))?;
    GeoPoint::new(lat, lon).map_err(|e| e.to_string())
}

fn print_results<T, F>(results: &[ProximityResult<T>], json: bool, describe: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No matches");
        return Ok(());
    }

    for result in results {
        println!(
            "{:>8}  {}",
            format_distance(result.distance_km),
            describe(&result.record)
        );
    }
    Ok(())
}

fn open_service(args: &LookupArgs, config: &Config) -> Result<NearbyService<MemoryStore>> {
    let store = MemoryStore::from_snapshot_file(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    Ok(NearbyService::new(store, config.proximity.clone()))
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Command::Distance { from, to } => {
            let distance = from.distance_km(&to);
            let bearing = from.bearing_to(&to);
            println!("Distance: {} ({:.3} km)", format_distance(distance), distance);
            println!(
                "Bearing:  {:.1}° {}",
                bearing,
                CompassDirection::from_bearing(bearing)
            );
        }
        Command::Alerts(args) => {
            let service = open_service(&args, &config)?;
            let results = service.nearby_alerts(args.at, args.radius)?;
            print_results(&results, args.json, |alert| {
                format!("{}  {:?}  {}", alert.id, alert.incident_type, alert.location)
            })?;
        }
        Command::Communities(args) => {
            let service = open_service(&args, &config)?;
            let results = service.nearby_communities(args.at, args.radius)?;
            print_results(&results, args.json, |community| {
                format!(
                    "{}  {} ({} members)",
                    community.id, community.name, community.member_count
                )
            })?;
        }
        Command::Posts(args) => {
            let service = open_service(&args, &config)?;
            let results = service.nearby_posts(args.at, args.radius)?;
            print_results(&results, args.json, |post| {
                format!("{}  {}: {}", post.id, post.display_name(), post.content)
            })?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default_config(),
    };
    if cli.log_json {
        config.logging.json = true;
    }

    logging::init_with(&config.logging);
    tracing::debug!(?config, "Configuration loaded");

    run(cli, config)
}
