use anyhow::{Context, Result};
use clap::Parser;
use csv::Writer;
use geodir::directory;
use geodir::proximity;
use geodir::GeoPoint;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "nearby")]
#[command(about = "Rank locations (or clubs) from a location CSV by great-circle distance to an origin.", long_about = None)]
struct Cli {
    /// Path to the locations CSV (id,club_id,name,address,longitude,latitude)
    #[arg(short, long)]
    locations: String,

    /// Origin as "lng,lat" in decimal degrees
    #[arg(short = 'p', long, allow_hyphen_values = true)]
    origin: GeoPoint,

    /// Keep only results within this many meters
    #[arg(short, long)]
    radius: Option<f64>,

    /// Keep at most this many results
    #[arg(short = 'k', long)]
    limit: Option<usize>,

    /// Rank clubs by their closest location instead of listing every location
    #[arg(long, default_value_t = false)]
    by_club: bool,

    /// Output CSV. If omitted, prints a summary to stdout.
    #[arg(short, long)]
    out: Option<String>,
}

fn main() -> Result<()> {
    geodir::init_logging();
    let cli = Cli::parse();

    let locations = directory::load_locations(&cli.locations)?;
    info!(count = locations.len(), path = %cli.locations, "loaded locations");

    if cli.by_club {
        let k = cli.limit.unwrap_or(usize::MAX);
        let clubs = match cli.radius {
            Some(radius) => proximity::clubs_within_radius(&cli.origin, &locations, radius, k)?,
            None => proximity::nearest_clubs(&cli.origin, &locations, k),
        };

        if let Some(out_path) = &cli.out {
            let mut wtr = Writer::from_path(out_path)
                .with_context(|| format!("creating CSV {}", out_path))?;
            wtr.write_record(["club_id", "location_id", "distance_m"])?;
            for c in &clubs {
                wtr.write_record(&[
                    c.club_id.to_string(),
                    c.nearest.id.to_string(),
                    format!("{:.1}", c.distance_m),
                ])?;
            }
            wtr.flush()?;
            info!(clubs = clubs.len(), path = %out_path, "wrote club distances");
        } else {
            println!("Clubs near {}: {}", cli.origin, clubs.len());
            for c in &clubs {
                println!(
                    "{:>12.1} m  club {} ({})",
                    c.distance_m, c.club_id, c.nearest.name
                );
            }
        }
        return Ok(());
    }

    let ranked = proximity::rank_locations(&cli.origin, &locations, cli.radius, cli.limit)?;

    if let Some(out_path) = &cli.out {
        let mut wtr =
            Writer::from_path(out_path).with_context(|| format!("creating CSV {}", out_path))?;
        wtr.write_record(["id", "club_id", "name", "distance_m"])?;
        for r in &ranked {
            wtr.write_record(&[
                r.location.id.to_string(),
                r.location.club_id.to_string(),
                r.location.name.clone(),
                format!("{:.1}", r.distance_m),
            ])?;
        }
        wtr.flush()?;
        info!(locations = ranked.len(), path = %out_path, "wrote distances");
    } else {
        println!("Locations near {}: {}", cli.origin, ranked.len());
        for r in &ranked {
            println!(
                "{:>12.1} m  {} ({})",
                r.distance_m, r.location.name, r.location.address
            );
        }
        if let Some(farthest) = ranked.last() {
            println!("Max distance (m): {:.2}", farthest.distance_m);
        }
    }

    Ok(())
}
