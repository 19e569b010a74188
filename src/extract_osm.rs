use anyhow::{Context, Result};
use clap::Parser;
use geodir::directory::{self, Location, LocationId};
use geodir::GeoPoint;
use osmpbfreader::{OsmObj, OsmPbfReader, Tags};
use std::fs::File;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "extract")]
#[command(about = "Pull named, tagged nodes out of an OSM .pbf into a locations CSV.", long_about = None)]
struct Cli {
    /// Path to the .osm.pbf file
    #[arg(short, long)]
    pbf: String,

    /// Output locations CSV
    #[arg(short, long)]
    out: String,

    /// Tag key a node must carry to be kept (e.g. leisure, sport, club)
    #[arg(short, long, default_value_t = String::from("leisure"))]
    tag: String,

    /// Only keep nodes whose tag has this value
    #[arg(short, long)]
    value: Option<String>,
}

fn is_wanted(tags: &Tags, key: &str, value: Option<&str>) -> bool {
    if !tags.contains_key("name") {
        return false;
    }
    match (tags.get(key), value) {
        (Some(v), Some(want)) => v.as_str() == want,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn address(tags: &Tags) -> String {
    match (tags.get("addr:street"), tags.get("addr:housenumber")) {
        (Some(street), Some(number)) => format!("{} {}", street, number),
        (Some(street), None) => street.to_string(),
        _ => String::new(),
    }
}

/// Locally edited extracts use negative ids for new nodes; those have no stable id to keep.
fn location_id(node_id: i64) -> Option<LocationId> {
    LocationId::try_from(node_id).ok()
}

fn main() -> Result<()> {
    geodir::init_logging();
    let cli = Cli::parse();

    let file = File::open(&cli.pbf).with_context(|| format!("opening {}", &cli.pbf))?;
    let mut pbf = OsmPbfReader::new(file);

    let mut locations: Vec<Location> = Vec::new();
    let mut skipped: usize = 0;
    for obj in pbf.iter() {
        let obj = obj?;
        if let OsmObj::Node(n) = obj {
            if !is_wanted(&n.tags, &cli.tag, cli.value.as_deref()) {
                continue;
            }
            let Some(id) = location_id(n.id.0) else {
                warn!(node = n.id.0, "skipping node with negative id");
                skipped += 1;
                continue;
            };
            let point = match GeoPoint::new(n.lon(), n.lat()) {
                Ok(point) => point,
                Err(e) => {
                    warn!(node = n.id.0, error = %e, "skipping node");
                    skipped += 1;
                    continue;
                }
            };
            locations.push(Location {
                id,
                club_id: 0,
                name: n.tags.get("name").map(|s| s.to_string()).unwrap_or_default(),
                address: address(&n.tags),
                point,
            });
        }
    }

    info!(kept = locations.len(), skipped, tag = %cli.tag, "collected tagged nodes");

    directory::write_locations(&cli.out, &locations)?;
    info!(path = %cli.out, "wrote locations");
    Ok(())
}
