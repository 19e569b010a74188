use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};
use hashbrown::HashMap;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::geo::GeoPoint;

pub type LocationId = u64;
pub type ClubId = u64;

const HEADER: [&str; 6] = ["id", "club_id", "name", "address", "longitude", "latitude"];

/// One physical place where a club meets.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub club_id: ClubId,
    pub name: String,
    pub address: String,
    pub point: GeoPoint,
}

pub fn load_locations<P: AsRef<Path>>(path: P) -> Result<Vec<Location>> {
    let path = path.as_ref();
    let rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    read_from(rdr).with_context(|| format!("reading {}", path.display()))
}

/// Parses `id,club_id,name,address,longitude,latitude` rows.
pub fn read_locations<R: io::Read>(reader: R) -> Result<Vec<Location>> {
    read_from(ReaderBuilder::new().has_headers(true).from_reader(reader))
}

fn read_from<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<Location>> {
    let mut locations = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() != HEADER.len() {
            anyhow::bail!(
                "line {}: expected {} fields, found {}",
                line,
                HEADER.len(),
                record.len()
            );
        }
        let id: LocationId = record[0]
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad id {:?}", line, &record[0]))?;
        let club_id: ClubId = record[1]
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad club_id {:?}", line, &record[1]))?;
        let longitude: f64 = record[4]
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad longitude {:?}", line, &record[4]))?;
        let latitude: f64 = record[5]
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad latitude {:?}", line, &record[5]))?;
        let point = GeoPoint::new(longitude, latitude)
            .with_context(|| format!("line {}: location {}", line, id))?;
        locations.push(Location {
            id,
            club_id,
            name: record[2].to_string(),
            address: record[3].to_string(),
            point,
        });
    }
    debug!(count = locations.len(), "parsed locations");
    Ok(locations)
}

pub fn write_locations<P: AsRef<Path>>(path: P, locations: &[Location]) -> Result<()> {
    let path = path.as_ref();
    let wtr = Writer::from_path(path).with_context(|| format!("creating CSV {}", path.display()))?;
    write_to(wtr, locations)
}

pub fn write_locations_to<W: io::Write>(writer: W, locations: &[Location]) -> Result<()> {
    write_to(Writer::from_writer(writer), locations)
}

fn write_to<W: io::Write>(mut wtr: Writer<W>, locations: &[Location]) -> Result<()> {
    wtr.write_record(HEADER)?;
    for loc in locations {
        wtr.write_record(&[
            loc.id.to_string(),
            loc.club_id.to_string(),
            loc.name.clone(),
            loc.address.clone(),
            loc.point.longitude().to_string(),
            loc.point.latitude().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Locations per club, in input order within each club.
pub fn group_by_club(locations: &[Location]) -> HashMap<ClubId, Vec<&Location>> {
    let mut clubs: HashMap<ClubId, Vec<&Location>> = HashMap::new();
    for loc in locations {
        clubs.entry(loc.club_id).or_default().push(loc);
    }
    clubs
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,club_id,name,address,longitude,latitude
1,10,Fælledparken,Øster Allé,12.5700,55.7000
2,10,Amager Strand,Amager Strandvej 110,12.6500,55.6600
3,20,\"Aarhus Stadion, bane 2\",Stadion Allé 70,10.2039,56.1496
";

    #[test]
    fn reads_locations() {
        let locations = read_locations(SAMPLE.as_bytes()).unwrap();
        assert_eq!(locations.len(), 3);
        assert_eq!(locations[2].name, "Aarhus Stadion, bane 2");
        assert_eq!(locations[0].club_id, 10);
        assert_eq!(locations[1].point.longitude(), 12.65);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let data = "id,club_id,name,address,longitude,latitude\n1,1,x,y,12.0,95.0\n";
        let err = read_locations(data.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("latitude 95"));
    }

    #[test]
    fn rejects_unparsable_numbers() {
        let data = "id,club_id,name,address,longitude,latitude\n1,1,x,y,east,55.0\n";
        let err = read_locations(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("bad longitude"));
    }

    #[test]
    fn write_then_read() {
        let locations = read_locations(SAMPLE.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_locations_to(&mut buf, &locations).unwrap();
        assert_eq!(read_locations(buf.as_slice()).unwrap(), locations);
    }

    #[test]
    fn groups_by_club() {
        let locations = read_locations(SAMPLE.as_bytes()).unwrap();
        let clubs = group_by_club(&locations);
        assert_eq!(clubs.len(), 2);
        let ids: Vec<_> = clubs[&10].iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
