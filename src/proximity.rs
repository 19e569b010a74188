/*
Ordering locations by their distance from an origin point.

OrderedFloat gives distances a total order without unwraps. A point built with
GeoPoint::new_unchecked can still produce NaN; those sort after every finite distance.
*/

use ordered_float::OrderedFloat;
use orx_priority_queue::*;
use tracing::debug;

use crate::directory::{group_by_club, ClubId, Location, LocationId};
use crate::error::{GeoError, Result};
use crate::geo::GeoPoint;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ranked<'a> {
    pub location: &'a Location,
    pub distance_m: f64,
}

/// A club together with its location closest to the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClubDistance<'a> {
    pub club_id: ClubId,
    pub nearest: &'a Location,
    pub distance_m: f64,
}

type RankKey = (OrderedFloat<f64>, LocationId);
type ClubKey = (OrderedFloat<f64>, ClubId);

fn rank_key(r: &Ranked) -> RankKey {
    (OrderedFloat(r.distance_m), r.location.id)
}

fn measure<'a>(origin: &GeoPoint, locations: &'a [Location]) -> impl Iterator<Item = Ranked<'a>> + 'a {
    let origin = *origin;
    locations.iter().map(move |location| Ranked {
        location,
        distance_m: origin.distance_to(&location.point),
    })
}

/// All locations, closest first. Equal distances fall back to location id.
pub fn sort_by_distance<'a>(origin: &GeoPoint, locations: &'a [Location]) -> Vec<Ranked<'a>> {
    let mut ranked: Vec<Ranked> = measure(origin, locations).collect();
    ranked.sort_by_key(rank_key);
    ranked
}

fn check_radius(radius_m: f64) -> Result<()> {
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(GeoError::InvalidRadius(radius_m));
    }
    Ok(())
}

/// Locations no farther than `radius_m` from `origin`, closest first.
pub fn within_radius<'a>(
    origin: &GeoPoint,
    locations: &'a [Location],
    radius_m: f64,
) -> Result<Vec<Ranked<'a>>> {
    check_radius(radius_m)?;
    let mut ranked: Vec<Ranked> = measure(origin, locations)
        .filter(|r| r.distance_m <= radius_m)
        .collect();
    ranked.sort_by_key(rank_key);
    debug!(radius_m, kept = ranked.len(), total = locations.len(), "radius filter");
    Ok(ranked)
}

/// The `k` closest locations, closest first.
pub fn nearest<'a>(origin: &GeoPoint, locations: &'a [Location], k: usize) -> Vec<Ranked<'a>> {
    let mut pq: BinaryHeap<usize, RankKey> = BinaryHeap::new();
    let all: Vec<Ranked> = measure(origin, locations).collect();
    for (idx, r) in all.iter().enumerate() {
        pq.push(idx, rank_key(r));
    }

    let mut out = Vec::with_capacity(k.min(all.len()));
    while out.len() < k {
        match pq.pop() {
            Some((idx, _)) => out.push(all[idx]),
            None => break,
        }
    }
    out
}

/// Locations ordered for display: restricted to `radius_m` when given, then cut to `limit`.
pub fn rank_locations<'a>(
    origin: &GeoPoint,
    locations: &'a [Location],
    radius_m: Option<f64>,
    limit: Option<usize>,
) -> Result<Vec<Ranked<'a>>> {
    let mut ranked = match (radius_m, limit) {
        (Some(radius_m), _) => within_radius(origin, locations, radius_m)?,
        (None, Some(k)) => nearest(origin, locations, k),
        (None, None) => sort_by_distance(origin, locations),
    };
    if let Some(k) = limit {
        ranked.truncate(k);
    }
    Ok(ranked)
}

/// Clubs ranked by their closest location, at most `k` of them.
/// Equal distances fall back to club id.
pub fn nearest_clubs<'a>(
    origin: &GeoPoint,
    locations: &'a [Location],
    k: usize,
) -> Vec<ClubDistance<'a>> {
    let clubs = group_by_club(locations);
    let mut best: Vec<Ranked> = Vec::with_capacity(clubs.len());
    let mut pq: BinaryHeapWithMap<usize, ClubKey> = BinaryHeapWithMap::new();

    for (club_id, club_locations) in clubs {
        let idx = best.len();
        for &location in &club_locations {
            let r = Ranked {
                location,
                distance_m: origin.distance_to(&location.point),
            };
            if best.len() == idx {
                best.push(r);
            } else if rank_key(&r) < rank_key(&best[idx]) {
                best[idx] = r;
            }
            pq.decrease_key_or_push(&idx, (OrderedFloat(best[idx].distance_m), club_id));
        }
    }
    debug!(clubs = best.len(), "scored clubs by nearest location");

    let mut out = Vec::with_capacity(k.min(best.len()));
    while out.len() < k {
        match pq.pop() {
            Some((idx, (distance_m, club_id))) => out.push(ClubDistance {
                club_id,
                nearest: best[idx].location,
                distance_m: distance_m.into_inner(),
            }),
            None => break,
        }
    }
    out
}

/// Clubs whose closest location is within `radius_m`, at most `k` of them.
pub fn clubs_within_radius<'a>(
    origin: &GeoPoint,
    locations: &'a [Location],
    radius_m: f64,
    k: usize,
) -> Result<Vec<ClubDistance<'a>>> {
    check_radius(radius_m)?;
    let mut clubs = nearest_clubs(origin, locations, k);
    clubs.retain(|c| c.distance_m <= radius_m);
    Ok(clubs)
}
