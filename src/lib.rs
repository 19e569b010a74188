//! Great-circle distances over a directory of club locations.
//!
//! [`geo`] holds the haversine calculator and the validated [`GeoPoint`].
//! [`directory`] reads and writes location records, and [`proximity`] sorts,
//! filters and ranks them by distance from an origin.

pub mod directory;
pub mod error;
pub mod geo;
pub mod proximity;

pub use error::GeoError;
pub use geo::{distance_meters, GeoPoint};

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber used by both binaries. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}
