use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside (-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("radius {0} must be a finite, non-negative number of meters")]
    InvalidRadius(f64),

    #[error("malformed point {0:?}, expected \"lng,lat\"")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, GeoError>;
