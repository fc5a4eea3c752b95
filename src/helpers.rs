//! Shared helpers for coordinate handling.
//!
//! - `validate_coordinate`: range check applied before anything reaches the core
//! - `f64_to_decimal_full` / `dec_to_f64`: f64 ↔ Decimal for NUMERIC columns
//!
//! `f64_to_decimal_full` returns `Decimal::ZERO` for non-finite inputs (NaN, ±Inf).

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::errors::AppError;
use crate::services::snapshot::Coordinate;

/// Reject coordinates that are non-finite or outside lat [-90, 90], lon [-180, 180].
pub(crate) fn validate_coordinate(lat: f64, lon: f64) -> Result<Coordinate, AppError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::BadRequest(
            "lat must be between -90 and 90".to_string(),
        ));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::BadRequest(
            "lon must be between -180 and 180".to_string(),
        ));
    }
    Ok(Coordinate::new(lat, lon))
}

/// Convert an f64 to Decimal preserving full precision.
///
/// Used for geographic values (latitude, longitude) where full precision
/// matters for accurate positioning.
pub(crate) fn f64_to_decimal_full(v: f64) -> Decimal {
    if !v.is_finite() {
        tracing::warn!(
            "f64_to_decimal_full received non-finite value {}, defaulting to 0",
            v
        );
        return Decimal::ZERO;
    }
    Decimal::from_f64(v).unwrap_or_else(|| Decimal::new(v as i64, 0))
}

/// Convert a Decimal to f64, defaulting to 0.0 for values that can't be represented.
pub(crate) fn dec_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}
