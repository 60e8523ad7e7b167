//! Construction parameters for `ChainedHashMap`.

use crate::buckets::MAX_BUCKETS;
use crate::error::MapError;

/// Smallest bucket array a map is ever built with.
pub const MIN_BUCKETS: usize = 8;

/// Load ceiling used unless the caller sets another one.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapConfig {
    /// Requested bucket count; values below `MIN_BUCKETS` are raised to it.
    pub buckets: usize,
    /// Ceiling for `len / bucket_count`; must be strictly positive.
    pub max_load_factor: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            buckets: MIN_BUCKETS,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl MapConfig {
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            buckets,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), MapError> {
        check_max_load_factor(self.max_load_factor)
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.clamp(MIN_BUCKETS, MAX_BUCKETS)
    }
}

// `!(f > 0.0)` also rejects NaN.
pub(crate) fn check_max_load_factor(f: f64) -> Result<(), MapError> {
    if !(f > 0.0) {
        return Err(MapError::InvalidValue("max load factor must be positive"));
    }
    Ok(())
}

/// Buckets allocated when growing to hold `target` entries: a generous
/// `floor(2 / max_load_factor)` buckets per entry, never fewer than one.
/// The result stays within `MIN_BUCKETS..=MAX_BUCKETS` however tiny the
/// ceiling or large the target.
pub(crate) fn buckets_for(target: usize, max_load_factor: f64) -> usize {
    // Float-to-int `as` saturates, so an infinite spread lands on usize::MAX.
    let spread = ((2.0 / max_load_factor).floor() as usize).clamp(1, MAX_BUCKETS);
    target.saturating_mul(spread).clamp(MIN_BUCKETS, MAX_BUCKETS)
}
