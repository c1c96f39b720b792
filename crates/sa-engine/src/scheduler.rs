//! Review scheduling.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Lowest (hardest) difficulty rating.
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest (easiest) difficulty rating.
pub const MAX_DIFFICULTY: u8 = 5;
/// Rating given to freshly created cards.
pub const DEFAULT_DIFFICULTY: u8 = 3;

/// Self-rated recall difficulty, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub fn new(value: u8) -> Result<Self, EngineError> {
        if (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EngineError::validation(format!(
                "Difficulty must be between {MIN_DIFFICULTY} and {MAX_DIFFICULTY}, got {value}"
            )))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_DIFFICULTY)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of days until the next review.
///
/// # Arguments
///
/// * `review_count` - The card's review count *after* the review being scheduled
/// * `difficulty` - The rating given at this review
///
/// # Algorithm
///
/// `2^review_count × (6 − difficulty)`. A rating of 1 therefore yields the
/// longest interval and a rating of 5 the shortest. Results too large for
/// an `i64` saturate at `i64::MAX`.
///
/// # Errors
///
/// `EngineError::Validation` when `review_count` is zero.
pub fn interval_days(review_count: u32, difficulty: Difficulty) -> Result<i64, EngineError> {
    if review_count < 1 {
        return Err(EngineError::validation(
            "Review count must be at least 1 when scheduling a review",
        ));
    }

    let factor = i64::from(6 - difficulty.get());
    Ok(2_i64
        .checked_pow(review_count)
        .and_then(|base| base.checked_mul(factor))
        .unwrap_or(i64::MAX))
}

/// Compute the next review date.
///
/// # Arguments
///
/// * `review_count` - The card's review count after incrementing for this review
/// * `difficulty` - The rating given at this review
/// * `now` - When the review happened
///
/// # Returns
///
/// `now + interval_days(review_count, difficulty)` days. Dates past the
/// representable range clamp to [`DateTime::<Utc>::MAX_UTC`].
pub fn schedule_next_review(
    review_count: u32,
    difficulty: Difficulty,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, EngineError> {
    let days = interval_days(review_count, difficulty)?;

    let next = TimeDelta::try_days(days)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    Ok(next)
}
