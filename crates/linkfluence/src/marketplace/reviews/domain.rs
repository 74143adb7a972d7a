use serde::{Deserialize, Serialize};

use crate::marketplace::domain::{ReviewId, Timestamp, UserId};
use crate::marketplace::identity::CachedRating;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub creator_id: UserId,
    pub reviewer_id: UserId,
    pub reviewer_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: Timestamp,
}

/// Incoming review. `rating` arrives as a JSON number and is checked for integrality here
/// rather than by the deserializer, so `4.5` is reported as an invalid rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub creator_id: UserId,
    pub reviewer_id: UserId,
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
}

pub(crate) fn parse_rating(raw: f64) -> Option<u8> {
    if raw.fract() != 0.0 || raw < f64::from(MIN_RATING) || raw > f64::from(MAX_RATING) {
        return None;
    }
    Some(raw as u8)
}

/// Mean rating rounded to one decimal place plus the review count.
/// An empty slice yields `{0, 0}`.
pub fn summarize_ratings(ratings: &[u8]) -> CachedRating {
    if ratings.is_empty() {
        return CachedRating::default();
    }

    let total: u32 = ratings.iter().map(|rating| u32::from(*rating)).sum();
    let count = ratings.len() as u32;
    let mean = f64::from(total) / f64::from(count);

    CachedRating {
        average: round_tenths_half_even(mean),
        count,
    }
}

/// Round a non-negative value to one decimal place, judging ties on the exact binary value of
/// `value`: `2.25` rounds to `2.2`, while `1.15` (stored just below the half) rounds to `1.1`.
fn round_tenths_half_even(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }

    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1_u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1_u64 << 52), biased - 1075)
    };
    if exponent >= 0 {
        return value;
    }
    if exponent < -120 {
        return 0.0;
    }

    // value * 10 == scaled / 2^shift exactly.
    let shift = exponent.unsigned_abs();
    let scaled = u128::from(mantissa) * 10;
    let denominator = 1_u128 << shift;
    let mut tenths = scaled >> shift;
    let remainder = scaled & (denominator - 1);

    let twice = remainder << 1;
    if twice > denominator || (twice == denominator && tenths % 2 == 1) {
        tenths += 1;
    }

    tenths as f64 / 10.0
}
