//! Spaced-repetition scheduling (SM-2).
//!
//! Implements the SuperMemo SM-2 algorithm: each review rates recall from
//! 0 to 5, and the next interval grows by an ease factor that adapts to
//! how well the card is known. Ratings below 3 are failures and reset the
//! interval to one day.
//!
//! Scheduling is a pure function over the review history. It touches no
//! storage and no key material, so callers can run it over decrypted
//! payloads and persist the result however they like.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

/// Lowest ease factor a card can reach.
const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to a card on its first review.
const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Highest valid recall rating.
const MAX_RATING: u8 = 5;

/// One completed review of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry {
    /// Recall rating, 0 (blackout) to 5 (perfect)
    pub rating: u8,

    /// When the review happened
    pub scheduled_at: DateTime<Utc>,

    /// Interval that was assigned by this review, in days
    pub interval_days: u32,

    /// Ease factor after this review
    pub ease_factor: f64,
}

/// The scheduling decision for a card after a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextReview {
    /// Days until the card is due again (0 means later this session)
    pub interval_days: u32,

    /// Updated ease factor to carry into the next review
    pub ease_factor: f64,

    /// When the card is due
    pub due_at: DateTime<Utc>,
}

/// Compute the next review for a card.
///
/// # Arguments
///
/// * `history` - Past reviews, oldest first; only the last one matters
/// * `rating` - Recall rating for the review that just happened, 0 to 5
/// * `now` - The current time, from which `due_at` is computed
///
/// # Scheduling rules
///
/// - First review: interval 1 on success (rating 3+), 0 on failure
/// - Failure always resets the interval to 1 day but keeps shrinking the
///   ease factor, so a struggling card grows back slowly
/// - Success grows the interval: 1 day, then 6, then by the ease factor
/// - The ease factor never drops below 1.3
///
/// # Errors
///
/// Returns `HubError::InvalidInput` if `rating` is above 5.
pub fn next_interval(history: &[ReviewEntry], rating: u8, now: DateTime<Utc>) -> Result<NextReview> {
    if rating > MAX_RATING {
        return Err(HubError::InvalidInput(format!(
            "Rating must be 0 to {} (got {})",
            MAX_RATING, rating
        )));
    }

    let (interval_days, ease_factor) = match history.last() {
        None => {
            let interval = if rating >= 3 { 1 } else { 0 };
            (interval, INITIAL_EASE_FACTOR)
        }
        Some(last) => {
            let penalty = f64::from(5 - rating);
            let ease = (last.ease_factor + 0.1 - penalty * (0.08 + penalty * 0.02))
                .max(MIN_EASE_FACTOR);

            let interval = if rating < 3 {
                1
            } else {
                match last.interval_days {
                    0 => 1,
                    1 => 6,
                    days => (f64::from(days) * ease).round() as u32,
                }
            };
            (interval, ease)
        }
    };

    Ok(NextReview {
        interval_days,
        ease_factor,
        due_at: now + Duration::days(i64::from(interval_days)),
    })
}
