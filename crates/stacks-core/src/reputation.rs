//! Reputation scoring and tier policy
//!
//! Pure functions: activity counters map to an integer score, a score maps
//! to a [`Tier`], and a tier maps to a transfer speed multiplier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Each upload is worth this many points
pub const UPLOAD_WEIGHT: i64 = 2;
/// Each download costs this many points
pub const DOWNLOAD_WEIGHT: i64 = 1;
/// Multiplier applied to the average rating received
pub const RATING_WEIGHT: i64 = 10;
/// Scores never drop below this floor
pub const LOW_REPUTATION: i64 = -100;
/// Scores strictly above this are contributors
pub const CONTRIBUTOR_THRESHOLD: i64 = 50;
/// Scores at or above this (and not contributors) are neutral
pub const NEUTRAL_THRESHOLD: i64 = 0;

/// Multiplier used when a tier label cannot be recognised
pub const UNKNOWN_TIER_MULTIPLIER: f64 = 0.5;

/// Contribution tier derived from a reputation score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Contributor,
    #[default]
    Neutral,
    Leecher,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Contributor => "Contributor",
            Tier::Neutral => "Neutral",
            Tier::Leecher => "Leecher",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contributor" => Ok(Tier::Contributor),
            "neutral" => Ok(Tier::Neutral),
            "leecher" => Ok(Tier::Leecher),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}

/// Compute a reputation score from activity counters.
///
/// `uploads × 2 − downloads + trunc(average_rating × 10)`, floored at
/// [`LOW_REPUTATION`]. The rating term truncates toward zero, so a 4.59
/// average contributes 45, not 46. Inputs are not validated.
pub fn score(uploads: u64, downloads: u64, average_rating: f64) -> i64 {
    let upload_score = (uploads as i64).saturating_mul(UPLOAD_WEIGHT);
    let download_penalty = (downloads as i64).saturating_mul(DOWNLOAD_WEIGHT);
    let rating_bonus = (average_rating * RATING_WEIGHT as f64) as i64;

    let total = upload_score
        .saturating_sub(download_penalty)
        .saturating_add(rating_bonus);

    total.max(LOW_REPUTATION)
}

/// Classify a score. Thresholds are checked in order, first match wins.
pub fn classify(score: i64) -> Tier {
    if score > CONTRIBUTOR_THRESHOLD {
        Tier::Contributor
    } else if score >= NEUTRAL_THRESHOLD {
        Tier::Neutral
    } else {
        Tier::Leecher
    }
}

/// Fraction of full transfer speed granted to a tier
pub fn throttle_multiplier(tier: Tier) -> f64 {
    match tier {
        Tier::Contributor => 1.0,
        Tier::Neutral => 0.7,
        Tier::Leecher => 0.3,
    }
}

/// Like [`throttle_multiplier`] but for a tier given as text, e.g. from
/// config or the command line. Unrecognised labels get
/// [`UNKNOWN_TIER_MULTIPLIER`].
pub fn throttle_multiplier_for_label(label: &str) -> f64 {
    label
        .parse::<Tier>()
        .map(throttle_multiplier)
        .unwrap_or(UNKNOWN_TIER_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_known_values() {
        assert_eq!(score(0, 0, 0.0), 0);
        assert_eq!(score(50, 30, 4.5), 115);
        assert_eq!(score(5, 50, 2.0), -20);
        assert_eq!(score(30, 0, 0.0), 60);
    }

    #[test]
    fn test_score_truncates_rating_term() {
        // 4.59 * 10 = 45.9 -> 45
        assert_eq!(score(0, 0, 4.59), 45);
        // 0.99 * 10 = 9.9 -> 9
        assert_eq!(score(1, 0, 0.99), 11);
    }

    #[test]
    fn test_score_floor() {
        assert_eq!(score(0, 500, 0.0), LOW_REPUTATION);
        assert_eq!(score(0, 101, 0.0), LOW_REPUTATION);
        assert_eq!(score(0, 100, 0.0), -100);
        assert_eq!(score(0, 99, 0.0), -99);
    }

    #[test]
    fn test_score_not_clamped_above() {
        assert_eq!(score(10_000, 0, 5.0), 20_050);
    }

    #[test]
    fn test_score_never_below_floor() {
        for uploads in [0u64, 1, 7, 40, 300] {
            for downloads in [0u64, 3, 55, 250, 10_000] {
                for rating in [0.0, 0.5, 1.0, 2.75, 4.99, 5.0] {
                    assert!(score(uploads, downloads, rating) >= LOW_REPUTATION);
                }
            }
        }
    }

    #[test]
    fn test_classify_boundaries() {
        let cases = [
            (100, Tier::Contributor),
            (51, Tier::Contributor),
            (50, Tier::Neutral),
            (25, Tier::Neutral),
            (0, Tier::Neutral),
            (-1, Tier::Leecher),
            (-50, Tier::Leecher),
            (LOW_REPUTATION, Tier::Leecher),
        ];
        for (score, expected) in cases {
            assert_eq!(classify(score), expected, "classify({})", score);
        }
    }

    #[test]
    fn test_throttle_multiplier() {
        assert_eq!(throttle_multiplier(Tier::Contributor), 1.0);
        assert_eq!(throttle_multiplier(Tier::Neutral), 0.7);
        assert_eq!(throttle_multiplier(Tier::Leecher), 0.3);
    }

    #[test]
    fn test_throttle_multiplier_for_label() {
        assert_eq!(throttle_multiplier_for_label("contributor"), 1.0);
        assert_eq!(throttle_multiplier_for_label("Leecher"), 0.3);
        assert_eq!(throttle_multiplier_for_label("moderator"), UNKNOWN_TIER_MULTIPLIER);
    }

    #[test]
    fn test_tier_serde_names() {
        let json = serde_json::to_string(&Tier::Contributor).unwrap();
        assert_eq!(json, "\"Contributor\"");
        let tier: Tier = serde_json::from_str("\"Leecher\"").unwrap();
        assert_eq!(tier, Tier::Leecher);
    }
}
