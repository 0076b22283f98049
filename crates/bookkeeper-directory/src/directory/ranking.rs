use serde::Serialize;
use tracing::warn;

use super::domain::{Coordinates, Profile};

/// How a filtered result set is ordered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankingMode {
    /// Store order, untouched.
    Default,
    /// Ascending great-circle distance from the reference point.
    Proximity(Coordinates),
}

impl RankingMode {
    /// Proximity ranking around a validated point, or default order when the point is unusable.
    pub fn proximity(latitude: f64, longitude: f64) -> Self {
        match Coordinates::new(latitude, longitude) {
            Some(reference) => RankingMode::Proximity(reference),
            None => {
                warn!(latitude, longitude, "invalid reference point; using default order");
                RankingMode::Default
            }
        }
    }
}

/// A profile plus its distance from the caller when proximity ranking was requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Orders profiles for presentation.
///
/// Proximity mode drops profiles without coordinates and sorts the rest by distance;
/// `sort_by` is stable so equal distances keep store order.
pub fn rank(profiles: Vec<Profile>, mode: RankingMode) -> Vec<RankedResult> {
    match mode {
        RankingMode::Default => profiles
            .into_iter()
            .map(|profile| RankedResult {
                profile,
                distance_km: None,
            })
            .collect(),
        RankingMode::Proximity(reference) => {
            let mut ranked: Vec<RankedResult> = profiles
                .into_iter()
                .filter_map(|profile| {
                    let distance = profile.coordinates()?.distance_to(&reference);
                    Some(RankedResult {
                        profile,
                        distance_km: Some(distance),
                    })
                })
                .collect();
            ranked.sort_by(|a, b| {
                let left = a.distance_km.unwrap_or(f64::INFINITY);
                let right = b.distance_km.unwrap_or(f64::INFINITY);
                left.total_cmp(&right)
            });
            ranked
        }
    }
}
