//! Windowed per-user statistics
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::memory_db::schema::UserTrackingRecord;

/// Rows compared at each end of the window.
pub const TREND_SAMPLE: usize = 5;
pub const TREND_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTrend {
    Improving,
    Concerning,
    Stable,
    NoData,
}

impl DashboardTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardTrend::Improving => "improving",
            DashboardTrend::Concerning => "concerning",
            DashboardTrend::Stable => "stable",
            DashboardTrend::NoData => "no_data",
        }
    }
}

impl fmt::Display for DashboardTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub user_id: String,
    pub chat_count: usize,
    pub avg_sentiment: f64,
    pub trend: DashboardTrend,
    pub last_30_days_data: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<UserTrackingRecord>,
}

impl DashboardStats {
    /// Aggregate `scores`, which must be ordered newest first.
    pub fn compute(user_id: &str, scores: &[f64], tracking: Option<UserTrackingRecord>) -> Self {
        let (avg_sentiment, trend) = match scores {
            [] => (0.0, DashboardTrend::NoData),
            _ => (round2(mean(scores)), trend_of(scores)),
        };

        Self {
            user_id: user_id.to_string(),
            chat_count: scores.len(),
            avg_sentiment,
            trend,
            last_30_days_data: scores.len(),
            tracking,
        }
    }
}

fn trend_of(scores: &[f64]) -> DashboardTrend {
    if scores.len() <= TREND_SAMPLE {
        return DashboardTrend::Stable;
    }
    let recent = mean(&scores[..TREND_SAMPLE]);
    let old = mean(&scores[scores.len() - TREND_SAMPLE..]);

    if recent > old + TREND_MARGIN {
        DashboardTrend::Improving
    } else if recent < old - TREND_MARGIN {
        DashboardTrend::Concerning
    } else {
        DashboardTrend::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
