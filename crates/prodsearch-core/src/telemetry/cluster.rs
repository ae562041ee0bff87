//! Search-cluster health vocabulary.
//!
//! Gauges cannot carry the status string itself, so the status is exported as
//! an ordinal: `0 = red`, `1 = yellow`, `2 = green`. Higher is healthier.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ProdSearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    Red,
    Yellow,
    Green,
}

impl ClusterStatus {
    /// Value written to the cluster status gauge.
    pub fn ordinal(self) -> i64 {
        match self {
            ClusterStatus::Red => 0,
            ClusterStatus::Yellow => 1,
            ClusterStatus::Green => 2,
        }
    }

    pub fn from_ordinal(v: i64) -> Option<Self> {
        match v {
            0 => Some(ClusterStatus::Red),
            1 => Some(ClusterStatus::Yellow),
            2 => Some(ClusterStatus::Green),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClusterStatus::Red => "red",
            ClusterStatus::Yellow => "yellow",
            ClusterStatus::Green => "green",
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterStatus {
    type Err = ProdSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(ClusterStatus::Red),
            "yellow" => Ok(ClusterStatus::Yellow),
            "green" => Ok(ClusterStatus::Green),
            other => Err(ProdSearchError::UnknownLabelValue(format!(
                "cluster status {other:?}"
            ))),
        }
    }
}

/// Subset of a `_cluster/health` response that feeds the health gauges.
/// Unknown fields are ignored so the poller can hand over the raw body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterHealth {
    pub status: ClusterStatus,
    #[serde(default)]
    pub active_shards: i64,
    #[serde(default)]
    pub relocating_shards: i64,
    #[serde(default)]
    pub unassigned_shards: i64,
}
