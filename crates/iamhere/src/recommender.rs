//! Rule-based activity recommendations and emergency resources.
//!
//! The catalog (activities per category, per-tier selections, hotlines) is
//! data loaded from `resources/support_catalog.json` or `CATALOG_PATH`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::analysis::Indicator;
use crate::error::LexiconError;

const EMBEDDED_CATALOG: &str = include_str!("../resources/support_catalog.json");

/// Upper bound on the number of suggestions returned per turn.
pub const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Tier from score and indicator count. Never decreases as the score drops
    /// or the indicator count grows.
    pub fn classify(score: f64, indicator_count: usize) -> Self {
        if score < -0.7 || indicator_count >= 4 {
            Severity::Severe
        } else if score < -0.4 || indicator_count >= 2 {
            Severity::Moderate
        } else {
            Severity::Mild
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level stored on the per-user tracking row; derived from the score alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepressionLevel {
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl DepressionLevel {
    pub fn from_score(score: f64) -> Self {
        if score < -0.7 {
            DepressionLevel::Severe
        } else if score < -0.4 {
            DepressionLevel::Moderate
        } else if score < -0.1 {
            DepressionLevel::Mild
        } else {
            DepressionLevel::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DepressionLevel::Normal => "normal",
            DepressionLevel::Mild => "mild",
            DepressionLevel::Moderate => "moderate",
            DepressionLevel::Severe => "severe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(DepressionLevel::Normal),
            "mild" => Some(DepressionLevel::Mild),
            "moderate" => Some(DepressionLevel::Moderate),
            "severe" => Some(DepressionLevel::Severe),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotline {
    pub name: String,
    pub number: String,
    pub availability: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyResources {
    pub hotlines: Vec<Hotline>,
    pub emergency_centers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TierPick {
    category: String,
    #[serde(default)]
    take: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    activities: HashMap<String, Vec<String>>,
    tiers: HashMap<String, Vec<TierPick>>,
    emergency_resources: EmergencyResources,
}

/// Recommender over a validated catalog.
#[derive(Debug, Clone)]
pub struct Recommender {
    tiers: HashMap<Severity, Vec<String>>,
    emergency: EmergencyResources,
}

impl Recommender {
    pub fn embedded() -> Result<Self, LexiconError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, LexiconError> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| LexiconError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                let recommender = Self::from_json(&contents)?;
                info!("Loaded support catalog from {}", path.display());
                Ok(recommender)
            }
            None => Self::embedded(),
        }
    }

    /// Parse and pre-expand each tier into its ordered, already-truncated list.
    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|source| LexiconError::Parse { what: "support catalog", source })?;

        let mut tiers = HashMap::new();
        for severity in [Severity::Mild, Severity::Moderate, Severity::Severe] {
            let picks = file
                .tiers
                .get(severity.as_str())
                .ok_or_else(|| LexiconError::MissingTier(severity.to_string()))?;

            let mut selected = Vec::new();
            for pick in picks {
                let activities = file.activities.get(&pick.category).ok_or_else(|| {
                    LexiconError::UnknownActivityCategory {
                        tier: severity.to_string(),
                        category: pick.category.clone(),
                    }
                })?;
                let take = pick.take.unwrap_or(activities.len()).min(activities.len());
                selected.extend(activities[..take].iter().cloned());
            }
            selected.truncate(MAX_RECOMMENDATIONS);
            tiers.insert(severity, selected);
        }

        Ok(Self {
            tiers,
            emergency: file.emergency_resources,
        })
    }

    /// Suggested activities for a turn, at most [`MAX_RECOMMENDATIONS`].
    pub fn recommend(&self, score: f64, indicators: &[Indicator]) -> Vec<String> {
        let severity = Severity::classify(score, indicators.len());
        self.tiers.get(&severity).cloned().unwrap_or_default()
    }

    pub fn emergency_resources(&self) -> &EmergencyResources {
        &self.emergency
    }
}
