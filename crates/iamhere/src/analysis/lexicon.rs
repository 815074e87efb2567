//! Keyword lists and indicator patterns, loaded from JSON.
//!
//! The default lexicon is compiled into the binary from
//! `resources/lexicon.json`; `LEXICON_PATH` replaces it at startup.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::indicators::Indicator;
use crate::error::LexiconError;

const EMBEDDED_LEXICON: &str = include_str!("../../resources/lexicon.json");

#[derive(Debug, Deserialize)]
struct LexiconFile {
    negative_keywords: Vec<String>,
    positive_keywords: Vec<String>,
    indicator_patterns: HashMap<String, String>,
}

/// Compiled lexicon: lower-cased keywords plus one regex per indicator.
#[derive(Debug, Clone)]
pub struct Lexicon {
    negative_keywords: Vec<String>,
    positive_keywords: Vec<String>,
    patterns: Vec<(Indicator, Regex)>,
}

impl Lexicon {
    pub fn embedded() -> Result<Self, LexiconError> {
        Self::from_json(EMBEDDED_LEXICON)
    }

    /// Load from `path` when given, otherwise fall back to the embedded lexicon.
    pub fn load(path: Option<&Path>) -> Result<Self, LexiconError> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| LexiconError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                let lexicon = Self::from_json(&contents)?;
                info!("Loaded lexicon from {}", path.display());
                Ok(lexicon)
            }
            None => Self::embedded(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = serde_json::from_str(json)
            .map_err(|source| LexiconError::Parse { what: "lexicon", source })?;

        for name in file.indicator_patterns.keys() {
            name.parse::<Indicator>()
                .map_err(LexiconError::UnknownCategory)?;
        }

        let mut patterns = Vec::with_capacity(Indicator::ALL.len());
        for indicator in Indicator::ALL {
            let source = file
                .indicator_patterns
                .get(indicator.as_str())
                .ok_or_else(|| LexiconError::MissingCategory(indicator.as_str().to_string()))?;
            let regex = Regex::new(source).map_err(|source| LexiconError::Pattern {
                category: indicator.as_str().to_string(),
                source,
            })?;
            patterns.push((indicator, regex));
        }

        Ok(Self {
            negative_keywords: normalize(file.negative_keywords),
            positive_keywords: normalize(file.positive_keywords),
            patterns,
        })
    }

    pub fn negative_keywords(&self) -> &[String] {
        &self.negative_keywords
    }

    pub fn positive_keywords(&self) -> &[String] {
        &self.positive_keywords
    }

    pub fn patterns(&self) -> &[(Indicator, Regex)] {
        &self.patterns
    }
}

fn normalize(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
