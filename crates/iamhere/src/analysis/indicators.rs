//! Depression-indicator categories and pattern matching.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::lexicon::Lexicon;

/// One of the eight fixed symptom domains detected in free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    SleepProblems,
    AppetiteChanges,
    EnergyLoss,
    ConcentrationIssues,
    Hopelessness,
    GuiltShame,
    SocialWithdrawal,
    SuicidalThoughts,
}

impl Indicator {
    /// Declaration order; extraction results follow it.
    pub const ALL: [Indicator; 8] = [
        Indicator::SleepProblems,
        Indicator::AppetiteChanges,
        Indicator::EnergyLoss,
        Indicator::ConcentrationIssues,
        Indicator::Hopelessness,
        Indicator::GuiltShame,
        Indicator::SocialWithdrawal,
        Indicator::SuicidalThoughts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::SleepProblems => "sleep_problems",
            Indicator::AppetiteChanges => "appetite_changes",
            Indicator::EnergyLoss => "energy_loss",
            Indicator::ConcentrationIssues => "concentration_issues",
            Indicator::Hopelessness => "hopelessness",
            Indicator::GuiltShame => "guilt_shame",
            Indicator::SocialWithdrawal => "social_withdrawal",
            Indicator::SuicidalThoughts => "suicidal_thoughts",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Indicator::ALL
            .iter()
            .copied()
            .find(|indicator| indicator.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Return every category whose pattern matches the case-folded text.
///
/// Categories are tested independently, so one message can match several.
pub fn extract_indicators(lexicon: &Lexicon, text: &str) -> Vec<Indicator> {
    let text_lower = text.to_lowercase();
    lexicon
        .patterns()
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&text_lower))
        .map(|(indicator, _)| *indicator)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::embedded().unwrap()
    }

    #[test]
    fn test_suicidal_phrase_is_detected() {
        let found = extract_indicators(&lexicon(), "Dạo này tôi hay nghĩ đến chuyện tự tử");
        assert!(found.contains(&Indicator::SuicidalThoughts));
    }

    #[test]
    fn test_case_folding_applies() {
        let found = extract_indicators(&lexicon(), "TÔI MẤT NGỦ CẢ TUẦN");
        assert_eq!(found, vec![Indicator::SleepProblems]);
    }

    #[test]
    fn test_multiple_categories_in_declaration_order() {
        let text = "Tôi cô đơn, mệt mỏi và mất ngủ, cảm thấy tuyệt vọng";
        let found = extract_indicators(&lexicon(), text);
        assert_eq!(
            found,
            vec![
                Indicator::SleepProblems,
                Indicator::EnergyLoss,
                Indicator::Hopelessness,
                Indicator::SocialWithdrawal,
            ]
        );
    }

    #[test]
    fn test_plain_text_has_no_indicators() {
        assert!(extract_indicators(&lexicon(), "Hôm nay trời đẹp quá").is_empty());
        assert!(extract_indicators(&lexicon(), "").is_empty());
    }

    #[test]
    fn test_name_round_trip() {
        for indicator in Indicator::ALL {
            assert_eq!(indicator.as_str().parse::<Indicator>(), Ok(indicator));
        }
        assert!("sadness".parse::<Indicator>().is_err());
    }

    #[test]
    fn test_serializes_as_snake_case() {
        let json = serde_json::to_string(&Indicator::GuiltShame).unwrap();
        assert_eq!(json, "\"guilt_shame\"");
    }
}
