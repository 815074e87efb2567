//! Analysis module - keyword sentiment scoring and indicator extraction

pub mod indicators;
pub mod lexicon;
pub mod sentiment;

pub use indicators::{extract_indicators, Indicator};
pub use lexicon::Lexicon;
pub use sentiment::{analyze_sentiment, SentimentAnalysis, SentimentLabel};

/// Score below which a turn is treated as an emergency regardless of indicators.
pub const EMERGENCY_SCORE_THRESHOLD: f64 = -0.8;

/// Combined view of one message: sentiment plus matched indicator categories.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageAnalysis {
    pub sentiment: SentimentAnalysis,
    pub indicators: Vec<Indicator>,
}

impl MessageAnalysis {
    /// True when the message mentions suicidal thoughts or scores below -0.8.
    pub fn is_emergency(&self) -> bool {
        self.indicators.contains(&Indicator::SuicidalThoughts)
            || self.sentiment.score < EMERGENCY_SCORE_THRESHOLD
    }
}

/// Analyzer bound to a loaded lexicon.
#[derive(Debug, Clone)]
pub struct MoodAnalyzer {
    lexicon: Lexicon,
}

impl MoodAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn analyze_sentiment(&self, text: &str) -> SentimentAnalysis {
        analyze_sentiment(&self.lexicon, text)
    }

    pub fn extract_indicators(&self, text: &str) -> Vec<Indicator> {
        extract_indicators(&self.lexicon, text)
    }

    pub fn analyze(&self, text: &str) -> MessageAnalysis {
        MessageAnalysis {
            sentiment: self.analyze_sentiment(text),
            indicators: self.extract_indicators(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> MoodAnalyzer {
        MoodAnalyzer::new(Lexicon::embedded().unwrap())
    }

    #[test]
    fn test_suicidal_mention_is_emergency() {
        let analysis = analyzer().analyze("Tôi đã nghĩ tới việc tự tử nhiều lần trong tuần này rồi");
        assert!(analysis.indicators.contains(&Indicator::SuicidalThoughts));
        assert!(analysis.is_emergency());
    }

    #[test]
    fn test_very_low_score_is_emergency() {
        let analysis = MessageAnalysis {
            sentiment: SentimentAnalysis {
                score: -0.85,
                depression_indicators: 3,
                positive_indicators: 0,
                analysis: SentimentLabel::Negative,
            },
            indicators: vec![],
        };
        assert!(analysis.is_emergency());
    }

    #[test]
    fn test_mild_sadness_is_not_emergency() {
        let analysis = analyzer().analyze("Hôm nay tôi hơi buồn một chút vì trời mưa");
        assert!(!analysis.is_emergency());
    }
}
