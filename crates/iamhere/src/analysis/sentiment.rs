//! Keyword-count sentiment scoring.

use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;

/// Weight applied to the winning keyword ratio.
const KEYWORD_WEIGHT: f64 = 0.7;
/// Scores beyond this magnitude get a non-neutral label.
const LABEL_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score < -LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else if score > LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }
}

/// Result of scoring one message. Field names are part of the `/chat` wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub score: f64,
    pub depression_indicators: usize,
    pub positive_indicators: usize,
    pub analysis: SentimentLabel,
}

impl SentimentAnalysis {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            depression_indicators: 0,
            positive_indicators: 0,
            analysis: SentimentLabel::Neutral,
        }
    }
}

/// Score `text` in [-1, 1] from how many negative and positive keywords it contains.
///
/// Each keyword counts once if present. Whitespace-only input scores neutral.
pub fn analyze_sentiment(lexicon: &Lexicon, text: &str) -> SentimentAnalysis {
    let word_count = text.split_whitespace().count();
    if word_count == 0 {
        return SentimentAnalysis::neutral();
    }

    let text_lower = text.to_lowercase();
    let negative = count_present(lexicon.negative_keywords(), &text_lower);
    let positive = count_present(lexicon.positive_keywords(), &text_lower);

    let raw = if negative > positive {
        -KEYWORD_WEIGHT * (negative as f64 / word_count as f64)
    } else if positive > negative {
        KEYWORD_WEIGHT * (positive as f64 / word_count as f64)
    } else {
        0.0
    };
    let score = raw.clamp(-1.0, 1.0);

    SentimentAnalysis {
        score,
        depression_indicators: negative,
        positive_indicators: positive,
        analysis: SentimentLabel::from_score(score),
    }
}

fn count_present(keywords: &[String], text_lower: &str) -> usize {
    keywords.iter().filter(|k| text_lower.contains(k.as_str())).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lexicon() -> Lexicon {
        Lexicon::embedded().unwrap()
    }

    #[test]
    fn test_negative_text_scores_negative() {
        let result = analyze_sentiment(&lexicon(), "buồn quá");
        assert_eq!(result.depression_indicators, 1);
        assert_eq!(result.positive_indicators, 0);
        assert!((result.score + 0.35).abs() < 1e-9);
        assert_eq!(result.analysis, SentimentLabel::Negative);
    }

    #[test]
    fn test_positive_text_scores_positive() {
        let result = analyze_sentiment(&lexicon(), "hôm nay hạnh phúc");
        assert_eq!(result.positive_indicators, 1);
        assert!(result.score > 0.0);
        assert_eq!(result.analysis, SentimentLabel::Neutral);

        let result = analyze_sentiment(&lexicon(), "hạnh phúc");
        assert!((result.score - 0.35).abs() < 1e-9);
        assert_eq!(result.analysis, SentimentLabel::Positive);
    }

    #[test]
    fn test_tie_scores_zero() {
        let result = analyze_sentiment(&lexicon(), "buồn nhưng vẫn hy vọng");
        assert_eq!(result.depression_indicators, 1);
        assert_eq!(result.positive_indicators, 1);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.analysis, SentimentLabel::Neutral);
    }

    #[test]
    fn test_empty_text_is_neutral() {
        assert_eq!(analyze_sentiment(&lexicon(), ""), SentimentAnalysis::neutral());
        assert_eq!(analyze_sentiment(&lexicon(), "   \n\t"), SentimentAnalysis::neutral());
    }

    #[test]
    fn test_dense_keywords_stay_clamped() {
        // Four keywords packed into two whitespace-separated words.
        let result = analyze_sentiment(&lexicon(), "buồn,khóc,stress,tự ti");
        assert_eq!(result.depression_indicators, 4);
        assert_eq!(result.score, -1.0);
        assert_eq!(result.analysis, SentimentLabel::Negative);
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(SentimentLabel::from_score(-0.31), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(-0.3), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.3), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.31), SentimentLabel::Positive);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(analyze_sentiment(&lexicon(), "buồn")).unwrap();
        assert_eq!(json["analysis"], "negative");
        assert_eq!(json["depression_indicators"], 1);
        assert_eq!(json["positive_indicators"], 0);
    }

    proptest! {
        #[test]
        fn prop_score_is_bounded(text in "\\PC{0,200}") {
            let result = analyze_sentiment(&lexicon(), &text);
            prop_assert!(result.score >= -1.0 && result.score <= 1.0);
        }

        #[test]
        fn prop_sign_follows_keyword_majority(
            neg in 0usize..5,
            pos in 0usize..5,
            filler in 0usize..10,
        ) {
            let negatives = ["buồn", "khóc", "áp lực", "vô dụng", "đau khổ"];
            let positives = ["vui vẻ", "hạnh phúc", "biết ơn", "mạnh mẽ", "sáng tạo"];
            let mut words: Vec<&str> = Vec::new();
            words.extend(&negatives[..neg]);
            words.extend(&positives[..pos]);
            words.extend(std::iter::repeat("và").take(filler));
            let result = analyze_sentiment(&lexicon(), &words.join(" "));
            if neg > pos {
                prop_assert!(result.score < 0.0);
            } else if pos > neg {
                prop_assert!(result.score > 0.0);
            } else {
                prop_assert_eq!(result.score, 0.0);
            }
        }
    }
}
