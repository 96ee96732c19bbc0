//! Lexicon-based sentiment scoring.
//!
//! Each known word carries a valence in [-4, 4]. A negator in the three
//! words before a hit flips and dampens it, and an intensifier directly
//! before it boosts it. The summed valence is squashed into a compound
//! score in [-1, 1] as `s / sqrt(s^2 + 15)`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;

const LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("bad", -2.5),
    ("best", 3.2),
    ("broken", -1.9),
    ("confused", -1.3),
    ("confusing", -1.3),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("excellent", 2.7),
    ("frustrated", -2.4),
    ("frustrating", -2.1),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("hate", -2.7),
    ("helpful", 1.8),
    ("horrible", -2.5),
    ("like", 1.5),
    ("love", 3.2),
    ("nice", 1.8),
    ("pathetic", -2.6),
    ("perfect", 2.7),
    ("poor", -2.1),
    ("problem", -1.7),
    ("sad", -2.1),
    ("stupid", -2.4),
    ("terrible", -2.1),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("ugh", -1.8),
    ("unhappy", -1.8),
    ("upset", -1.6),
    ("useless", -1.8),
    ("waste", -1.8),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "cannot", "cant", "can't", "dont", "don't",
    "doesnt", "doesn't", "isnt", "isn't", "wasnt", "wasn't", "wont", "won't",
];

const BOOSTERS: &[&str] = &[
    "very", "really", "extremely", "so", "totally", "absolutely", "incredibly", "completely",
];

/// Sentiment of one message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SentimentScore {
    /// Overall polarity in [-1, 1]
    pub compound: f64,
    pub pos: f64,
    pub neu: f64,
    pub neg: f64,
}

impl SentimentScore {
    pub fn neutral() -> Self {
        Self {
            compound: 0.0,
            pos: 0.0,
            neu: 1.0,
            neg: 0.0,
        }
    }
}

impl Default for SentimentScore {
    fn default() -> Self {
        Self::neutral()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SentimentAnalyzer {
    enabled: bool,
}

impl SentimentAnalyzer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn analyze(&self, text: &str) -> SentimentScore {
        if !self.enabled {
            return SentimentScore::neutral();
        }

        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        if words.is_empty() {
            return SentimentScore::neutral();
        }

        let mut sum = 0.0;
        let mut pos_sum = 0.0;
        let mut neg_sum = 0.0;
        let mut neutral_count = 0usize;

        for (i, word) in words.iter().enumerate() {
            let Some(mut valence) = valence(word) else {
                neutral_count += 1;
                continue;
            };

            if i > 0 && BOOSTERS.contains(&words[i - 1].as_str()) {
                valence += BOOSTER_INCREMENT * valence.signum();
            }

            let window = i.saturating_sub(3)..i;
            if words[window].iter().any(|w| NEGATORS.contains(&w.as_str())) {
                valence *= NEGATION_SCALAR;
            }

            sum += valence;
            if valence > 0.0 {
                pos_sum += valence + 1.0;
            } else {
                neg_sum += valence - 1.0;
            }
        }

        let compound = normalize(sum);
        let total = pos_sum + neg_sum.abs() + neutral_count as f64;
        if total == 0.0 {
            return SentimentScore::neutral();
        }

        SentimentScore {
            compound: round4(compound),
            pos: round4(pos_sum / total),
            neu: round4(neutral_count as f64 / total),
            neg: round4(neg_sum.abs() / total),
        }
    }
}

fn valence(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, v)| *v)
}

fn normalize(score: f64) -> f64 {
    let norm = score / (score * score + NORMALIZATION_ALPHA).sqrt();
    norm.clamp(-1.0, 1.0)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_neutral() {
        let analyzer = SentimentAnalyzer::new(false);
        assert_eq!(analyzer.analyze("this is terrible"), SentimentScore::neutral());
    }

    #[test]
    fn test_neutral_text() {
        let score = SentimentAnalyzer::new(true).analyze("what courses do you offer");
        assert_eq!(score.compound, 0.0);
        assert_eq!(score.neu, 1.0);
    }

    #[test]
    fn test_positive_text() {
        let score = SentimentAnalyzer::new(true).analyze("This is great, thanks!");
        assert!(score.compound > 0.5, "{:?}", score);
        assert!(score.pos > 0.0);
        assert_eq!(score.neg, 0.0);
    }

    #[test]
    fn test_strongly_negative_text() {
        let score =
            SentimentAnalyzer::new(true).analyze("This is terrible and useless, I hate it");
        assert!(score.compound < -0.5, "{:?}", score);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let analyzer = SentimentAnalyzer::new(true);
        assert!(analyzer.analyze("this is not good").compound < 0.0);
        assert!(analyzer.analyze("not bad at all").compound > 0.0);
    }

    #[test]
    fn test_compound_is_bounded() {
        let text = "worst ".repeat(50);
        let score = SentimentAnalyzer::new(true).analyze(&text);
        assert!(score.compound >= -1.0 && score.compound < -0.9);
    }

    #[test]
    fn test_proportions_sum_to_one() {
        let score = SentimentAnalyzer::new(true).analyze("good course but bad schedule");
        let total = score.pos + score.neu + score.neg;
        assert!((total - 1.0).abs() < 0.001, "{:?}", score);
    }
}
