//! Heuristic sentiment classifier.
//!
//! Keyword scan over the case-folded, tokenized input. This is a
//! best-effort heuristic, not a statistical model: ambiguity (both
//! polarities present, or neither) always degrades to NEUTRAL rather
//! than guessing. Pure, total, no I/O.

use crate::shared::models::{Classification, Sentiment};

/// Keywords that signal distress. Spanish terms come from the supported
/// chat audience; English equivalents are accepted as well.
const NEGATIVE_KEYWORDS: &[&str] = &[
    "triste",
    "mal",
    "ansioso",
    "ansiosa",
    "deprimido",
    "deprimida",
    "preocupado",
    "preocupada",
    "miedo",
    "solo",
    "sola",
    "ayuda",
    "problema",
    "problemas",
    "difícil",
    "dificil",
    "frustrado",
    "frustrada",
    "pelea",
    "conflicto",
    "sad",
    "bad",
    "anxious",
    "alone",
    "help",
    "problem",
    "difficult",
    "frustrated",
    "conflict",
];

const POSITIVE_KEYWORDS: &[&str] = &[
    "feliz",
    "bien",
    "agradecido",
    "agradecida",
    "contento",
    "contenta",
    "genial",
    "maravilloso",
    "maravillosa",
    "excelente",
    "happy",
    "good",
    "grateful",
    "great",
];

/// Classify a message. Deterministic and never fails.
///
/// Decision rule: negative keywords present and positive absent →
/// NEGATIVE; positive present and negative absent → POSITIVE; every
/// other case → NEUTRAL. Urgency tier, score and reaction glyph follow
/// from the sentiment (see [`Classification::from_sentiment`]).
pub fn classify(text: &str) -> Classification {
    let tokens = tokenize(text);

    let has_negative = tokens.iter().any(|t| NEGATIVE_KEYWORDS.contains(&t.as_str()));
    let has_positive = tokens.iter().any(|t| POSITIVE_KEYWORDS.contains(&t.as_str()));

    let sentiment = match (has_negative, has_positive) {
        (true, false) => Sentiment::Negative,
        (false, true) => Sentiment::Positive,
        _ => Sentiment::Neutral,
    };

    Classification::from_sentiment(sentiment)
}

/// Lowercased word tokens. Token membership rather than substring search,
/// so "maravilloso" does not register the negative keyword "mal".
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::UrgencyTier;

    #[test]
    fn negative_keyword_yields_negative_high_urgency() {
        let result = classify("Me siento muy triste y no sé qué hacer");
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.urgency_tier, UrgencyTier::High);
        assert_eq!(result.urgency_score, 3);
        assert!(result.reaction_glyph.is_some());
    }

    #[test]
    fn positive_keyword_yields_positive_low_urgency() {
        let result = classify("Hoy me siento feliz y agradecido");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.urgency_tier, UrgencyTier::Low);
        assert_eq!(result.urgency_score, 1);
        assert_eq!(result.reaction_glyph.as_deref(), Some("😊"));
    }

    #[test]
    fn mixed_polarity_ties_to_neutral() {
        let result = classify("Estoy feliz pero también triste");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.urgency_score, 2);
        assert!(result.reaction_glyph.is_none());
    }

    #[test]
    fn no_keywords_yields_neutral() {
        let result = classify("El cielo es azul");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.urgency_tier, UrgencyTier::Normal);
    }

    #[test]
    fn english_keywords_are_recognized() {
        assert_eq!(classify("I feel sad and alone").sentiment, Sentiment::Negative);
        assert_eq!(classify("what a great day").sentiment, Sentiment::Positive);
    }

    #[test]
    fn empty_input_is_neutral() {
        assert_eq!(classify("").sentiment, Sentiment::Neutral);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(classify("ESTOY MUY TRISTE").sentiment, Sentiment::Negative);
    }

    #[test]
    fn substring_of_positive_word_does_not_match_negative() {
        // "maravilloso" contains "mal" but must not count as negative.
        let result = classify("Qué día tan maravilloso");
        assert_eq!(result.sentiment, Sentiment::Positive);
    }

    #[test]
    fn punctuation_does_not_block_matches() {
        assert_eq!(classify("¡ayuda!").sentiment, Sentiment::Negative);
    }
}
