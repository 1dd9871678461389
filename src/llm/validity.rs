//! Validity filter for statistically generated replies.
//!
//! The deterministic conversational generator is valid by construction;
//! this filter only guards output coming back from a remote model. All
//! checks are conjunctive short-circuits: failing any one rejects the
//! candidate and the orchestrator moves on to the next strategy.

use once_cell::sync::Lazy;
use regex::Regex;

/// Instruction fragments that indicate the model leaked its prompt
/// instead of answering.
const LEAKAGE_MARKERS: &[&str] = &[
    "eres un asistente",
    "you are an assistant",
    "analiza el sentimiento",
    "analyze the sentiment",
    "mensaje del usuario",
    "json:",
    "system:",
    "formato json",
];

/// Fragment-like shapes no coherent reply takes.
static NONSENSE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Only punctuation, digits or whitespace.
        r"^[\d\s[:punct:]]+$",
        // A lone truncated clause like "y el" / "de la".
        r"^(?i)(y|o|de|la|el|en|que|con)\s+\w{1,3}$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("nonsense pattern must compile"))
    .collect()
});

static ALPHABETIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-zÁÉÍÓÚÜÑáéíóúüñ]{3,}").expect("run pattern must compile"));

/// Function words ignored when counting significant tokens.
const STOPWORDS: &[&str] = &[
    "de", "la", "que", "el", "en", "y", "a", "los", "del", "se", "las", "por", "un", "para",
    "con", "no", "una", "su", "al", "lo", "como", "más", "mas", "pero", "sus", "le", "ya", "o",
    "este", "sí", "si", "the", "and", "for", "you", "are", "not", "but", "with",
];

/// Empathetic or verb-like tokens that make a short reply coherent.
const COHERENCE_MARKERS: &[&str] = &[
    "entiendo",
    "comprendo",
    "lamento",
    "siento",
    "gracias",
    "puedes",
    "puedo",
    "ánimo",
    "animo",
    "cuéntame",
    "cuentame",
    "tranquilo",
    "tranquila",
    "estoy",
    "aquí",
    "aqui",
];

/// Clause-boundary openers acceptable at the start of a short reply.
const CLAUSE_OPENERS: &[&str] = &["claro", "bueno", "vale", "entonces", "mira", "sí", "si "];

/// One character echoed over and over ("aaaaaaaa"). Callers have already
/// ruled out strings shorter than five characters.
fn single_char_repeated(reply: &str) -> bool {
    let mut chars = reply.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

/// Decide whether a candidate reply is usable. `original` is the user
/// text the candidate answers; an echo of it is rejected.
pub fn is_valid(candidate: &str, original: &str) -> bool {
    let reply = candidate.trim();

    if reply.chars().count() < 5 {
        return false;
    }
    if reply.chars().count() > 500 {
        return false;
    }

    let lower = reply.to_lowercase();
    if LEAKAGE_MARKERS.iter().any(|m| lower.contains(m)) {
        return false;
    }
    if single_char_repeated(reply) {
        return false;
    }
    if NONSENSE_PATTERNS.iter().any(|re| re.is_match(reply)) {
        return false;
    }
    if lower == original.trim().to_lowercase() {
        return false;
    }

    let tokens: Vec<&str> = lower.split_whitespace().collect();
    if tokens.len() < 3 {
        return false;
    }

    let significant = tokens
        .iter()
        .filter(|t| {
            let word: String = t.chars().filter(|c| c.is_alphanumeric()).collect();
            word.chars().count() > 2 && !STOPWORDS.contains(&word.as_str())
        })
        .count();
    if significant < 2 {
        return false;
    }

    if !ALPHABETIC_RUN.is_match(reply) {
        return false;
    }

    // Short replies must still read like an answer: an empathetic token,
    // a question, or a recognizable clause opener.
    if tokens.len() < 5 {
        let coherent = lower.contains('?')
            || COHERENCE_MARKERS.iter().any(|m| lower.contains(m))
            || CLAUSE_OPENERS.iter().any(|m| lower.starts_with(m));
        if !coherent {
            return false;
        }
    }

    true
}
