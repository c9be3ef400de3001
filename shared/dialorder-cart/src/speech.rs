//! Text-to-speech friendly rendering of cart lines

use regex::Regex;
use std::sync::LazyLock;

use crate::cart::{split_piece_suffix, CartLineItem, Piece};

/// Whole-word replacements applied before anything is read aloud.
const CENSORED_WORDS: &[(&str, &str)] = &[
    (r"fuck|f\*ck", "eff"),
    (r"shit|sh\*t", "shoot"),
    (r"damn", "dang"),
    (r"hell", "heck"),
    (r"ass", "butt"),
];

static NORMALIZER: LazyLock<SpeechNormalizer> = LazyLock::new(SpeechNormalizer::new);

struct SpeechNormalizer {
    piece_count: Regex,
    censored: Vec<(Regex, &'static str)>,
}

impl SpeechNormalizer {
    fn new() -> Self {
        Self {
            piece_count: Regex::new(r"(?i)(\d+)\s*pc\b").expect("static pattern"),
            censored: CENSORED_WORDS
                .iter()
                .map(|(words, replacement)| {
                    let pattern = format!(r"(?i)\b(?:{})\b", words);
                    (Regex::new(&pattern).expect("static pattern"), *replacement)
                })
                .collect(),
        }
    }

    fn normalize(&self, text: &str) -> String {
        let text = self.piece_count.replace_all(text, "$1 piece");
        let mut text = text.replace("w/", "with ");
        for (pattern, replacement) in &self.censored {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// `"10pc Nuggets w/ranch"` -> `"10 piece Nuggets with ranch"`.
pub fn speakable(text: &str) -> String {
    NORMALIZER.normalize(text)
}

/// Plurals the suffix rules get wrong
const IRREGULAR_UNITS: &[(&str, &str)] = &[("pies", "pie"), ("cookies", "cookie"), ("ties", "tie")];

/// Singular of the last spoken word of an item name, used as the unit in
/// "first sandwich ...".
pub fn piece_unit(spoken_name: &str) -> String {
    let word = spoken_name
        .split_whitespace()
        .last()
        .unwrap_or("item")
        .to_lowercase();
    if let Some((_, singular)) = IRREGULAR_UNITS.iter().find(|(plural, _)| *plural == word) {
        (*singular).to_string()
    } else if word.len() > 4 && word.ends_with("ies") {
        format!("{}y", &word[..word.len() - 3])
    } else if ["ches", "shes", "xes", "sses"].iter().any(|end| word.ends_with(end)) {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word
    }
}

/// One line as read to the caller, including its modifiers.
pub fn speak_line(line: &CartLineItem) -> String {
    let name = speakable(line.name());
    let mut spoken = format!("{} {}", line.quantity, name);
    if !line.special_instructions.is_empty() {
        spoken.push_str(&format!(" ({})", speakable(&line.special_instructions)));
    }

    let mut whole = Vec::new();
    let mut pieces: Vec<(Piece, Vec<String>)> = Vec::new();
    for modifier in &line.modifiers {
        let (base, piece) = split_piece_suffix(&modifier.name);
        let base = speakable(base);
        match piece {
            Some(piece) => match pieces.iter_mut().find(|(p, _)| *p == piece) {
                Some((_, mods)) => mods.push(base),
                None => pieces.push((piece, vec![base])),
            },
            None => whole.push(base),
        }
    }

    if !whole.is_empty() {
        spoken.push_str(&format!(" with {}", whole.join(" and ")));
    }
    pieces.sort_by_key(|(piece, _)| *piece);
    let unit = piece_unit(&name);
    for (piece, mods) in pieces {
        spoken.push_str(&format!(", {} {} {}", piece.ordinal(), unit, mods.join(" and ")));
    }
    spoken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_count() {
        assert_eq!(speakable("10pc Nuggets"), "10 piece Nuggets");
        assert_eq!(speakable("3 PC Tenders"), "3 piece Tenders");
        assert_eq!(speakable("Pcs of cake"), "Pcs of cake");
    }

    #[test]
    fn test_with_abbreviation() {
        assert_eq!(speakable("Sandwich w/cheese"), "Sandwich with cheese");
        assert_eq!(speakable("Sandwich w/ cheese"), "Sandwich with cheese");
    }

    #[test]
    fn test_censoring_is_whole_word() {
        assert_eq!(speakable("Hell Fire Sandwich"), "heck Fire Sandwich");
        assert_eq!(speakable("Damn Good Fries"), "dang Good Fries");
        assert_eq!(speakable("F*CK it"), "eff it");
        assert_eq!(speakable("Shell Pasta"), "Shell Pasta");
        assert_eq!(speakable("Classic Sandwich"), "Classic Sandwich");
    }

    #[test]
    fn test_piece_unit() {
        assert_eq!(piece_unit("Double Sandwich"), "sandwich");
        assert_eq!(piece_unit("2 piece Tenders"), "tender");
        assert_eq!(piece_unit("Sandwiches"), "sandwich");
        assert_eq!(piece_unit("Glass"), "glass");
        assert_eq!(piece_unit("Regular Fries"), "fry");
        assert_eq!(piece_unit("Cajun Fries"), "fry");
        assert_eq!(piece_unit("Apple Pies"), "pie");
        assert_eq!(piece_unit("Cookies"), "cookie");
        assert_eq!(piece_unit(""), "item");
    }
}
