use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A sentence and its position in segmentation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sentence {
    /// Zero-based position in the transcript.
    pub index: usize,
    /// Trimmed sentence text.
    pub text: String,
}

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "inc", "ltd", "co",
    "corp", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    "approx", "dept", "est", "fig", "gen", "gov", "lt", "col", "sgt", "capt", "rev", "ave",
];

const OPENERS: &[char] = &['"', '\'', '(', '[', '“', '‘'];

/// Punctuation- and abbreviation-aware sentence splitter.
#[derive(Debug, Clone)]
pub struct TextSegmenter {
    boundary: Regex,
    whitespace: Regex,
    abbreviations: HashSet<String>,
}

impl TextSegmenter {
    /// Creates a segmenter with the built-in English abbreviation list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: Regex::new(r#"[.!?…]+["'”’)\]]*(?:\s+|$)|\n[ \t\r]*\n\s*"#)
                .expect("boundary pattern is valid"),
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
            abbreviations: ABBREVIATIONS.iter().map(|abbr| (*abbr).to_string()).collect(),
        }
    }

    /// Adds an abbreviation (without its trailing period) that must not end a sentence.
    #[must_use]
    pub fn with_abbreviation(mut self, abbreviation: &str) -> Self {
        self.abbreviations
            .insert(abbreviation.trim_end_matches('.').to_lowercase());
        self
    }

    /// Splits `text` into sentences. Whitespace-only input yields nothing.
    #[must_use]
    pub fn segment(&self, text: &str) -> Vec<Sentence> {
        let mut fragments = Vec::new();
        let mut start = 0;
        for boundary in self.boundary.find_iter(text) {
            let matched = boundary.as_str();
            let terminator = matched.trim_end();
            let paragraph = matched[terminator.len()..].matches('\n').count() >= 2;
            if !terminator.is_empty()
                && !paragraph
                && !self.is_sentence_end(
                    &text[start..boundary.start()],
                    terminator,
                    &text[boundary.end()..],
                )
            {
                continue;
            }
            fragments.push(&text[start..boundary.start() + terminator.len()]);
            start = boundary.end();
        }
        fragments.push(&text[start..]);

        fragments
            .into_iter()
            .map(|fragment| self.whitespace.replace_all(fragment.trim(), " ").into_owned())
            .filter(|fragment| !fragment.is_empty())
            .enumerate()
            .map(|(index, text)| Sentence { index, text })
            .collect()
    }

    fn is_sentence_end(&self, preceding: &str, terminator: &str, following: &str) -> bool {
        if terminator.starts_with("..") || terminator.starts_with('…') {
            return !following.chars().next().is_some_and(char::is_lowercase);
        }
        let punctuation: String = terminator
            .chars()
            .filter(|c| matches!(c, '.' | '!' | '?'))
            .collect();
        if punctuation != "." {
            return true;
        }
        let raw = preceding
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or_default()
            .trim_start_matches(OPENERS);
        let word = raw.to_lowercase();
        let dotted = word.contains('.') && word.chars().any(char::is_alphabetic);
        !(dotted || self.abbreviations.contains(&word) || is_initial(raw, following))
    }
}

/// Sentence-initial words that rule out reading a preceding letter as an initial.
const STARTERS: &[&str] = &[
    "a", "after", "all", "and", "are", "at", "before", "but", "can", "could", "did", "do",
    "does", "for", "go", "he", "hello", "hey", "hi", "how", "i", "if", "in", "is", "it", "its",
    "just", "let", "maybe", "my", "no", "not", "now", "oh", "ok", "okay", "on", "open", "or",
    "our", "please", "she", "so", "that", "the", "then", "there", "they", "this", "thanks",
    "we", "well", "were", "what", "when", "where", "who", "why", "will", "yes", "you", "your",
];

/// An uppercase letter other than the pronoun `I`, followed by a capitalised
/// word that does not usually open a sentence (`J. Smith`, not `plan B. Go`).
fn is_initial(word: &str, following: &str) -> bool {
    let mut letters = word.chars();
    let (Some(letter), None) = (letters.next(), letters.next()) else {
        return false;
    };
    if !letter.is_uppercase() || letter == 'I' {
        return false;
    }
    let next = following
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_start_matches(OPENERS);
    if !next.chars().next().is_some_and(char::is_uppercase) {
        return false;
    }
    let next = next
        .chars()
        .take_while(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    !STARTERS.contains(&next.as_str())
}

impl Default for TextSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        TextSegmenter::new()
            .segment(input)
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        assert_eq!(
            texts("I love bees. I hate rain! Do you? Yes."),
            vec!["I love bees.", "I hate rain!", "Do you?", "Yes."]
        );
    }

    #[test]
    fn indices_follow_segmentation_order() {
        let sentences = TextSegmenter::new().segment("One. Two. Three.");
        let indices: Vec<_> = sentences.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn abbreviations_and_initials_do_not_split() {
        assert_eq!(
            texts("Mr. Benson met Dr. Adams at St. Paul. J. Smith stayed home."),
            vec!["Mr. Benson met Dr. Adams at St. Paul.", "J. Smith stayed home."]
        );
        assert_eq!(texts("Bees, e.g. honeybees, fly."), vec!["Bees, e.g. honeybees, fly."]);
        assert_eq!(
            texts("Ask J. R. Tolkien and A. Jones."),
            vec!["Ask J. R. Tolkien and A. Jones."]
        );
    }

    #[test]
    fn single_letter_words_can_end_sentences() {
        assert_eq!(
            texts("Who is there? It is I. Open the door. We need plan B. Go now."),
            vec!["Who is there?", "It is I.", "Open the door.", "We need plan B.", "Go now."]
        );
        assert_eq!(texts("Pick option c. then stop."), vec!["Pick option c.", "then stop."]);
        assert_eq!(texts("I got an A. It's great."), vec!["I got an A.", "It's great."]);
    }

    #[test]
    fn keeps_closing_quotes_with_sentence() {
        assert_eq!(
            texts("He said \"Ya like jazz?\" She nodded."),
            vec!["He said \"Ya like jazz?\"", "She nodded."]
        );
    }

    #[test]
    fn ellipsis_followed_by_lowercase_continues() {
        assert_eq!(
            texts("Well... maybe not. Wait... What?"),
            vec!["Well... maybe not.", "Wait...", "What?"]
        );
    }

    #[test]
    fn paragraph_breaks_end_fragments_and_whitespace_collapses() {
        assert_eq!(
            texts("BARRY\n  Hello   there\n\nVANESSA\nHi."),
            vec!["BARRY Hello there", "VANESSA Hi."]
        );
    }

    #[test]
    fn decimals_are_not_boundaries() {
        assert_eq!(texts("It costs 3.50 today. Cheap."), vec!["It costs 3.50 today.", "Cheap."]);
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(texts("").is_empty());
        assert!(texts("  \n\t ").is_empty());
    }

    #[test]
    fn non_empty_input_yields_at_least_one_sentence() {
        for input in ["no punctuation at all", "?", "...", "a", "Dr."] {
            assert!(!texts(input).is_empty(), "input {input:?}");
        }
    }

    #[test]
    fn segmentation_is_deterministic() {
        let input = "First one. Second one! Third?";
        assert_eq!(texts(input), texts(input));
    }
}
