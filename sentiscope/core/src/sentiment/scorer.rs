use super::{SentimentScorer, ValenceLexicon};

const BOOST: f64 = 0.293;
const CAPS_BOOST: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const NORMALIZATION_ALPHA: f64 = 15.0;
const EXCLAMATION_BOOST: f64 = 0.292;
const QUESTION_BOOST: f64 = 0.18;

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "cannot",
    "without", "aint", "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "cant",
    "couldnt", "wont", "wouldnt", "shouldnt", "hasnt", "havent", "hadnt", "neednt",
];

const INTENSIFIERS: &[&str] = &[
    "very", "really", "extremely", "so", "totally", "absolutely", "incredibly", "completely",
    "super", "truly", "especially", "particularly", "highly", "remarkably", "utterly", "most",
];

const DAMPENERS: &[&str] = &[
    "slightly", "somewhat", "barely", "hardly", "marginally", "partly", "scarcely", "kinda",
    "sorta", "occasionally", "less",
];

/// Valence-aware rule-based scorer producing a normalized compound score.
#[derive(Debug, Clone)]
pub struct LexiconSentimentScorer {
    lexicon: ValenceLexicon,
}

struct Token {
    raw: String,
    lower: String,
}

impl LexiconSentimentScorer {
    /// Scorer over the built-in lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lexicon(ValenceLexicon::builtin())
    }

    /// Scorer over a caller-supplied lexicon.
    #[must_use]
    pub const fn with_lexicon(lexicon: ValenceLexicon) -> Self {
        Self { lexicon }
    }

    /// Adds or overrides one word's valence.
    #[must_use]
    pub fn with_entry(mut self, word: &str, valence: f64) -> Self {
        self.lexicon.insert(word, valence);
        self
    }

    fn valences(&self, tokens: &[Token], shouting: bool) -> Vec<Option<f64>> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                if booster(&token.lower).is_some() {
                    return None;
                }
                let mut valence = self.lexicon.valence(&token.lower)?;
                if shouting && is_all_caps(&token.raw) {
                    valence += CAPS_BOOST.copysign(valence);
                }
                for distance in 1..=3usize.min(i) {
                    let previous = &tokens[i - distance].lower;
                    if let Some(boost) = booster(previous) {
                        let decay = 1.0 - 0.05 * (distance - 1) as f64;
                        valence += boost * decay * valence.signum();
                    }
                    if is_negation(previous) {
                        valence *= NEGATION_SCALAR;
                    }
                }
                Some(valence)
            })
            .collect()
    }
}

impl Default for LexiconSentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconSentimentScorer {
    fn score(&self, sentence: &str) -> f64 {
        let tokens: Vec<Token> = sentence
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| !word.is_empty())
            .map(|word| Token {
                raw: word.to_string(),
                lower: word.to_lowercase().replace(['\'', '’'], ""),
            })
            .collect();

        let caps = tokens.iter().filter(|t| is_all_caps(&t.raw)).count();
        let shouting = caps > 0 && caps < tokens.len();

        let mut valences = self.valences(&tokens, shouting);
        if !valences.iter().any(Option::is_some) {
            return 0.0;
        }

        if let Some(pivot) = tokens.iter().position(|t| t.lower == "but") {
            for (i, valence) in valences.iter_mut().enumerate() {
                if let Some(v) = valence {
                    *v *= if i < pivot { 0.5 } else { 1.5 };
                }
            }
        }

        let mut sum: f64 = valences.into_iter().flatten().sum();
        if sum != 0.0 {
            let exclamations = sentence.matches('!').count().min(4);
            let questions = sentence.matches('?').count();
            let mut emphasis = exclamations as f64 * EXCLAMATION_BOOST;
            if questions > 1 {
                emphasis += questions.min(3) as f64 * QUESTION_BOOST;
            }
            sum += emphasis.copysign(sum);
        }

        (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

fn booster(word: &str) -> Option<f64> {
    if INTENSIFIERS.contains(&word) {
        Some(BOOST)
    } else if DAMPENERS.contains(&word) {
        Some(-BOOST)
    } else {
        None
    }
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word)
}

fn is_all_caps(word: &str) -> bool {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() > 1 && letters.iter().all(|c| c.is_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(sentence: &str) -> f64 {
        LexiconSentimentScorer::new().score(sentence)
    }

    #[test]
    fn polarity_follows_lexicon() {
        assert!(score("I love bees.") > 0.5);
        assert!(score("I hate rain.") < -0.5);
        assert_eq!(score("The table is brown."), 0.0);
        assert_eq!(score(""), 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        assert!(score("I don't love rain.") < 0.0);
        assert!(score("This is not bad") > 0.0);
    }

    #[test]
    fn boosters_and_dampeners_shift_intensity() {
        assert!(score("very good") > score("good"));
        assert!(score("slightly good") < score("good"));
        assert!(score("slightly good") > 0.0);
    }

    #[test]
    fn caps_and_exclamations_emphasize() {
        assert!(score("This is GREAT fun") > score("This is great fun"));
        assert!(score("great!!") > score("great"));
        assert!(score("terrible!!") < score("terrible"));
    }

    #[test]
    fn contrastive_but_weights_second_clause() {
        assert!(score("The food was good but the service was terrible.") < 0.0);
        assert!(score("The service was terrible but the food was great.") > 0.0);
    }

    #[test]
    fn custom_entries_override_lexicon() {
        let scorer = LexiconSentimentScorer::new().with_entry("pollen", 2.5);
        assert!(scorer.score("So much pollen") > 0.0);
    }

    #[test]
    fn scores_are_bounded() {
        let rant = "HATE HATE hate terrible awful horrible worst evil disaster!!!!!";
        let s = score(rant);
        assert!((-1.0..=1.0).contains(&s));
        assert!(s < -0.9);
    }
}
