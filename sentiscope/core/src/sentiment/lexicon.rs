use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};

/// Word valences on the −4…+4 scale used by VADER-style lexica.
#[derive(Debug, Clone, Default)]
pub struct ValenceLexicon {
    words: HashMap<String, f64>,
}

const BUILTIN: &[(&str, f64)] = &[
    // positive
    ("love", 3.2),
    ("loved", 2.9),
    ("loves", 2.7),
    ("lovely", 2.8),
    ("like", 2.0),
    ("liked", 1.8),
    ("good", 1.9),
    ("great", 3.1),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("wonderful", 2.7),
    ("excellent", 2.7),
    ("fantastic", 2.6),
    ("beautiful", 2.9),
    ("happy", 2.7),
    ("glad", 2.0),
    ("joy", 2.8),
    ("fun", 2.3),
    ("funny", 1.9),
    ("nice", 1.8),
    ("best", 3.2),
    ("better", 1.9),
    ("thanks", 1.9),
    ("thank", 1.5),
    ("win", 2.8),
    ("won", 2.7),
    ("hope", 1.9),
    ("hopeful", 1.6),
    ("free", 2.3),
    ("safe", 1.9),
    ("sweet", 2.0),
    ("honey", 0.7),
    ("kind", 2.4),
    ("friend", 2.2),
    ("friends", 2.1),
    ("proud", 2.1),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("smile", 1.5),
    ("laugh", 2.6),
    ("yes", 1.7),
    ("cool", 1.3),
    ("perfect", 2.7),
    ("brilliant", 2.8),
    ("delighted", 2.5),
    ("enjoy", 2.2),
    ("pleasure", 2.7),
    ("calm", 1.3),
    ("brave", 2.4),
    ("welcome", 2.0),
    ("congratulations", 2.9),
    ("impressive", 2.3),
    ("fine", 0.8),
    ("okay", 0.9),
    ("ok", 1.2),
    ("well", 1.1),
    ("true", 1.8),
    ("agree", 1.5),
    ("alive", 1.6),
    ("special", 1.7),
    // negative
    ("hate", -2.7),
    ("hated", -3.2),
    ("hates", -1.9),
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("sad", -2.1),
    ("angry", -2.3),
    ("mad", -2.2),
    ("afraid", -2.0),
    ("scared", -1.9),
    ("fear", -2.2),
    ("kill", -3.7),
    ("killed", -3.5),
    ("dead", -3.3),
    ("die", -2.9),
    ("death", -2.9),
    ("hurt", -2.4),
    ("pain", -2.3),
    ("sorry", -0.3),
    ("cry", -2.1),
    ("crazy", -1.4),
    ("stupid", -2.4),
    ("wrong", -2.1),
    ("problem", -1.7),
    ("trouble", -1.7),
    ("lost", -1.3),
    ("lose", -1.7),
    ("fail", -2.5),
    ("failed", -2.3),
    ("ugly", -2.3),
    ("disgusting", -2.4),
    ("gross", -2.1),
    ("nasty", -2.6),
    ("annoying", -1.9),
    ("boring", -1.3),
    ("worried", -1.2),
    ("worry", -1.9),
    ("danger", -2.4),
    ("dangerous", -2.1),
    ("attack", -2.1),
    ("crash", -1.7),
    ("alone", -1.0),
    ("lonely", -1.5),
    ("upset", -1.6),
    ("shame", -2.1),
    ("guilty", -1.8),
    ("disaster", -3.1),
    ("damn", -1.7),
    ("unfortunately", -1.4),
    ("sick", -2.3),
    ("tired", -1.9),
    ("weird", -0.7),
    ("enemy", -2.5),
    ("war", -2.9),
    ("evil", -3.4),
];

impl ValenceLexicon {
    /// Built-in general-purpose English lexicon.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            words: BUILTIN
                .iter()
                .map(|(word, valence)| ((*word).to_string(), *valence))
                .collect(),
        }
    }

    /// Parses a VADER-format lexicon: one `token<TAB>mean[<TAB>…]` per line.
    /// Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Result<Self> {
        let mut words = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim_end();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let mut columns = line.split('\t');
            let (Some(token), Some(mean)) = (columns.next(), columns.next()) else {
                bail!("line {}: expected `token<TAB>valence`", line_no + 1);
            };
            let valence: f64 = mean
                .trim()
                .parse()
                .with_context(|| format!("line {}: bad valence {mean:?}", line_no + 1))?;
            if !valence.is_finite() {
                bail!("line {}: valence must be finite", line_no + 1);
            }
            words.insert(token.trim().to_lowercase(), valence);
        }
        Ok(Self { words })
    }

    /// Loads a VADER-format lexicon file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading lexicon {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing lexicon {}", path.display()))
    }

    /// Adds or replaces a word.
    pub fn insert(&mut self, word: &str, valence: f64) {
        self.words.insert(word.to_lowercase(), valence);
    }

    /// Valence of a lowercase token.
    #[must_use]
    pub fn valence(&self, token: &str) -> Option<f64> {
        self.words.get(token).copied()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the lexicon has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_has_polar_entries() {
        let lexicon = ValenceLexicon::builtin();
        assert!(lexicon.valence("love").unwrap() > 0.0);
        assert!(lexicon.valence("hate").unwrap() < 0.0);
        assert!(lexicon.valence("table").is_none());
    }

    #[test]
    fn parses_vader_format_and_skips_comments() {
        let lexicon = ValenceLexicon::parse("# header\nbuzz\t1.5\t0.5\t[1, 2]\n\nSting\t-2.0\n")
            .unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.valence("sting"), Some(-2.0));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(ValenceLexicon::parse("buzz 1.5").is_err());
        assert!(ValenceLexicon::parse("buzz\tlots").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lexicon.txt");
        fs::write(&path, "pollen\t1.2\n").unwrap();
        let lexicon = ValenceLexicon::load(&path).unwrap();
        assert_eq!(lexicon.valence("pollen"), Some(1.2));
    }
}
