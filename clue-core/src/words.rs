use anyhow::{Context, Result, anyhow};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A secret word and the hints revealed for it, in reveal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub hints: Vec<String>,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, hints: Vec<String>) -> Self {
        Self {
            word: word.into(),
            hints,
        }
    }
}

/// Source of words for new rounds.
pub trait WordProvider: Send + Sync {
    /// Draw the next word. `previous` is the word of the round that just
    /// finished, if any, so implementations can avoid repeating it.
    fn draw(&self, previous: Option<&str>) -> WordEntry;
}

const BUILTIN_WORDS: &[(&str, &[&str])] = &[
    ("LANTERN", &["It gives off light", "You can carry it by a handle", "Old ones burned oil", "Campers hang them at night"]),
    ("GLACIER", &["It is very cold", "It moves extremely slowly", "It is made of packed snow", "It carves valleys"]),
    ("PIANO", &["It is a musical instrument", "It has black and white keys", "Hammers strike its strings", "It can be grand or upright"]),
    ("COMPASS", &["It helps you find your way", "It has a needle", "It reacts to magnetism", "North is marked on it"]),
    ("HONEYBEE", &["It is an insect", "It lives in a colony", "It visits flowers", "It makes something sweet"]),
    ("SUBMARINE", &["It is a vessel", "It travels under water", "It uses a periscope", "Sailors serve aboard it"]),
    ("CACTUS", &["It is a plant", "It grows in dry places", "It stores water", "Touching it can hurt"]),
    ("ORCHESTRA", &["It is a large group", "It has a conductor", "It plays in concert halls", "Strings, brass and woodwinds"]),
    ("PASSPORT", &["It is a document", "It has your photo", "You need it abroad", "Border officers stamp it"]),
    ("WINDMILL", &["It is a tall structure", "Wind turns its blades", "It can grind grain", "The Netherlands has many"]),
    ("THUNDER", &["You hear it rather than see it", "It follows lightning", "It rumbles", "Storms bring it"]),
    ("CHAMELEON", &["It is a reptile", "Its eyes move independently", "It has a long sticky tongue", "It changes color"]),
];

/// In-memory list of [`WordEntry`] values with uniform random draws.
#[derive(Debug, Clone)]
pub struct WordBank {
    entries: Vec<WordEntry>,
}

impl WordBank {
    /// Build a bank from raw entries. Words are trimmed and upper-cased;
    /// entries with a blank word are dropped and blank hints are skipped.
    pub fn new(entries: Vec<WordEntry>) -> Result<Self> {
        let entries: Vec<WordEntry> = entries
            .into_iter()
            .map(|entry| WordEntry {
                word: entry.word.trim().to_uppercase(),
                hints: entry
                    .hints
                    .into_iter()
                    .map(|hint| hint.trim().to_string())
                    .filter(|hint| !hint.is_empty())
                    .collect(),
            })
            .filter(|entry| !entry.word.is_empty())
            .collect();

        if entries.is_empty() {
            return Err(anyhow!("Word bank must contain at least one word"));
        }

        Ok(Self { entries })
    }

    /// Parse a JSON array of `{"word": "...", "hints": ["..."]}` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<WordEntry> =
            serde_json::from_str(json).context("Invalid word bank JSON")?;
        Self::new(entries)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read word bank {}", path.display()))?;
        let bank = Self::from_json_str(&json)?;
        tracing::info!("Loaded {} words from {}", bank.len(), path.display());
        Ok(bank)
    }

    /// The word list shipped with the server.
    pub fn builtin() -> Self {
        let entries = BUILTIN_WORDS
            .iter()
            .map(|(word, hints)| {
                WordEntry::new(*word, hints.iter().map(|h| h.to_string()).collect())
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }
}

impl WordProvider for WordBank {
    fn draw(&self, previous: Option<&str>) -> WordEntry {
        let mut rng = rand::rng();
        let candidates: Vec<&WordEntry> = match previous {
            Some(previous) if self.entries.len() > 1 => self
                .entries
                .iter()
                .filter(|entry| !entry.word.eq_ignore_ascii_case(previous))
                .collect(),
            _ => self.entries.iter().collect(),
        };

        // The filter removes at most the one matching word, so candidates
        // can only be empty if every entry repeats `previous`.
        if candidates.is_empty() {
            return self.entries[rng.random_range(0..self.entries.len())].clone();
        }
        candidates[rng.random_range(0..candidates.len())].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bank_is_usable() {
        let bank = WordBank::builtin();
        assert!(bank.len() >= 10);
        for entry in bank.entries() {
            assert_eq!(entry.word, entry.word.to_uppercase());
            assert!(!entry.hints.is_empty(), "{} has no hints", entry.word);
        }
    }

    #[test]
    fn test_json_bank_normalizes_words() {
        let json = r#"[
            {"word": " kettle ", "hints": ["It boils water", "  ", "It whistles"]},
            {"word": "", "hints": ["dropped"]}
        ]"#;
        let bank = WordBank::from_json_str(json).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.entries()[0].word, "KETTLE");
        assert_eq!(bank.entries()[0].hints, vec!["It boils water", "It whistles"]);
    }

    #[test]
    fn test_empty_bank_is_rejected() {
        assert!(WordBank::from_json_str("[]").is_err());
        assert!(WordBank::from_json_str("not json").is_err());
        assert!(WordBank::new(vec![WordEntry::new("   ", vec![])]).is_err());
    }

    #[test]
    fn test_draw_avoids_previous_word() {
        let bank = WordBank::new(vec![
            WordEntry::new("ALPHA", vec!["first".into()]),
            WordEntry::new("BRAVO", vec!["second".into()]),
        ])
        .unwrap();

        for _ in 0..50 {
            assert_eq!(bank.draw(Some("ALPHA")).word, "BRAVO");
            assert_eq!(bank.draw(Some("bravo")).word, "ALPHA");
        }
    }

    #[test]
    fn test_single_word_bank_repeats() {
        let bank = WordBank::new(vec![WordEntry::new("ALPHA", vec![])]).unwrap();
        assert_eq!(bank.draw(Some("ALPHA")).word, "ALPHA");
        assert_eq!(bank.draw(None).word, "ALPHA");
    }
}
