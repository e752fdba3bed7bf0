//! Vocabulary encoder
//!
//! Maps raw text to vocabulary indices using the tokenizer rules that were
//! exported together with the word index. The rules are read from the
//! artifact, never re-derived here: lowercasing, the filtered character
//! set, the split string and the `num_words` cut-off all come from the file.
//!
//! Two artifact shapes are accepted:
//! - the `Tokenizer.to_json()` export (`{"class_name": "Tokenizer", "config": {...}}`)
//!   where `word_index` is itself a JSON-encoded string
//! - a flat object with the same keys and `word_index` as a plain map

use jobscreen_core::{Error, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Characters replaced by the split string before tokenizing
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Out-of-vocabulary token used by the training pipeline
pub const DEFAULT_OOV_TOKEN: &str = "<OOV>";

/// Tokenization rules stored alongside the word index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerRules {
    /// Lowercase text before lookup
    pub lower: bool,

    /// Characters mapped to `split`
    pub filters: String,

    /// Separator between tokens
    pub split: String,

    /// Treat every character as a token
    pub char_level: bool,
}

impl Default for TokenizerRules {
    fn default() -> Self {
        Self {
            lower: true,
            filters: DEFAULT_FILTERS.to_string(),
            split: " ".to_string(),
            char_level: false,
        }
    }
}

/// Read-only token → index table
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word_index: HashMap<String, u32>,
    filters: HashSet<char>,
    rules: TokenizerRules,
    num_words: Option<u32>,
    oov_index: Option<u32>,
}

impl Vocabulary {
    /// Build a vocabulary from an explicit word index.
    ///
    /// Index 0 is reserved for padding and must not appear in the table.
    /// When `oov_token` is set it must be present in `word_index`.
    pub fn new(
        word_index: HashMap<String, u32>,
        rules: TokenizerRules,
        num_words: Option<u32>,
        oov_token: Option<&str>,
    ) -> Result<Self> {
        if word_index.is_empty() {
            return Err(Error::artifact("vocabulary word index is empty"));
        }
        if let Some((word, _)) = word_index.iter().find(|(_, index)| **index == 0) {
            return Err(Error::artifact(format!(
                "word '{}' uses index 0, which is reserved for padding",
                word
            )));
        }
        if !rules.char_level && rules.split.is_empty() {
            return Err(Error::artifact("tokenizer split string must not be empty"));
        }

        let oov_index = match oov_token {
            Some(token) => Some(*word_index.get(token).ok_or_else(|| {
                Error::artifact(format!("OOV token '{}' is missing from the word index", token))
            })?),
            None => None,
        };

        Ok(Self {
            filters: rules.filters.chars().collect(),
            word_index,
            rules,
            // A cut-off of zero disables the limit
            num_words: num_words.filter(|&n| n > 0),
            oov_index,
        })
    }

    /// Build a vocabulary from words ranked by frequency, the way the
    /// training pipeline assigns indices: the OOV token (if any) takes
    /// index 1 and the ranked words follow.
    pub fn from_ranked_words<I, S>(words: I, oov_token: Option<&str>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut word_index = HashMap::new();
        let mut next = 1u32;

        if let Some(token) = oov_token {
            word_index.insert(token.to_string(), next);
            next += 1;
        }
        for word in words {
            word_index.entry(word.into()).or_insert_with(|| {
                let index = next;
                next += 1;
                index
            });
        }

        Self::new(word_index, TokenizerRules::default(), None, oov_token)
    }

    /// Load a vocabulary artifact from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact(format!("Failed to read vocabulary {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse a vocabulary artifact from its JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: VocabularyArtifact = serde_json::from_str(json)
            .map_err(|e| Error::artifact(format!("Failed to parse vocabulary: {}", e)))?;

        let file = match artifact {
            VocabularyArtifact::Exported { class_name, config } => {
                if class_name != "Tokenizer" {
                    return Err(Error::artifact(format!(
                        "unexpected tokenizer class '{}'",
                        class_name
                    )));
                }
                config
            }
            VocabularyArtifact::Flat(file) => file,
        };

        let word_index = match file.word_index {
            WordIndexField::Encoded(encoded) => serde_json::from_str(&encoded).map_err(|e| {
                Error::artifact(format!("Failed to decode embedded word_index: {}", e))
            })?,
            WordIndexField::Table(table) => table,
        };

        let rules = TokenizerRules {
            lower: file.lower,
            filters: file.filters.unwrap_or_default(),
            split: file.split,
            char_level: file.char_level,
        };

        Self::new(word_index, rules, file.num_words, file.oov_token.as_deref())
    }

    /// Split text into lookup tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.rules.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        if self.rules.char_level {
            return text.chars().map(String::from).collect();
        }

        let mut translated = String::with_capacity(text.len());
        for c in text.chars() {
            if self.filters.contains(&c) {
                translated.push_str(&self.rules.split);
            } else {
                translated.push(c);
            }
        }

        translated
            .split(self.rules.split.as_str())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Encode text to indices.
    ///
    /// Unknown words and words ranked beyond `num_words` map to the OOV index
    /// when one is configured and are dropped otherwise.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.tokenize(text)
            .iter()
            .filter_map(|token| self.lookup(token))
            .collect()
    }

    fn lookup(&self, token: &str) -> Option<u32> {
        match self.word_index.get(token) {
            Some(&index) => match self.num_words {
                Some(limit) if index >= limit => self.oov_index,
                _ => Some(index),
            },
            None => self.oov_index,
        }
    }

    /// Index of a single token, ignoring the `num_words` cut-off
    pub fn index_of(&self, token: &str) -> Option<u32> {
        self.word_index.get(token).copied()
    }

    /// Index assigned to unknown words, if any
    pub fn oov_index(&self) -> Option<u32> {
        self.oov_index
    }

    /// Largest index [`Vocabulary::encode`] can emit
    pub fn max_encoded_index(&self) -> u32 {
        let max = self.word_index.values().copied().max().unwrap_or(0);
        match self.num_words {
            Some(limit) => max.min(limit.saturating_sub(1)).max(self.oov_index.unwrap_or(0)),
            None => max,
        }
    }

    /// Number of entries in the word index
    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    pub fn num_words(&self) -> Option<u32> {
        self.num_words
    }

    pub fn rules(&self) -> &TokenizerRules {
        &self.rules
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VocabularyArtifact {
    Exported {
        class_name: String,
        config: TokenizerFile,
    },
    Flat(TokenizerFile),
}

#[derive(Deserialize)]
struct TokenizerFile {
    #[serde(default)]
    num_words: Option<u32>,

    #[serde(default = "default_filters")]
    filters: Option<String>,

    #[serde(default = "default_true")]
    lower: bool,

    #[serde(default = "default_split")]
    split: String,

    #[serde(default)]
    char_level: bool,

    #[serde(default)]
    oov_token: Option<String>,

    word_index: WordIndexField,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WordIndexField {
    Encoded(String),
    Table(HashMap<String, u32>),
}

fn default_filters() -> Option<String> {
    Some(DEFAULT_FILTERS.to_string())
}

fn default_true() -> bool {
    true
}

fn default_split() -> String {
    " ".to_string()
}
